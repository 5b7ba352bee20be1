#[cfg(feature = "lambda")]
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
#[cfg(feature = "lambda")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "lambda")]
use stat_feeds::core::respond::respond_error_with;
#[cfg(feature = "lambda")]
use stat_feeds::core::{ErrorEnvelope, Query};
#[cfg(feature = "lambda")]
use stat_feeds::utils::{logger, validation::Validate};
#[cfg(feature = "lambda")]
use stat_feeds::{AppContext, Endpoint, HandlerResponse, HandlerSet, LambdaConfig};
#[cfg(feature = "lambda")]
use std::collections::HashMap;
#[cfg(feature = "lambda")]
use std::sync::Arc;

#[cfg(feature = "lambda")]
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub endpoint: Option<String>,
    pub raw_path: Option<String>,
    pub path: Option<String>,
    pub query_string_parameters: Option<HashMap<String, String>>,
}

#[cfg(feature = "lambda")]
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

#[cfg(feature = "lambda")]
impl From<HandlerResponse> for Response {
    fn from(resp: HandlerResponse) -> Self {
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), resp.content_type().to_string());
        if let Some(cache_control) = resp.cache_control {
            headers.insert("cache-control".to_string(), cache_control);
        }
        Self {
            status_code: resp.status.as_u16(),
            headers,
            body: resp.body,
        }
    }
}

#[cfg(feature = "lambda")]
async fn function_handler(
    handlers: &HandlerSet,
    event: LambdaEvent<Request>,
) -> Result<Response, Error> {
    let request = event.payload;
    let target = request
        .endpoint
        .as_deref()
        .or(request.raw_path.as_deref())
        .or(request.path.as_deref())
        .unwrap_or_default();

    let Some(endpoint) = Endpoint::from_path(target) else {
        tracing::warn!("Unknown endpoint requested: {}", target);
        return Ok(respond_error_with(
            reqwest::StatusCode::NOT_FOUND,
            ErrorEnvelope::new("not_found"),
        )
        .into());
    };

    tracing::info!("Handling {} in Lambda", endpoint);
    let query: Query = request.query_string_parameters.unwrap_or_default();
    let response = handlers.get(endpoint).handle(&query).await;
    Ok(response.into())
}

#[cfg(feature = "lambda")]
#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger();

    let config = LambdaConfig::from_env()?;
    config.validate()?;
    let handlers = Arc::new(HandlerSet::new(AppContext::new(config.sources)?)?);

    run(service_fn(move |event: LambdaEvent<Request>| {
        let handlers = handlers.clone();
        async move { function_handler(&handlers, event).await }
    }))
    .await
}
