use httpmock::prelude::*;
use stat_feeds::app::handlers::ForexRatesHandler;
use stat_feeds::config::sources::DEFAULT_CURRENCIES;
use stat_feeds::core::{Query, StatisticHandler};
use stat_feeds::{AppContext, SourcesConfig};

fn handler_for(server: &MockServer, api_key: Option<&str>) -> ForexRatesHandler {
    let mut config = SourcesConfig::default();
    config.forex.endpoint = server.url("/v1/latest");
    config.forex.api_key = api_key.map(|k| k.to_string());
    ForexRatesHandler::new(AppContext::new(config).unwrap())
}

fn query(pairs: &[(&str, &str)]) -> Query {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[tokio::test]
async fn test_rates_with_default_query() {
    let server = MockServer::start();
    let api = server.mock(|when, then| {
        when.method(GET)
            .path("/v1/latest")
            .query_param("api_key", "test-key")
            .query_param("base", "GBP")
            .query_param("currencies", DEFAULT_CURRENCIES);
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({
                "success": true,
                "base": "GBP",
                "timestamp": 1_760_486_400,
                "rates": {"USD": 1.27, "EUR": 1.17}
            }));
    });

    let response = handler_for(&server, Some("test-key"))
        .handle(&Query::new())
        .await;

    api.assert();
    assert_eq!(response.status.as_u16(), 200);
    assert_eq!(
        response.cache_control.as_deref(),
        Some("s-maxage=86400, stale-while-revalidate=43200")
    );
    assert_eq!(
        response.body,
        r#"{"base":"GBP","date":"2025-10-15T00:00:00Z","rates":{"EUR":1.17,"USD":1.27},"provider":"forexrateapi"}"#
    );
}

#[tokio::test]
async fn test_query_params_are_passed_through() {
    let server = MockServer::start();
    let api = server.mock(|when, then| {
        when.method(GET)
            .path("/v1/latest")
            .query_param("base", "USD")
            .query_param("currencies", "EUR,JPY");
        then.status(200).json_body(serde_json::json!({
            "data": {"base": "USD", "rates": {"EUR": 0.92, "JPY": 150.1}}
        }));
    });

    let response = handler_for(&server, Some("test-key"))
        .handle(&query(&[("base", "usd"), ("currencies", "eur,jpy")]))
        .await;

    api.assert();
    assert_eq!(response.status.as_u16(), 200);
    let json: serde_json::Value = serde_json::from_str(&response.body).unwrap();
    assert_eq!(json["base"], "USD");
    assert_eq!(json["rates"]["JPY"], 150.1);
    assert_eq!(json["provider"], "forexrateapi");
    assert!(json["date"].is_string());
}

#[tokio::test]
async fn test_conversion_rates_shape_uses_base_code() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/v1/latest");
        then.status(200).json_body(serde_json::json!({
            "base_code": "GBP",
            "date": "2025-10-15",
            "conversion_rates": {"CHF": 1.07}
        }));
    });

    let response = handler_for(&server, Some("test-key"))
        .handle(&Query::new())
        .await;

    let json: serde_json::Value = serde_json::from_str(&response.body).unwrap();
    assert_eq!(json["base"], "GBP");
    assert_eq!(json["date"], "2025-10-15");
    assert_eq!(json["rates"], serde_json::json!({"CHF": 1.07}));
}

#[tokio::test]
async fn test_missing_api_key_fails_before_network_call() {
    let server = MockServer::start();
    let api = server.mock(|when, then| {
        when.method(GET).path("/v1/latest");
        then.status(200).json_body(serde_json::json!({"rates": {}}));
    });

    let response = handler_for(&server, None).handle(&Query::new()).await;

    api.assert_hits(0);
    assert_eq!(response.status.as_u16(), 500);
    assert!(response.cache_control.is_none());
    assert_eq!(response.body, r#"{"error":"missing_api_key"}"#);
}

#[tokio::test]
async fn test_upstream_failure_is_bad_gateway() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/v1/latest");
        then.status(401).json_body(serde_json::json!({"error": "invalid api key"}));
    });

    let response = handler_for(&server, Some("bad-key"))
        .handle(&Query::new())
        .await;

    assert_eq!(response.status.as_u16(), 502);
    assert!(response.cache_control.is_none());
    let json: serde_json::Value = serde_json::from_str(&response.body).unwrap();
    assert_eq!(json["error"], "upstream_error");
    assert_eq!(json["status"], 401);
    assert!(json.get("rates").is_none());
}

#[tokio::test]
async fn test_unrecognized_payload_is_bad_gateway() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/v1/latest");
        then.status(200).json_body(serde_json::json!({
            "success": false,
            "error": {"code": 104, "info": "quota reached"}
        }));
    });

    let response = handler_for(&server, Some("test-key"))
        .handle(&Query::new())
        .await;

    assert_eq!(response.status.as_u16(), 502);
    let json: serde_json::Value = serde_json::from_str(&response.body).unwrap();
    assert_eq!(json["error"], "unrecognized_payload");
}

#[tokio::test]
async fn test_non_json_body_is_bad_gateway() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/v1/latest");
        then.status(200).body("<html>maintenance</html>");
    });

    let response = handler_for(&server, Some("test-key"))
        .handle(&Query::new())
        .await;

    assert_eq!(response.status.as_u16(), 502);
    let json: serde_json::Value = serde_json::from_str(&response.body).unwrap();
    assert_eq!(json["error"], "unrecognized_payload");
}

#[tokio::test]
async fn test_unreachable_upstream_is_bad_gateway_without_key_in_body() {
    // 綁定後立刻釋放，確保該埠沒有人監聽
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let mut config = SourcesConfig::default();
    config.forex.endpoint = format!("http://{}/v1/latest", addr);
    config.forex.api_key = Some("SUPERSECRET".to_string());
    let handler = ForexRatesHandler::new(AppContext::new(config).unwrap());

    let response = handler.handle(&Query::new()).await;

    assert_eq!(response.status.as_u16(), 502);
    assert!(response.cache_control.is_none());
    assert_eq!(response.body, r#"{"error":"upstream_unreachable"}"#);
}

#[tokio::test]
async fn test_whole_number_rates_render_as_integers() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/v1/latest");
        then.status(200).json_body(serde_json::json!({
            "base": "GBP",
            "timestamp": 1_760_486_400,
            "rates": {"GBP": 1, "USD": 1.27}
        }));
    });

    let response = handler_for(&server, Some("test-key"))
        .handle(&query(&[("currencies", "GBP,USD")]))
        .await;

    assert_eq!(response.status.as_u16(), 200);
    assert!(response.body.contains(r#""rates":{"GBP":1,"USD":1.27}"#));
}
