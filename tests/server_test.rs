use axum::body::Body;
use axum::http::{Request, StatusCode};
use httpmock::prelude::*;
use stat_feeds::{create_router, AppContext, HandlerSet, SourcesConfig};
use tower::ServiceExt;

fn router_for(server: &MockServer, api_key: Option<&str>) -> axum::Router {
    let mut config = SourcesConfig::default();
    config.ofgem.url = server.url("/ofgem");
    config.ons.url = server.url("/ons");
    config.forex.endpoint = server.url("/v1/latest");
    config.forex.api_key = api_key.map(|k| k.to_string());
    let handlers = HandlerSet::new(AppContext::new(config).unwrap()).unwrap();
    create_router(handlers)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_endpoint_returns_ok() {
    let server = MockServer::start();
    let app = router_for(&server, None);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}

#[tokio::test]
async fn test_ofgem_route_sets_json_and_cache_headers() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/ofgem");
        then.status(200).body(
            "<p>A typical household will pay £1,755 per year from 1 October to 31 December 2025.</p>",
        );
    });
    let app = router_for(&server, None);

    let response = app
        .oneshot(Request::builder().uri("/api/ofgem-cap").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "application/json");
    assert_eq!(
        response.headers()["cache-control"],
        "s-maxage=21600, stale-while-revalidate=86400"
    );
    let json = body_json(response).await;
    assert_eq!(json["stat"]["value"], 1755);
}

#[tokio::test]
async fn test_rates_route_forwards_query() {
    let server = MockServer::start();
    let api = server.mock(|when, then| {
        when.method(GET)
            .path("/v1/latest")
            .query_param("base", "EUR")
            .query_param("currencies", "USD");
        then.status(200)
            .json_body(serde_json::json!({"base": "EUR", "rates": {"USD": 1.08}}));
    });
    let app = router_for(&server, Some("test-key"));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/rates?base=eur&currencies=usd")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    api.assert();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["cache-control"],
        "s-maxage=86400, stale-while-revalidate=43200"
    );
    let json = body_json(response).await;
    assert_eq!(json["rates"]["USD"], 1.08);
}

#[tokio::test]
async fn test_rates_route_without_key_is_500_without_cache() {
    let server = MockServer::start();
    let app = router_for(&server, None);

    let response = app
        .oneshot(Request::builder().uri("/api/rates").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.headers().get("cache-control").is_none());
    assert_eq!(response.headers()["content-type"], "application/json");
    assert_eq!(body_json(response).await["error"], "missing_api_key");
}

#[tokio::test]
async fn test_house_price_route_is_always_200() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/ons");
        then.status(500);
    });
    let app = router_for(&server, None);

    let response = app
        .oneshot(Request::builder().uri("/api/house-price").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["value"].is_null());
    assert!(json["error"].is_string());
}
