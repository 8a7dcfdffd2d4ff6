use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use ezx::client::HttpConversionClient;
use ezx::conversion_client::ConversionClient;
use ezx::core::Currency;
use ezx::core::cache::Cache;
use ezx::providers::exchange_rate_api::ExchangeRateApiProvider;
use ezx::server::{AppState, build_router};
use ezx::widget::{Action, Converter, Effect};

const API_KEY: &str = "integration-test-key";

mod test_utils {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub async fn create_upstream_mock(pair_path: &str, mock_response: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        let url_path = format!("/{API_KEY}/pair/{pair_path}");

        Mock::given(method("GET"))
            .and(path(&url_path))
            .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
            .mount(&mock_server)
            .await;

        mock_server
    }

    pub fn state_with_upstream(upstream_url: &str) -> Arc<AppState> {
        let cache = Arc::new(Cache::new(Duration::from_secs(3600)));
        let provider = ExchangeRateApiProvider::new(upstream_url, API_KEY, cache);
        Arc::new(AppState {
            rates: Some(Arc::new(provider)),
        })
    }

    /// Serves the proxy on an ephemeral port and returns its base URL.
    pub async fn spawn_proxy(state: Arc<AppState>) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local addr");

        let app = build_router(state);
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Proxy crashed");
        });

        format!("http://{addr}")
    }
}

#[test_log::test(tokio::test)]
async fn test_widget_to_upstream_conversion_flow() {
    let mock_response = r#"{
        "result": "success",
        "conversion_rate": 0.8325,
        "conversion_result": 83.25
    }"#;
    let upstream = test_utils::create_upstream_mock("USD/GBP/100", mock_response).await;
    let proxy_url = test_utils::spawn_proxy(test_utils::state_with_upstream(&upstream.uri())).await;

    let client = HttpConversionClient::new(&proxy_url);
    let mut widget = Converter::new();
    widget.apply(Action::SetAmount("100".to_string()));

    info!("Submitting conversion through the full stack");
    let effect = widget.submit(&client).await;

    assert_eq!(effect, Some(Effect::RevealResult));
    assert!(widget.error().is_none());

    let result = widget.result().expect("Conversion result should be set");
    assert_eq!(result.amount, 100.0);
    assert_eq!(result.rate, 0.8325);
    assert_eq!(result.converted_amount, 83.25);
    assert!((result.inverse_rate - 1.0 / 0.8325).abs() < 1e-12);

    let rendered = result.display_as_table();
    assert!(rendered.contains("100"));
    assert!(rendered.contains("83.25"));
    assert!(rendered.contains("US Dollar"));
    assert!(rendered.contains("British Pound"));
}

#[test_log::test(tokio::test)]
async fn test_missing_parameters_return_400() {
    let upstream = wiremock::MockServer::start().await;
    let proxy_url = test_utils::spawn_proxy(test_utils::state_with_upstream(&upstream.uri())).await;

    for query in ["", "?from=USD", "?from=USD&to=GBP", "?to=GBP&amount=100"] {
        let response = reqwest::get(format!("{proxy_url}/api/convert{query}"))
            .await
            .unwrap();
        assert_eq!(response.status(), 400, "query {query:?}");

        let body: serde_json::Value = response.json().await.unwrap();
        assert!(
            body["error"].as_str().unwrap().contains("Missing"),
            "query {query:?}"
        );
    }
}

#[test_log::test(tokio::test)]
async fn test_non_positive_amount_returns_400() {
    let upstream = wiremock::MockServer::start().await;
    let proxy_url = test_utils::spawn_proxy(test_utils::state_with_upstream(&upstream.uri())).await;

    for amount in ["-5", "0", "abc"] {
        let response = reqwest::get(format!(
            "{proxy_url}/api/convert?from=USD&to=GBP&amount={amount}"
        ))
        .await
        .unwrap();
        assert_eq!(response.status(), 400, "amount {amount:?}");

        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Amount must be a positive number");
    }
}

#[test_log::test(tokio::test)]
async fn test_missing_credential_returns_500() {
    let proxy_url = test_utils::spawn_proxy(Arc::new(AppState { rates: None })).await;

    let response = reqwest::get(format!(
        "{proxy_url}/api/convert?from=USD&to=GBP&amount=100"
    ))
    .await
    .unwrap();

    assert_eq!(response.status(), 500);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "API key not configured");
}

#[test_log::test(tokio::test)]
async fn test_upstream_failure_is_masked_with_generic_message() {
    let mock_response = r#"{"result": "error", "error-type": "invalid-key"}"#;
    let upstream = test_utils::create_upstream_mock("USD/GBP/100", mock_response).await;
    let proxy_url = test_utils::spawn_proxy(test_utils::state_with_upstream(&upstream.uri())).await;

    let response = reqwest::get(format!(
        "{proxy_url}/api/convert?from=USD&to=GBP&amount=100"
    ))
    .await
    .unwrap();

    assert_eq!(response.status(), 500);
    let text = response.text().await.unwrap();
    assert!(text.contains("Failed to convert currency"));
    // Upstream detail is never echoed to the client
    assert!(!text.contains("invalid-key"));
    assert!(!text.contains(API_KEY));
}

#[test_log::test(tokio::test)]
async fn test_successful_response_carries_cache_directive() {
    let mock_response = r#"{
        "result": "success",
        "conversion_rate": 1.1,
        "conversion_result": 110
    }"#;
    let upstream = test_utils::create_upstream_mock("EUR/USD/100", mock_response).await;
    let proxy_url = test_utils::spawn_proxy(test_utils::state_with_upstream(&upstream.uri())).await;

    let response = reqwest::get(format!(
        "{proxy_url}/api/convert?from=EUR&to=USD&amount=100"
    ))
    .await
    .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(
        response
            .headers()
            .get("cache-control")
            .and_then(|v| v.to_str().ok()),
        Some("public, s-maxage=3600, stale-while-revalidate=7200")
    );

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["conversion_rate"], 1.1);
    assert_eq!(body["conversion_result"], 110.0);
    // Only the pair data is forwarded
    assert!(body.get("result").is_none());
}

#[test_log::test(tokio::test)]
async fn test_repeat_conversion_is_idempotent_and_cached() {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let mock_response = r#"{
        "result": "success",
        "conversion_rate": 0.8325,
        "conversion_result": 83.25
    }"#;
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/{API_KEY}/pair/USD/GBP/100")))
        .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
        .expect(1)
        .mount(&upstream)
        .await;

    let proxy_url = test_utils::spawn_proxy(test_utils::state_with_upstream(&upstream.uri())).await;
    let client = HttpConversionClient::new(&proxy_url);

    let first = client
        .convert(Currency::Usd, Currency::Gbp, 100.0)
        .await
        .unwrap();
    let second = client
        .convert(Currency::Usd, Currency::Gbp, 100.0)
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(first.rate, 0.8325);
    assert_eq!(first.converted_amount, 83.25);
}
