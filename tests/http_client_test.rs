//! Integration tests for the network API client against a wiremock server.

use std::time::Duration;

use reqwest::Client;
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use profile_env::network::{
	ClientService, HttpClientService, HttpPriceFeed, LookupError, PriceFeed, WalletIdentifier,
};

fn client(server: &MockServer) -> HttpClientService {
	HttpClientService::new(Client::new(), server.uri(), Some(Duration::from_secs(5)))
}

#[tokio::test]
async fn wallets_posts_identifiers_and_unwraps_envelope() {
	let server = MockServer::start().await;

	Mock::given(method("POST"))
		.and(path("/wallets/search"))
		.and(body_json(json!({
			"identifiers": [
				{"type": "address", "value": "A1"},
				{"type": "address", "value": "A2"}
			]
		})))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({
			"data": [{"address": "A1", "balance": "100", "nonce": "2"}]
		})))
		.expect(1)
		.mount(&server)
		.await;

	let wallets = client(&server)
		.wallets(&[WalletIdentifier::address("A1"), WalletIdentifier::address("A2")])
		.await
		.expect("lookup should succeed");

	assert_eq!(wallets.len(), 1);
	assert_eq!(wallets[0].address, "A1");
	assert_eq!(wallets[0].balance, "100");
	assert_eq!(wallets[0].nonce.as_deref(), Some("2"));
	assert_eq!(wallets[0].public_key, None);
}

#[tokio::test]
async fn wallets_without_identifiers_skips_the_request() {
	let server = MockServer::start().await;

	Mock::given(method("POST"))
		.respond_with(ResponseTemplate::new(500))
		.expect(0)
		.mount(&server)
		.await;

	let wallets = client(&server).wallets(&[]).await.expect("no request made");
	assert!(wallets.is_empty());
}

#[tokio::test]
async fn client_errors_are_not_retried() {
	let server = MockServer::start().await;

	Mock::given(method("GET"))
		.and(path("/delegates"))
		.respond_with(ResponseTemplate::new(404))
		.expect(1)
		.mount(&server)
		.await;

	let result = client(&server).delegates().await;
	assert!(matches!(
		result,
		Err(LookupError::StatusError { status: 404, .. })
	));
}

#[tokio::test]
async fn server_errors_are_retried() {
	let server = MockServer::start().await;

	Mock::given(method("GET"))
		.and(path("/node/fees"))
		.respond_with(ResponseTemplate::new(503))
		.up_to_n_times(1)
		.expect(1)
		.mount(&server)
		.await;

	Mock::given(method("GET"))
		.and(path("/node/fees"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({
			"data": {"transfer": {"min": "1", "avg": "2", "max": "3"}}
		})))
		.expect(1)
		.mount(&server)
		.await;

	let fees = client(&server).fees().await.expect("retry should succeed");
	assert_eq!(fees["transfer"].avg, "2");
}

#[tokio::test]
async fn malformed_bodies_are_json_errors() {
	let server = MockServer::start().await;

	Mock::given(method("GET"))
		.and(path("/delegates"))
		.respond_with(ResponseTemplate::new(200).set_body_string("not json"))
		.mount(&server)
		.await;

	let result = client(&server).delegates().await;
	assert!(matches!(result, Err(LookupError::JsonError(_))));
}

#[tokio::test]
async fn known_wallets_use_the_published_list_when_configured() {
	let server = MockServer::start().await;

	Mock::given(method("GET"))
		.and(path("/lists/known.json"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({
			"data": [{"type": "exchange", "name": "Binance", "address": "AB1"}]
		})))
		.mount(&server)
		.await;

	let known = client(&server)
		.with_known_wallets_url(Some(format!("{}/lists/known.json", server.uri())))
		.known_wallets()
		.await
		.expect("known wallets");

	assert_eq!(known.len(), 1);
	assert_eq!(known[0].kind, "exchange");
	assert_eq!(known[0].name, "Binance");
}

#[tokio::test]
async fn price_feed_reads_requested_currency() {
	let server = MockServer::start().await;

	Mock::given(method("GET"))
		.and(path("/data/price"))
		.and(query_param("fsym", "ARK"))
		.and(query_param("tsyms", "USD"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({"USD": 0.25})))
		.mount(&server)
		.await;

	let feed = HttpPriceFeed::new(Client::new(), server.uri(), Duration::from_secs(5));

	assert_eq!(feed.rate("ARK", "USD").await.expect("rate"), 0.25);
	// unmatched requests get a 404 from the mock server
	assert!(matches!(
		feed.rate("ARK", "EUR").await,
		Err(LookupError::StatusError { status: 404, .. })
	));
}
