//! Logs into a mocked Convo backend, lets the access token expire, and shows the client
//! refreshing it transparently while the session is persisted through a file store.

// std
use std::{env, sync::Arc};
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use convo_client::{
	auth::Credentials,
	client::ApiClient,
	config::ClientConfig,
	http::ReqwestHttpClient,
	navigation::LoginRedirect,
	reqwest::Client,
	store::{FileStore, SessionStore},
};

struct PrintRedirect;
impl LoginRedirect for PrintRedirect {
	fn redirect_to_login(&self, entry_point: &str) {
		println!("Session expired; navigating to {entry_point}.");
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let login_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/login");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"token\":\"demo-access\",\"refresh_token\":\"demo-refresh\"}");
		})
		.await;
	let expired_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/meetings").header("authorization", "Bearer demo-access");
			then.status(401).body("{\"message\":\"Token expired\"}");
		})
		.await;
	let refresh_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/refresh-token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"accessToken\":\"demo-access-2\"}");
		})
		.await;
	let meetings_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/meetings").header("authorization", "Bearer demo-access-2");
			then.status(200).header("content-type", "application/json").body(concat!(
				"[{\"id\":1,\"title\":\"Kickoff\",\"description\":null,",
				"\"start_time\":\"2025-11-10T09:00:00\",\"end_time\":\"2025-11-10T09:30:00\",",
				"\"creator_id\":1}]",
			));
		})
		.await;
	let path = env::temp_dir().join("convo-demo").join("session.json");
	let store: Arc<dyn SessionStore> = Arc::new(FileStore::open(&path)?);
	// The mock server answers over TLS with a self-signed certificate.
	let http_client = ReqwestHttpClient::with_client(
		Client::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()?,
	);
	let client = <ApiClient<ReqwestHttpClient>>::with_http_client(
		ClientConfig::parse(&server.url("/api"))?,
		store,
		http_client,
		Arc::new(PrintRedirect),
	);

	client.login(&Credentials::new("a@b.com", "secret")).await?;

	for meeting in client.list_meetings().await? {
		println!(
			"Meeting #{}: {} ({} to {}).",
			meeting.id, meeting.title, meeting.start_time, meeting.end_time
		);
	}

	println!(
		"Refreshes sent: {}; session persisted at {}.",
		client.refresh_metrics.attempts(),
		path.display()
	);

	client.logout().await?;

	login_mock.assert_async().await;
	expired_mock.assert_async().await;
	refresh_mock.assert_async().await;
	meetings_mock.assert_async().await;

	Ok(())
}
