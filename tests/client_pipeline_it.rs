// std
use std::{io, sync::Arc, time::Duration};
// crates.io
use parking_lot::Mutex;
// self
use convo_client::{
	auth::{Credentials, Session},
	client::ApiClient,
	config::ClientConfig,
	error::{Error, ErrorKind, FALLBACK_MESSAGE, TransportError},
	http::{ApiRequest, ApiResponse, HttpRequest, HttpTransport, TransportFuture},
	navigation::{LoginRedirect, RecordingRedirect},
	store::{CompareAndSwapOutcome, MemoryStore, SessionStore, StoreError, StoreFuture},
};

const BASE_URL: &str = "http://convo.test/api";

#[derive(Clone, Debug)]
enum Reply {
	Json(u16, String),
	Timeout,
	Refused,
}

fn json(status: u16, body: &str) -> Reply {
	Reply::Json(status, body.to_owned())
}

type Handler = Box<dyn Fn(&HttpRequest, usize) -> Reply + Send + Sync>;

/// Fake transport that records every send and answers from a routing closure.
///
/// The closure receives the request and how many earlier sends hit the same path.
struct ScriptedTransport {
	handler: Handler,
	sent: Mutex<Vec<HttpRequest>>,
	refresh_delay: Option<Duration>,
}
impl ScriptedTransport {
	fn new(handler: impl 'static + Fn(&HttpRequest, usize) -> Reply + Send + Sync) -> Self {
		Self { handler: Box::new(handler), sent: Mutex::new(Vec::new()), refresh_delay: None }
	}

	fn with_refresh_delay(mut self, delay: Duration) -> Self {
		self.refresh_delay = Some(delay);

		self
	}

	fn sent(&self) -> Vec<HttpRequest> {
		self.sent.lock().clone()
	}

	fn sent_to(&self, route: &str) -> Vec<HttpRequest> {
		self.sent().into_iter().filter(|request| route_of(request) == route).collect()
	}
}
impl HttpTransport for ScriptedTransport {
	fn send(&self, request: HttpRequest) -> TransportFuture<'_> {
		let hits = {
			let mut sent = self.sent.lock();
			let hits =
				sent.iter().filter(|earlier| earlier.url.path() == request.url.path()).count();

			sent.push(request.clone());

			hits
		};
		let reply = (self.handler)(&request, hits);
		let delay = if route_of(&request) == "/refresh-token" { self.refresh_delay } else { None };

		Box::pin(async move {
			if let Some(delay) = delay {
				tokio::time::sleep(delay).await;
			}

			match reply {
				Reply::Json(status, body) => Ok(ApiResponse::new(status, body)),
				Reply::Timeout => Err(TransportError::Timeout),
				Reply::Refused => Err(TransportError::from(io::Error::new(
					io::ErrorKind::ConnectionRefused,
					"connection refused",
				))),
			}
		})
	}
}

fn route_of(request: &HttpRequest) -> &str {
	request.url.path().strip_prefix("/api").unwrap_or(request.url.path())
}

fn body_of(request: &HttpRequest) -> serde_json::Value {
	serde_json::from_slice(request.body.as_deref().expect("Request should carry a body."))
		.expect("Request body should be JSON.")
}

struct Fixture {
	client: ApiClient<ScriptedTransport>,
	transport: Arc<ScriptedTransport>,
	store: Arc<MemoryStore>,
	redirect: Arc<RecordingRedirect>,
}

fn fixture(transport: ScriptedTransport, session: Option<Session>) -> Fixture {
	let transport = Arc::new(transport);
	let store = Arc::new(session.map(MemoryStore::with_session).unwrap_or_default());
	let redirect = Arc::new(RecordingRedirect::default());
	let session_store: Arc<dyn SessionStore> = store.clone();
	let login_redirect: Arc<dyn LoginRedirect> = redirect.clone();
	let config = ClientConfig::parse(BASE_URL).expect("Fixture config should build.");
	let client = ApiClient::with_http_client(
		config,
		session_store,
		transport.clone(),
		login_redirect,
	);

	Fixture { client, transport, store, redirect }
}

fn logged_in() -> Option<Session> {
	Some(Session::new("T1").with_refresh_token("R1"))
}

/// Meetings answer 200 for `T2`, 401 for anything else; refresh hands out `T2`.
fn rotating_backend(request: &HttpRequest, _hits: usize) -> Reply {
	match route_of(request) {
		"/refresh-token" => json(200, r#"{"accessToken":"T2"}"#),
		_ if request.bearer_token() == Some("T2") => json(200, r#"[{"id":42}]"#),
		_ => json(401, r#"{"message":"Token expired"}"#),
	}
}

#[tokio::test]
async fn successful_call_sends_exactly_one_request() {
	let Fixture { client, transport, .. } =
		fixture(ScriptedTransport::new(|_, _| json(200, "[]")), logged_in());
	let response =
		client.request(ApiRequest::get("/meetings")).await.expect("Request should succeed.");

	assert_eq!(response.status, 200);
	assert_eq!(transport.sent().len(), 1);
	assert_eq!(transport.sent()[0].bearer_token(), Some("T1"));
	assert_eq!(transport.sent()[0].url.as_str(), "http://convo.test/api/meetings");
}

#[tokio::test]
async fn single_401_refreshes_once_and_retries_with_the_new_token() {
	let Fixture { client, transport, store, redirect } =
		fixture(ScriptedTransport::new(rotating_backend), logged_in());
	let response = client
		.request(ApiRequest::get("/meetings/42"))
		.await
		.expect("Request should succeed after the refresh.");

	assert_eq!(response.body, br#"[{"id":42}]"#);

	let sent = transport.sent();

	assert_eq!(sent.len(), 3);
	assert_eq!(sent[0].bearer_token(), Some("T1"));
	assert_eq!(route_of(&sent[1]), "/refresh-token");
	assert_eq!(sent[1].bearer_token(), None);
	assert_eq!(body_of(&sent[1]), serde_json::json!({ "token": "R1" }));
	assert_eq!(sent[2].bearer_token(), Some("T2"));
	assert_eq!(route_of(&sent[2]), "/meetings/42");

	let session = store.snapshot().expect("Session should survive the refresh.");

	assert!(session.holds_access("T2"));
	assert!(session.holds_refresh("R1"));
	assert_eq!(redirect.count(), 0);
	assert_eq!(client.refresh_metrics.attempts(), 1);
	assert_eq!(client.refresh_metrics.successes(), 1);
}

#[tokio::test]
async fn rotated_refresh_token_is_stored() {
	let Fixture { client, store, .. } = fixture(
		ScriptedTransport::new(|request, _| match route_of(request) {
			"/refresh-token" => json(200, r#"{"accessToken":"T2","refreshToken":"R2"}"#),
			_ if request.bearer_token() == Some("T2") => json(200, "[]"),
			_ => json(401, ""),
		}),
		logged_in(),
	);

	client.list_meetings().await.expect("Listing should succeed after the refresh.");

	let session = store.snapshot().expect("Session should survive the refresh.");

	assert!(session.holds_access("T2"));
	assert!(session.holds_refresh("R2"));
}

#[tokio::test]
async fn second_401_expires_the_session_without_a_third_attempt() {
	let Fixture { client, transport, store, redirect } = fixture(
		ScriptedTransport::new(|request, _| match route_of(request) {
			"/refresh-token" => json(200, r#"{"accessToken":"T2"}"#),
			_ => json(401, ""),
		}),
		logged_in(),
	);
	let err = client
		.request(ApiRequest::get("/meetings"))
		.await
		.expect_err("A 401 after the refresh should be terminal.");

	assert!(matches!(err, Error::AuthExpired));
	assert_eq!(err.kind(), ErrorKind::AuthExpired);
	assert_eq!(transport.sent().len(), 3);
	assert_eq!(transport.sent_to("/refresh-token").len(), 1);
	assert!(store.snapshot().is_none());
	assert_eq!(redirect.redirects(), vec!["/login".to_owned()]);
}

#[tokio::test]
async fn failed_refresh_clears_the_session_and_redirects_once() {
	let Fixture { client, transport, store, redirect } = fixture(
		ScriptedTransport::new(|request, _| match route_of(request) {
			"/refresh-token" => json(403, r#"{"message":"Refresh token revoked"}"#),
			_ => json(401, ""),
		}),
		logged_in(),
	);
	let err = client
		.request(ApiRequest::get("/meetings"))
		.await
		.expect_err("A rejected refresh should expire the session.");

	assert!(matches!(err, Error::AuthExpired));
	assert_eq!(transport.sent().len(), 2);
	assert!(store.snapshot().is_none());
	assert_eq!(redirect.count(), 1);
	assert_eq!(client.refresh_metrics.failures(), 1);
}

#[tokio::test]
async fn undecodable_or_unreachable_refresh_also_expires() {
	for refresh_reply in [json(200, r#"{"token":"wrong-shape"}"#), Reply::Refused, Reply::Timeout] {
		let Fixture { client, store, redirect, .. } = fixture(
			ScriptedTransport::new(move |request, _| match route_of(request) {
				"/refresh-token" => refresh_reply.clone(),
				_ => json(401, ""),
			}),
			logged_in(),
		);
		let err = client
			.request(ApiRequest::get("/meetings"))
			.await
			.expect_err("A broken refresh should expire the session.");

		assert!(matches!(err, Error::AuthExpired));
		assert!(store.snapshot().is_none());
		assert_eq!(redirect.count(), 1);
	}
}

#[tokio::test]
async fn missing_refresh_token_expires_without_a_refresh_request() {
	let Fixture { client, transport, store, redirect } =
		fixture(ScriptedTransport::new(|_, _| json(401, "")), Some(Session::new("T1")));
	let err = client
		.request(ApiRequest::get("/meetings"))
		.await
		.expect_err("Without a refresh token the 401 is terminal.");

	assert!(matches!(err, Error::AuthExpired));
	assert_eq!(transport.sent().len(), 1);
	assert!(store.snapshot().is_none());
	assert_eq!(redirect.count(), 1);
}

#[tokio::test]
async fn persistent_503_surfaces_server_unavailable_after_three_attempts() {
	let Fixture { client, transport, store, .. } =
		fixture(ScriptedTransport::new(|_, _| json(503, "")), logged_in());
	let err = client
		.request(ApiRequest::get("/meetings"))
		.await
		.expect_err("Exhausted retries should fail.");

	assert!(matches!(err, Error::ServerUnavailable { attempts: 3 }));
	assert_eq!(transport.sent().len(), 3);
	assert!(transport.sent_to("/refresh-token").is_empty());
	assert!(store.snapshot().is_some());
}

#[tokio::test]
async fn gateway_statuses_and_timeouts_are_retried() {
	let Fixture { client, transport, .. } = fixture(
		ScriptedTransport::new(|_, hits| match hits {
			0 => Reply::Timeout,
			1 => json(502, ""),
			_ => json(200, "[]"),
		}),
		logged_in(),
	);
	let meetings = client.list_meetings().await.expect("Third attempt should succeed.");

	assert!(meetings.is_empty());
	assert_eq!(transport.sent().len(), 3);
	assert!(transport.sent().iter().all(|request| request.bearer_token() == Some("T1")));
}

#[tokio::test]
async fn a_401_does_not_consume_the_transient_budget() {
	let Fixture { client, transport, .. } = fixture(
		ScriptedTransport::new(|request, hits| match (route_of(request), hits) {
			("/refresh-token", _) => json(200, r#"{"accessToken":"T2"}"#),
			(_, 0 | 1) => json(504, ""),
			(_, 2) => json(401, ""),
			_ => json(200, "[]"),
		}),
		logged_in(),
	);

	client.list_meetings().await.expect("The refreshed attempt should succeed.");

	assert_eq!(transport.sent_to("/meetings").len(), 4);
	assert_eq!(transport.sent_to("/refresh-token").len(), 1);
}

#[tokio::test]
async fn refused_connection_is_not_retried() {
	let Fixture { client, transport, .. } =
		fixture(ScriptedTransport::new(|_, _| Reply::Refused), logged_in());
	let err = client
		.request(ApiRequest::get("/meetings"))
		.await
		.expect_err("A refused connection should fail.");

	assert!(matches!(err, Error::NetworkUnreachable { .. }));
	assert_eq!(err.kind(), ErrorKind::NetworkUnreachable);
	assert_eq!(transport.sent().len(), 1);
}

#[tokio::test]
async fn failed_statuses_carry_the_backend_message_or_the_fallback() {
	let Fixture { client, transport, .. } = fixture(
		ScriptedTransport::new(|request, _| match route_of(request) {
			"/meetings/404" => json(404, r#"{"message":"Meeting not found"}"#),
			_ => json(500, "<html>Internal Server Error</html>"),
		}),
		logged_in(),
	);
	let err = client.get_meeting(404).await.expect_err("404 should fail.");

	assert_eq!(err.kind(), ErrorKind::RequestFailed { status: 404 });
	assert_eq!(err.message(), "Meeting not found");

	let err = client.get_meeting(500).await.expect_err("500 should fail.");

	assert_eq!(err.http_status(), Some(500));
	assert_eq!(err.message(), FALLBACK_MESSAGE);
	assert_eq!(transport.sent().len(), 2);
}

#[tokio::test]
async fn wrong_password_is_a_plain_failure_without_refresh() {
	let Fixture { client, transport, store, redirect } = fixture(
		ScriptedTransport::new(|_, _| json(401, r#"{"message":"Invalid credentials"}"#)),
		logged_in(),
	);
	let err = client
		.login(&Credentials::new("a@b.com", "wrong"))
		.await
		.expect_err("Bad credentials should fail.");

	match err {
		Error::RequestFailed { status, message } => {
			assert_eq!(status, 401);
			assert_eq!(message, "Invalid credentials");
		},
		other => panic!("Unexpected error: {other:?}."),
	}

	let sent = transport.sent();

	assert_eq!(sent.len(), 1);
	assert_eq!(sent[0].bearer_token(), None);
	assert!(store.snapshot().is_some_and(|session| session.holds_access("T1")));
	assert_eq!(redirect.count(), 0);
}

#[tokio::test]
async fn login_persists_the_session_for_following_calls() {
	let Fixture { client, transport, store, .. } = fixture(
		ScriptedTransport::new(|request, _| match route_of(request) {
			"/login" => json(200, r#"{"token":"T1","refresh_token":"R1"}"#),
			_ => json(200, "[]"),
		}),
		None,
	);
	let session = client
		.login(&Credentials::new("a@b.com", "secret"))
		.await
		.expect("Login should succeed.");

	assert!(session.holds_access("T1"));
	assert!(store.snapshot().is_some_and(|stored| stored.holds_refresh("R1")));

	client.list_meetings().await.expect("Listing should succeed.");

	let sent = transport.sent();

	assert_eq!(body_of(&sent[0]), serde_json::json!({ "email": "a@b.com", "password": "secret" }));
	assert_eq!(sent[1].bearer_token(), Some("T1"));

	client.logout().await.expect("Logout should succeed.");

	assert!(store.snapshot().is_none());
	assert_eq!(transport.sent().len(), 2);
}

#[tokio::test]
async fn concurrent_401s_share_a_single_refresh() {
	let Fixture { client, transport, store, .. } = fixture(
		ScriptedTransport::new(rotating_backend).with_refresh_delay(Duration::from_millis(50)),
		logged_in(),
	);
	let (first, second, third) = tokio::join!(
		client.request(ApiRequest::get("/meetings/1")),
		client.request(ApiRequest::get("/meetings/2")),
		client.request(ApiRequest::get("/meetings/3")),
	);

	for result in [first, second, third] {
		assert_eq!(result.expect("Every call should succeed with the shared token.").status, 200);
	}

	assert_eq!(transport.sent_to("/refresh-token").len(), 1);

	let retried = transport
		.sent()
		.into_iter()
		.filter(|request| request.bearer_token() == Some("T2"))
		.count();

	assert_eq!(retried, 3);
	assert!(store.snapshot().is_some_and(|session| session.holds_access("T2")));
	assert_eq!(client.refresh_metrics.attempts(), 1);
	assert_eq!(client.refresh_metrics.coalesced(), 2);
}

#[tokio::test]
async fn stale_refresh_cannot_overwrite_a_newer_login() {
	let Fixture { client, transport, store, redirect } = fixture(
		ScriptedTransport::new(|request, _| match (route_of(request), request.bearer_token()) {
			("/refresh-token", _) => json(200, r#"{"accessToken":"T2"}"#),
			(_, Some("T9")) => json(200, "[]"),
			_ => json(401, ""),
		})
		.with_refresh_delay(Duration::from_millis(50)),
		logged_in(),
	);
	let relogin = async {
		tokio::time::sleep(Duration::from_millis(10)).await;
		store
			.set(Session::new("T9").with_refresh_token("R9"))
			.await
			.expect("Relogin should store the new session.");
	};
	let (result, _) = tokio::join!(client.request(ApiRequest::get("/meetings")), relogin);

	result.expect("The call should continue with the newer login.");

	let session = store.snapshot().expect("The newer login should survive.");

	assert!(session.holds_access("T9"));
	assert!(session.holds_refresh("R9"));
	assert_eq!(
		transport.sent().last().and_then(|request| request.bearer_token().map(str::to_owned)),
		Some("T9".to_owned())
	);
	assert_eq!(redirect.count(), 0);
}

#[tokio::test]
async fn invalid_paths_are_rejected_before_any_traffic() {
	let Fixture { client, transport, .. } =
		fixture(ScriptedTransport::new(|_, _| json(200, "")), logged_in());

	for path in ["meetings", "https://evil.example.com/meetings"] {
		let err = client
			.request(ApiRequest::get(path))
			.await
			.expect_err("Non-relative paths should be rejected.");

		assert_eq!(err.kind(), ErrorKind::Local);
	}

	assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn mismatched_bodies_surface_decode_errors() {
	let Fixture { client, .. } = fixture(
		ScriptedTransport::new(|_, _| json(200, r#"{"id":"forty-two"}"#)),
		logged_in(),
	);
	let err = client.get_meeting(42).await.expect_err("Malformed meetings should not decode.");

	match err {
		Error::Decode { source, status } => {
			assert_eq!(status, 200);
			assert_eq!(source.path().to_string(), "id");
		},
		other => panic!("Unexpected error: {other:?}."),
	}
}

#[tokio::test]
async fn abandoned_call_leaves_the_session_and_refresh_guard_usable() {
	let Fixture { client, transport, store, redirect } = fixture(
		ScriptedTransport::new(rotating_backend).with_refresh_delay(Duration::from_millis(100)),
		logged_in(),
	);
	let pending = client.request(ApiRequest::get("/meetings/1"));
	let abandoned = tokio::time::timeout(Duration::from_millis(20), pending).await;

	assert!(abandoned.is_err());
	assert_eq!(transport.sent_to("/refresh-token").len(), 1);
	assert!(store.snapshot().is_some_and(|session| session.holds_access("T1")));

	let response = client
		.request(ApiRequest::get("/meetings/2"))
		.await
		.expect("A later call should refresh and succeed.");

	assert_eq!(response.status, 200);
	assert_eq!(transport.sent_to("/refresh-token").len(), 2);
	assert_eq!(transport.sent_to("/meetings/1").len(), 1);
	assert!(store.snapshot().is_some_and(|session| session.holds_access("T2")));
	assert_eq!(redirect.count(), 0);
}

/// Memory store whose conditional delete always fails.
struct BrokenRevokeStore(MemoryStore);
impl SessionStore for BrokenRevokeStore {
	fn get(&self) -> StoreFuture<'_, Option<Session>> {
		self.0.get()
	}

	fn set(&self, session: Session) -> StoreFuture<'_, ()> {
		self.0.set(session)
	}

	fn clear(&self) -> StoreFuture<'_, ()> {
		self.0.clear()
	}

	fn compare_and_swap_access<'a>(
		&'a self,
		expected_refresh: &'a str,
		replacement: Session,
	) -> StoreFuture<'a, CompareAndSwapOutcome> {
		self.0.compare_and_swap_access(expected_refresh, replacement)
	}

	fn revoke<'a>(&'a self, _expected_access: &'a str) -> StoreFuture<'a, Option<Session>> {
		Box::pin(async { Err(StoreError::Backend { message: "disk unavailable".into() }) })
	}
}

#[tokio::test]
async fn storage_failure_during_teardown_still_expires_the_call() {
	let store = Arc::new(BrokenRevokeStore(
		MemoryStore::with_session(Session::new("T1").with_refresh_token("R1")),
	));
	let redirect = Arc::new(RecordingRedirect::default());
	let transport = Arc::new(ScriptedTransport::new(|request, _| match route_of(request) {
		"/refresh-token" => json(401, r#"{"message":"Refresh token expired"}"#),
		_ => json(401, ""),
	}));
	let session_store: Arc<dyn SessionStore> = store.clone();
	let login_redirect: Arc<dyn LoginRedirect> = redirect.clone();
	let client: ApiClient<ScriptedTransport> = ApiClient::with_http_client(
		ClientConfig::parse(BASE_URL).expect("Fixture config should build."),
		session_store,
		transport.clone(),
		login_redirect,
	);
	let err = client
		.request(ApiRequest::get("/meetings"))
		.await
		.expect_err("A rejected refresh should expire the call.");

	assert!(matches!(err, Error::AuthExpired));
	assert_eq!(redirect.redirects(), vec!["/login".to_owned()]);
	assert!(store.0.snapshot().is_some_and(|session| session.holds_access("T1")));
	assert_eq!(transport.sent().len(), 2);
}
