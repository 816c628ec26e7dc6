//! Transport primitives for backend calls.
//!
//! [`ApiRequest`] is the caller-facing request descriptor (a path relative to the base URL).
//! The client resolves it into an [`HttpRequest`] with an absolute URL, the per-send timeout,
//! and the injected `Authorization` header, then hands it to an [`HttpTransport`]. Transports
//! only see crate-owned types so tests can script responses without a network stack.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, FALLBACK_MESSAGE, TransportError},
};

/// Header carrying the bearer token.
pub const AUTHORIZATION: &str = "Authorization";
/// Header describing the request body format.
pub const CONTENT_TYPE: &str = "Content-Type";
/// Media type used for every JSON body.
pub const APPLICATION_JSON: &str = "application/json";

/// Boxed future returned by [`HttpTransport::send`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<ApiResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP stacks capable of executing a single resolved request.
///
/// Implementations must honor [`HttpRequest::timeout`] and report an elapsed bound as
/// [`TransportError::Timeout`]; failures that produce no response at all map to
/// [`TransportError::Network`] or [`TransportError::Io`]. Any received response, including
/// error statuses, is returned as `Ok`.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Sends `request` once.
	fn send(&self, request: HttpRequest) -> TransportFuture<'_>;
}

/// HTTP methods used by the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
	/// `GET`
	Get,
	/// `POST`
	Post,
	/// `PUT`
	Put,
	/// `DELETE`
	Delete,
}
impl Method {
	/// Returns the canonical method token.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
			Method::Put => "PUT",
			Method::Delete => "DELETE",
		}
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Whether the pipeline attaches the session's bearer token.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AuthMode {
	/// Attach the current access token and recover from 401 via refresh.
	#[default]
	Bearer,
	/// Never attach a token; a 401 is an ordinary failure (e.g. wrong password on `/login`).
	Public,
}

/// Caller-facing request descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiRequest {
	/// HTTP method.
	pub method: Method,
	/// Path relative to the configured base URL; must start with `/`.
	pub path: String,
	/// Extra headers sent with every attempt.
	pub headers: BTreeMap<String, String>,
	/// Serialized request body.
	pub body: Option<Vec<u8>>,
	/// Token attachment policy.
	pub auth: AuthMode,
}
impl ApiRequest {
	/// Creates a bearer-authenticated request without a body.
	pub fn new(method: Method, path: impl Into<String>) -> Self {
		Self {
			method,
			path: path.into(),
			headers: BTreeMap::new(),
			body: None,
			auth: AuthMode::Bearer,
		}
	}

	/// Shorthand for a `GET` request.
	pub fn get(path: impl Into<String>) -> Self {
		Self::new(Method::Get, path)
	}

	/// Shorthand for a `POST` request.
	pub fn post(path: impl Into<String>) -> Self {
		Self::new(Method::Post, path)
	}

	/// Shorthand for a `PUT` request.
	pub fn put(path: impl Into<String>) -> Self {
		Self::new(Method::Put, path)
	}

	/// Shorthand for a `DELETE` request.
	pub fn delete(path: impl Into<String>) -> Self {
		Self::new(Method::Delete, path)
	}

	/// Marks the request as public so no token is attached.
	pub fn public(mut self) -> Self {
		self.auth = AuthMode::Public;

		self
	}

	/// Adds or replaces a header.
	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.insert(name.into(), value.into());

		self
	}

	/// Serializes `body` as JSON and sets the matching content type.
	pub fn with_json<T>(mut self, body: &T) -> Result<Self>
	where
		T: ?Sized + Serialize,
	{
		let bytes =
			serde_json::to_vec(body).map_err(|source| ConfigError::RequestBody { source })?;

		self.body = Some(bytes);
		self.headers.insert(CONTENT_TYPE.into(), APPLICATION_JSON.into());

		Ok(self)
	}
}

/// Fully resolved request handed to an [`HttpTransport`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpRequest {
	/// HTTP method.
	pub method: Method,
	/// Absolute target URL.
	pub url: Url,
	/// Headers, including `Authorization` when a token was injected.
	pub headers: BTreeMap<String, String>,
	/// Serialized request body.
	pub body: Option<Vec<u8>>,
	/// Upper bound for this single send.
	pub timeout: StdDuration,
}
impl HttpRequest {
	/// Returns the header value, matching the name case-insensitively.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(key, _)| key.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}

	/// Returns the bearer token carried by the request, if any.
	pub fn bearer_token(&self) -> Option<&str> {
		self.header(AUTHORIZATION)?.strip_prefix("Bearer ")
	}
}

/// Response captured from the backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response headers with lowercase names.
	pub headers: BTreeMap<String, String>,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl ApiResponse {
	/// Creates a response with an empty header map.
	pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
		Self { status, headers: BTreeMap::new(), body: body.into() }
	}

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Decodes the body as JSON, reporting the failing field path on mismatch.
	pub fn json<T>(&self) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let body: &[u8] = if self.body.is_empty() { b"null" } else { &self.body };
		let mut deserializer = serde_json::Deserializer::from_slice(body);

		serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| Error::Decode { source, status: self.status })
	}

	/// Extracts the backend's `message` field, if the body is a JSON object carrying one.
	pub fn error_message(&self) -> Option<String> {
		#[derive(Deserialize)]
		struct ErrorBody {
			message: Option<String>,
		}

		serde_json::from_slice::<ErrorBody>(&self.body)
			.ok()
			.and_then(|body| body.message)
			.filter(|message| !message.trim().is_empty())
	}

	/// Same as [`ApiResponse::error_message`], falling back to a generic string.
	pub fn error_message_or_fallback(&self) -> String {
		self.error_message().unwrap_or_else(|| FALLBACK_MESSAGE.into())
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client from a configured [`reqwest::ClientBuilder`].
	pub fn from_builder(builder: reqwest::ClientBuilder) -> Result<Self> {
		Ok(Self(builder.build().map_err(ConfigError::from)?))
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestHttpClient {
	fn send(&self, request: HttpRequest) -> TransportFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let method = match request.method {
				Method::Get => reqwest::Method::GET,
				Method::Post => reqwest::Method::POST,
				Method::Put => reqwest::Method::PUT,
				Method::Delete => reqwest::Method::DELETE,
			};
			let mut builder = client.request(method, request.url).timeout(request.timeout);

			for (name, value) in &request.headers {
				builder = builder.header(name.as_str(), value.as_str());
			}
			if let Some(body) = request.body {
				builder = builder.body(body);
			}

			let response = builder.send().await?;
			let status = response.status().as_u16();
			let headers = response
				.headers()
				.iter()
				.filter_map(|(name, value)| {
					value.to_str().ok().map(|value| (name.as_str().to_owned(), value.to_owned()))
				})
				.collect();
			let body = response.bytes().await?.to_vec();

			Ok(ApiResponse { status, headers, body })
		})
	}
}
