// self
use crate::{
	_prelude::*,
	auth::{Credentials, Session},
	client::ApiClient,
	http::{ApiRequest, HttpTransport},
	model::{LoginResponse, NewUser, User},
};

/// Account registration endpoint.
pub const REGISTER_PATH: &str = "/register";
/// Credential exchange endpoint.
pub const LOGIN_PATH: &str = "/login";

impl<C> ApiClient<C>
where
	C: ?Sized + HttpTransport,
{
	/// Creates an account.
	pub async fn register(&self, user: &NewUser) -> Result<User> {
		self.request_json(ApiRequest::post(REGISTER_PATH).public().with_json(user)?).await
	}

	/// Exchanges credentials for a session and persists it.
	///
	/// A wrong password surfaces as `RequestFailed { status: 401 }`; any existing session is
	/// left untouched in that case.
	pub async fn login(&self, credentials: &Credentials) -> Result<Session> {
		let request = ApiRequest::post(LOGIN_PATH).public().with_json(credentials)?;
		let session = self.request_json::<LoginResponse>(request).await?.into_session();

		self.store.set(session.clone()).await?;

		Ok(session)
	}

	/// Forgets the current session. No request is sent.
	pub async fn logout(&self) -> Result<()> {
		self.store.clear().await?;

		Ok(())
	}
}
