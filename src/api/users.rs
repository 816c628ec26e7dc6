// self
use crate::{
	_prelude::*,
	client::ApiClient,
	http::{ApiRequest, HttpTransport},
	model::{Id, User},
};

/// Path of a single user.
pub fn user_path(id: Id) -> String {
	format!("/users/{id}")
}

impl<C> ApiClient<C>
where
	C: ?Sized + HttpTransport,
{
	/// Fetches a user profile.
	pub async fn get_user(&self, id: Id) -> Result<User> {
		self.request_json(ApiRequest::get(user_path(id))).await
	}
}
