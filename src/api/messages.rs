// self
use crate::{
	_prelude::*,
	api::meeting_path,
	client::ApiClient,
	http::{ApiRequest, HttpTransport},
	model::{Id, Message, NewMessage},
};

/// Path of a meeting's message thread.
pub fn messages_path(meeting_id: Id) -> String {
	format!("{}/messages", meeting_path(meeting_id))
}

impl<C> ApiClient<C>
where
	C: ?Sized + HttpTransport,
{
	/// Lists a meeting's messages.
	pub async fn list_messages(&self, meeting_id: Id) -> Result<Vec<Message>> {
		self.request_json(ApiRequest::get(messages_path(meeting_id))).await
	}

	/// Posts a message to the meeting named by `message.meeting_id`.
	pub async fn create_message(&self, message: &NewMessage) -> Result<Message> {
		self.request_json(ApiRequest::post(messages_path(message.meeting_id)).with_json(message)?)
			.await
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::api::user_path;

	#[test]
	fn paths_nest_under_their_resources() {
		assert_eq!(meeting_path(42), "/meetings/42");
		assert_eq!(messages_path(42), "/meetings/42/messages");
		assert_eq!(user_path(7), "/users/7");
	}
}
