// self
use crate::{
	_prelude::*,
	client::ApiClient,
	http::{ApiRequest, HttpTransport},
	model::{Id, Meeting, NewMeeting},
};

/// Meeting collection endpoint.
pub const MEETINGS_PATH: &str = "/meetings";

/// Path of a single meeting.
pub fn meeting_path(id: Id) -> String {
	format!("{MEETINGS_PATH}/{id}")
}

impl<C> ApiClient<C>
where
	C: ?Sized + HttpTransport,
{
	/// Lists every meeting visible to the current user.
	pub async fn list_meetings(&self) -> Result<Vec<Meeting>> {
		self.request_json(ApiRequest::get(MEETINGS_PATH)).await
	}

	/// Schedules a meeting.
	pub async fn create_meeting(&self, meeting: &NewMeeting) -> Result<Meeting> {
		self.request_json(ApiRequest::post(MEETINGS_PATH).with_json(meeting)?).await
	}

	/// Fetches one meeting.
	pub async fn get_meeting(&self, id: Id) -> Result<Meeting> {
		self.request_json(ApiRequest::get(meeting_path(id))).await
	}

	/// Replaces a meeting's fields.
	pub async fn update_meeting(&self, id: Id, meeting: &NewMeeting) -> Result<Meeting> {
		self.request_json(ApiRequest::put(meeting_path(id)).with_json(meeting)?).await
	}

	/// Deletes a meeting. The response body is ignored.
	pub async fn delete_meeting(&self, id: Id) -> Result<()> {
		self.request(ApiRequest::delete(meeting_path(id))).await?;

		Ok(())
	}
}
