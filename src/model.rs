//! Wire models mirroring the backend's rows and auth payloads.
//!
//! Timestamps are naive `YYYY-MM-DDTHH:MM:SS` strings on the wire; fractional seconds are
//! accepted when decoding and never emitted.

// self
use crate::{_prelude::*, auth::Session};

/// Backend identifier for users, meetings, and messages.
pub type Id = i32;

/// Registered account, as returned by `/register` and `/users/:id`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
	/// Account identifier.
	pub id: Id,
	/// Display name.
	pub name: String,
	/// Account email.
	pub email: String,
}

/// Registration payload posted to `/register`.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct NewUser {
	/// Display name.
	pub name: String,
	/// Account email.
	pub email: String,
	/// Plaintext password; redacted from `Debug`.
	pub password: String,
}
impl NewUser {
	/// Creates a registration payload.
	pub fn new(
		name: impl Into<String>,
		email: impl Into<String>,
		password: impl Into<String>,
	) -> Self {
		Self { name: name.into(), email: email.into(), password: password.into() }
	}
}
impl Debug for NewUser {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("NewUser")
			.field("name", &self.name)
			.field("email", &self.email)
			.field("password", &"<redacted>")
			.finish()
	}
}

/// Scheduled meeting.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meeting {
	/// Meeting identifier.
	pub id: Id,
	/// Meeting title.
	pub title: String,
	/// Optional free-form description.
	#[serde(default)]
	pub description: Option<String>,
	/// Start instant.
	#[serde(with = "naive_timestamp")]
	pub start_time: PrimitiveDateTime,
	/// End instant.
	#[serde(with = "naive_timestamp")]
	pub end_time: PrimitiveDateTime,
	/// Owner's user identifier.
	pub creator_id: Id,
}

/// Meeting payload for `POST /meetings` and `PUT /meetings/:id`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMeeting {
	/// Meeting title.
	pub title: String,
	/// Optional free-form description.
	#[serde(default)]
	pub description: Option<String>,
	/// Start instant.
	#[serde(with = "naive_timestamp")]
	pub start_time: PrimitiveDateTime,
	/// End instant.
	#[serde(with = "naive_timestamp")]
	pub end_time: PrimitiveDateTime,
	/// Owner's user identifier.
	pub creator_id: Id,
}

/// Chat message posted in a meeting.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
	/// Message identifier.
	pub id: Id,
	/// Message body.
	pub content: String,
	/// Author's user identifier.
	pub sender_id: Id,
	/// Meeting the message belongs to.
	pub meeting_id: Id,
	/// Send instant.
	#[serde(with = "naive_timestamp")]
	pub timestamp: PrimitiveDateTime,
}

/// Message payload for `POST /meetings/:meeting_id/messages`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMessage {
	/// Message body.
	pub content: String,
	/// Author's user identifier.
	pub sender_id: Id,
	/// Meeting the message belongs to; also selects the endpoint path.
	pub meeting_id: Id,
	/// Send instant.
	#[serde(with = "naive_timestamp")]
	pub timestamp: PrimitiveDateTime,
}

/// Body returned by `/login`.
#[derive(Clone, Deserialize)]
pub struct LoginResponse {
	/// Access token.
	pub token: String,
	/// Refresh token, when the backend issues one.
	#[serde(default, alias = "refreshToken")]
	pub refresh_token: Option<String>,
}
impl LoginResponse {
	/// Converts the payload into a freshly stamped session.
	pub fn into_session(self) -> Session {
		let session = Session::new(self.token);

		match self.refresh_token {
			Some(refresh_token) => session.with_refresh_token(refresh_token),
			None => session,
		}
	}
}
impl Debug for LoginResponse {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("LoginResponse")
			.field("token", &"<redacted>")
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.finish()
	}
}

/// Body posted to the refresh endpoint.
#[derive(Serialize)]
pub(crate) struct RefreshRequest<'a> {
	pub(crate) token: &'a str,
}

/// Body returned by the refresh endpoint.
#[derive(Clone, Deserialize)]
pub struct RefreshResponse {
	/// Replacement access token.
	#[serde(rename = "accessToken")]
	pub access_token: String,
	/// Rotated refresh token, if the backend rotated it.
	#[serde(default, rename = "refreshToken", alias = "refresh_token")]
	pub refresh_token: Option<String>,
}
impl Debug for RefreshResponse {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RefreshResponse")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.finish()
	}
}

/// Serde adapter for the backend's naive timestamps.
pub mod naive_timestamp {
	// crates.io
	use serde::{Deserializer, Serializer, de::Error as _, ser::Error as _};
	use time::{format_description::BorrowedFormatItem, macros::format_description};
	// self
	use crate::_prelude::*;

	const WIRE: &[BorrowedFormatItem<'_>] =
		format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
	const WIRE_FRACTIONAL: &[BorrowedFormatItem<'_>] =
		format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]");

	/// Formats `value` without fractional seconds.
	pub fn serialize<S>(value: &PrimitiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		let text = value.format(WIRE).map_err(S::Error::custom)?;

		serializer.serialize_str(&text)
	}

	/// Parses a naive timestamp, with or without fractional seconds.
	pub fn deserialize<'de, D>(deserializer: D) -> Result<PrimitiveDateTime, D::Error>
	where
		D: Deserializer<'de>,
	{
		let text = String::deserialize(deserializer)?;

		PrimitiveDateTime::parse(&text, WIRE)
			.or_else(|_| PrimitiveDateTime::parse(&text, WIRE_FRACTIONAL))
			.map_err(D::Error::custom)
	}
}
