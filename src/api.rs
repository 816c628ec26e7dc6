//! Typed wrappers for Convo's REST endpoints.
//!
//! Each operation is an [`ApiClient`](crate::client::ApiClient) method that goes through the
//! authenticated pipeline. `/register` and `/login` are sent as public requests, so a 401 on
//! them surfaces as [`Error::RequestFailed`] instead of starting a refresh.

mod auth;
mod meetings;
mod messages;
mod users;

pub use auth::{LOGIN_PATH, REGISTER_PATH};
pub use meetings::*;
pub use messages::*;
pub use users::*;
