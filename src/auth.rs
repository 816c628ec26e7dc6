//! Credentials, redacted secrets, and the session model owned by the client.

pub mod credentials;
pub mod secret;
pub mod session;

pub use credentials::*;
pub use secret::*;
pub use session::*;
