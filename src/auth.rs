//! Client credentials and redacted token secrets.

pub mod credentials;
pub mod secret;

pub use credentials::*;
pub use secret::*;
