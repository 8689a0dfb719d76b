//! Tether Connectors Library
//!
//! Outbound clients for the external providers Tether integrates with: the
//! Box content API (file sync source), GitHub OAuth (credential refresh),
//! and Google ID-token verification (login).
//!
//! Every client classifies its failures at the source so callers can decide
//! between retrying and failing fast.

pub mod box_api;
pub mod error;
pub mod github;
pub mod google;

// Re-export commonly used types
pub use box_api::{source_url, BoxClient, BoxFile};
pub use error::ConnectorError;
pub use github::GithubOAuthClient;
pub use google::GoogleTokenVerifier;
