//! Provider endpoints and fixed identifiers shared across crates.

/// Base URL of the Box web application. Source references for ingested files
/// are always derived from this, never read from a provider response.
pub const BOX_APP_BASE_URL: &str = "https://app.box.com";

/// Base URL of the Box content API.
pub const BOX_API_BASE_URL: &str = "https://api.box.com/2.0";

/// GitHub OAuth token endpoint used for refresh-token exchange.
pub const GITHUB_OAUTH_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";

/// Google's published JWKS endpoint for ID-token signature keys.
pub const GOOGLE_JWKS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";

/// Issuers accepted on a Google ID token.
pub const GOOGLE_ALLOWED_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];
