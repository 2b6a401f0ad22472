//! OAuth 2.0 authorization-code flow with PKCE for social platform
//! connections
//!
//! This crate is the protocol adapter between the HTTP handlers and the
//! social platforms:
//! - PKCE verifier/challenge and anti-forgery state generation
//! - authorization URL construction
//! - authorization-code exchange and token refresh
//! - the file-backed per-provider connection store

pub mod authorize;
pub mod pkce;
pub mod storage;
pub mod token_exchange;
pub mod types;

pub use authorize::{build_authorization_url, AuthorizeParams};
pub use pkce::{generate_pkce_challenge, generate_state, PkceChallenge};
pub use storage::ConnectionStore;
pub use token_exchange::{ExchangeRequest, RefreshRequest, TokenExchanger};
pub use types::{ConnectionDocument, OAuthTokens, PkceSession, ProviderCredentials};
