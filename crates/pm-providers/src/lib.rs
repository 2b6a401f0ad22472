//! Social platform integrations for PawMe Connect
//!
//! Each platform module contributes a static [`ProviderSpec`] describing its
//! OAuth endpoints (or API-key scheme) and the read-only API endpoints the
//! proxy exposes. The [`ProviderRegistry`] is the lookup table handlers
//! resolve provider names against.

pub mod instagram;
pub mod proxy;
pub mod registry;
pub mod tiktok;
pub mod youtube;

pub use proxy::{ProxyAuth, ProxyFetcher, ProxyResponse};
pub use registry::{
    OAuthEndpoints, ProfileFields, ProfileSpec, ProviderAuth, ProviderRegistry, ProviderSpec,
};
