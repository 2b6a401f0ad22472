//! Instagram provider descriptor
//!
//! Read-only integration: the Graph API is queried with a long-lived access
//! token configured as an API key, so there is no connect flow for this
//! provider.

use crate::registry::{ProviderAuth, ProviderSpec};

const STATS_URL: &str = "https://graph.instagram.com/me?fields=username,followers_count,media_count";
const POSTS_URL: &str =
    "https://graph.instagram.com/me/media?fields=id,caption,media_type,media_url,permalink,timestamp";

pub fn spec() -> ProviderSpec {
    ProviderSpec {
        name: "instagram",
        display_name: "Instagram",
        auth: ProviderAuth::ApiKey {
            query_param: "access_token",
        },
        endpoints: &[("stats", STATS_URL), ("posts", POSTS_URL)],
    }
}
