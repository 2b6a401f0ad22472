//! TikTok provider descriptor
//!
//! TikTok names the client identifier `client_key` in both the authorization
//! and token requests.

use crate::registry::{OAuthEndpoints, ProfileFields, ProfileSpec, ProviderAuth, ProviderSpec};

const AUTHORIZE_URL: &str = "https://www.tiktok.com/v2/auth/authorize/";
const TOKEN_URL: &str = "https://open.tiktokapis.com/v2/oauth/token/";

const PROFILE_URL: &str =
    "https://open.tiktokapis.com/v2/user/info/?fields=open_id,display_name";
const STATS_URL: &str =
    "https://open.tiktokapis.com/v2/user/info/?fields=follower_count,following_count,likes_count,video_count";
const VIDEOS_URL: &str =
    "https://open.tiktokapis.com/v2/video/list/?fields=id,title,cover_image_url,share_url,view_count,like_count";

pub fn spec() -> ProviderSpec {
    ProviderSpec {
        name: "tiktok",
        display_name: "TikTok",
        auth: ProviderAuth::OAuth(OAuthEndpoints {
            authorize_url: AUTHORIZE_URL,
            token_url: TOKEN_URL,
            client_param: "client_key",
            default_scopes: &["user.info.basic", "video.list"],
            profile: Some(ProfileSpec {
                url: PROFILE_URL,
                parse: parse_profile,
            }),
        }),
        endpoints: &[("stats", STATS_URL), ("videos", VIDEOS_URL)],
    }
}

/// Extract profile fields from a `/v2/user/info/` response
///
/// Shape: `{"data": {"user": {"display_name": ..., "open_id": ...}}}`
fn parse_profile(body: &serde_json::Value) -> ProfileFields {
    let user = &body["data"]["user"];
    ProfileFields {
        display_name: user["display_name"].as_str().map(str::to_string),
        account_id: user["open_id"].as_str().map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_profile() {
        let body = json!({
            "data": {
                "user": {
                    "open_id": "open-abc",
                    "display_name": "PawMe Official"
                }
            }
        });

        let fields = parse_profile(&body);
        assert_eq!(fields.display_name.as_deref(), Some("PawMe Official"));
        assert_eq!(fields.account_id.as_deref(), Some("open-abc"));
    }

    #[test]
    fn test_parse_profile_missing_fields() {
        let body = json!({ "data": {} });

        let fields = parse_profile(&body);
        assert_eq!(fields, ProfileFields::default());
    }

    #[test]
    fn test_spec_uses_client_key() {
        let spec = spec();
        assert_eq!(spec.oauth().unwrap().client_param, "client_key");
    }
}
