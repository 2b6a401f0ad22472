//! YouTube provider descriptor

use crate::registry::{OAuthEndpoints, ProfileFields, ProfileSpec, ProviderAuth, ProviderSpec};

const AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

const PROFILE_URL: &str =
    "https://www.googleapis.com/youtube/v3/channels?part=snippet&mine=true";
const STATS_URL: &str =
    "https://www.googleapis.com/youtube/v3/channels?part=statistics&mine=true";
const VIDEOS_URL: &str =
    "https://www.googleapis.com/youtube/v3/search?part=snippet&forMine=true&type=video&order=date&maxResults=25";

pub fn spec() -> ProviderSpec {
    ProviderSpec {
        name: "youtube",
        display_name: "YouTube",
        auth: ProviderAuth::OAuth(OAuthEndpoints {
            authorize_url: AUTHORIZE_URL,
            token_url: TOKEN_URL,
            client_param: "client_id",
            default_scopes: &["https://www.googleapis.com/auth/youtube.readonly"],
            profile: Some(ProfileSpec {
                url: PROFILE_URL,
                parse: parse_profile,
            }),
        }),
        endpoints: &[("stats", STATS_URL), ("videos", VIDEOS_URL)],
    }
}

/// Extract the channel title and id from a `channels?mine=true` response
fn parse_profile(body: &serde_json::Value) -> ProfileFields {
    let channel = &body["items"][0];
    ProfileFields {
        display_name: channel["snippet"]["title"].as_str().map(str::to_string),
        account_id: channel["id"].as_str().map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_profile() {
        let body = json!({
            "items": [
                {
                    "id": "UCabc123",
                    "snippet": { "title": "PawMe Pets" }
                }
            ]
        });

        let fields = parse_profile(&body);
        assert_eq!(fields.display_name.as_deref(), Some("PawMe Pets"));
        assert_eq!(fields.account_id.as_deref(), Some("UCabc123"));
    }

    #[test]
    fn test_parse_profile_no_channels() {
        let body = json!({ "items": [] });

        let fields = parse_profile(&body);
        assert_eq!(fields, ProfileFields::default());
    }
}
