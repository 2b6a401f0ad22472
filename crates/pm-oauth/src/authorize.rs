//! Authorization URL construction

/// Inputs for building a provider authorization URL
///
/// `client_param` is the provider's name for the client identifier in the
/// authorization query ("client_id" for most platforms, "client_key" for
/// TikTok).
#[derive(Debug)]
pub struct AuthorizeParams<'a> {
    pub authorize_url: &'a str,
    pub client_param: &'a str,
    pub client_id: &'a str,
    pub redirect_uri: &'a str,
    pub scopes: &'a [String],
    pub code_challenge: &'a str,
    pub state: &'a str,
}

/// Build the provider authorization URL
pub fn build_authorization_url(params: &AuthorizeParams<'_>) -> String {
    let mut url = format!(
        "{}?{}={}&response_type=code&redirect_uri={}&code_challenge={}&code_challenge_method=S256&state={}",
        params.authorize_url,
        params.client_param,
        urlencoding::encode(params.client_id),
        urlencoding::encode(params.redirect_uri),
        urlencoding::encode(params.code_challenge),
        urlencoding::encode(params.state),
    );

    if !params.scopes.is_empty() {
        let scopes = params.scopes.join(" ");
        url.push_str(&format!("&scope={}", urlencoding::encode(&scopes)));
    }

    url
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_params<'a>(scopes: &'a [String]) -> AuthorizeParams<'a> {
        AuthorizeParams {
            authorize_url: "https://example.com/oauth/authorize",
            client_param: "client_id",
            client_id: "abc",
            redirect_uri: "http://localhost:8787/api/auth/example/callback",
            scopes,
            code_challenge: "test_challenge",
            state: "test_state",
        }
    }

    #[test]
    fn test_build_authorization_url() {
        let scopes = vec!["read".to_string()];
        let url = build_authorization_url(&test_params(&scopes));

        assert!(url.starts_with("https://example.com/oauth/authorize?"));
        assert!(url.contains("client_id=abc"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("code_challenge=test_challenge"));
        assert!(url.contains("code_challenge_method=S256"));
        assert!(url.contains("state=test_state"));
        assert!(url.contains("scope=read"));
    }

    #[test]
    fn test_client_param_name_varies_by_provider() {
        let scopes: Vec<String> = vec![];
        let mut params = test_params(&scopes);
        params.client_param = "client_key";

        let url = build_authorization_url(&params);
        assert!(url.contains("client_key=abc"));
        assert!(!url.contains("client_id="));
    }

    #[test]
    fn test_scopes_are_space_joined_and_encoded() {
        let scopes = vec!["user.info.basic".to_string(), "video.list".to_string()];
        let url = build_authorization_url(&test_params(&scopes));

        assert!(url.contains("scope=user.info.basic%20video.list"));
    }

    #[test]
    fn test_no_scope_param_when_empty() {
        let scopes: Vec<String> = vec![];
        let url = build_authorization_url(&test_params(&scopes));

        assert!(!url.contains("scope="));
    }

    #[test]
    fn test_redirect_uri_is_encoded() {
        let scopes: Vec<String> = vec![];
        let url = build_authorization_url(&test_params(&scopes));

        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A8787%2Fapi%2Fauth%2Fexample%2Fcallback"));
    }
}
