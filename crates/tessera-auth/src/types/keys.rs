//! Storage keyspace.
//!
//! Every persisted entry lives under an `oauth2.` prefix. Codes and refresh
//! tokens are keyed by (client, value) so a grant presented with the wrong
//! `client_id` simply fails to resolve; access tokens are keyed by value
//! alone because bearer validation has no client in hand.

/// Key for an authorization code issued to `client_id`.
#[must_use]
pub fn authorization_code(client_id: &str, code: &str) -> String {
    format!("oauth2.authorization_code.{client_id}:{code}")
}

/// Key for an access token.
#[must_use]
pub fn access_token(token: &str) -> String {
    format!("oauth2.access_token:{token}")
}

/// Key for a refresh token issued to `client_id`.
#[must_use]
pub fn refresh_token(client_id: &str, token: &str) -> String {
    format!("oauth2.refresh_token.{client_id}:{token}")
}

/// Key for the set of outstanding token keys issued to a (client, user)
/// pair. Used for bulk revocation.
#[must_use]
pub fn client_user(client_id: &str, user_id: Option<&str>) -> String {
    format!("oauth2.client_user.{client_id}:{}", user_id.unwrap_or(""))
}

/// Key for a client registration, for stores that double as the client
/// registry.
#[must_use]
pub fn client(client_id: &str) -> String {
    format!("oauth2.client:{client_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_formats() {
        assert_eq!(
            authorization_code("app123", "abc"),
            "oauth2.authorization_code.app123:abc"
        );
        assert_eq!(access_token("tok"), "oauth2.access_token:tok");
        assert_eq!(
            refresh_token("app123", "rt"),
            "oauth2.refresh_token.app123:rt"
        );
        assert_eq!(
            client_user("app123", Some("u1")),
            "oauth2.client_user.app123:u1"
        );
        assert_eq!(client_user("app123", None), "oauth2.client_user.app123:");
        assert_eq!(client("app123"), "oauth2.client:app123");
    }
}
