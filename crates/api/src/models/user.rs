//! User domain types.
//!
//! A user is created or refreshed on every successful GitHub login and keyed
//! by the GitHub account ID. The access token is kept so that it can be
//! revoked on logout; it never leaves the server.

use serde::{Deserialize, Serialize};

use eko_store_core::UserId;

use super::Entity;

/// One address from the provider's email list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileEmail {
    pub value: String,
}

/// A GitHub identity that has logged in (stored form).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// GitHub account ID, the upsert key.
    pub github_id: String,
    pub username: String,
    pub display_name: Option<String>,
    pub profile_url: String,
    pub emails: Vec<ProfileEmail>,
    pub access_token: String,
}

impl Entity for User {
    const COLLECTION: &'static str = "users";
    const NAME: &'static str = "user";
}

impl User {
    /// The client-facing view of this user, without the access token.
    #[must_use]
    pub fn profile(&self, id: UserId) -> UserProfile {
        UserProfile {
            id,
            github_id: self.github_id.clone(),
            username: self.username.clone(),
            display_name: self.display_name.clone(),
            profile_url: self.profile_url.clone(),
            emails: self.emails.clone(),
        }
    }
}

/// Response body for `GET /profile`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub github_id: String,
    pub username: String,
    pub display_name: Option<String>,
    pub profile_url: String,
    pub emails: Vec<ProfileEmail>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_omits_access_token() {
        let user = User {
            github_id: "583231".to_string(),
            username: "octocat".to_string(),
            display_name: Some("The Octocat".to_string()),
            profile_url: "https://github.com/octocat".to_string(),
            emails: vec![ProfileEmail {
                value: "octocat@github.com".to_string(),
            }],
            access_token: "gho_secret".to_string(),
        };

        let json = serde_json::to_value(user.profile(UserId::generate())).unwrap();
        assert_eq!(json["githubId"], "583231");
        assert_eq!(json["emails"][0]["value"], "octocat@github.com");
        assert!(json.get("accessToken").is_none());
        assert!(!json.to_string().contains("gho_secret"));
    }
}
