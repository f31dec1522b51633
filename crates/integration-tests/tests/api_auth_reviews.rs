//! Integration tests for GitHub login routes and reviews.
//!
//! These tests require:
//! - The API server running (cargo run -p eko-store-api)
//! - `EKO_SESSION_COOKIE` for the review write test
//!
//! Run with: cargo test -p eko-store-integration-tests -- --ignored

use eko_store_integration_tests::{authenticated, client, session_cookie, url};
use reqwest::{StatusCode, header};
use serde_json::{Value, json};

// ============================================================================
// Auth routes
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_login_redirects_to_github() {
    let resp = client()
        .get(url("/auth/github"))
        .send()
        .await
        .expect("Failed to start login");
    assert!(resp.status().is_redirection());
    assert!(resp.headers().contains_key(header::SET_COOKIE));

    let location = resp.headers()[header::LOCATION]
        .to_str()
        .expect("location is ASCII");
    let location = url::Url::parse(location).expect("absolute redirect");
    assert_eq!(location.host_str(), Some("github.com"));

    let scope = location
        .query_pairs()
        .find(|(k, _)| k == "scope")
        .map(|(_, v)| v.into_owned());
    assert_eq!(scope.as_deref(), Some("user:email"));
}

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_callback_without_pending_login_goes_home() {
    let resp = client()
        .get(url("/auth/github/callback?code=abc&state=forged"))
        .send()
        .await
        .expect("Failed to call callback");
    assert!(resp.status().is_redirection());
    assert_eq!(resp.headers()[header::LOCATION], "/");
}

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_anonymous_profile_is_unauthorized() {
    let resp = client()
        .get(url("/profile"))
        .send()
        .await
        .expect("Failed to get profile");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_anonymous_logout_goes_home() {
    let resp = client()
        .get(url("/logout"))
        .send()
        .await
        .expect("Failed to log out");
    assert!(resp.status().is_redirection());
    assert_eq!(resp.headers()[header::LOCATION], "/");
}

#[tokio::test]
#[ignore = "Requires running API server and EKO_SESSION_COOKIE"]
async fn test_profile_omits_access_token() {
    let Some(cookie) = session_cookie() else {
        return;
    };

    let resp = authenticated(client().get(url("/profile")), &cookie)
        .send()
        .await
        .expect("Failed to get profile");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to parse profile");
    assert!(body["githubId"].is_string());
    assert!(body.get("accessToken").is_none());
}

// ============================================================================
// Reviews
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_anonymous_review_is_unauthorized() {
    let resp = client()
        .post(url("/reviews"))
        .json(&json!({"name": "Food", "email": "a@b.c", "rating": 5, "comment": "ok"}))
        .send()
        .await
        .expect("Failed to post review");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_reviews_for_unknown_product_are_empty() {
    let resp = client()
        .get(url("/reviews/no-such-product-in-this-store"))
        .send()
        .await
        .expect("Failed to get reviews");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse reviews");
    assert_eq!(body, json!([]));
}

#[tokio::test]
#[ignore = "Requires running API server, database and EKO_SESSION_COOKIE"]
async fn test_review_lookup_is_case_insensitive() {
    let Some(cookie) = session_cookie() else {
        return;
    };
    let name = format!("Food-{}", eko_store_core::DocumentId::generate());

    let resp = authenticated(client().post(url("/reviews")), &cookie)
        .json(&json!({
            "name": name,
            "email": "john@gmail.com",
            "rating": 5,
            "comment": "This is an awesome item",
        }))
        .send()
        .await
        .expect("Failed to post review");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = resp.json().await.expect("Failed to parse review");
    assert_eq!(created["name"], name.to_lowercase());

    let found: Value = client()
        .get(url(&format!("/reviews/{}", name.to_uppercase())))
        .send()
        .await
        .expect("Failed to get reviews")
        .json()
        .await
        .expect("Failed to parse reviews");
    let found = found.as_array().expect("reviews are an array");
    assert_eq!(found.len(), 1);
    assert_eq!(found.first().map(|r| &r["_id"]), Some(&created["_id"]));
}
