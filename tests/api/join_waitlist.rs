use anyhow::Result;
use reqwest::{Method, StatusCode};
use serde_json::json;

use crate::helpers::{reply_json, TestApp};

#[tokio::test]
async fn join_waitlist_ok_stores_lowercased_email() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.post_join(&json!({ "email": "Foo@Bar.com" })).await?;

    assert_eq!(
        res.status(),
        StatusCode::OK,
        "Wrong response StatusCode: {}",
        res.status()
    );
    let body = reply_json(res).await?;

    let entries = app.store.entries();
    assert_eq!(1, entries.len());
    assert_eq!("foo@bar.com", entries[0].email);
    assert_eq!(
        json!({
            "success": true,
            "message": "Email added to waitlist",
            "insertedId": entries[0].id.to_string(),
        }),
        body
    );

    Ok(())
}

#[tokio::test]
async fn join_waitlist_ok_on_both_paths() -> Result<()> {
    let app = TestApp::spawn().await?;

    for path in ["/join-waitlist", "/api/join-waitlist"] {
        let res = app
            .post_join_at(path, &json!({ "email": "ursula@leguin.com" }))
            .await?;
        assert_eq!(StatusCode::OK, res.status(), "path: {path}");
    }

    assert_eq!(2, app.store.entries().len());

    Ok(())
}

#[tokio::test]
async fn join_waitlist_duplicate_emails_are_stored_again() -> Result<()> {
    let app = TestApp::spawn().await?;

    for _ in 0..2 {
        let res = app.post_join(&json!({ "email": "dup@example.com" })).await?;
        assert_eq!(StatusCode::OK, res.status());
    }

    let entries = app.store.entries();
    assert_eq!(2, entries.len());
    assert_ne!(entries[0].id, entries[1].id);

    Ok(())
}

#[tokio::test]
async fn join_waitlist_returns_a_400_for_missing_or_empty_email() -> Result<()> {
    let app = TestApp::spawn().await?;

    let cases = [
        (json!({ "email": "" }), "Empty email"),
        (json!({ "email": "   " }), "Whitespace email"),
        (json!({ "email": null }), "Null email"),
        (json!({ "email": 42 }), "Number email"),
        (json!({ "email": ["a@b.co"] }), "Array email"),
        (json!({}), "Empty json"),
    ];

    for (body, description) in cases {
        let res = app.post_join(&body).await?;
        assert_eq!(
            400,
            res.status().as_u16(),
            "The API did not return a 400 BAD REQUEST the payload was {description}."
        );
        assert_eq!(
            json!({
                "success": false,
                "message": "Email is required and must be a non-empty string"
            }),
            reply_json(res).await?,
            "Wrong body for: {description}"
        );
    }
    assert!(app.store.entries().is_empty());

    Ok(())
}

#[tokio::test]
async fn join_waitlist_returns_a_400_for_invalid_format() -> Result<()> {
    let app = TestApp::spawn().await?;

    for email in ["not-an-email", "ursula@leguin", "ursuladomain.com", "a b@c.de"] {
        let res = app.post_join(&json!({ "email": email })).await?;
        assert_eq!(400, res.status().as_u16(), "email: {email}");
        assert_eq!(
            json!({ "success": false, "message": "Invalid email format" }),
            reply_json(res).await?
        );
    }
    assert!(app.store.entries().is_empty());

    Ok(())
}

#[tokio::test]
async fn join_waitlist_returns_a_400_for_a_body_that_is_not_json() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app
        .post_join_raw("application/x-www-form-urlencoded", "email=foo%40bar.com")
        .await?;

    assert_eq!(StatusCode::BAD_REQUEST, res.status());
    assert!(app.store.entries().is_empty());

    Ok(())
}

#[tokio::test]
async fn join_waitlist_returns_a_405_for_other_methods() -> Result<()> {
    let app = TestApp::spawn().await?;

    for method in [Method::GET, Method::PUT, Method::DELETE, Method::PATCH] {
        let res = app.request_join(method.clone()).await?;
        assert_eq!(
            StatusCode::METHOD_NOT_ALLOWED,
            res.status(),
            "method: {method}"
        );
        assert_eq!(
            json!({ "success": false, "message": "Method not allowed. Use POST." }),
            reply_json(res).await?
        );
    }
    assert!(app.store.entries().is_empty());

    Ok(())
}

#[tokio::test]
async fn join_waitlist_returns_a_500_when_the_store_fails() -> Result<()> {
    let app = TestApp::spawn().await?;
    app.store.set_unavailable(true);

    let res = app.post_join(&json!({ "email": "ursula@leguin.com" })).await?;

    assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, res.status());
    assert_eq!(
        json!({ "success": false, "message": "Internal server error" }),
        reply_json(res).await?
    );
    assert!(app.store.entries().is_empty());

    // The store recovering needs nothing from the caller but a resubmit.
    app.store.set_unavailable(false);
    let res = app.post_join(&json!({ "email": "ursula@leguin.com" })).await?;
    assert_eq!(StatusCode::OK, res.status());
    assert_eq!(1, app.store.entries().len());

    Ok(())
}

#[tokio::test]
async fn join_waitlist_responses_carry_a_request_id() -> Result<()> {
    let app = TestApp::spawn().await?;

    let ok = app.post_join(&json!({ "email": "ursula@leguin.com" })).await?;
    let rejected = app.post_join(&json!({ "email": "" })).await?;

    for res in [ok, rejected] {
        assert!(
            res.headers().contains_key("x-request-id"),
            "missing x-request-id for status {}",
            res.status()
        );
    }

    Ok(())
}

#[tokio::test]
async fn join_waitlist_concurrent_submissions_are_independent() -> Result<()> {
    let app = TestApp::spawn().await?;

    let requests = (0..10).map(|i| {
        let email = if i % 2 == 0 {
            format!("user{i}@example.com")
        } else {
            "broken".to_string()
        };
        let body = json!({ "email": email });
        let client = app.http_client.clone();
        let url = app.url("/api/join-waitlist");
        tokio::spawn(async move { client.post(url).json(&body).send().await })
    });

    let mut statuses = Vec::new();
    for request in requests.collect::<Vec<_>>() {
        statuses.push(request.await??.status());
    }

    assert_eq!(5, statuses.iter().filter(|s| **s == StatusCode::OK).count());
    assert_eq!(
        5,
        statuses
            .iter()
            .filter(|s| **s == StatusCode::BAD_REQUEST)
            .count()
    );
    assert_eq!(5, app.store.entries().len());

    Ok(())
}
