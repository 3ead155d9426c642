use anyhow::Result;
use reqwest::StatusCode;

use crate::helpers::TestApp;

#[tokio::test]
async fn health_check_returns_200_with_request_id() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.http_client.get(app.url("/health-check")).send().await?;

    assert_eq!(StatusCode::OK, res.status());
    assert!(res.headers().contains_key("x-request-id"));

    Ok(())
}

#[tokio::test]
async fn unknown_path_returns_404_and_writes_nothing() -> Result<()> {
    let app = TestApp::spawn().await?;

    for path in ["/invalidpath", "/api", "/api/join-waitlist/extra"] {
        let res = app.http_client.post(app.url(path)).send().await?;
        assert_eq!(
            StatusCode::NOT_FOUND,
            res.status(),
            "expected 404 for {path}, got: {}",
            res.status().as_u16()
        );
    }
    assert!(app.store.entries().is_empty());

    Ok(())
}
