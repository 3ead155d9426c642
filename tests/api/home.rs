use anyhow::Result;
use reqwest::StatusCode;

use crate::helpers::TestApp;

#[tokio::test]
async fn home_serves_the_signup_form() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.http_client.get(app.url("/")).send().await?;
    assert_eq!(StatusCode::OK, res.status());

    let content_type = res
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/html"));

    let page = res.text().await?;
    assert!(page.contains(r#"id="waitlist-form""#));
    assert!(page.contains("/api/join-waitlist"));

    Ok(())
}
