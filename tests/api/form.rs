//! Drives the form controller against the real app.

use std::time::Duration;

use anyhow::Result;
use waitlist::client::{FormController, FormState, JOINED_LABEL};

use crate::helpers::TestApp;

#[tokio::test]
async fn form_joins_against_running_app() -> Result<()> {
    let app = TestApp::spawn().await?;
    let mut form = FormController::new(app.url(""), Duration::from_secs(2))?;

    let state = form.submit("Ursula@LeGuin.com").await.clone();

    let entries = app.store.entries();
    assert_eq!(1, entries.len());
    assert_eq!("ursula@leguin.com", entries[0].email);
    assert_eq!(
        FormState::Joined {
            inserted_id: Some(entries[0].id.to_string())
        },
        state
    );
    assert_eq!(JOINED_LABEL, form.view().button_label);
    assert!(form.view().input_disabled);

    Ok(())
}

#[tokio::test]
async fn form_surfaces_store_failure_and_recovers() -> Result<()> {
    let app = TestApp::spawn().await?;
    let mut form = FormController::new(app.url(""), Duration::from_secs(2))?;
    app.store.set_unavailable(true);

    form.submit("ursula@leguin.com").await;

    assert_eq!(
        &FormState::Failed {
            message: "Error: Internal server error".to_string()
        },
        form.state()
    );
    assert!(!form.view().button_disabled);
    assert!(app.store.entries().is_empty());

    app.store.set_unavailable(false);
    form.submit("ursula@leguin.com").await;

    assert!(matches!(form.state(), FormState::Joined { .. }));
    assert_eq!(1, app.store.entries().len());

    Ok(())
}
