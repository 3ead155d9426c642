//! The signup form as seen from the browser side: a small HTTP client plus the UI state it drives.
//!
//! `FormController::submit` runs the same pattern check the server runs, posts the email and
//! settles the form into either the joined state or back into an editable one. The form never
//! stays stuck in "submitting", whatever the server or the network does.

use std::time::Duration;

use reqwest::{Client, Url};
use serde_json::json;
use tracing::{debug, warn};

use crate::{email::ValidEmail, signup::JoinReply};

pub const JOIN_PATH: &str = "api/join-waitlist";

pub const SUBMIT_LABEL: &str = "Join the waitlist";
pub const SUBMITTING_LABEL: &str = "Submitting...";
pub const JOINED_LABEL: &str = "Thanks for joining!";
pub const INVALID_EMAIL_ALERT: &str = "Please enter a valid email address.";
const FALLBACK_ERROR: &str = "Something went wrong";

// ###################################
// ->   STRUCTS
// ###################################
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormState {
    /// Waiting for input, nothing sent yet.
    Idle,
    /// A request is in flight, the submit control is disabled.
    Submitting,
    /// Terminal, the input stays disabled.
    Joined { inserted_id: Option<String> },
    /// The last attempt failed, the user may retry.
    Failed { message: String },
}

/// What the user currently sees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormView {
    pub button_label: String,
    pub button_disabled: bool,
    pub input_disabled: bool,
    pub alert: Option<String>,
}

impl Default for FormView {
    fn default() -> Self {
        FormView {
            button_label: SUBMIT_LABEL.to_string(),
            button_disabled: false,
            input_disabled: false,
            alert: None,
        }
    }
}

#[derive(Debug)]
pub struct FormController {
    http_client: Client,
    url: Url,
    state: FormState,
    view: FormView,
}

impl FormController {
    /// `base_url` is the origin serving the signup endpoint, e.g. `https://example.com`.
    pub fn new<S: AsRef<str>>(base_url: S, timeout: Duration) -> Result<Self> {
        let url = Url::parse(base_url.as_ref())
            .and_then(|base| base.join(JOIN_PATH))
            .map_err(|e| Error::UrlParsing(e.to_string()))?;

        let http_client = Client::builder().timeout(timeout).build()?;

        Ok(FormController {
            http_client,
            url,
            state: FormState::Idle,
            view: FormView::default(),
        })
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn view(&self) -> &FormView {
        &self.view
    }

    /// Handles one form submission and returns the state the form settled in.
    #[tracing::instrument(name = "Submitting waitlist form", skip_all)]
    pub async fn submit(&mut self, email: &str) -> &FormState {
        if self.view.input_disabled {
            debug!("form already joined, ignoring submission");
            return &self.state;
        }

        if email.is_empty() || !ValidEmail::is_plausible(email) {
            self.view.alert = Some(INVALID_EMAIL_ALERT.to_string());
            return &self.state;
        }

        self.begin_submit();

        match self.post(email).await {
            Ok(reply) if reply.success => self.finish_joined(reply.inserted_id),
            Ok(reply) => {
                let message = if reply.message.is_empty() {
                    FALLBACK_ERROR.to_string()
                } else {
                    reply.message
                };
                self.finish_failed(format!("Error: {message}"));
            }
            Err(er) => {
                warn!(error = %er, "waitlist request failed");
                self.finish_failed(format!("Error: {er}"));
            }
        }

        &self.state
    }

    async fn post(&self, email: &str) -> Result<JoinReply> {
        let resp = self
            .http_client
            .post(self.url.clone())
            .json(&json!({ "email": email }))
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        // Error statuses usually still carry a JSON body with a message worth showing.
        match serde_json::from_str::<JoinReply>(&text) {
            Ok(reply) => Ok(reply),
            Err(_) if !status.is_success() => Err(Error::Http {
                status: status.as_u16(),
                body: text,
            }),
            Err(er) => Err(Error::InvalidReply(er.to_string())),
        }
    }

    fn begin_submit(&mut self) {
        self.state = FormState::Submitting;
        self.view.alert = None;
        self.view.button_disabled = true;
        self.view.button_label = SUBMITTING_LABEL.to_string();
    }

    fn finish_joined(&mut self, inserted_id: Option<String>) {
        self.state = FormState::Joined { inserted_id };
        self.view.button_label = JOINED_LABEL.to_string();
        self.view.button_disabled = true;
        self.view.input_disabled = true;
    }

    fn finish_failed(&mut self, message: String) {
        self.state = FormState::Failed {
            message: message.clone(),
        };
        self.view.alert = Some(message);
        self.view.button_label = SUBMIT_LABEL.to_string();
        self.view.button_disabled = false;
    }
}

// ###################################
// ->   ERROR & RESULT
// ###################################
pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid url: {0}")]
    UrlParsing(String),
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("unexpected response: {0}")]
    InvalidReply(String),
    #[error("{0}")]
    Reqwest(#[from] reqwest::Error),
}
