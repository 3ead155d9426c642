//! The signup flow: method check, validation, one insert.
//!
//! `SignupHandler` takes the request method and the raw body and returns a typed outcome.
//! The hosting layer (see `web::routes`) turns that outcome into its own response type.

use std::sync::Arc;

use axum::http::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::AsRefStr;
use tracing::{debug, info};

use crate::{
    email::{ValidEmail, ValidationError},
    store::{EntryId, NewEntry, StoreError, WaitlistStore},
};

pub const JOINED_MESSAGE: &str = "Email added to waitlist";

// ###################################
// ->   STRUCTS
// ###################################
/// The JSON body every signup response carries.
/// Also what the form controller parses, so missing fields are tolerated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inserted_id: Option<String>,
}

impl JoinReply {
    pub fn joined(inserted_id: &EntryId) -> Self {
        JoinReply {
            success: true,
            message: JOINED_MESSAGE.to_string(),
            inserted_id: Some(inserted_id.to_string()),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        JoinReply {
            success: false,
            message: message.into(),
            inserted_id: None,
        }
    }
}

/// A successfully stored signup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinSuccess {
    pub inserted_id: EntryId,
}

#[derive(Clone)]
pub struct SignupHandler {
    store: Arc<dyn WaitlistStore>,
}

impl SignupHandler {
    pub fn new(store: Arc<dyn WaitlistStore>) -> Self {
        SignupHandler { store }
    }

    /// Handles one submission. Only `POST` with a JSON body `{"email": "<string>"}` gets through.
    /// A body that is not JSON is treated as if the email was missing.
    /// On success exactly one entry has been written, on any error none.
    #[tracing::instrument(name = "Handling waitlist signup", skip_all, fields(method = %method))]
    pub async fn handle(&self, method: &Method, body: &[u8]) -> SignupResult<JoinSuccess> {
        if *method != Method::POST {
            return Err(SignupError::MethodNotAllowed);
        }

        let body: Option<Value> = serde_json::from_slice(body).ok();
        let email = ValidEmail::parse(body.as_ref().and_then(|body| body.get("email")))
            .inspect_err(|er| debug!(kind = er.as_ref(), "email rejected"))?;
        debug!(email = %email.as_ref(), "email validated");

        let inserted_id = self.store.insert(NewEntry::new(email)).await?;
        info!(inserted_id = %inserted_id, "Email added to waitlist");

        Ok(JoinSuccess { inserted_id })
    }
}

// ###################################
// ->   ERROR
// ###################################
pub type SignupResult<T> = core::result::Result<T, SignupError>;

#[derive(Debug, AsRefStr, thiserror::Error)]
pub enum SignupError {
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
