use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use strum_macros::AsRefStr;

use crate::signup::SignupError;

pub type WebResult<T> = core::result::Result<T, Error>;

#[derive(Debug, AsRefStr, thiserror::Error)]
pub enum Error {
    #[error("signup error: {0}")]
    Signup(#[from] SignupError),

    #[error("templating error: {0}")]
    Tera(#[from] tera::Error),
}

impl Error {
    /// Maps the error onto what the caller gets to see.
    /// Validation problems are echoed, everything server side collapses into `ServiceError`.
    pub fn status_code_and_client_error(&self) -> (StatusCode, ClientError) {
        use ClientError::*;

        match self {
            Error::Signup(SignupError::MethodNotAllowed) => {
                (StatusCode::METHOD_NOT_ALLOWED, MethodNotAllowed)
            }
            Error::Signup(SignupError::Validation(er)) => {
                (StatusCode::BAD_REQUEST, InvalidInput(er.to_string()))
            }
            Error::Signup(SignupError::Store(_)) | Error::Tera(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, ServiceError)
            }
        }
    }
}

impl Error {
    /// Variant path for log lines, e.g. `Signup.Validation.BadFormat`.
    pub fn type_path(&self) -> String {
        match self {
            Error::Signup(SignupError::Validation(er)) => {
                format!("{}.Validation.{}", self.as_ref(), er.as_ref())
            }
            Error::Signup(er) => format!("{}.{}", self.as_ref(), er.as_ref()),
            Error::Tera(_) => self.as_ref().to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        tracing::debug!("{:<12} - into_response(Error: {self:?})", "INTO_RESP");

        // Construct a response
        let mut res = StatusCode::INTERNAL_SERVER_ERROR.into_response();

        // Insert the Error into response so that `response_mapper` can build the client body.
        res.extensions_mut().insert(Arc::new(self));

        res
    }
}

/// What the client is told. `Display` is the `message` of the JSON body.
#[derive(Debug, AsRefStr, derive_more::Display)]
pub enum ClientError {
    #[display("{_0}")]
    InvalidInput(String),
    #[display("Method not allowed. Use POST.")]
    MethodNotAllowed,
    #[display("Internal server error")]
    ServiceError,
}
