use axum::{body::Bytes, extract::State, http::Method, Json};

use crate::{signup::JoinReply, web::WebResult, AppState};

/// Accepts every method so that anything but `POST` gets the JSON 405 instead of axum's empty one.
#[tracing::instrument(name = "join_waitlist", skip_all)]
pub async fn join_waitlist(
    State(app_state): State<AppState>,
    method: Method,
    body: Bytes,
) -> WebResult<Json<JoinReply>> {
    let joined = app_state.signup.handle(&method, &body).await?;

    Ok(Json(JoinReply::joined(&joined.inserted_id)))
}
