use std::sync::Arc;

use axum::{
    http::{HeaderValue, Method, Uri},
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    signup::JoinReply,
    web::{log, Error, REQUEST_ID_HEADER},
};

/// Turns a `web::Error` left in the response extensions into the JSON body the form expects:
/// `{"success": false, "message": ...}` with the mapped status code.
/// Responses without an error pass through untouched. Every response gets logged.
pub async fn response_mapper(req_method: Method, uri: Uri, resp: Response) -> Response {
    // Set by `PropagateRequestIdLayer`, which runs on the response before this mapper.
    let req_id: Option<HeaderValue> = resp.headers().get(REQUEST_ID_HEADER).cloned();

    let web_error = resp.extensions().get::<Arc<Error>>().map(Arc::as_ref);
    let client_status_and_error = web_error.map(Error::status_code_and_client_error);

    let err_resp = client_status_and_error.as_ref().map(|(status, cl_err)| {
        let mut err_resp = (*status, Json(JoinReply::rejected(cl_err.to_string()))).into_response();
        if let Some(req_id) = req_id.clone() {
            err_resp.headers_mut().insert(REQUEST_ID_HEADER, req_id);
        }
        err_resp
    });

    log::log_request(
        req_id.and_then(|id| id.to_str().ok().map(str::to_string)),
        req_method,
        uri,
        resp.status(),
        web_error,
        client_status_and_error.as_ref(),
    );

    err_resp.unwrap_or(resp)
}
