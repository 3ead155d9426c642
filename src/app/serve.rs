use std::time::Duration;

use axum::{
    body::Body,
    http::{HeaderName, Request, Response},
    middleware, Router,
};
use tower::ServiceBuilder;
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{MakeSpan, OnRequest, OnResponse, TraceLayer},
};
use tracing::{field, info, warn, Span};

use crate::{
    web::{midware, routes::routes, REQUEST_ID_HEADER},
    App, AppState, Result,
};

/// Serves the signup service until the listener fails or a shutdown signal arrives.
/// In-flight signups are allowed to finish before returning.
pub async fn serve(app: App) -> Result<()> {
    let App {
        app_state,
        listener,
    } = app;

    axum::serve(listener, app_router(app_state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("{:<20} - Server stopped", "serve");
    Ok(())
}

/// The routes wrapped in the request-id, tracing and error-mapping layers.
pub fn app_router(app_state: AppState) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    // Requests pass the layers top to bottom, responses bottom to top:
    // the id is on the response before `response_mapper` rebuilds error bodies.
    let layers = ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
        .layer(signup_trace_layer())
        .layer(middleware::map_response(midware::response_mapper))
        .layer(PropagateRequestIdLayer::new(request_id));

    routes(app_state).layer(layers)
}

fn signup_trace_layer() -> TraceLayer<
    SharedClassifier<ServerErrorsAsFailures>,
    impl MakeSpan<Body> + Clone,
    impl OnRequest<Body> + Clone,
    impl OnResponse<Body> + Clone,
> {
    TraceLayer::new_for_http()
        .make_span_with(|req: &Request<Body>| {
            let req_id = req
                .headers()
                .get(REQUEST_ID_HEADER)
                .and_then(|id| id.to_str().ok())
                .unwrap_or_default();

            tracing::info_span!(
                "request",
                id = req_id,
                method = %req.method(),
                path = req.uri().path(),
                status = field::Empty,
                latency_ms = field::Empty,
            )
        })
        .on_request(|_req: &Request<Body>, _span: &Span| tracing::debug!("START"))
        .on_response(|res: &Response<Body>, latency: Duration, span: &Span| {
            let status = res.status();
            span.record("status", status.as_u16());
            span.record("latency_ms", latency.as_millis() as u64);

            if status.is_client_error() || status.is_server_error() {
                tracing::error!("END - STATUS: {}", status.as_u16())
            } else {
                tracing::info!("END - STATUS: {}", status.as_u16())
            }
        })
}

/// Resolves on Ctrl+C or, on unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(er) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {er}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(er) => {
                warn!("Failed to listen for SIGTERM: {er}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("{:<20} - Shutdown signal received", "serve");
}
