//! Router: resource routes, health, and the middleware stack.

use crate::app::ApplicationContext;
use crate::config::AppConfig;
use crate::error::ConfigError;
use crate::handlers::generic::{self, GenericHandler};
use crate::health;
use crate::middleware::{json_error_body, log_request, panic_response, RequestLogger};
use crate::model::Model;
use crate::search::SearchFilter;
use axum::{
    middleware::{from_fn_with_state, map_response},
    routing::get,
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, limit::RequestBodyLimitLayer, timeout::TimeoutLayer};

/// CRUD and search routes for one resource mounted at `path` (e.g. `/users`).
pub fn resource_routes<M: Model, F: SearchFilter>(path: &str, handler: Arc<GenericHandler<M, F>>) -> Router {
    Router::new()
        .route(path, get(generic::all::<M, F>).post(generic::create::<M, F>))
        .route(
            &format!("{}/search", path),
            get(generic::search::<M, F>).post(generic::search_by_body::<M, F>),
        )
        .route(
            &format!("{}/:id", path),
            get(generic::load::<M, F>)
                .put(generic::update::<M, F>)
                .patch(generic::patch::<M, F>)
                .delete(generic::delete::<M, F>),
        )
        .with_state(handler)
}

/// Layers run outermost first: panic recovery, JSON error bodies, request log, timeout, body limit.
pub fn router(ctx: &ApplicationContext, config: &AppConfig) -> Result<Router, ConfigError> {
    let mut app = Router::new()
        .route("/health", get(health::health))
        .with_state(ctx.health.clone())
        .merge(resource_routes("/users", ctx.user.clone()))
        .layer(RequestBodyLimitLayer::new(config.server.body_limit_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(config.server.request_timeout_secs)));

    if config.middleware.log {
        let logger = RequestLogger::new(config)?;
        app = app.layer(from_fn_with_state(logger, log_request));
    }

    Ok(app.layer(
        ServiceBuilder::new()
            .layer(CatchPanicLayer::custom(panic_response))
            .layer(map_response(json_error_body)),
    ))
}
