use std::sync::Arc;

use axum::routing::get;
use axum::{Extension, Json, Router};
use utoipa::OpenApi;

use crate::api::rest::handlers;
use crate::api::rest::openapi::ApiDoc;
use crate::domain::service::Service;

pub const BASE_PATH: &str = "/access-policy/v1";

#[allow(clippy::needless_pass_by_value)] // Arc is intentionally passed by value for Extension layer
pub fn register_routes(router: Router, service: Arc<Service>) -> Router {
    let document = ApiDoc::openapi();

    let api = Router::new()
        // GET /access-policy/v1/access - Evaluate access for the caller
        .route("/access", get(handlers::get_access))
        // GET/POST /access-policy/v1/trial - Read or start the caller's trial
        .route("/trial", get(handlers::get_trial).post(handlers::start_trial))
        // GET/POST /access-policy/v1/subscriptions - List or record payments
        .route(
            "/subscriptions",
            get(handlers::list_subscriptions).post(handlers::create_subscription),
        )
        .route(
            "/openapi.json",
            get(move || {
                let document = document.clone();
                async move { Json(document) }
            }),
        )
        .layer(Extension(service));

    router.nest(BASE_PATH, api)
}
