// web/mod.rs — HTTP server and router.
//
// Server-rendered pages plus a few JSON endpoints:
//   GET  /                     homepage
//   GET  /notes | /contact | /about
//   GET  /todolist             task list (incomplete first)
//   POST /todolist             create task (form-encoded)
//   POST /delete_task/{id}
//   POST /edit_task/{id}       body: {"task": "..."}
//   POST /toggle_task/{id}     body: {"is_completed": bool}
//   GET  /health

pub mod flash;
pub mod routes;
pub mod templates;

use anyhow::Result;
use axum::{
    response::Html,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::AppError;
use crate::web::flash::Flash;
use crate::AppContext;

pub async fn serve(ctx: Arc<AppContext>) -> Result<()> {
    let bind = format!("{}:{}", ctx.config.bind_address, ctx.config.port);
    let router = build_router(ctx);

    info!("taskpad listening on http://{}", bind);
    let listener = tokio::net::TcpListener::bind(&bind).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

pub fn build_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/", get(routes::pages::homepage))
        .route("/notes", get(routes::pages::notes))
        .route("/contact", get(routes::pages::contact))
        .route("/about", get(routes::pages::about))
        .route(
            "/todolist",
            get(routes::todolist::list_tasks).post(routes::todolist::create_task),
        )
        // POST, not GET: a crawler following links must never delete rows.
        .route("/delete_task/{id}", post(routes::todolist::delete_task))
        .route("/edit_task/{id}", post(routes::todolist::edit_task))
        .route("/toggle_task/{id}", post(routes::todolist::toggle_task))
        .route("/health", get(routes::health::health))
        .fallback(routes::pages::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

/// Render a template against the shared engine, mapping template failures to
/// the unexpected-error tail.
pub(crate) fn render(
    ctx: &AppContext,
    template: &str,
    context: &tera::Context,
) -> Result<Html<String>, AppError> {
    let html = ctx
        .templates
        .render(template, context)
        .map_err(anyhow::Error::from)?;
    Ok(Html(html))
}

/// Base context every page template expects: the page title and the flash
/// message list (possibly empty).
pub(crate) fn page_context(page: &str, messages: &[Flash]) -> tera::Context {
    let mut context = tera::Context::new();
    context.insert("page", page);
    context.insert("messages", messages);
    context
}
