// web/routes/pages.rs — static page routes.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{AppendHeaders, IntoResponse, Response},
};
use std::sync::Arc;

use crate::error::AppError;
use crate::web::{flash, page_context, render};
use crate::AppContext;

pub async fn homepage(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    render_static(&ctx, &headers, "homepage.html", "Homepage")
}

pub async fn notes(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    render_static(&ctx, &headers, "notes.html", "Notes")
}

pub async fn contact(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    render_static(&ctx, &headers, "contact.html", "Contact")
}

pub async fn about(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    render_static(&ctx, &headers, "about.html", "About")
}

/// Router fallback: any unknown path gets the rendered not-found page.
pub async fn not_found(State(ctx): State<Arc<AppContext>>) -> Result<Response, AppError> {
    render_not_found(&ctx, "The page you were looking for does not exist.")
}

/// Render the not-found page with a 404 status. Page flows (e.g. deleting an
/// unknown task id) use this instead of the JSON failure shape.
pub fn render_not_found(ctx: &AppContext, detail: &str) -> Result<Response, AppError> {
    let mut context = page_context("Not found", &[]);
    context.insert("detail", detail);
    let html = render(ctx, "404.html", &context)?;
    Ok((StatusCode::NOT_FOUND, html).into_response())
}

/// Render a plain page, draining any pending flash messages into it.
fn render_static(
    ctx: &AppContext,
    headers: &HeaderMap,
    template: &str,
    page: &str,
) -> Result<Response, AppError> {
    let messages = flash::read(headers);
    let html = render(ctx, template, &page_context(page, &messages))?;
    if messages.is_empty() {
        Ok(html.into_response())
    } else {
        Ok((AppendHeaders([(header::SET_COOKIE, flash::clear())]), html).into_response())
    }
}
