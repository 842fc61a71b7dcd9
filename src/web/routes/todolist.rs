// web/routes/todolist.rs — task CRUD routes.
//
// Page flows (list/create/delete) speak the post-redirect-get dance with
// flash messages; edit and toggle are JSON endpoints called from the listing
// page's inline script.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, HeaderMap},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
    Form, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::error::AppError;
use crate::forms::{self, ValidationError};
use crate::storage::StoreError;
use crate::tasks::{TaskOrder, TaskPatch};
use crate::web::flash::{self, Flash};
use crate::web::{page_context, render};
use crate::web::routes::pages::render_not_found;
use crate::AppContext;

#[derive(Deserialize)]
pub struct CreateTaskForm {
    #[serde(default)]
    pub task: String,
    /// Checkbox field: present ("on") when ticked, absent otherwise.
    #[serde(default)]
    pub is_completed: Option<String>,
}

#[derive(Deserialize)]
pub struct EditTaskBody {
    pub task: String,
}

#[derive(Deserialize)]
pub struct ToggleTaskBody {
    pub is_completed: bool,
}

pub async fn list_tasks(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let tasks = ctx.store.list(TaskOrder::ActiveFirst).await?;
    let messages = flash::read(&headers);
    let mut context = page_context("Things To Do", &messages);
    context.insert("tasks", &tasks);
    let html = render(&ctx, "todolist.html", &context)?;
    if messages.is_empty() {
        Ok(html.into_response())
    } else {
        Ok((AppendHeaders([(header::SET_COOKIE, flash::clear())]), html).into_response())
    }
}

pub async fn create_task(
    State(ctx): State<Arc<AppContext>>,
    Form(form): Form<CreateTaskForm>,
) -> Result<Response, AppError> {
    match forms::clean_task(&form.task) {
        Ok(description) => {
            ctx.store
                .create(&description, form.is_completed.is_some())
                .await?;
            // Redirect back to the list so a refresh cannot resubmit the form.
            let cookie = flash::set(&[Flash::success("Task added successfully!")]);
            Ok((
                AppendHeaders([(header::SET_COOKIE, cookie)]),
                Redirect::to("/todolist"),
            )
                .into_response())
        }
        Err(err) => {
            // Nothing was created; re-render the list with the error inline
            // and the rejected text kept in the form.
            let tasks = ctx.store.list(TaskOrder::ActiveFirst).await?;
            let messages = vec![Flash::error(err.to_string())];
            let mut context = page_context("Things To Do", &messages);
            context.insert("tasks", &tasks);
            context.insert("draft", &form.task);
            Ok(render(&ctx, "todolist.html", &context)?.into_response())
        }
    }
}

pub async fn delete_task(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let task = match ctx.store.get(id).await {
        Ok(task) => task,
        Err(StoreError::NotFound(_)) => {
            return render_not_found(&ctx, &format!("Task {id} does not exist."));
        }
        Err(err) => return Err(err.into()),
    };
    ctx.store.delete(id).await?;

    let cookie = flash::set(&[Flash::success(format!(
        "Task \"{}\" deleted successfully!",
        task.description
    ))]);
    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Redirect::to("/todolist"),
    )
        .into_response())
}

pub async fn edit_task(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<i64>,
    body: Result<Json<EditTaskBody>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(body) = body.map_err(|rejection| AppError::Malformed(rejection.body_text()))?;
    let trimmed = body.task.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty.into());
    }
    ctx.store.update(id, TaskPatch::description(trimmed)).await?;

    let message = "Task updated successfully!";
    Ok(json_success(
        message,
        json!({ "success": true, "message": message }),
    ))
}

pub async fn toggle_task(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<i64>,
    body: Result<Json<ToggleTaskBody>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(body) = body.map_err(|rejection| AppError::Malformed(rejection.body_text()))?;
    let task = ctx
        .store
        .update(id, TaskPatch::completed(body.is_completed))
        .await?;
    let message = if task.is_completed {
        "Task marked as completed!"
    } else {
        "Task marked as incomplete!"
    };
    Ok(json_success(
        message,
        json!({
            "success": true,
            "is_completed": task.is_completed,
            "message": message,
        }),
    ))
}

/// JSON success response that also flashes the message, so the page reload
/// triggered by the listing script shows it once.
fn json_success(message: &str, body: Value) -> Response {
    let cookie = flash::set(&[Flash::success(message)]);
    (AppendHeaders([(header::SET_COOKIE, cookie)]), Json(body)).into_response()
}
