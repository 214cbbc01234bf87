//! Task handlers.
//!
//! Each handler validates its input, makes exactly one call to the store
//! worker and maps the answer onto a status code and JSON body.

use crate::api::AppState;
use crate::api::dto::{CreateTaskRequest, ListQuery, ListResponse, MessageResponse};
use crate::api::error::ApiError;
use crate::protocol::{Request, Response};
use crate::types::{ITEMS_PER_PAGE, ListFilter, NewTask, Status, Task, TaskPatch, total_pages};
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;

/// GET / - liveness text.
pub async fn root() -> &'static str {
    "Todo API is running"
}

/// GET /api/todos/all?status=&page=
pub async fn list_todos(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<ListResponse>, ApiError> {
    let Query(query) = query?;
    let filter = match query.status.as_deref().map(str::trim) {
        None | Some("") => ListFilter::new(),
        Some(raw) => {
            let status = raw
                .parse::<Status>()
                .map_err(|e| ApiError::bad_request(e.to_string()))?;
            ListFilter::new().status(status)
        }
    };
    let page = query.page();
    log::debug!("list status={:?} page={}", filter.status, page);

    let response = state
        .store
        .call(Request::List {
            filter,
            page,
            page_size: ITEMS_PER_PAGE,
        })
        .await?;

    match response {
        Response::Page { items, total_count } => Ok(Json(ListResponse {
            page,
            total_pages: total_pages(total_count, ITEMS_PER_PAGE),
            total_items: total_count,
            items_per_page: ITEMS_PER_PAGE,
            todos: items,
        })),
        other => Err(ApiError::from_store(other)),
    }
}

/// GET /api/todos/{id}
pub async fn get_todo(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Task>, ApiError> {
    log::debug!("get {}", id);
    let response = state.store.call(Request::Get { id }).await?;
    expect_task(response).map(Json)
}

/// POST /api/todos/create
pub async fn create_todo(
    State(state): State<AppState>,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let Json(body) = payload?;

    let (Some(title), Some(description), Some(status)) = (body.title, body.description, body.status) else {
        return Err(ApiError::bad_request("Please provide all required fields"));
    };
    if title.is_empty() || description.is_empty() {
        return Err(ApiError::bad_request("Please provide all required fields"));
    }

    let response = state
        .store
        .call(Request::Create {
            task: NewTask::new(title, description).status(status),
        })
        .await?;
    let task = expect_task(response)?;
    log::info!("Created task {}", task.id);

    Ok((StatusCode::CREATED, Json(task)))
}

/// PUT /api/todos/update/{id}
pub async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<TaskPatch>, JsonRejection>,
) -> Result<Json<Task>, ApiError> {
    let Json(patch) = payload?;
    log::debug!("update {} {:?}", id, patch);

    let response = state.store.call(Request::Update { id, patch }).await?;
    let task = expect_task(response)?;
    log::info!("Updated task {}", task.id);

    Ok(Json(task))
}

/// DELETE /api/todos/delete/{id}
pub async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    match state.store.call(Request::Delete { id: id.clone() }).await? {
        Response::Ok => {
            log::info!("Deleted task {}", id);
            Ok(Json(MessageResponse::new("Todo removed")))
        }
        other => Err(ApiError::from_store(other)),
    }
}

fn expect_task(response: Response) -> Result<Task, ApiError> {
    match response {
        Response::Task { task } => Ok(task),
        other => Err(ApiError::from_store(other)),
    }
}
