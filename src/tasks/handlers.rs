use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    session::CurrentUser,
    state::AppState,
    store::{StoreError, Task, TaskPatch},
};

use super::dto::{CreateTaskRequest, TaskResponse, UpdateTaskRequest};

pub fn task_routes() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list_tasks))
        .route("/tasks", post(create_task))
        .route("/tasks/:id", patch(update_task))
        .route("/tasks/:id", delete(delete_task))
}

#[instrument(skip(state, user))]
pub async fn list_tasks(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<TaskResponse>>> {
    let tasks = match state.tasks.list_by_owner(user.id).await {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, user_id = %user.id, "list tasks failed");
            return Err(ApiError::Internal(anyhow::anyhow!("task list failed")));
        }
    };
    Ok(Json(tasks.into_iter().map(TaskResponse::from).collect()))
}

#[instrument(skip(state, user, payload))]
pub async fn create_task(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)> {
    let title = payload.title.trim().to_string();
    if title.is_empty() {
        warn!(user_id = %user.id, "task without title");
        return Err(ApiError::Validation("Title is required".into()));
    }

    let now = OffsetDateTime::now_utc();
    let task = Task {
        id: Uuid::new_v4(),
        user_id: user.id,
        title,
        description: payload.description,
        priority: payload.priority,
        completed: false,
        created_at: now,
        updated_at: now,
    };

    if let Err(e) = state.tasks.insert(task.clone()).await {
        error!(error = %e, user_id = %user.id, "insert task failed");
        return Err(ApiError::Internal(anyhow::anyhow!("task insert failed")));
    }

    info!(user_id = %user.id, task_id = %task.id, "task created");
    Ok((StatusCode::CREATED, Json(TaskResponse::from(task))))
}

#[instrument(skip(state, user, payload))]
pub async fn update_task(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTaskRequest>,
) -> ApiResult<Json<TaskResponse>> {
    let title = match payload.title {
        Some(t) => {
            let t = t.trim().to_string();
            if t.is_empty() {
                return Err(ApiError::Validation("Title is required".into()));
            }
            Some(t)
        }
        None => None,
    };

    let patch = TaskPatch {
        title,
        description: payload.description,
        priority: payload.priority,
        completed: payload.completed,
    };

    // (id, owner) joint match: someone else's task reads as absent
    let task = match state.tasks.update(id, user.id, patch).await {
        Ok(t) => t,
        Err(StoreError::NotFound) => {
            warn!(user_id = %user.id, task_id = %id, "update on missing task");
            return Err(ApiError::NotFound("Task"));
        }
        Err(e) => {
            error!(error = %e, user_id = %user.id, task_id = %id, "update task failed");
            return Err(ApiError::Internal(anyhow::anyhow!("task update failed")));
        }
    };

    info!(user_id = %user.id, task_id = %id, "task updated");
    Ok(Json(TaskResponse::from(task)))
}

#[instrument(skip(state, user))]
pub async fn delete_task(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    match state.tasks.delete(id, user.id).await {
        Ok(()) => {
            info!(user_id = %user.id, task_id = %id, "task deleted");
            Ok(StatusCode::NO_CONTENT)
        }
        Err(StoreError::NotFound) => {
            warn!(user_id = %user.id, task_id = %id, "delete on missing task");
            Err(ApiError::NotFound("Task"))
        }
        Err(e) => {
            error!(error = %e, user_id = %user.id, task_id = %id, "delete task failed");
            Err(ApiError::Internal(anyhow::anyhow!("task delete failed")))
        }
    }
}
