//! Notification endpoints.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::error::Result;
use crate::notification::Notification;
use crate::server::{extract_bearer_token, AppState};

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuery {
    pub notification_id: Option<String>,
}

/// Unparseable query strings fall back to no parameters, leaving the
/// authorize-then-validate order to the service.
fn query_or_default<T: Default>(query: std::result::Result<Query<T>, QueryRejection>) -> T {
    match query {
        Ok(Query(query)) => query,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Query string rejected");
            T::default()
        }
    }
}

/// GET /api/v1/notifications?user_id=
#[tracing::instrument(name = "http.list_notifications", skip(state, headers, query))]
pub async fn list_notifications(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: std::result::Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<Notification>>> {
    let query = query_or_default(query);
    let token = extract_bearer_token(&headers);
    let notifications = state
        .notifications
        .get_notifications(token, query.user_id.as_deref())
        .await?;

    Ok(Json(notifications))
}

/// POST /api/v1/notifications
///
/// A body that is not valid JSON is passed on as `null`, so an
/// unauthorized caller still gets 403 rather than a parse error.
#[tracing::instrument(name = "http.create_notification", skip(state, headers, body))]
pub async fn create_notification(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Notification>)> {
    let token = extract_bearer_token(&headers);
    let payload = match body {
        Ok(Json(value)) => value,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Request body is not JSON");
            Value::Null
        }
    };

    let created = state.notifications.post_notifications(token, payload).await?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// DELETE /api/v1/notifications?notification_id=
#[tracing::instrument(name = "http.delete_notification", skip(state, headers, query))]
pub async fn delete_notification(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: std::result::Result<Query<DeleteQuery>, QueryRejection>,
) -> Result<StatusCode> {
    let query = query_or_default(query);
    let token = extract_bearer_token(&headers);
    state
        .notifications
        .delete_notifications(token, query.notification_id.as_deref())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
