//! Generic resource route handlers.
//!
//! One set of handlers serves every [`Resource`]; the router instantiates
//! them per entity type. Mutating handlers take [`RequireAuth`] before the
//! body so anonymous writes are rejected before any parsing.

use axum::{
    Json,
    extract::{FromRequest, Path, Request, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{Resource, Stored};
use crate::services::ResourceService;
use crate::state::AppState;

/// A JSON request body; syntax and content-type problems become 400s.
pub struct JsonBody(pub Value);

impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> std::result::Result<Self, Self::Rejection> {
        match Json::<Value>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(AppError::BadRequest(rejection.body_text())),
        }
    }
}

/// List every entity.
///
/// # Route
///
/// `GET /{collection}`
pub async fn index<R: Resource>(State(state): State<AppState>) -> Result<Json<Vec<Stored<R>>>> {
    let service = ResourceService::<R>::new(state.gateway())?;
    Ok(Json(service.list().await?))
}

/// Get one entity by ID.
///
/// # Route
///
/// `GET /{collection}/{id}`
pub async fn show<R: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Stored<R>>> {
    let service = ResourceService::<R>::new(state.gateway())?;
    Ok(Json(service.get(&id).await?))
}

/// Create an entity.
///
/// # Route
///
/// `POST /{collection}`
pub async fn create<R: Resource>(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    JsonBody(input): JsonBody,
) -> Result<impl IntoResponse> {
    let service = ResourceService::<R>::new(state.gateway())?;
    let stored = service.create(&input).await?;
    tracing::debug!(user = %user.username, id = %stored.id, "{} created via API", R::NAME);
    Ok((StatusCode::CREATED, Json(stored)))
}

/// Fully replace an entity.
///
/// # Route
///
/// `PUT /{collection}/{id}`
pub async fn replace<R: Resource>(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<String>,
    JsonBody(input): JsonBody,
) -> Result<StatusCode> {
    let service = ResourceService::<R>::new(state.gateway())?;
    service.update(&id, &input).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete an entity.
///
/// # Route
///
/// `DELETE /{collection}/{id}`
pub async fn destroy<R: Resource>(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let service = ResourceService::<R>::new(state.gateway())?;
    service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
