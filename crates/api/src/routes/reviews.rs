//! Review lookups.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::error::Result;
use crate::middleware::OptionalAuth;
use crate::models::{Review, Stored};
use crate::services::ResourceService;
use crate::state::AppState;

/// Every review of a product, by product name (case-insensitive).
///
/// Open to anonymous callers; a logged-in viewer is only noted in the logs.
///
/// # Route
///
/// `GET /reviews/{name}`
pub async fn by_name(
    State(state): State<AppState>,
    OptionalAuth(viewer): OptionalAuth,
    Path(name): Path<String>,
) -> Result<Json<Vec<Stored<Review>>>> {
    let service = ResourceService::<Review>::new(state.gateway())?;
    let reviews = service.find_by_name(&name).await?;
    tracing::debug!(
        product = %name,
        viewer = viewer.as_ref().map(|u| u.username.as_str()),
        count = reviews.len(),
        "Review lookup"
    );
    Ok(Json(reviews))
}
