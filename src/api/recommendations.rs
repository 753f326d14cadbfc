use axum::{extract::State, Json};

use super::{auth::AuthUser, AppState};
use crate::{error::AppResult, models::Recommendations};

/// Recommendations seeded from the caller's reference movie. A user with
/// no favorites and no rated movies gets an explanatory empty list, still
/// as a success.
pub async fn recommend(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> AppResult<Json<Recommendations>> {
    Ok(Json(state.recommendations.for_user(user.id).await?))
}
