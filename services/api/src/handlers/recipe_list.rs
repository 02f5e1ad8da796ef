use axum::{
    Json,
    extract::{Path, State, rejection::PathRejection},
    http::StatusCode,
};

use foodgram_auth_types::identity::IdentityHeaders;

use crate::domain::types::RecipeList;
use crate::error::ApiError;
use crate::handlers::recipe::RecipeShortResponse;
use crate::state::AppState;
use crate::usecase::recipe_list::{AddToRecipeListUseCase, RemoveFromRecipeListUseCase};

async fn add(
    list: RecipeList,
    identity: IdentityHeaders,
    state: AppState,
    path: Result<Path<i32>, PathRejection>,
) -> Result<(StatusCode, Json<RecipeShortResponse>), ApiError> {
    let Path(recipe_id) = path.map_err(|_| ApiError::RecipeNotFound)?;
    let uc = AddToRecipeListUseCase {
        list,
        repo: state.recipe_list_repo(),
        recipes: state.recipe_repo(),
        users: state.user_repo(),
    };
    let summary = uc.execute(identity.user_id, recipe_id).await?;
    Ok((StatusCode::CREATED, Json(summary.into())))
}

async fn remove(
    list: RecipeList,
    identity: IdentityHeaders,
    state: AppState,
    path: Result<Path<i32>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(recipe_id) = path.map_err(|_| ApiError::RecipeNotFound)?;
    let uc = RemoveFromRecipeListUseCase {
        list,
        repo: state.recipe_list_repo(),
        recipes: state.recipe_repo(),
    };
    uc.execute(identity.user_id, recipe_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── POST|DELETE /recipes/{id}/favorite ───────────────────────────────────────

pub async fn add_favorite(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<(StatusCode, Json<RecipeShortResponse>), ApiError> {
    add(RecipeList::Favorites, identity, state, path).await
}

pub async fn remove_favorite(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    remove(RecipeList::Favorites, identity, state, path).await
}

// ── POST|DELETE /recipes/{id}/shopping_cart ──────────────────────────────────

pub async fn add_to_shopping_cart(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<(StatusCode, Json<RecipeShortResponse>), ApiError> {
    add(RecipeList::ShoppingCart, identity, state, path).await
}

pub async fn remove_from_shopping_cart(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    remove(RecipeList::ShoppingCart, identity, state, path).await
}
