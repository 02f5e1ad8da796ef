use axum::{
    Json,
    extract::{Path, RawQuery, State, rejection::JsonRejection, rejection::PathRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use foodgram_auth_types::identity::IdentityHeaders;

use crate::domain::types::Ingredient;
use crate::error::ApiError;
use crate::handlers::{parse_body, parse_query};
use crate::state::AppState;
use crate::usecase::ingredient::{
    CreateIngredientInput, CreateIngredientUseCase, GetIngredientUseCase,
    SearchIngredientsUseCase,
};

#[derive(Serialize)]
pub struct IngredientResponse {
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
}

impl From<Ingredient> for IngredientResponse {
    fn from(ingredient: Ingredient) -> Self {
        Self {
            id: ingredient.id,
            name: ingredient.name,
            measurement_unit: ingredient.measurement_unit,
        }
    }
}

// ── GET /ingredients ─────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct IngredientSearchQuery {
    pub name: Option<String>,
}

pub async fn list_ingredients(
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<Vec<IngredientResponse>>, ApiError> {
    let query: IngredientSearchQuery = parse_query(raw_query.as_deref())?;
    let uc = SearchIngredientsUseCase {
        repo: state.ingredient_repo(),
    };
    let found = uc.execute(query.name.as_deref()).await?;
    Ok(Json(found.into_iter().map(IngredientResponse::from).collect()))
}

// ── GET /ingredients/{id} ────────────────────────────────────────────────────

pub async fn get_ingredient(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<IngredientResponse>, ApiError> {
    let Path(id) = path.map_err(|_| ApiError::IngredientNotFound)?;
    let uc = GetIngredientUseCase {
        repo: state.ingredient_repo(),
    };
    Ok(Json(uc.execute(id).await?.into()))
}

// ── POST /ingredients ────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateIngredientRequest {
    pub name: String,
    pub measurement_unit: String,
}

pub async fn create_ingredient(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    body: Result<Json<CreateIngredientRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<IngredientResponse>), ApiError> {
    if !identity.is_admin() {
        return Err(ApiError::Forbidden);
    }
    let body = parse_body(body)?;
    let uc = CreateIngredientUseCase {
        repo: state.ingredient_repo(),
    };
    let ingredient = uc
        .execute(
            identity.user_role,
            CreateIngredientInput {
                name: body.name,
                measurement_unit: body.measurement_unit,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(ingredient.into())))
}
