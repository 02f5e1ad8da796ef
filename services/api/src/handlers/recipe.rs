use axum::{
    Json,
    extract::{Path, RawQuery, State, rejection::JsonRejection, rejection::PathRejection},
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use foodgram_auth_types::identity::IdentityHeaders;
use foodgram_domain::pagination::{Page, PageRequest};

use crate::domain::types::{IngredientAmount, Recipe, RecipeFilter, RecipeSummary};
use crate::error::ApiError;
use crate::handlers::tag::TagResponse;
use crate::handlers::user::UserResponse;
use crate::handlers::{parse_body, parse_flag, parse_query};
use crate::state::AppState;
use crate::usecase::recipe::{
    CreateRecipeUseCase, DeleteRecipeUseCase, GetRecipeImageUseCase, GetRecipeUseCase,
    ListRecipesUseCase, RecipeInput, UpdateRecipeUseCase,
};

/// Public URL of a stored recipe picture.
pub fn image_url(recipe_id: i32, has_image: bool) -> Option<String> {
    has_image.then(|| format!("/recipes/{recipe_id}/image"))
}

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct RecipeIngredientResponse {
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

#[derive(Serialize)]
pub struct RecipeResponse {
    pub id: i32,
    pub tags: Vec<TagResponse>,
    pub author: UserResponse,
    pub ingredients: Vec<RecipeIngredientResponse>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: Option<String>,
    pub text: String,
    pub cooking_time: i32,
    #[serde(serialize_with = "foodgram_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Recipe> for RecipeResponse {
    fn from(recipe: Recipe) -> Self {
        Self {
            id: recipe.id,
            tags: recipe.tags.into_iter().map(TagResponse::from).collect(),
            author: recipe.author.into(),
            ingredients: recipe
                .ingredients
                .into_iter()
                .map(|line| RecipeIngredientResponse {
                    id: line.ingredient.id,
                    name: line.ingredient.name,
                    measurement_unit: line.ingredient.measurement_unit,
                    amount: line.amount,
                })
                .collect(),
            is_favorited: recipe.is_favorited,
            is_in_shopping_cart: recipe.is_in_shopping_cart,
            image: image_url(recipe.id, recipe.has_image),
            name: recipe.name,
            text: recipe.text,
            cooking_time: recipe.cooking_time,
            created_at: recipe.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct RecipeShortResponse {
    pub id: i32,
    pub name: String,
    pub image: Option<String>,
    pub cooking_time: i32,
}

impl From<RecipeSummary> for RecipeShortResponse {
    fn from(summary: RecipeSummary) -> Self {
        Self {
            id: summary.id,
            image: image_url(summary.id, summary.has_image),
            name: summary.name,
            cooking_time: summary.cooking_time,
        }
    }
}

// ── Request types ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct IngredientAmountRequest {
    pub id: i32,
    pub amount: i32,
}

/// Create and update body. Every field is optional here so that updates can
/// be partial; create enforces presence. Unknown fields such as `author` are ignored.
#[derive(Deserialize)]
pub struct RecipeRequest {
    pub ingredients: Option<Vec<IngredientAmountRequest>>,
    pub tags: Option<Vec<i32>>,
    pub image: Option<String>,
    pub name: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i32>,
}

impl From<RecipeRequest> for RecipeInput {
    fn from(body: RecipeRequest) -> Self {
        Self {
            name: body.name,
            text: body.text,
            cooking_time: body.cooking_time,
            tags: body.tags,
            ingredients: body.ingredients.map(|items| {
                items
                    .into_iter()
                    .map(|i| IngredientAmount {
                        ingredient_id: i.id,
                        amount: i.amount,
                    })
                    .collect()
            }),
            image: body.image,
        }
    }
}

#[derive(Deserialize, Default)]
pub struct RecipeListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// Comma-separated tag slugs; a recipe matches if it has any of them.
    pub tags: Option<String>,
    pub author: Option<Uuid>,
    pub is_favorited: Option<String>,
    pub is_in_shopping_cart: Option<String>,
}

// ── GET /recipes ─────────────────────────────────────────────────────────────

pub async fn list_recipes(
    identity: Option<IdentityHeaders>,
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<Page<RecipeResponse>>, ApiError> {
    let query: RecipeListQuery = parse_query(raw_query.as_deref())?;
    let filter = RecipeFilter {
        tags: query
            .tags
            .as_deref()
            .map(|t| t.split(',').map(|s| s.trim().to_owned()).collect())
            .unwrap_or_default(),
        author: query.author,
        is_favorited: parse_flag(query.is_favorited.as_deref())?,
        is_in_shopping_cart: parse_flag(query.is_in_shopping_cart.as_deref())?,
    };
    let uc = ListRecipesUseCase {
        repo: state.recipe_repo(),
    };
    let page = uc
        .execute(
            filter,
            identity.map(|i| i.user_id),
            PageRequest::new(query.limit, query.page),
        )
        .await?;
    Ok(Json(page.map(RecipeResponse::from)))
}

// ── GET /recipes/{id} ────────────────────────────────────────────────────────

pub async fn get_recipe(
    identity: Option<IdentityHeaders>,
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<RecipeResponse>, ApiError> {
    let Path(id) = path.map_err(|_| ApiError::RecipeNotFound)?;
    let uc = GetRecipeUseCase {
        repo: state.recipe_repo(),
    };
    let recipe = uc.execute(id, identity.map(|i| i.user_id)).await?;
    Ok(Json(recipe.into()))
}

// ── POST /recipes ────────────────────────────────────────────────────────────

pub async fn create_recipe(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    body: Result<Json<RecipeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RecipeResponse>), ApiError> {
    let body = parse_body(body)?;
    let uc = CreateRecipeUseCase {
        repo: state.recipe_repo(),
        ingredients: state.ingredient_repo(),
        tags: state.tag_repo(),
        users: state.user_repo(),
    };
    let recipe = uc.execute(identity.user_id, body.into()).await?;
    Ok((StatusCode::CREATED, Json(recipe.into())))
}

// ── PATCH|PUT /recipes/{id} ──────────────────────────────────────────────────

pub async fn update_recipe(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
    body: Result<Json<RecipeRequest>, JsonRejection>,
) -> Result<Json<RecipeResponse>, ApiError> {
    let Path(id) = path.map_err(|_| ApiError::RecipeNotFound)?;
    let body = parse_body(body)?;
    let uc = UpdateRecipeUseCase {
        repo: state.recipe_repo(),
        ingredients: state.ingredient_repo(),
        tags: state.tag_repo(),
    };
    let recipe = uc.execute(identity.user_id, id, body.into()).await?;
    Ok(Json(recipe.into()))
}

// ── DELETE /recipes/{id} ─────────────────────────────────────────────────────

pub async fn delete_recipe(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = path.map_err(|_| ApiError::RecipeNotFound)?;
    let uc = DeleteRecipeUseCase {
        repo: state.recipe_repo(),
    };
    uc.execute(identity.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── GET /recipes/{id}/image ──────────────────────────────────────────────────

pub async fn get_recipe_image(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = path.map_err(|_| ApiError::RecipeNotFound)?;
    let uc = GetRecipeImageUseCase {
        repo: state.recipe_repo(),
    };
    let image = uc.execute(id).await?;
    Ok(([(header::CONTENT_TYPE, image.content_type)], image.data))
}
