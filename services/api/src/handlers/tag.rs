use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection, rejection::PathRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use foodgram_auth_types::identity::IdentityHeaders;

use crate::domain::types::Tag;
use crate::error::ApiError;
use crate::handlers::parse_body;
use crate::state::AppState;
use crate::usecase::tag::{CreateTagInput, CreateTagUseCase, GetTagUseCase, ListTagsUseCase};

#[derive(Serialize)]
pub struct TagResponse {
    pub id: i32,
    pub name: String,
    pub color: Option<String>,
    pub slug: String,
}

impl From<Tag> for TagResponse {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
            color: tag.color,
            slug: tag.slug,
        }
    }
}

// ── GET /tags ────────────────────────────────────────────────────────────────

pub async fn list_tags(State(state): State<AppState>) -> Result<Json<Vec<TagResponse>>, ApiError> {
    let uc = ListTagsUseCase {
        repo: state.tag_repo(),
    };
    let tags = uc.execute().await?;
    Ok(Json(tags.into_iter().map(TagResponse::from).collect()))
}

// ── GET /tags/{id} ───────────────────────────────────────────────────────────

pub async fn get_tag(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<TagResponse>, ApiError> {
    let Path(id) = path.map_err(|_| ApiError::TagNotFound)?;
    let uc = GetTagUseCase {
        repo: state.tag_repo(),
    };
    Ok(Json(uc.execute(id).await?.into()))
}

// ── POST /tags ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateTagRequest {
    pub name: String,
    pub color: Option<String>,
    pub slug: String,
}

pub async fn create_tag(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    body: Result<Json<CreateTagRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TagResponse>), ApiError> {
    if !identity.is_admin() {
        return Err(ApiError::Forbidden);
    }
    let body = parse_body(body)?;
    let uc = CreateTagUseCase {
        repo: state.tag_repo(),
    };
    let tag = uc
        .execute(
            identity.user_role,
            CreateTagInput {
                name: body.name,
                color: body.color,
                slug: body.slug,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(tag.into())))
}
