use axum::{
    Json,
    extract::{Path, RawQuery, State, rejection::JsonRejection, rejection::PathRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use foodgram_auth_types::identity::IdentityHeaders;
use foodgram_domain::pagination::{Page, PageRequest};

use crate::domain::types::{Profile, User};
use crate::error::ApiError;
use crate::handlers::{parse_body, parse_query};
use crate::state::AppState;
use crate::usecase::user::{CreateUserInput, CreateUserUseCase, GetUserUseCase, ListUsersUseCase};

#[derive(Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
}

impl UserResponse {
    pub fn new(user: User, is_subscribed: bool) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            is_subscribed,
        }
    }
}

impl From<Profile> for UserResponse {
    fn from(profile: Profile) -> Self {
        Self::new(profile.user, profile.is_subscribed)
    }
}

#[derive(Deserialize, Default)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

// ── POST /users ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Serialize)]
pub struct CreatedUserResponse {
    pub id: String,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(serialize_with = "foodgram_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

pub async fn create_user(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    body: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedUserResponse>), ApiError> {
    let body = parse_body(body)?;
    let uc = CreateUserUseCase {
        repo: state.user_repo(),
    };
    let user = uc
        .execute(
            identity.user_id,
            CreateUserInput {
                email: body.email,
                username: body.username,
                first_name: body.first_name,
                last_name: body.last_name,
            },
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedUserResponse {
            id: user.id.to_string(),
            email: user.email,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            created_at: user.created_at,
        }),
    ))
}

// ── GET /users ───────────────────────────────────────────────────────────────

pub async fn list_users(
    identity: Option<IdentityHeaders>,
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<Page<UserResponse>>, ApiError> {
    let query: PageQuery = parse_query(raw_query.as_deref())?;
    let uc = ListUsersUseCase {
        repo: state.user_repo(),
        follows: state.follow_repo(),
    };
    let page = uc
        .execute(
            identity.map(|i| i.user_id),
            PageRequest::new(query.limit, query.page),
        )
        .await?;
    Ok(Json(page.map(UserResponse::from)))
}

// ── GET /users/me ────────────────────────────────────────────────────────────

pub async fn get_me(
    identity: IdentityHeaders,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, ApiError> {
    let uc = GetUserUseCase {
        repo: state.user_repo(),
        follows: state.follow_repo(),
    };
    let profile = uc.execute(identity.user_id, Some(identity.user_id)).await?;
    Ok(Json(profile.into()))
}

// ── GET /users/{id} ──────────────────────────────────────────────────────────

pub async fn get_user(
    identity: Option<IdentityHeaders>,
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<UserResponse>, ApiError> {
    let Path(id) = path.map_err(|_| ApiError::UserNotFound)?;
    let uc = GetUserUseCase {
        repo: state.user_repo(),
        follows: state.follow_repo(),
    };
    let profile = uc.execute(id, identity.map(|i| i.user_id)).await?;
    Ok(Json(profile.into()))
}
