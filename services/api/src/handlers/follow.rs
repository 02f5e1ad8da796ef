use axum::{
    Json,
    extract::{Path, RawQuery, State, rejection::PathRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use foodgram_auth_types::identity::IdentityHeaders;
use foodgram_domain::pagination::{Page, PageRequest};

use crate::domain::types::Subscription;
use crate::error::ApiError;
use crate::handlers::parse_query;
use crate::handlers::recipe::RecipeShortResponse;
use crate::handlers::user::UserResponse;
use crate::state::AppState;
use crate::usecase::follow::{FollowUseCase, ListSubscriptionsUseCase, UnfollowUseCase};

#[derive(Serialize)]
pub struct SubscriptionResponse {
    #[serde(flatten)]
    pub author: UserResponse,
    pub recipes: Vec<RecipeShortResponse>,
    pub recipes_count: u64,
}

impl From<Subscription> for SubscriptionResponse {
    fn from(subscription: Subscription) -> Self {
        Self {
            author: UserResponse::new(subscription.author, true),
            recipes: subscription
                .recipes
                .into_iter()
                .map(RecipeShortResponse::from)
                .collect(),
            recipes_count: subscription.recipes_count,
        }
    }
}

#[derive(Deserialize, Default)]
pub struct SubscriptionQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub recipes_limit: Option<u32>,
}

// ── POST /users/{id}/subscribe ───────────────────────────────────────────────

pub async fn subscribe(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    RawQuery(raw_query): RawQuery,
) -> Result<(StatusCode, Json<SubscriptionResponse>), ApiError> {
    let Path(author_id) = path.map_err(|_| ApiError::UserNotFound)?;
    let query: SubscriptionQuery = parse_query(raw_query.as_deref())?;
    let uc = FollowUseCase {
        follows: state.follow_repo(),
        users: state.user_repo(),
        recipes: state.recipe_repo(),
    };
    let subscription = uc
        .execute(identity.user_id, author_id, query.recipes_limit)
        .await?;
    Ok((StatusCode::CREATED, Json(subscription.into())))
}

// ── DELETE /users/{id}/subscribe ─────────────────────────────────────────────

pub async fn unsubscribe(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(author_id) = path.map_err(|_| ApiError::UserNotFound)?;
    let uc = UnfollowUseCase {
        follows: state.follow_repo(),
        users: state.user_repo(),
    };
    uc.execute(identity.user_id, author_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── GET /users/subscriptions ─────────────────────────────────────────────────

pub async fn list_subscriptions(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<Page<SubscriptionResponse>>, ApiError> {
    let query: SubscriptionQuery = parse_query(raw_query.as_deref())?;
    let uc = ListSubscriptionsUseCase {
        follows: state.follow_repo(),
        recipes: state.recipe_repo(),
    };
    let page = uc
        .execute(
            identity.user_id,
            PageRequest::new(query.limit, query.page),
            query.recipes_limit,
        )
        .await?;
    Ok(Json(page.map(SubscriptionResponse::from)))
}
