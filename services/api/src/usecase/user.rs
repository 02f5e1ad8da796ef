use chrono::Utc;
use uuid::Uuid;

use foodgram_domain::pagination::{Page, PageRequest};
use foodgram_domain::validate::{
    MAX_PERSON_NAME_LEN, validate_email, validate_text, validate_username,
};

use crate::domain::repository::{FollowRepository, UserRepository};
use crate::domain::types::{Profile, User};
use crate::error::ApiError;

/// Writes that reference the caller need a registered profile; identity
/// headers alone do not create one.
pub(crate) async fn require_profile<U: UserRepository>(
    users: &U,
    user_id: Uuid,
) -> Result<(), ApiError> {
    if users.find_by_id(user_id).await?.is_none() {
        return Err(ApiError::ProfileRequired);
    }
    Ok(())
}

// ── CreateUser ───────────────────────────────────────────────────────────────

pub struct CreateUserInput {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

pub struct CreateUserUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> CreateUserUseCase<R> {
    /// Registers the profile of an already authenticated identity.
    pub async fn execute(&self, user_id: Uuid, input: CreateUserInput) -> Result<User, ApiError> {
        let email = input.email.trim().to_lowercase();
        if !validate_email(&email) {
            return Err(ApiError::InvalidEmail);
        }
        if !validate_username(&input.username) {
            return Err(ApiError::InvalidUsername);
        }
        let first_name = input.first_name.trim().to_owned();
        let last_name = input.last_name.trim().to_owned();
        if !validate_text(&first_name, MAX_PERSON_NAME_LEN)
            || !validate_text(&last_name, MAX_PERSON_NAME_LEN)
        {
            return Err(ApiError::InvalidName);
        }
        let user = User {
            id: user_id,
            email,
            username: input.username,
            first_name,
            last_name,
            created_at: Utc::now(),
        };
        if !self.repo.create(&user).await? {
            return Err(ApiError::UserAlreadyExists);
        }
        tracing::info!(user_id = %user.id, username = %user.username, "user created");
        Ok(user)
    }
}

// ── GetUser ──────────────────────────────────────────────────────────────────

pub struct GetUserUseCase<R: UserRepository, F: FollowRepository> {
    pub repo: R,
    pub follows: F,
}

impl<R: UserRepository, F: FollowRepository> GetUserUseCase<R, F> {
    pub async fn execute(&self, id: Uuid, viewer: Option<Uuid>) -> Result<Profile, ApiError> {
        let user = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::UserNotFound)?;
        let is_subscribed = match viewer {
            Some(viewer) if viewer != id => self.follows.contains(viewer, id).await?,
            _ => false,
        };
        Ok(Profile {
            user,
            is_subscribed,
        })
    }
}

// ── ListUsers ────────────────────────────────────────────────────────────────

pub struct ListUsersUseCase<R: UserRepository, F: FollowRepository> {
    pub repo: R,
    pub follows: F,
}

impl<R: UserRepository, F: FollowRepository> ListUsersUseCase<R, F> {
    pub async fn execute(
        &self,
        viewer: Option<Uuid>,
        page: PageRequest,
    ) -> Result<Page<Profile>, ApiError> {
        let users = self.repo.list(page.clamped()).await?;
        let followed = match viewer {
            Some(viewer) => {
                let ids: Vec<Uuid> = users.results.iter().map(|u| u.id).collect();
                self.follows.followed_among(viewer, &ids).await?
            }
            None => vec![],
        };
        Ok(users.map(|user| Profile {
            is_subscribed: followed.contains(&user.id),
            user,
        }))
    }
}
