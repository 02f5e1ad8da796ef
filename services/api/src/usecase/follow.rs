use uuid::Uuid;

use foodgram_domain::pagination::{Page, PageRequest};

use crate::domain::repository::{FollowRepository, RecipeRepository, UserRepository};
use crate::domain::types::Subscription;
use crate::error::ApiError;
use crate::usecase::user::require_profile;

// ── Follow ───────────────────────────────────────────────────────────────────

pub struct FollowUseCase<F: FollowRepository, U: UserRepository, R: RecipeRepository> {
    pub follows: F,
    pub users: U,
    pub recipes: R,
}

impl<F: FollowRepository, U: UserRepository, R: RecipeRepository> FollowUseCase<F, U, R> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        author_id: Uuid,
        recipes_limit: Option<u32>,
    ) -> Result<Subscription, ApiError> {
        if user_id == author_id {
            return Err(ApiError::SelfFollow);
        }
        require_profile(&self.users, user_id).await?;
        let author = self
            .users
            .find_by_id(author_id)
            .await?
            .ok_or(ApiError::UserNotFound)?;
        if self.follows.contains(user_id, author_id).await? {
            return Err(ApiError::FollowAlreadyExists);
        }
        // A concurrent identical request loses on the primary key.
        if !self.follows.insert(user_id, author_id).await? {
            return Err(ApiError::FollowAlreadyExists);
        }
        tracing::info!(user_id = %user_id, author_id = %author_id, "subscribed");

        let (recipes, recipes_count) = self
            .recipes
            .summaries_by_authors(&[author_id], recipes_limit)
            .await?
            .into_iter()
            .next()
            .map(|(_, recipes, count)| (recipes, count))
            .unwrap_or_default();
        Ok(Subscription {
            author,
            recipes,
            recipes_count,
        })
    }
}

// ── Unfollow ─────────────────────────────────────────────────────────────────

pub struct UnfollowUseCase<F: FollowRepository, U: UserRepository> {
    pub follows: F,
    pub users: U,
}

impl<F: FollowRepository, U: UserRepository> UnfollowUseCase<F, U> {
    pub async fn execute(&self, user_id: Uuid, author_id: Uuid) -> Result<(), ApiError> {
        if user_id == author_id {
            return Err(ApiError::SelfFollow);
        }
        if self.users.find_by_id(author_id).await?.is_none() {
            return Err(ApiError::UserNotFound);
        }
        if !self.follows.delete(user_id, author_id).await? {
            return Err(ApiError::FollowNotFound);
        }
        tracing::info!(user_id = %user_id, author_id = %author_id, "unsubscribed");
        Ok(())
    }
}

// ── ListSubscriptions ────────────────────────────────────────────────────────

pub struct ListSubscriptionsUseCase<F: FollowRepository, R: RecipeRepository> {
    pub follows: F,
    pub recipes: R,
}

impl<F: FollowRepository, R: RecipeRepository> ListSubscriptionsUseCase<F, R> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        page: PageRequest,
        recipes_limit: Option<u32>,
    ) -> Result<Page<Subscription>, ApiError> {
        let authors = self.follows.list_authors(user_id, page.clamped()).await?;
        let ids: Vec<Uuid> = authors.results.iter().map(|a| a.id).collect();
        let mut previews = self
            .recipes
            .summaries_by_authors(&ids, recipes_limit)
            .await?;
        Ok(authors.map(|author| {
            let (recipes, recipes_count) = previews
                .iter_mut()
                .find(|(id, _, _)| *id == author.id)
                .map(|(_, recipes, count)| (std::mem::take(recipes), *count))
                .unwrap_or_default();
            Subscription {
                author,
                recipes,
                recipes_count,
            }
        }))
    }
}
