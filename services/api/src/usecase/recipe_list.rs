use uuid::Uuid;

use crate::domain::repository::{RecipeListRepository, RecipeRepository, UserRepository};
use crate::domain::types::{RecipeList, RecipeSummary};
use crate::error::ApiError;
use crate::usecase::user::require_profile;

fn already_exists(list: RecipeList) -> ApiError {
    match list {
        RecipeList::Favorites => ApiError::FavoriteAlreadyExists,
        RecipeList::ShoppingCart => ApiError::ShoppingCartEntryAlreadyExists,
    }
}

fn not_found(list: RecipeList) -> ApiError {
    match list {
        RecipeList::Favorites => ApiError::FavoriteNotFound,
        RecipeList::ShoppingCart => ApiError::ShoppingCartEntryNotFound,
    }
}

// ── AddToRecipeList ──────────────────────────────────────────────────────────

pub struct AddToRecipeListUseCase<L: RecipeListRepository, R: RecipeRepository, U: UserRepository>
{
    pub list: RecipeList,
    pub repo: L,
    pub recipes: R,
    pub users: U,
}

impl<L: RecipeListRepository, R: RecipeRepository, U: UserRepository>
    AddToRecipeListUseCase<L, R, U>
{
    pub async fn execute(&self, user_id: Uuid, recipe_id: i32) -> Result<RecipeSummary, ApiError> {
        require_profile(&self.users, user_id).await?;
        let summary = self
            .recipes
            .summary(recipe_id)
            .await?
            .ok_or(ApiError::RecipeNotFound)?;
        if self.repo.contains(self.list, user_id, recipe_id).await? {
            return Err(already_exists(self.list));
        }
        // The store's primary key settles races between identical requests.
        if !self.repo.add(self.list, user_id, recipe_id).await? {
            return Err(already_exists(self.list));
        }
        tracing::info!(user_id = %user_id, recipe_id, list = ?self.list, "recipe added");
        Ok(summary)
    }
}

// ── RemoveFromRecipeList ─────────────────────────────────────────────────────

pub struct RemoveFromRecipeListUseCase<L: RecipeListRepository, R: RecipeRepository> {
    pub list: RecipeList,
    pub repo: L,
    pub recipes: R,
}

impl<L: RecipeListRepository, R: RecipeRepository> RemoveFromRecipeListUseCase<L, R> {
    pub async fn execute(&self, user_id: Uuid, recipe_id: i32) -> Result<(), ApiError> {
        if self.recipes.find_author(recipe_id).await?.is_none() {
            return Err(ApiError::RecipeNotFound);
        }
        if !self.repo.remove(self.list, user_id, recipe_id).await? {
            return Err(not_found(self.list));
        }
        tracing::info!(user_id = %user_id, recipe_id, list = ?self.list, "recipe removed");
        Ok(())
    }
}
