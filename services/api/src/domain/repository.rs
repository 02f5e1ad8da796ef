#![allow(async_fn_in_trait)]

use uuid::Uuid;

use foodgram_domain::pagination::{Page, PageRequest};

use crate::domain::types::{
    Ingredient, NewIngredient, NewTag, Recipe, RecipeChanges, RecipeDraft, RecipeFilter,
    RecipeImage, RecipeList, RecipeSummary, ShoppingListItem, Tag, User,
};
use crate::error::ApiError;

/// Repository for the tag catalog.
pub trait TagRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Tag>, ApiError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<Tag>, ApiError>;
    /// Subset of `ids` that exist.
    async fn existing_ids(&self, ids: &[i32]) -> Result<Vec<i32>, ApiError>;
    /// Returns `None` when the slug is already taken.
    async fn create(&self, tag: &NewTag) -> Result<Option<Tag>, ApiError>;
}

/// Repository for the ingredient catalog.
pub trait IngredientRepository: Send + Sync {
    /// Ingredients ordered by name, optionally restricted to a name prefix.
    async fn search(&self, name_prefix: Option<&str>) -> Result<Vec<Ingredient>, ApiError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<Ingredient>, ApiError>;
    /// Subset of `ids` that exist.
    async fn existing_ids(&self, ids: &[i32]) -> Result<Vec<i32>, ApiError>;
    /// Returns `None` when `(name, measurement_unit)` already exists.
    async fn create(&self, ingredient: &NewIngredient) -> Result<Option<Ingredient>, ApiError>;
}

/// Repository for user profiles.
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError>;
    async fn list(&self, page: PageRequest) -> Result<Page<User>, ApiError>;
    /// Returns `false` when the id, email or username is already taken.
    async fn create(&self, user: &User) -> Result<bool, ApiError>;
}

/// Repository for the follow relation (`user` follows `author`).
pub trait FollowRepository: Send + Sync {
    async fn contains(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, ApiError>;
    /// Returns `false` when the pair already exists.
    async fn insert(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, ApiError>;
    /// Returns `true` if a row was deleted.
    async fn delete(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, ApiError>;
    /// Authors followed by `user_id`, ordered by username.
    async fn list_authors(&self, user_id: Uuid, page: PageRequest) -> Result<Page<User>, ApiError>;
    /// Subset of `author_ids` that `user_id` follows.
    async fn followed_among(
        &self,
        user_id: Uuid,
        author_ids: &[Uuid],
    ) -> Result<Vec<Uuid>, ApiError>;
}

/// Repository for the recipe aggregate.
pub trait RecipeRepository: Send + Sync {
    async fn find_author(&self, id: i32) -> Result<Option<Uuid>, ApiError>;
    async fn get(&self, id: i32, viewer: Option<Uuid>) -> Result<Option<Recipe>, ApiError>;
    /// Newest first. Relation filters are already cleared for anonymous viewers.
    async fn list(
        &self,
        filter: &RecipeFilter,
        viewer: Option<Uuid>,
        page: PageRequest,
    ) -> Result<Page<Recipe>, ApiError>;
    async fn summary(&self, id: i32) -> Result<Option<RecipeSummary>, ApiError>;
    /// Newest recipes of each author, at most `limit` per author, with per-author totals.
    async fn summaries_by_authors(
        &self,
        author_ids: &[Uuid],
        limit: Option<u32>,
    ) -> Result<Vec<(Uuid, Vec<RecipeSummary>, u64)>, ApiError>;
    /// Insert recipe, tags, ingredients and image atomically; returns the new id.
    async fn create(&self, author_id: Uuid, draft: &RecipeDraft) -> Result<i32, ApiError>;
    /// Apply changes atomically; provided tag and ingredient sets replace the stored ones.
    async fn update(&self, id: i32, changes: &RecipeChanges) -> Result<(), ApiError>;
    /// Returns `true` if a row was deleted.
    async fn delete(&self, id: i32) -> Result<bool, ApiError>;
    async fn image(&self, id: i32) -> Result<Option<RecipeImage>, ApiError>;
}

/// Repository for the per-user recipe relations (favorites, shopping cart).
pub trait RecipeListRepository: Send + Sync {
    async fn contains(&self, list: RecipeList, user_id: Uuid, recipe_id: i32)
    -> Result<bool, ApiError>;
    /// Returns `false` when the pair already exists.
    async fn add(&self, list: RecipeList, user_id: Uuid, recipe_id: i32) -> Result<bool, ApiError>;
    /// Returns `true` if a row was deleted.
    async fn remove(&self, list: RecipeList, user_id: Uuid, recipe_id: i32)
    -> Result<bool, ApiError>;
}

/// Query port for the shopping list aggregation.
pub trait ShoppingListRepository: Send + Sync {
    /// Ingredient totals over every recipe in the user's cart, grouped by `(name, unit)`.
    async fn cart_totals(&self, user_id: Uuid) -> Result<Vec<ShoppingListItem>, ApiError>;
}
