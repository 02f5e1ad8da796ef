use std::collections::HashSet;

use uuid::Uuid;

use foodgram_domain::pagination::{Page, PageRequest};
use foodgram_domain::validate::{MAX_TITLE_LEN, validate_text};

use crate::domain::repository::{
    IngredientRepository, RecipeRepository, TagRepository, UserRepository,
};
use crate::domain::types::{
    IngredientAmount, Recipe, RecipeChanges, RecipeDraft, RecipeFilter, RecipeImage,
};
use crate::error::ApiError;
use crate::usecase::user::require_profile;

// ── Validation ───────────────────────────────────────────────────────────────

/// Checks run in a fixed order so clients get the same error for the same payload:
/// empty list, amounts, existence, duplicates.
async fn validate_ingredients<I: IngredientRepository>(
    catalog: &I,
    items: &[IngredientAmount],
) -> Result<(), ApiError> {
    if items.is_empty() {
        return Err(ApiError::NoIngredients);
    }
    if items.iter().any(|i| i.amount < 1) {
        return Err(ApiError::AmountBelowMinimum);
    }
    let unique: HashSet<i32> = items.iter().map(|i| i.ingredient_id).collect();
    let ids: Vec<i32> = unique.iter().copied().collect();
    let existing = catalog.existing_ids(&ids).await?;
    if existing.len() != ids.len() {
        return Err(ApiError::IngredientNotFound);
    }
    if unique.len() != items.len() {
        return Err(ApiError::DuplicateIngredient);
    }
    Ok(())
}

/// Returns the tag ids deduplicated, in submission order.
async fn validate_tags<T: TagRepository>(catalog: &T, tags: &[i32]) -> Result<Vec<i32>, ApiError> {
    if tags.is_empty() {
        return Err(ApiError::NoTags);
    }
    let mut seen = HashSet::new();
    let unique: Vec<i32> = tags.iter().copied().filter(|t| seen.insert(*t)).collect();
    let existing = catalog.existing_ids(&unique).await?;
    if existing.len() != unique.len() {
        return Err(ApiError::TagNotFound);
    }
    Ok(unique)
}

fn validate_name(name: &str) -> Result<String, ApiError> {
    let name = name.trim();
    if !validate_text(name, MAX_TITLE_LEN) {
        return Err(ApiError::InvalidName);
    }
    Ok(name.to_owned())
}

fn validate_body(text: &str) -> Result<String, ApiError> {
    if text.trim().is_empty() {
        return Err(ApiError::InvalidText);
    }
    Ok(text.to_owned())
}

fn validate_cooking_time(minutes: i32) -> Result<i32, ApiError> {
    if minutes < 1 {
        return Err(ApiError::CookingTimeBelowMinimum);
    }
    Ok(minutes)
}

fn decode_image(uri: &str) -> Result<RecipeImage, ApiError> {
    RecipeImage::from_data_uri(uri).ok_or(ApiError::InvalidImage)
}

// ── CreateRecipe ─────────────────────────────────────────────────────────────

pub struct RecipeInput {
    pub name: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i32>,
    pub tags: Option<Vec<i32>>,
    pub ingredients: Option<Vec<IngredientAmount>>,
    /// Data URI.
    pub image: Option<String>,
}

pub struct CreateRecipeUseCase<
    R: RecipeRepository,
    I: IngredientRepository,
    T: TagRepository,
    U: UserRepository,
> {
    pub repo: R,
    pub ingredients: I,
    pub tags: T,
    pub users: U,
}

impl<R: RecipeRepository, I: IngredientRepository, T: TagRepository, U: UserRepository>
    CreateRecipeUseCase<R, I, T, U>
{
    /// The author is always the caller.
    pub async fn execute(&self, author_id: Uuid, input: RecipeInput) -> Result<Recipe, ApiError> {
        let ingredients = input.ingredients.unwrap_or_default();
        validate_ingredients(&self.ingredients, &ingredients).await?;
        let tags = validate_tags(&self.tags, &input.tags.unwrap_or_default()).await?;
        let draft = RecipeDraft {
            name: validate_name(input.name.as_deref().ok_or(ApiError::MissingData)?)?,
            text: validate_body(input.text.as_deref().ok_or(ApiError::MissingData)?)?,
            cooking_time: validate_cooking_time(
                input.cooking_time.ok_or(ApiError::MissingData)?,
            )?,
            tags,
            ingredients,
            image: decode_image(input.image.as_deref().ok_or(ApiError::ImageRequired)?)?,
        };
        require_profile(&self.users, author_id).await?;

        let id = self.repo.create(author_id, &draft).await?;
        tracing::info!(recipe_id = id, author_id = %author_id, "recipe created");
        self.repo
            .get(id, Some(author_id))
            .await?
            .ok_or(ApiError::RecipeNotFound)
    }
}

// ── UpdateRecipe ─────────────────────────────────────────────────────────────

pub struct UpdateRecipeUseCase<R: RecipeRepository, I: IngredientRepository, T: TagRepository> {
    pub repo: R,
    pub ingredients: I,
    pub tags: T,
}

impl<R: RecipeRepository, I: IngredientRepository, T: TagRepository> UpdateRecipeUseCase<R, I, T> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        id: i32,
        input: RecipeInput,
    ) -> Result<Recipe, ApiError> {
        let author_id = self
            .repo
            .find_author(id)
            .await?
            .ok_or(ApiError::RecipeNotFound)?;
        if author_id != user_id {
            return Err(ApiError::Forbidden);
        }

        if let Some(ref ingredients) = input.ingredients {
            validate_ingredients(&self.ingredients, ingredients).await?;
        }
        let tags = match input.tags {
            Some(ref tags) => Some(validate_tags(&self.tags, tags).await?),
            None => None,
        };
        let changes = RecipeChanges {
            name: input.name.as_deref().map(validate_name).transpose()?,
            text: input.text.as_deref().map(validate_body).transpose()?,
            cooking_time: input.cooking_time.map(validate_cooking_time).transpose()?,
            tags,
            ingredients: input.ingredients,
            image: input.image.as_deref().map(decode_image).transpose()?,
        };

        self.repo.update(id, &changes).await?;
        tracing::info!(recipe_id = id, author_id = %user_id, "recipe updated");
        self.repo
            .get(id, Some(user_id))
            .await?
            .ok_or(ApiError::RecipeNotFound)
    }
}

// ── DeleteRecipe ─────────────────────────────────────────────────────────────

pub struct DeleteRecipeUseCase<R: RecipeRepository> {
    pub repo: R,
}

impl<R: RecipeRepository> DeleteRecipeUseCase<R> {
    pub async fn execute(&self, user_id: Uuid, id: i32) -> Result<(), ApiError> {
        let author_id = self
            .repo
            .find_author(id)
            .await?
            .ok_or(ApiError::RecipeNotFound)?;
        if author_id != user_id {
            return Err(ApiError::Forbidden);
        }
        if !self.repo.delete(id).await? {
            return Err(ApiError::RecipeNotFound);
        }
        tracing::info!(recipe_id = id, author_id = %user_id, "recipe deleted");
        Ok(())
    }
}

// ── GetRecipe ────────────────────────────────────────────────────────────────

pub struct GetRecipeUseCase<R: RecipeRepository> {
    pub repo: R,
}

impl<R: RecipeRepository> GetRecipeUseCase<R> {
    pub async fn execute(&self, id: i32, viewer: Option<Uuid>) -> Result<Recipe, ApiError> {
        self.repo
            .get(id, viewer)
            .await?
            .ok_or(ApiError::RecipeNotFound)
    }
}

// ── ListRecipes ──────────────────────────────────────────────────────────────

pub struct ListRecipesUseCase<R: RecipeRepository> {
    pub repo: R,
}

impl<R: RecipeRepository> ListRecipesUseCase<R> {
    pub async fn execute(
        &self,
        mut filter: RecipeFilter,
        viewer: Option<Uuid>,
        page: PageRequest,
    ) -> Result<Page<Recipe>, ApiError> {
        if viewer.is_none() {
            filter.is_favorited = false;
            filter.is_in_shopping_cart = false;
        }
        filter.tags.retain(|slug| !slug.is_empty());
        self.repo.list(&filter, viewer, page.clamped()).await
    }
}

// ── GetRecipeImage ───────────────────────────────────────────────────────────

pub struct GetRecipeImageUseCase<R: RecipeRepository> {
    pub repo: R,
}

impl<R: RecipeRepository> GetRecipeImageUseCase<R> {
    pub async fn execute(&self, id: i32) -> Result<RecipeImage, ApiError> {
        self.repo.image(id).await?.ok_or(ApiError::ImageNotFound)
    }
}
