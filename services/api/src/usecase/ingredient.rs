use foodgram_domain::user::UserRole;
use foodgram_domain::validate::{MAX_TITLE_LEN, validate_text};

use crate::domain::repository::IngredientRepository;
use crate::domain::types::{Ingredient, NewIngredient};
use crate::error::ApiError;

// ── SearchIngredients ────────────────────────────────────────────────────────

pub struct SearchIngredientsUseCase<R: IngredientRepository> {
    pub repo: R,
}

impl<R: IngredientRepository> SearchIngredientsUseCase<R> {
    /// A blank prefix lists the whole catalog.
    pub async fn execute(&self, name_prefix: Option<&str>) -> Result<Vec<Ingredient>, ApiError> {
        let prefix = name_prefix.map(str::trim).filter(|p| !p.is_empty());
        self.repo.search(prefix).await
    }
}

// ── GetIngredient ────────────────────────────────────────────────────────────

pub struct GetIngredientUseCase<R: IngredientRepository> {
    pub repo: R,
}

impl<R: IngredientRepository> GetIngredientUseCase<R> {
    pub async fn execute(&self, id: i32) -> Result<Ingredient, ApiError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::IngredientNotFound)
    }
}

// ── CreateIngredient ─────────────────────────────────────────────────────────

pub struct CreateIngredientInput {
    pub name: String,
    pub measurement_unit: String,
}

pub struct CreateIngredientUseCase<R: IngredientRepository> {
    pub repo: R,
}

impl<R: IngredientRepository> CreateIngredientUseCase<R> {
    pub async fn execute(
        &self,
        role: UserRole,
        input: CreateIngredientInput,
    ) -> Result<Ingredient, ApiError> {
        if !role.can_manage_catalog() {
            return Err(ApiError::Forbidden);
        }
        let name = input.name.trim().to_owned();
        let measurement_unit = input.measurement_unit.trim().to_owned();
        if !validate_text(&name, MAX_TITLE_LEN) || !validate_text(&measurement_unit, MAX_TITLE_LEN)
        {
            return Err(ApiError::InvalidName);
        }
        let ingredient = self
            .repo
            .create(&NewIngredient {
                name,
                measurement_unit,
            })
            .await?
            .ok_or(ApiError::IngredientAlreadyExists)?;
        tracing::info!(ingredient_id = ingredient.id, "ingredient created");
        Ok(ingredient)
    }
}
