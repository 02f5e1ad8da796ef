use sea_orm::DatabaseConnection;

use crate::infra::db::{
    DbFollowRepository, DbIngredientRepository, DbRecipeListRepository, DbRecipeRepository,
    DbShoppingListRepository, DbTagRepository, DbUserRepository,
};

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
}

impl AppState {
    pub fn tag_repo(&self) -> DbTagRepository {
        DbTagRepository {
            db: self.db.clone(),
        }
    }

    pub fn ingredient_repo(&self) -> DbIngredientRepository {
        DbIngredientRepository {
            db: self.db.clone(),
        }
    }

    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn follow_repo(&self) -> DbFollowRepository {
        DbFollowRepository {
            db: self.db.clone(),
        }
    }

    pub fn recipe_repo(&self) -> DbRecipeRepository {
        DbRecipeRepository {
            db: self.db.clone(),
        }
    }

    pub fn recipe_list_repo(&self) -> DbRecipeListRepository {
        DbRecipeListRepository {
            db: self.db.clone(),
        }
    }

    pub fn shopping_list_repo(&self) -> DbShoppingListRepository {
        DbShoppingListRepository {
            db: self.db.clone(),
        }
    }
}
