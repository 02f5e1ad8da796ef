use uuid::Uuid;

use crate::domain::repository::ShoppingListRepository;
use crate::domain::types::ShoppingList;
use crate::error::ApiError;

// ── DownloadShoppingList ─────────────────────────────────────────────────────

pub struct DownloadShoppingListUseCase<R: ShoppingListRepository> {
    pub repo: R,
}

impl<R: ShoppingListRepository> DownloadShoppingListUseCase<R> {
    /// An empty cart is an error, never an empty document.
    pub async fn execute(&self, user_id: Uuid) -> Result<ShoppingList, ApiError> {
        let rows = self.repo.cart_totals(user_id).await?;
        let list = ShoppingList::from_rows(rows);
        if list.is_empty() {
            return Err(ApiError::EmptyShoppingCart);
        }
        Ok(list)
    }
}
