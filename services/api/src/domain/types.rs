use std::collections::BTreeMap;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Recipe tag (reference data).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: i32,
    pub name: String,
    pub color: Option<String>,
    pub slug: String,
}

#[derive(Debug, Clone)]
pub struct NewTag {
    pub name: String,
    pub color: Option<String>,
    pub slug: String,
}

/// Ingredient with its measurement unit (reference data).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ingredient {
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
}

#[derive(Debug, Clone)]
pub struct NewIngredient {
    pub name: String,
    pub measurement_unit: String,
}

/// User profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
}

/// A user as seen by a particular viewer.
#[derive(Debug, Clone)]
pub struct Profile {
    pub user: User,
    pub is_subscribed: bool,
}

/// An ingredient line of a recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeIngredient {
    pub ingredient: Ingredient,
    pub amount: i32,
}

/// Fully hydrated recipe aggregate, with viewer-relative flags.
#[derive(Debug, Clone)]
pub struct Recipe {
    pub id: i32,
    pub author: Profile,
    pub name: String,
    pub text: String,
    pub cooking_time: i32,
    pub has_image: bool,
    pub tags: Vec<Tag>,
    pub ingredients: Vec<RecipeIngredient>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub created_at: DateTime<Utc>,
}

/// Short recipe view used by favorites, cart and subscription previews.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeSummary {
    pub id: i32,
    pub name: String,
    pub cooking_time: i32,
    pub has_image: bool,
}

/// Followed author with a preview of their newest recipes.
#[derive(Debug, Clone)]
pub struct Subscription {
    pub author: User,
    pub recipes: Vec<RecipeSummary>,
    pub recipes_count: u64,
}

/// `{ingredient_id, amount}` pair submitted on recipe writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngredientAmount {
    pub ingredient_id: i32,
    pub amount: i32,
}

/// Matches the `recipe_images.content_type` column width.
const MAX_CONTENT_TYPE_LEN: usize = 100;

/// Decoded recipe picture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeImage {
    pub content_type: String,
    pub data: Vec<u8>,
}

impl RecipeImage {
    /// Decode `data:image/<subtype>;base64,<payload>`.
    pub fn from_data_uri(uri: &str) -> Option<Self> {
        let rest = uri.trim().strip_prefix("data:")?;
        let (meta, payload) = rest.split_once(',')?;
        let content_type = meta.strip_suffix(";base64")?;
        let subtype = content_type.strip_prefix("image/")?;
        if subtype.is_empty() || content_type.len() > MAX_CONTENT_TYPE_LEN {
            return None;
        }
        let data = STANDARD.decode(payload.trim()).ok()?;
        if data.is_empty() {
            return None;
        }
        Some(Self {
            content_type: content_type.to_owned(),
            data,
        })
    }
}

/// Validated recipe ready to be inserted. Tags are deduplicated.
#[derive(Debug, Clone)]
pub struct RecipeDraft {
    pub name: String,
    pub text: String,
    pub cooking_time: i32,
    pub tags: Vec<i32>,
    pub ingredients: Vec<IngredientAmount>,
    pub image: RecipeImage,
}

/// Validated partial update. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct RecipeChanges {
    pub name: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i32>,
    pub tags: Option<Vec<i32>>,
    pub ingredients: Option<Vec<IngredientAmount>>,
    pub image: Option<RecipeImage>,
}

/// Recipe list filters. Relation flags only apply to an authenticated viewer.
#[derive(Debug, Clone, Default)]
pub struct RecipeFilter {
    pub tags: Vec<String>,
    pub author: Option<Uuid>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

/// Which per-user recipe relation an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeList {
    Favorites,
    ShoppingCart,
}

/// One aggregated `(name, unit)` row of a shopping list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingListItem {
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}

/// Consolidated shopping list: one line per `(name, unit)`, amounts summed.
#[derive(Debug, Clone, Default)]
pub struct ShoppingList {
    items: Vec<ShoppingListItem>,
}

impl ShoppingList {
    pub const HEADER: &'static str = "Shopping list";

    /// Fold rows by `(name, unit)`, ordered by name then unit in codepoint order.
    pub fn from_rows(rows: impl IntoIterator<Item = ShoppingListItem>) -> Self {
        let mut totals: BTreeMap<(String, String), i64> = BTreeMap::new();
        for row in rows {
            *totals.entry((row.name, row.measurement_unit)).or_default() += row.amount;
        }
        let items = totals
            .into_iter()
            .map(|((name, measurement_unit), amount)| ShoppingListItem {
                name,
                measurement_unit,
                amount,
            })
            .collect();
        Self { items }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[ShoppingListItem] {
        &self.items
    }

    pub fn render(&self) -> String {
        let mut out = String::from(Self::HEADER);
        out.push('\n');
        for item in &self.items {
            out.push_str(&format!(
                "{} - {}/{}\n",
                item.name, item.amount, item.measurement_unit
            ));
        }
        out
    }
}
