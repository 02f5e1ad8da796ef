//! sea-orm entities for the Foodgram API database.

pub mod favorites;
pub mod follows;
pub mod ingredients;
pub mod recipe_images;
pub mod recipe_ingredients;
pub mod recipe_tags;
pub mod recipes;
pub mod shopping_cart_entries;
pub mod tags;
pub mod users;
