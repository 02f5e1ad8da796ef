pub mod follow;
pub mod ingredient;
pub mod recipe;
pub mod recipe_list;
pub mod shopping_list;
pub mod tag;
pub mod user;
