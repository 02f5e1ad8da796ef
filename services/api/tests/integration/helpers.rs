use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use foodgram_api::domain::repository::{
    FollowRepository, IngredientRepository, RecipeListRepository, RecipeRepository,
    ShoppingListRepository, TagRepository, UserRepository,
};
use foodgram_api::domain::types::{
    Ingredient, IngredientAmount, NewIngredient, NewTag, Profile, Recipe, RecipeChanges,
    RecipeDraft, RecipeFilter, RecipeImage, RecipeIngredient, RecipeList, RecipeSummary,
    ShoppingListItem, Tag, User,
};
use foodgram_api::error::ApiError;
use foodgram_api::usecase::recipe::RecipeInput;
use foodgram_domain::pagination::{Page, PageRequest};

// ── In-memory store ──────────────────────────────────────────────────────────

pub struct StoredRecipe {
    pub id: i32,
    pub author_id: Uuid,
    pub name: String,
    pub text: String,
    pub cooking_time: i32,
    pub tags: Vec<i32>,
    pub ingredients: Vec<IngredientAmount>,
    pub image: Option<RecipeImage>,
    pub created_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct Store {
    pub tags: Vec<Tag>,
    pub ingredients: Vec<Ingredient>,
    pub users: Vec<User>,
    pub recipes: Vec<StoredRecipe>,
    pub favorites: HashSet<(Uuid, i32)>,
    pub cart: HashSet<(Uuid, i32)>,
    pub follows: HashSet<(Uuid, Uuid)>,
    next_id: i32,
}

impl Store {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn hydrate(&self, r: &StoredRecipe, viewer: Option<Uuid>) -> Recipe {
        let author = self
            .users
            .iter()
            .find(|u| u.id == r.author_id)
            .cloned()
            .expect("recipe author exists");
        let mut tags: Vec<Tag> = self
            .tags
            .iter()
            .filter(|t| r.tags.contains(&t.id))
            .cloned()
            .collect();
        tags.sort_by_key(|t| t.id);
        let mut ingredients: Vec<RecipeIngredient> = r
            .ingredients
            .iter()
            .map(|line| RecipeIngredient {
                ingredient: self
                    .ingredients
                    .iter()
                    .find(|i| i.id == line.ingredient_id)
                    .cloned()
                    .expect("ingredient exists"),
                amount: line.amount,
            })
            .collect();
        ingredients.sort_by(|a, b| a.ingredient.name.cmp(&b.ingredient.name));
        Recipe {
            id: r.id,
            author: Profile {
                is_subscribed: viewer.is_some_and(|v| self.follows.contains(&(v, r.author_id))),
                user: author,
            },
            name: r.name.clone(),
            text: r.text.clone(),
            cooking_time: r.cooking_time,
            has_image: r.image.is_some(),
            tags,
            ingredients,
            is_favorited: viewer.is_some_and(|v| self.favorites.contains(&(v, r.id))),
            is_in_shopping_cart: viewer.is_some_and(|v| self.cart.contains(&(v, r.id))),
            created_at: r.created_at,
        }
    }

    fn summary(r: &StoredRecipe) -> RecipeSummary {
        RecipeSummary {
            id: r.id,
            name: r.name.clone(),
            cooking_time: r.cooking_time,
            has_image: r.image.is_some(),
        }
    }
}

/// One handle implementing every repository port over a shared store.
#[derive(Clone, Default)]
pub struct InMemoryRepo {
    pub store: Arc<Mutex<Store>>,
}

fn paginate<T: Clone>(items: &[T], page: PageRequest) -> Page<T> {
    Page::new(
        items.len() as u64,
        items
            .iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .cloned()
            .collect(),
    )
}

impl TagRepository for InMemoryRepo {
    async fn list(&self) -> Result<Vec<Tag>, ApiError> {
        Ok(self.store.lock().unwrap().tags.clone())
    }
    async fn find_by_id(&self, id: i32) -> Result<Option<Tag>, ApiError> {
        Ok(self.store.lock().unwrap().tags.iter().find(|t| t.id == id).cloned())
    }
    async fn existing_ids(&self, ids: &[i32]) -> Result<Vec<i32>, ApiError> {
        let store = self.store.lock().unwrap();
        Ok(ids
            .iter()
            .copied()
            .filter(|id| store.tags.iter().any(|t| t.id == *id))
            .collect())
    }
    async fn create(&self, tag: &NewTag) -> Result<Option<Tag>, ApiError> {
        let mut store = self.store.lock().unwrap();
        if store.tags.iter().any(|t| t.slug == tag.slug) {
            return Ok(None);
        }
        let created = Tag {
            id: store.next_id(),
            name: tag.name.clone(),
            color: tag.color.clone(),
            slug: tag.slug.clone(),
        };
        store.tags.push(created.clone());
        Ok(Some(created))
    }
}

impl IngredientRepository for InMemoryRepo {
    async fn search(&self, name_prefix: Option<&str>) -> Result<Vec<Ingredient>, ApiError> {
        let store = self.store.lock().unwrap();
        Ok(store
            .ingredients
            .iter()
            .filter(|i| name_prefix.is_none_or(|p| i.name.starts_with(p)))
            .cloned()
            .collect())
    }
    async fn find_by_id(&self, id: i32) -> Result<Option<Ingredient>, ApiError> {
        let store = self.store.lock().unwrap();
        Ok(store.ingredients.iter().find(|i| i.id == id).cloned())
    }
    async fn existing_ids(&self, ids: &[i32]) -> Result<Vec<i32>, ApiError> {
        let store = self.store.lock().unwrap();
        Ok(ids
            .iter()
            .copied()
            .filter(|id| store.ingredients.iter().any(|i| i.id == *id))
            .collect())
    }
    async fn create(&self, ingredient: &NewIngredient) -> Result<Option<Ingredient>, ApiError> {
        let mut store = self.store.lock().unwrap();
        let created = Ingredient {
            id: store.next_id(),
            name: ingredient.name.clone(),
            measurement_unit: ingredient.measurement_unit.clone(),
        };
        store.ingredients.push(created.clone());
        Ok(Some(created))
    }
}

impl UserRepository for InMemoryRepo {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        Ok(self.store.lock().unwrap().users.iter().find(|u| u.id == id).cloned())
    }
    async fn list(&self, page: PageRequest) -> Result<Page<User>, ApiError> {
        Ok(paginate(&self.store.lock().unwrap().users, page))
    }
    async fn create(&self, user: &User) -> Result<bool, ApiError> {
        let mut store = self.store.lock().unwrap();
        if store.users.iter().any(|u| u.id == user.id) {
            return Ok(false);
        }
        store.users.push(user.clone());
        Ok(true)
    }
}

impl FollowRepository for InMemoryRepo {
    async fn contains(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, ApiError> {
        Ok(self.store.lock().unwrap().follows.contains(&(user_id, author_id)))
    }
    async fn insert(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, ApiError> {
        Ok(self.store.lock().unwrap().follows.insert((user_id, author_id)))
    }
    async fn delete(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, ApiError> {
        Ok(self.store.lock().unwrap().follows.remove(&(user_id, author_id)))
    }
    async fn list_authors(&self, user_id: Uuid, page: PageRequest) -> Result<Page<User>, ApiError> {
        let store = self.store.lock().unwrap();
        let mut authors: Vec<User> = store
            .users
            .iter()
            .filter(|u| store.follows.contains(&(user_id, u.id)))
            .cloned()
            .collect();
        authors.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(paginate(&authors, page))
    }
    async fn followed_among(
        &self,
        user_id: Uuid,
        author_ids: &[Uuid],
    ) -> Result<Vec<Uuid>, ApiError> {
        let store = self.store.lock().unwrap();
        Ok(author_ids
            .iter()
            .copied()
            .filter(|a| store.follows.contains(&(user_id, *a)))
            .collect())
    }
}

impl RecipeRepository for InMemoryRepo {
    async fn find_author(&self, id: i32) -> Result<Option<Uuid>, ApiError> {
        let store = self.store.lock().unwrap();
        Ok(store.recipes.iter().find(|r| r.id == id).map(|r| r.author_id))
    }

    async fn get(&self, id: i32, viewer: Option<Uuid>) -> Result<Option<Recipe>, ApiError> {
        let store = self.store.lock().unwrap();
        Ok(store
            .recipes
            .iter()
            .find(|r| r.id == id)
            .map(|r| store.hydrate(r, viewer)))
    }

    async fn list(
        &self,
        filter: &RecipeFilter,
        viewer: Option<Uuid>,
        page: PageRequest,
    ) -> Result<Page<Recipe>, ApiError> {
        let store = self.store.lock().unwrap();
        let tag_ids: Vec<i32> = store
            .tags
            .iter()
            .filter(|t| filter.tags.contains(&t.slug))
            .map(|t| t.id)
            .collect();
        let mut matching: Vec<&StoredRecipe> = store
            .recipes
            .iter()
            .filter(|r| filter.author.is_none_or(|a| a == r.author_id))
            .filter(|r| filter.tags.is_empty() || r.tags.iter().any(|t| tag_ids.contains(t)))
            .filter(|r| match viewer {
                Some(v) => {
                    (!filter.is_favorited || store.favorites.contains(&(v, r.id)))
                        && (!filter.is_in_shopping_cart || store.cart.contains(&(v, r.id)))
                }
                None => true,
            })
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        let hydrated: Vec<Recipe> = matching.iter().map(|r| store.hydrate(r, viewer)).collect();
        Ok(paginate(&hydrated, page))
    }

    async fn summary(&self, id: i32) -> Result<Option<RecipeSummary>, ApiError> {
        let store = self.store.lock().unwrap();
        Ok(store.recipes.iter().find(|r| r.id == id).map(Store::summary))
    }

    async fn summaries_by_authors(
        &self,
        author_ids: &[Uuid],
        limit: Option<u32>,
    ) -> Result<Vec<(Uuid, Vec<RecipeSummary>, u64)>, ApiError> {
        let store = self.store.lock().unwrap();
        Ok(author_ids
            .iter()
            .map(|author| {
                let mut own: Vec<&StoredRecipe> = store
                    .recipes
                    .iter()
                    .filter(|r| r.author_id == *author)
                    .collect();
                own.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
                let count = own.len() as u64;
                let take = limit.map_or(own.len(), |l| l as usize);
                let previews = own.into_iter().take(take).map(Store::summary).collect();
                (*author, previews, count)
            })
            .collect())
    }

    async fn create(&self, author_id: Uuid, draft: &RecipeDraft) -> Result<i32, ApiError> {
        let mut store = self.store.lock().unwrap();
        let id = store.next_id();
        // Distinct timestamps keep newest-first ordering deterministic.
        let created_at = Utc::now() + Duration::milliseconds(i64::from(id));
        store.recipes.push(StoredRecipe {
            id,
            author_id,
            name: draft.name.clone(),
            text: draft.text.clone(),
            cooking_time: draft.cooking_time,
            tags: draft.tags.clone(),
            ingredients: draft.ingredients.clone(),
            image: Some(draft.image.clone()),
            created_at,
        });
        Ok(id)
    }

    async fn update(&self, id: i32, changes: &RecipeChanges) -> Result<(), ApiError> {
        let mut store = self.store.lock().unwrap();
        let recipe = store
            .recipes
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(ApiError::RecipeNotFound)?;
        if let Some(ref name) = changes.name {
            recipe.name = name.clone();
        }
        if let Some(ref text) = changes.text {
            recipe.text = text.clone();
        }
        if let Some(minutes) = changes.cooking_time {
            recipe.cooking_time = minutes;
        }
        if let Some(ref tags) = changes.tags {
            recipe.tags = tags.clone();
        }
        if let Some(ref items) = changes.ingredients {
            recipe.ingredients = items.clone();
        }
        if let Some(ref image) = changes.image {
            recipe.image = Some(image.clone());
        }
        Ok(())
    }

    async fn delete(&self, id: i32) -> Result<bool, ApiError> {
        let mut store = self.store.lock().unwrap();
        let before = store.recipes.len();
        store.recipes.retain(|r| r.id != id);
        store.favorites.retain(|(_, recipe)| *recipe != id);
        store.cart.retain(|(_, recipe)| *recipe != id);
        Ok(store.recipes.len() < before)
    }

    async fn image(&self, id: i32) -> Result<Option<RecipeImage>, ApiError> {
        let store = self.store.lock().unwrap();
        Ok(store
            .recipes
            .iter()
            .find(|r| r.id == id)
            .and_then(|r| r.image.clone()))
    }
}

impl RecipeListRepository for InMemoryRepo {
    async fn contains(
        &self,
        list: RecipeList,
        user_id: Uuid,
        recipe_id: i32,
    ) -> Result<bool, ApiError> {
        let store = self.store.lock().unwrap();
        Ok(match list {
            RecipeList::Favorites => store.favorites.contains(&(user_id, recipe_id)),
            RecipeList::ShoppingCart => store.cart.contains(&(user_id, recipe_id)),
        })
    }

    async fn add(&self, list: RecipeList, user_id: Uuid, recipe_id: i32) -> Result<bool, ApiError> {
        let mut store = self.store.lock().unwrap();
        Ok(match list {
            RecipeList::Favorites => store.favorites.insert((user_id, recipe_id)),
            RecipeList::ShoppingCart => store.cart.insert((user_id, recipe_id)),
        })
    }

    async fn remove(
        &self,
        list: RecipeList,
        user_id: Uuid,
        recipe_id: i32,
    ) -> Result<bool, ApiError> {
        let mut store = self.store.lock().unwrap();
        Ok(match list {
            RecipeList::Favorites => store.favorites.remove(&(user_id, recipe_id)),
            RecipeList::ShoppingCart => store.cart.remove(&(user_id, recipe_id)),
        })
    }
}

impl ShoppingListRepository for InMemoryRepo {
    /// Emits one row per recipe line; folding is left to the domain.
    async fn cart_totals(&self, user_id: Uuid) -> Result<Vec<ShoppingListItem>, ApiError> {
        let store = self.store.lock().unwrap();
        let catalog: HashMap<i32, &Ingredient> =
            store.ingredients.iter().map(|i| (i.id, i)).collect();
        let mut rows = vec![];
        for recipe in store
            .recipes
            .iter()
            .filter(|r| store.cart.contains(&(user_id, r.id)))
        {
            for line in &recipe.ingredients {
                let ingredient = catalog[&line.ingredient_id];
                rows.push(ShoppingListItem {
                    name: ingredient.name.clone(),
                    measurement_unit: ingredient.measurement_unit.clone(),
                    amount: i64::from(line.amount),
                });
            }
        }
        Ok(rows)
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

pub const PNG_DATA_URI: &str = "data:image/png;base64,iVBORw0KGgo=";

impl InMemoryRepo {
    pub fn add_user(&self, username: &str) -> User {
        let user = User {
            id: Uuid::now_v7(),
            email: format!("{username}@example.com"),
            username: username.to_owned(),
            first_name: "Test".to_owned(),
            last_name: "Cook".to_owned(),
            created_at: Utc::now(),
        };
        self.store.lock().unwrap().users.push(user.clone());
        user
    }

    pub fn add_tag(&self, slug: &str) -> Tag {
        let mut store = self.store.lock().unwrap();
        let tag = Tag {
            id: store.next_id(),
            name: slug.to_owned(),
            color: Some("#49B64E".to_owned()),
            slug: slug.to_owned(),
        };
        store.tags.push(tag.clone());
        tag
    }

    pub fn add_ingredient(&self, name: &str, unit: &str) -> Ingredient {
        let mut store = self.store.lock().unwrap();
        let ingredient = Ingredient {
            id: store.next_id(),
            name: name.to_owned(),
            measurement_unit: unit.to_owned(),
        };
        store.ingredients.push(ingredient.clone());
        ingredient
    }

    pub fn recipe_count(&self) -> usize {
        self.store.lock().unwrap().recipes.len()
    }
}

pub fn recipe_input(tags: &[i32], ingredients: &[(i32, i32)]) -> RecipeInput {
    RecipeInput {
        name: Some("Pancakes".to_owned()),
        text: Some("Mix and fry.".to_owned()),
        cooking_time: Some(20),
        tags: Some(tags.to_vec()),
        ingredients: Some(
            ingredients
                .iter()
                .map(|&(ingredient_id, amount)| IngredientAmount {
                    ingredient_id,
                    amount,
                })
                .collect(),
        ),
        image: Some(PNG_DATA_URI.to_owned()),
    }
}

pub fn empty_input() -> RecipeInput {
    RecipeInput {
        name: None,
        text: None,
        cooking_time: None,
        tags: None,
        ingredients: None,
        image: None,
    }
}
