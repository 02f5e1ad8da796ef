use std::collections::{HashMap, HashSet};

use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, DbErr, EntityTrait, FromQueryResult, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Statement, TransactionTrait,
    sea_query::{Expr, Func, LikeExpr, OnConflict, Query},
};
use uuid::Uuid;

use foodgram_api_schema::{
    favorites, follows, ingredients, recipe_images, recipe_ingredients, recipe_tags, recipes,
    shopping_cart_entries, tags, users,
};
use foodgram_core::sea_ext::DbErrExt;
use foodgram_domain::pagination::{Page, PageRequest};

use crate::domain::repository::{
    FollowRepository, IngredientRepository, RecipeListRepository, RecipeRepository,
    ShoppingListRepository, TagRepository, UserRepository,
};
use crate::domain::types::{
    Ingredient, IngredientAmount, NewIngredient, NewTag, Profile, Recipe, RecipeChanges,
    RecipeDraft, RecipeFilter, RecipeImage, RecipeIngredient, RecipeList, RecipeSummary,
    ShoppingListItem, Tag, User,
};
use crate::error::ApiError;

/// Maps the outcome of a relation insert: `Ok(false)` on a duplicate pair,
/// `missing` when the target row vanished after the use case looked it up.
/// Callers check their own profile beforehand, so the target is the only
/// reference that can still dangle.
fn relation_inserted<T>(
    result: Result<T, DbErr>,
    missing: ApiError,
    context: &'static str,
) -> Result<bool, ApiError> {
    match result {
        Ok(_) => Ok(true),
        Err(e) if e.is_unique_violation() => Ok(false),
        Err(e) if e.is_foreign_key_violation() => Err(missing),
        Err(e) => Err(anyhow::Error::new(e).context(context).into()),
    }
}

// ── Tag repository ───────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbTagRepository {
    pub db: DatabaseConnection,
}

impl TagRepository for DbTagRepository {
    async fn list(&self) -> Result<Vec<Tag>, ApiError> {
        let models = tags::Entity::find()
            .order_by_asc(tags::Column::Id)
            .all(&self.db)
            .await
            .context("list tags")?;
        Ok(models.into_iter().map(tag_from_model).collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Tag>, ApiError> {
        let model = tags::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find tag by id")?;
        Ok(model.map(tag_from_model))
    }

    async fn existing_ids(&self, ids: &[i32]) -> Result<Vec<i32>, ApiError> {
        let found = tags::Entity::find()
            .select_only()
            .column(tags::Column::Id)
            .filter(tags::Column::Id.is_in(ids.iter().copied()))
            .into_tuple::<i32>()
            .all(&self.db)
            .await
            .context("find existing tag ids")?;
        Ok(found)
    }

    async fn create(&self, tag: &NewTag) -> Result<Option<Tag>, ApiError> {
        let result = tags::ActiveModel {
            name: Set(tag.name.clone()),
            color: Set(tag.color.clone()),
            slug: Set(tag.slug.clone()),
            ..Default::default()
        }
        .insert(&self.db)
        .await;
        match result {
            Ok(model) => Ok(Some(tag_from_model(model))),
            Err(e) if e.is_unique_violation() => Ok(None),
            Err(e) => Err(anyhow::Error::new(e).context("create tag").into()),
        }
    }
}

fn tag_from_model(model: tags::Model) -> Tag {
    Tag {
        id: model.id,
        name: model.name,
        color: model.color,
        slug: model.slug,
    }
}

// ── Ingredient repository ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbIngredientRepository {
    pub db: DatabaseConnection,
}

impl IngredientRepository for DbIngredientRepository {
    async fn search(&self, name_prefix: Option<&str>) -> Result<Vec<Ingredient>, ApiError> {
        let mut query = ingredients::Entity::find();
        if let Some(prefix) = name_prefix {
            let escaped = prefix
                .to_lowercase()
                .replace('\\', "\\\\")
                .replace('%', "\\%")
                .replace('_', "\\_");
            query = query.filter(
                Expr::expr(Func::lower(Expr::col((
                    ingredients::Entity,
                    ingredients::Column::Name,
                ))))
                .like(LikeExpr::new(format!("{escaped}%")).escape('\\')),
            );
        }
        let models = query
            .order_by_asc(ingredients::Column::Name)
            .order_by_asc(ingredients::Column::MeasurementUnit)
            .all(&self.db)
            .await
            .context("search ingredients")?;
        Ok(models.into_iter().map(ingredient_from_model).collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Ingredient>, ApiError> {
        let model = ingredients::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find ingredient by id")?;
        Ok(model.map(ingredient_from_model))
    }

    async fn existing_ids(&self, ids: &[i32]) -> Result<Vec<i32>, ApiError> {
        let found = ingredients::Entity::find()
            .select_only()
            .column(ingredients::Column::Id)
            .filter(ingredients::Column::Id.is_in(ids.iter().copied()))
            .into_tuple::<i32>()
            .all(&self.db)
            .await
            .context("find existing ingredient ids")?;
        Ok(found)
    }

    async fn create(&self, ingredient: &NewIngredient) -> Result<Option<Ingredient>, ApiError> {
        let result = ingredients::ActiveModel {
            name: Set(ingredient.name.clone()),
            measurement_unit: Set(ingredient.measurement_unit.clone()),
            ..Default::default()
        }
        .insert(&self.db)
        .await;
        match result {
            Ok(model) => Ok(Some(ingredient_from_model(model))),
            Err(e) if e.is_unique_violation() => Ok(None),
            Err(e) => Err(anyhow::Error::new(e).context("create ingredient").into()),
        }
    }
}

fn ingredient_from_model(model: ingredients::Model) -> Ingredient {
    Ingredient {
        id: model.id,
        name: model.name,
        measurement_unit: model.measurement_unit,
    }
}

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model))
    }

    async fn list(&self, page: PageRequest) -> Result<Page<User>, ApiError> {
        let count = users::Entity::find()
            .count(&self.db)
            .await
            .context("count users")?;
        let models = users::Entity::find()
            .order_by_asc(users::Column::Username)
            .offset(page.offset())
            .limit(u64::from(page.limit))
            .all(&self.db)
            .await
            .context("list users")?;
        Ok(Page::new(
            count,
            models.into_iter().map(user_from_model).collect(),
        ))
    }

    async fn create(&self, user: &User) -> Result<bool, ApiError> {
        let result = users::ActiveModel {
            id: Set(user.id),
            email: Set(user.email.clone()),
            username: Set(user.username.clone()),
            first_name: Set(user.first_name.clone()),
            last_name: Set(user.last_name.clone()),
            created_at: Set(user.created_at),
        }
        .insert(&self.db)
        .await;
        match result {
            Ok(_) => Ok(true),
            Err(e) if e.is_unique_violation() => Ok(false),
            Err(e) => Err(anyhow::Error::new(e).context("create user").into()),
        }
    }
}

fn user_from_model(model: users::Model) -> User {
    User {
        id: model.id,
        email: model.email,
        username: model.username,
        first_name: model.first_name,
        last_name: model.last_name,
        created_at: model.created_at,
    }
}

// ── Follow repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbFollowRepository {
    pub db: DatabaseConnection,
}

impl FollowRepository for DbFollowRepository {
    async fn contains(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, ApiError> {
        let found = follows::Entity::find_by_id((user_id, author_id))
            .one(&self.db)
            .await
            .context("find follow")?;
        Ok(found.is_some())
    }

    async fn insert(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, ApiError> {
        let result = follows::Entity::insert(follows::ActiveModel {
            user_id: Set(user_id),
            author_id: Set(author_id),
            created_at: Set(Utc::now()),
        })
        .exec_without_returning(&self.db)
        .await;
        relation_inserted(result, ApiError::UserNotFound, "insert follow")
    }

    async fn delete(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, ApiError> {
        let result = follows::Entity::delete_by_id((user_id, author_id))
            .exec(&self.db)
            .await
            .context("delete follow")?;
        Ok(result.rows_affected > 0)
    }

    async fn list_authors(&self, user_id: Uuid, page: PageRequest) -> Result<Page<User>, ApiError> {
        let query = users::Entity::find().filter(
            users::Column::Id.in_subquery(
                Query::select()
                    .column(follows::Column::AuthorId)
                    .from(follows::Entity)
                    .and_where(Expr::col(follows::Column::UserId).eq(user_id))
                    .to_owned(),
            ),
        );
        let count = query
            .clone()
            .count(&self.db)
            .await
            .context("count followed authors")?;
        let models = query
            .order_by_asc(users::Column::Username)
            .offset(page.offset())
            .limit(u64::from(page.limit))
            .all(&self.db)
            .await
            .context("list followed authors")?;
        Ok(Page::new(
            count,
            models.into_iter().map(user_from_model).collect(),
        ))
    }

    async fn followed_among(
        &self,
        user_id: Uuid,
        author_ids: &[Uuid],
    ) -> Result<Vec<Uuid>, ApiError> {
        if author_ids.is_empty() {
            return Ok(vec![]);
        }
        let found = follows::Entity::find()
            .select_only()
            .column(follows::Column::AuthorId)
            .filter(follows::Column::UserId.eq(user_id))
            .filter(follows::Column::AuthorId.is_in(author_ids.iter().copied()))
            .into_tuple::<Uuid>()
            .all(&self.db)
            .await
            .context("find followed authors")?;
        Ok(found)
    }
}

// ── Recipe repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbRecipeRepository {
    pub db: DatabaseConnection,
}

impl DbRecipeRepository {
    /// Attach tags, ingredients, authors, image presence and viewer flags to
    /// a batch of recipe rows, preserving their order.
    async fn hydrate(
        &self,
        models: Vec<recipes::Model>,
        viewer: Option<Uuid>,
    ) -> Result<Vec<Recipe>, ApiError> {
        if models.is_empty() {
            return Ok(vec![]);
        }
        let ids: Vec<i32> = models.iter().map(|m| m.id).collect();
        let author_ids: Vec<Uuid> = models
            .iter()
            .map(|m| m.author_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let mut tags_by_recipe: HashMap<i32, Vec<Tag>> = HashMap::new();
        for (link, tag) in recipe_tags::Entity::find()
            .filter(recipe_tags::Column::RecipeId.is_in(ids.clone()))
            .find_also_related(tags::Entity)
            .order_by_asc(tags::Column::Id)
            .all(&self.db)
            .await
            .context("load recipe tags")?
        {
            if let Some(tag) = tag {
                tags_by_recipe
                    .entry(link.recipe_id)
                    .or_default()
                    .push(tag_from_model(tag));
            }
        }

        let mut ingredients_by_recipe: HashMap<i32, Vec<RecipeIngredient>> = HashMap::new();
        for (link, ingredient) in recipe_ingredients::Entity::find()
            .filter(recipe_ingredients::Column::RecipeId.is_in(ids.clone()))
            .find_also_related(ingredients::Entity)
            .order_by_asc(ingredients::Column::Name)
            .all(&self.db)
            .await
            .context("load recipe ingredients")?
        {
            if let Some(ingredient) = ingredient {
                ingredients_by_recipe
                    .entry(link.recipe_id)
                    .or_default()
                    .push(RecipeIngredient {
                        ingredient: ingredient_from_model(ingredient),
                        amount: link.amount,
                    });
            }
        }

        let authors: HashMap<Uuid, User> = users::Entity::find()
            .filter(users::Column::Id.is_in(author_ids.clone()))
            .all(&self.db)
            .await
            .context("load recipe authors")?
            .into_iter()
            .map(|m| (m.id, user_from_model(m)))
            .collect();

        let with_image: HashSet<i32> = recipe_images::Entity::find()
            .select_only()
            .column(recipe_images::Column::RecipeId)
            .filter(recipe_images::Column::RecipeId.is_in(ids.clone()))
            .into_tuple::<i32>()
            .all(&self.db)
            .await
            .context("load recipe image ids")?
            .into_iter()
            .collect();

        let (favorited, in_cart, followed) = match viewer {
            Some(viewer) => {
                let favorited: HashSet<i32> = favorites::Entity::find()
                    .select_only()
                    .column(favorites::Column::RecipeId)
                    .filter(favorites::Column::UserId.eq(viewer))
                    .filter(favorites::Column::RecipeId.is_in(ids.clone()))
                    .into_tuple::<i32>()
                    .all(&self.db)
                    .await
                    .context("load viewer favorites")?
                    .into_iter()
                    .collect();
                let in_cart: HashSet<i32> = shopping_cart_entries::Entity::find()
                    .select_only()
                    .column(shopping_cart_entries::Column::RecipeId)
                    .filter(shopping_cart_entries::Column::UserId.eq(viewer))
                    .filter(shopping_cart_entries::Column::RecipeId.is_in(ids.clone()))
                    .into_tuple::<i32>()
                    .all(&self.db)
                    .await
                    .context("load viewer shopping cart")?
                    .into_iter()
                    .collect();
                let followed: HashSet<Uuid> = follows::Entity::find()
                    .select_only()
                    .column(follows::Column::AuthorId)
                    .filter(follows::Column::UserId.eq(viewer))
                    .filter(follows::Column::AuthorId.is_in(author_ids))
                    .into_tuple::<Uuid>()
                    .all(&self.db)
                    .await
                    .context("load viewer follows")?
                    .into_iter()
                    .collect();
                (favorited, in_cart, followed)
            }
            None => Default::default(),
        };

        models
            .into_iter()
            .map(|model| -> Result<Recipe, ApiError> {
                let author = authors.get(&model.author_id).cloned().with_context(|| {
                    format!("author {} of recipe {} missing", model.author_id, model.id)
                })?;
                Ok(Recipe {
                    id: model.id,
                    author: Profile {
                        is_subscribed: followed.contains(&model.author_id),
                        user: author,
                    },
                    has_image: with_image.contains(&model.id),
                    tags: tags_by_recipe.remove(&model.id).unwrap_or_default(),
                    ingredients: ingredients_by_recipe.remove(&model.id).unwrap_or_default(),
                    is_favorited: favorited.contains(&model.id),
                    is_in_shopping_cart: in_cart.contains(&model.id),
                    name: model.name,
                    text: model.text,
                    cooking_time: model.cooking_time,
                    created_at: model.created_at,
                })
            })
            .collect()
    }
}

async fn replace_tags(
    txn: &DatabaseTransaction,
    recipe_id: i32,
    tag_ids: &[i32],
) -> Result<(), DbErr> {
    recipe_tags::Entity::delete_many()
        .filter(recipe_tags::Column::RecipeId.eq(recipe_id))
        .exec(txn)
        .await?;
    if tag_ids.is_empty() {
        return Ok(());
    }
    recipe_tags::Entity::insert_many(tag_ids.iter().map(|&tag_id| recipe_tags::ActiveModel {
        recipe_id: Set(recipe_id),
        tag_id: Set(tag_id),
    }))
    .exec_without_returning(txn)
    .await?;
    Ok(())
}

/// Clear-then-reinsert; never a partial diff.
async fn replace_ingredients(
    txn: &DatabaseTransaction,
    recipe_id: i32,
    items: &[IngredientAmount],
) -> Result<(), DbErr> {
    recipe_ingredients::Entity::delete_many()
        .filter(recipe_ingredients::Column::RecipeId.eq(recipe_id))
        .exec(txn)
        .await?;
    if items.is_empty() {
        return Ok(());
    }
    recipe_ingredients::Entity::insert_many(items.iter().map(|item| {
        recipe_ingredients::ActiveModel {
            recipe_id: Set(recipe_id),
            ingredient_id: Set(item.ingredient_id),
            amount: Set(item.amount),
        }
    }))
    .exec_without_returning(txn)
    .await?;
    Ok(())
}

async fn upsert_image(
    txn: &DatabaseTransaction,
    recipe_id: i32,
    image: &RecipeImage,
) -> Result<(), DbErr> {
    recipe_images::Entity::insert(recipe_images::ActiveModel {
        recipe_id: Set(recipe_id),
        content_type: Set(image.content_type.clone()),
        data: Set(image.data.clone()),
    })
    .on_conflict(
        OnConflict::column(recipe_images::Column::RecipeId)
            .update_columns([
                recipe_images::Column::ContentType,
                recipe_images::Column::Data,
            ])
            .to_owned(),
    )
    .exec_without_returning(txn)
    .await?;
    Ok(())
}

#[derive(Debug, FromQueryResult)]
struct AuthorPreviewRow {
    author_id: Uuid,
    id: i32,
    name: String,
    cooking_time: i32,
    has_image: bool,
}

impl RecipeRepository for DbRecipeRepository {
    async fn find_author(&self, id: i32) -> Result<Option<Uuid>, ApiError> {
        let author = recipes::Entity::find_by_id(id)
            .select_only()
            .column(recipes::Column::AuthorId)
            .into_tuple::<Uuid>()
            .one(&self.db)
            .await
            .context("find recipe author")?;
        Ok(author)
    }

    async fn get(&self, id: i32, viewer: Option<Uuid>) -> Result<Option<Recipe>, ApiError> {
        let Some(model) = recipes::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find recipe by id")?
        else {
            return Ok(None);
        };
        Ok(self.hydrate(vec![model], viewer).await?.pop())
    }

    async fn list(
        &self,
        filter: &RecipeFilter,
        viewer: Option<Uuid>,
        page: PageRequest,
    ) -> Result<Page<Recipe>, ApiError> {
        let mut query = recipes::Entity::find();
        if let Some(author) = filter.author {
            query = query.filter(recipes::Column::AuthorId.eq(author));
        }
        if !filter.tags.is_empty() {
            query = query.filter(
                recipes::Column::Id.in_subquery(
                    Query::select()
                        .column((recipe_tags::Entity, recipe_tags::Column::RecipeId))
                        .from(recipe_tags::Entity)
                        .inner_join(
                            tags::Entity,
                            Expr::col((tags::Entity, tags::Column::Id))
                                .equals((recipe_tags::Entity, recipe_tags::Column::TagId)),
                        )
                        .and_where(
                            Expr::col((tags::Entity, tags::Column::Slug))
                                .is_in(filter.tags.iter().cloned()),
                        )
                        .to_owned(),
                ),
            );
        }
        if let Some(viewer) = viewer {
            if filter.is_favorited {
                query = query.filter(
                    recipes::Column::Id.in_subquery(
                        Query::select()
                            .column(favorites::Column::RecipeId)
                            .from(favorites::Entity)
                            .and_where(Expr::col(favorites::Column::UserId).eq(viewer))
                            .to_owned(),
                    ),
                );
            }
            if filter.is_in_shopping_cart {
                query = query.filter(
                    recipes::Column::Id.in_subquery(
                        Query::select()
                            .column(shopping_cart_entries::Column::RecipeId)
                            .from(shopping_cart_entries::Entity)
                            .and_where(Expr::col(shopping_cart_entries::Column::UserId).eq(viewer))
                            .to_owned(),
                    ),
                );
            }
        }

        let count = query
            .clone()
            .count(&self.db)
            .await
            .context("count recipes")?;
        let models = query
            .order_by_desc(recipes::Column::CreatedAt)
            .order_by_desc(recipes::Column::Id)
            .offset(page.offset())
            .limit(u64::from(page.limit))
            .all(&self.db)
            .await
            .context("list recipes")?;
        Ok(Page::new(count, self.hydrate(models, viewer).await?))
    }

    async fn summary(&self, id: i32) -> Result<Option<RecipeSummary>, ApiError> {
        let Some(model) = recipes::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find recipe by id")?
        else {
            return Ok(None);
        };
        let has_image = recipe_images::Entity::find_by_id(id)
            .select_only()
            .column(recipe_images::Column::RecipeId)
            .into_tuple::<i32>()
            .one(&self.db)
            .await
            .context("find recipe image id")?
            .is_some();
        Ok(Some(RecipeSummary {
            id: model.id,
            name: model.name,
            cooking_time: model.cooking_time,
            has_image,
        }))
    }

    async fn summaries_by_authors(
        &self,
        author_ids: &[Uuid],
        limit: Option<u32>,
    ) -> Result<Vec<(Uuid, Vec<RecipeSummary>, u64)>, ApiError> {
        if author_ids.is_empty() {
            return Ok(vec![]);
        }
        // Previews are capped per author inside the query.
        let placeholders: Vec<String> = (1..=author_ids.len()).map(|i| format!("${i}")).collect();
        let mut values: Vec<sea_orm::Value> = author_ids.iter().map(|id| (*id).into()).collect();
        let cap = match limit {
            Some(limit) => {
                values.push(i64::from(limit).into());
                format!("WHERE r.rn <= ${}", values.len())
            }
            None => String::new(),
        };
        let sql = format!(
            r#"
            SELECT r.author_id AS author_id,
                   r.id AS id,
                   r.name AS name,
                   r.cooking_time AS cooking_time,
                   (img.recipe_id IS NOT NULL) AS has_image
            FROM (
                SELECT id, author_id, name, cooking_time,
                       ROW_NUMBER() OVER (
                           PARTITION BY author_id ORDER BY created_at DESC, id DESC
                       ) AS rn
                FROM recipes
                WHERE author_id IN ({})
            ) r
            LEFT JOIN recipe_images img ON img.recipe_id = r.id
            {cap}
            ORDER BY r.author_id, r.rn
            "#,
            placeholders.join(", ")
        );
        let rows = AuthorPreviewRow::find_by_statement(Statement::from_sql_and_values(
            self.db.get_database_backend(),
            sql,
            values,
        ))
        .all(&self.db)
        .await
        .context("list recipe previews by authors")?;

        let counts: HashMap<Uuid, u64> = recipes::Entity::find()
            .select_only()
            .column(recipes::Column::AuthorId)
            .column_as(Expr::col(recipes::Column::Id).count(), "recipes_count")
            .filter(recipes::Column::AuthorId.is_in(author_ids.iter().copied()))
            .group_by(recipes::Column::AuthorId)
            .into_tuple::<(Uuid, i64)>()
            .all(&self.db)
            .await
            .context("count recipes by authors")?
            .into_iter()
            .map(|(author_id, count)| (author_id, count as u64))
            .collect();

        let mut grouped: HashMap<Uuid, Vec<RecipeSummary>> = HashMap::new();
        for row in rows {
            grouped.entry(row.author_id).or_default().push(RecipeSummary {
                id: row.id,
                name: row.name,
                cooking_time: row.cooking_time,
                has_image: row.has_image,
            });
        }
        Ok(author_ids
            .iter()
            .map(|id| {
                let recipes = grouped.remove(id).unwrap_or_default();
                (*id, recipes, counts.get(id).copied().unwrap_or(0))
            })
            .collect())
    }

    async fn create(&self, author_id: Uuid, draft: &RecipeDraft) -> Result<i32, ApiError> {
        let id = self
            .db
            .transaction::<_, i32, DbErr>(|txn| {
                let draft = draft.clone();
                Box::pin(async move {
                    let recipe = recipes::ActiveModel {
                        author_id: Set(author_id),
                        name: Set(draft.name),
                        text: Set(draft.text),
                        cooking_time: Set(draft.cooking_time),
                        created_at: Set(Utc::now()),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;
                    replace_tags(txn, recipe.id, &draft.tags).await?;
                    replace_ingredients(txn, recipe.id, &draft.ingredients).await?;
                    upsert_image(txn, recipe.id, &draft.image).await?;
                    Ok(recipe.id)
                })
            })
            .await
            .context("create recipe")?;
        Ok(id)
    }

    async fn update(&self, id: i32, changes: &RecipeChanges) -> Result<(), ApiError> {
        self.db
            .transaction::<_, (), DbErr>(|txn| {
                let changes = changes.clone();
                Box::pin(async move {
                    let mut update = recipes::Entity::update_many()
                        .filter(recipes::Column::Id.eq(id));
                    let mut dirty = false;
                    if let Some(name) = changes.name {
                        update = update.col_expr(recipes::Column::Name, Expr::value(name));
                        dirty = true;
                    }
                    if let Some(text) = changes.text {
                        update = update.col_expr(recipes::Column::Text, Expr::value(text));
                        dirty = true;
                    }
                    if let Some(minutes) = changes.cooking_time {
                        update =
                            update.col_expr(recipes::Column::CookingTime, Expr::value(minutes));
                        dirty = true;
                    }
                    if dirty {
                        update.exec(txn).await?;
                    }
                    if let Some(tags) = changes.tags {
                        replace_tags(txn, id, &tags).await?;
                    }
                    if let Some(items) = changes.ingredients {
                        replace_ingredients(txn, id, &items).await?;
                    }
                    if let Some(image) = changes.image {
                        upsert_image(txn, id, &image).await?;
                    }
                    Ok(())
                })
            })
            .await
            .context("update recipe")?;
        Ok(())
    }

    async fn delete(&self, id: i32) -> Result<bool, ApiError> {
        let result = recipes::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete recipe")?;
        Ok(result.rows_affected > 0)
    }

    async fn image(&self, id: i32) -> Result<Option<RecipeImage>, ApiError> {
        let model = recipe_images::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find recipe image")?;
        Ok(model.map(|m| RecipeImage {
            content_type: m.content_type,
            data: m.data,
        }))
    }
}

// ── Recipe list repository (favorites, shopping cart) ────────────────────────

#[derive(Clone)]
pub struct DbRecipeListRepository {
    pub db: DatabaseConnection,
}

impl RecipeListRepository for DbRecipeListRepository {
    async fn contains(
        &self,
        list: RecipeList,
        user_id: Uuid,
        recipe_id: i32,
    ) -> Result<bool, ApiError> {
        let found = match list {
            RecipeList::Favorites => favorites::Entity::find_by_id((user_id, recipe_id))
                .one(&self.db)
                .await
                .context("find favorite")?
                .is_some(),
            RecipeList::ShoppingCart => {
                shopping_cart_entries::Entity::find_by_id((user_id, recipe_id))
                    .one(&self.db)
                    .await
                    .context("find shopping cart entry")?
                    .is_some()
            }
        };
        Ok(found)
    }

    async fn add(&self, list: RecipeList, user_id: Uuid, recipe_id: i32) -> Result<bool, ApiError> {
        match list {
            RecipeList::Favorites => {
                let result = favorites::Entity::insert(favorites::ActiveModel {
                    user_id: Set(user_id),
                    recipe_id: Set(recipe_id),
                    created_at: Set(Utc::now()),
                })
                .exec_without_returning(&self.db)
                .await;
                relation_inserted(result, ApiError::RecipeNotFound, "insert favorite")
            }
            RecipeList::ShoppingCart => {
                let result = shopping_cart_entries::Entity::insert(
                    shopping_cart_entries::ActiveModel {
                        user_id: Set(user_id),
                        recipe_id: Set(recipe_id),
                        created_at: Set(Utc::now()),
                    },
                )
                .exec_without_returning(&self.db)
                .await;
                relation_inserted(result, ApiError::RecipeNotFound, "insert shopping cart entry")
            }
        }
    }

    async fn remove(
        &self,
        list: RecipeList,
        user_id: Uuid,
        recipe_id: i32,
    ) -> Result<bool, ApiError> {
        let result = match list {
            RecipeList::Favorites => favorites::Entity::delete_by_id((user_id, recipe_id))
                .exec(&self.db)
                .await
                .context("delete favorite")?,
            RecipeList::ShoppingCart => {
                shopping_cart_entries::Entity::delete_by_id((user_id, recipe_id))
                    .exec(&self.db)
                    .await
                    .context("delete shopping cart entry")?
            }
        };
        Ok(result.rows_affected > 0)
    }
}

// ── Shopping list query ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbShoppingListRepository {
    pub db: DatabaseConnection,
}

#[derive(Debug, FromQueryResult)]
struct CartTotalRow {
    name: String,
    measurement_unit: String,
    amount: i64,
}

impl ShoppingListRepository for DbShoppingListRepository {
    async fn cart_totals(&self, user_id: Uuid) -> Result<Vec<ShoppingListItem>, ApiError> {
        let sql = r#"
            SELECT i.name AS name,
                   i.measurement_unit AS measurement_unit,
                   SUM(ri.amount)::BIGINT AS amount
            FROM shopping_cart_entries c
            JOIN recipe_ingredients ri ON ri.recipe_id = c.recipe_id
            JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE c.user_id = $1
            GROUP BY i.name, i.measurement_unit
            ORDER BY i.name COLLATE "C", i.measurement_unit COLLATE "C"
        "#;
        let rows = CartTotalRow::find_by_statement(Statement::from_sql_and_values(
            self.db.get_database_backend(),
            sql,
            [user_id.into()],
        ))
        .all(&self.db)
        .await
        .context("aggregate shopping cart ingredients")?;
        Ok(rows
            .into_iter()
            .map(|row| ShoppingListItem {
                name: row.name,
                measurement_unit: row.measurement_unit,
                amount: row.amount,
            })
            .collect())
    }
}
