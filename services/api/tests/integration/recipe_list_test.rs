use foodgram_api::domain::types::{RecipeFilter, RecipeList};
use foodgram_api::error::ApiError;
use foodgram_api::usecase::recipe::{
    CreateRecipeUseCase, DeleteRecipeUseCase, GetRecipeUseCase, ListRecipesUseCase,
};
use foodgram_api::usecase::recipe_list::{AddToRecipeListUseCase, RemoveFromRecipeListUseCase};
use foodgram_domain::pagination::PageRequest;
use uuid::Uuid;

use crate::helpers::{InMemoryRepo, recipe_input};

fn add_uc(
    repo: &InMemoryRepo,
    list: RecipeList,
) -> AddToRecipeListUseCase<InMemoryRepo, InMemoryRepo, InMemoryRepo> {
    AddToRecipeListUseCase {
        list,
        repo: repo.clone(),
        recipes: repo.clone(),
        users: repo.clone(),
    }
}

fn remove_uc(
    repo: &InMemoryRepo,
    list: RecipeList,
) -> RemoveFromRecipeListUseCase<InMemoryRepo, InMemoryRepo> {
    RemoveFromRecipeListUseCase {
        list,
        repo: repo.clone(),
        recipes: repo.clone(),
    }
}

async fn seed_recipe(repo: &InMemoryRepo) -> i32 {
    let author = repo.add_user("alice");
    let tag = repo.add_tag("dinner");
    let salt = repo.add_ingredient("Salt", "g");
    let uc = CreateRecipeUseCase {
        repo: repo.clone(),
        ingredients: repo.clone(),
        tags: repo.clone(),
        users: repo.clone(),
    };
    uc.execute(author.id, recipe_input(&[tag.id], &[(salt.id, 5)]))
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn should_reject_second_favorite_and_keep_one_row() {
    let repo = InMemoryRepo::default();
    let recipe_id = seed_recipe(&repo).await;
    let viewer = repo.add_user("bob");
    let uc = add_uc(&repo, RecipeList::Favorites);

    let summary = uc.execute(viewer.id, recipe_id).await.unwrap();
    assert_eq!(summary.id, recipe_id);
    assert!(summary.has_image);

    assert!(matches!(
        uc.execute(viewer.id, recipe_id).await,
        Err(ApiError::FavoriteAlreadyExists)
    ));
    assert_eq!(repo.store.lock().unwrap().favorites.len(), 1);
}

#[tokio::test]
async fn should_keep_favorites_and_cart_independent() {
    let repo = InMemoryRepo::default();
    let recipe_id = seed_recipe(&repo).await;
    let viewer = repo.add_user("bob");

    add_uc(&repo, RecipeList::ShoppingCart)
        .execute(viewer.id, recipe_id)
        .await
        .unwrap();
    assert!(matches!(
        add_uc(&repo, RecipeList::ShoppingCart)
            .execute(viewer.id, recipe_id)
            .await,
        Err(ApiError::ShoppingCartEntryAlreadyExists)
    ));
    assert!(matches!(
        remove_uc(&repo, RecipeList::Favorites)
            .execute(viewer.id, recipe_id)
            .await,
        Err(ApiError::FavoriteNotFound)
    ));

    let recipe = GetRecipeUseCase { repo: repo.clone() }
        .execute(recipe_id, Some(viewer.id))
        .await
        .unwrap();
    assert!(recipe.is_in_shopping_cart);
    assert!(!recipe.is_favorited);

    remove_uc(&repo, RecipeList::ShoppingCart)
        .execute(viewer.id, recipe_id)
        .await
        .unwrap();
    assert!(matches!(
        remove_uc(&repo, RecipeList::ShoppingCart)
            .execute(viewer.id, recipe_id)
            .await,
        Err(ApiError::ShoppingCartEntryNotFound)
    ));
}

#[tokio::test]
async fn should_require_profile_to_collect_existing_recipe() {
    let repo = InMemoryRepo::default();
    let recipe_id = seed_recipe(&repo).await;
    let ghost = Uuid::now_v7();

    for list in [RecipeList::Favorites, RecipeList::ShoppingCart] {
        assert!(matches!(
            add_uc(&repo, list).execute(ghost, recipe_id).await,
            Err(ApiError::ProfileRequired)
        ));
    }
    let store = repo.store.lock().unwrap();
    assert!(store.favorites.is_empty());
    assert!(store.cart.is_empty());
}

#[tokio::test]
async fn should_report_missing_recipe_before_relation() {
    let repo = InMemoryRepo::default();
    let viewer = repo.add_user("bob");

    assert!(matches!(
        add_uc(&repo, RecipeList::Favorites).execute(viewer.id, 404).await,
        Err(ApiError::RecipeNotFound)
    ));
    assert!(matches!(
        remove_uc(&repo, RecipeList::ShoppingCart)
            .execute(viewer.id, 404)
            .await,
        Err(ApiError::RecipeNotFound)
    ));
}

#[tokio::test]
async fn should_filter_by_relation_only_for_authenticated_viewer() {
    let repo = InMemoryRepo::default();
    let favorite = seed_recipe(&repo).await;
    let other = seed_recipe(&repo).await;
    let viewer = repo.add_user("bob");
    add_uc(&repo, RecipeList::Favorites)
        .execute(viewer.id, favorite)
        .await
        .unwrap();

    let list = ListRecipesUseCase { repo: repo.clone() };
    let filter = RecipeFilter {
        is_favorited: true,
        ..RecipeFilter::default()
    };

    let mine = list
        .execute(filter.clone(), Some(viewer.id), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(mine.count, 1);
    assert_eq!(mine.results[0].id, favorite);
    assert!(mine.results[0].is_favorited);

    let anonymous = list
        .execute(filter, None, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(anonymous.count, 2);
    assert!(anonymous.results.iter().all(|r| !r.is_favorited));
    assert!(anonymous.results.iter().any(|r| r.id == other));
}

#[tokio::test]
async fn should_drop_relations_when_recipe_is_deleted() {
    let repo = InMemoryRepo::default();
    let recipe_id = seed_recipe(&repo).await;
    let author_id = repo.store.lock().unwrap().recipes[0].author_id;
    let viewer = repo.add_user("bob");
    add_uc(&repo, RecipeList::Favorites)
        .execute(viewer.id, recipe_id)
        .await
        .unwrap();
    add_uc(&repo, RecipeList::ShoppingCart)
        .execute(viewer.id, recipe_id)
        .await
        .unwrap();

    DeleteRecipeUseCase { repo: repo.clone() }
        .execute(author_id, recipe_id)
        .await
        .unwrap();

    let store = repo.store.lock().unwrap();
    assert!(store.favorites.is_empty());
    assert!(store.cart.is_empty());
}
