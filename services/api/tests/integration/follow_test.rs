use foodgram_api::error::ApiError;
use foodgram_api::usecase::follow::{FollowUseCase, ListSubscriptionsUseCase, UnfollowUseCase};
use foodgram_api::usecase::recipe::{CreateRecipeUseCase, GetRecipeUseCase};
use foodgram_domain::pagination::PageRequest;
use uuid::Uuid;

use crate::helpers::{InMemoryRepo, recipe_input};

fn follow_uc(repo: &InMemoryRepo) -> FollowUseCase<InMemoryRepo, InMemoryRepo, InMemoryRepo> {
    FollowUseCase {
        follows: repo.clone(),
        users: repo.clone(),
        recipes: repo.clone(),
    }
}

fn unfollow_uc(repo: &InMemoryRepo) -> UnfollowUseCase<InMemoryRepo, InMemoryRepo> {
    UnfollowUseCase {
        follows: repo.clone(),
        users: repo.clone(),
    }
}

async fn publish(repo: &InMemoryRepo, author_id: Uuid, count: usize) -> Vec<i32> {
    let tag = repo.add_tag("dinner");
    let salt = repo.add_ingredient("Salt", "g");
    let uc = CreateRecipeUseCase {
        repo: repo.clone(),
        ingredients: repo.clone(),
        tags: repo.clone(),
        users: repo.clone(),
    };
    let mut ids = vec![];
    for _ in 0..count {
        let recipe = uc
            .execute(author_id, recipe_input(&[tag.id], &[(salt.id, 1)]))
            .await
            .unwrap();
        ids.push(recipe.id);
    }
    ids
}

#[tokio::test]
async fn should_reject_self_follow() {
    let repo = InMemoryRepo::default();
    let alice = repo.add_user("alice");

    assert!(matches!(
        follow_uc(&repo).execute(alice.id, alice.id, None).await,
        Err(ApiError::SelfFollow)
    ));
    assert!(matches!(
        unfollow_uc(&repo).execute(alice.id, alice.id).await,
        Err(ApiError::SelfFollow)
    ));
    assert!(repo.store.lock().unwrap().follows.is_empty());
}

#[tokio::test]
async fn should_reject_duplicate_follow() {
    let repo = InMemoryRepo::default();
    let alice = repo.add_user("alice");
    let bob = repo.add_user("bob");
    let uc = follow_uc(&repo);

    let subscription = uc.execute(bob.id, alice.id, None).await.unwrap();
    assert_eq!(subscription.author.id, alice.id);
    assert_eq!(subscription.recipes_count, 0);

    assert!(matches!(
        uc.execute(bob.id, alice.id, None).await,
        Err(ApiError::FollowAlreadyExists)
    ));
    assert_eq!(repo.store.lock().unwrap().follows.len(), 1);
}

#[tokio::test]
async fn should_require_profile_to_follow_existing_author() {
    let repo = InMemoryRepo::default();
    let alice = repo.add_user("alice");

    assert!(matches!(
        follow_uc(&repo).execute(Uuid::now_v7(), alice.id, None).await,
        Err(ApiError::ProfileRequired)
    ));
    assert!(repo.store.lock().unwrap().follows.is_empty());
}

#[tokio::test]
async fn should_report_unknown_author_and_missing_follow() {
    let repo = InMemoryRepo::default();
    let bob = repo.add_user("bob");
    let alice = repo.add_user("alice");

    assert!(matches!(
        follow_uc(&repo).execute(bob.id, Uuid::now_v7(), None).await,
        Err(ApiError::UserNotFound)
    ));
    assert!(matches!(
        unfollow_uc(&repo).execute(bob.id, alice.id).await,
        Err(ApiError::FollowNotFound)
    ));

    follow_uc(&repo).execute(bob.id, alice.id, None).await.unwrap();
    unfollow_uc(&repo).execute(bob.id, alice.id).await.unwrap();
    assert!(repo.store.lock().unwrap().follows.is_empty());
}

#[tokio::test]
async fn should_cap_subscription_previews_but_count_all_recipes() {
    let repo = InMemoryRepo::default();
    let alice = repo.add_user("alice");
    let carol = repo.add_user("carol");
    let bob = repo.add_user("bob");
    let alice_recipes = publish(&repo, alice.id, 3).await;
    publish(&repo, carol.id, 1).await;

    let subscription = follow_uc(&repo)
        .execute(bob.id, alice.id, Some(2))
        .await
        .unwrap();
    assert_eq!(subscription.recipes_count, 3);
    let preview: Vec<i32> = subscription.recipes.iter().map(|r| r.id).collect();
    assert_eq!(preview, [alice_recipes[2], alice_recipes[1]]);

    follow_uc(&repo).execute(bob.id, carol.id, None).await.unwrap();

    let page = ListSubscriptionsUseCase {
        follows: repo.clone(),
        recipes: repo.clone(),
    }
    .execute(bob.id, PageRequest::default(), Some(1))
    .await
    .unwrap();
    assert_eq!(page.count, 2);
    let authors: Vec<&str> = page
        .results
        .iter()
        .map(|s| s.author.username.as_str())
        .collect();
    assert_eq!(authors, ["alice", "carol"]);
    assert_eq!(page.results[0].recipes.len(), 1);
    assert_eq!(page.results[0].recipes_count, 3);
    assert_eq!(page.results[1].recipes_count, 1);
}

#[tokio::test]
async fn should_mark_author_as_subscribed_for_follower() {
    let repo = InMemoryRepo::default();
    let alice = repo.add_user("alice");
    let bob = repo.add_user("bob");
    let recipe_id = publish(&repo, alice.id, 1).await[0];
    follow_uc(&repo).execute(bob.id, alice.id, None).await.unwrap();

    let get = GetRecipeUseCase { repo: repo.clone() };
    let as_follower = get.execute(recipe_id, Some(bob.id)).await.unwrap();
    assert!(as_follower.author.is_subscribed);
    let anonymous = get.execute(recipe_id, None).await.unwrap();
    assert!(!anonymous.author.is_subscribed);
}
