use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use foodgram_core::health::healthz;
use foodgram_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    follow::{list_subscriptions, subscribe, unsubscribe},
    health::readyz,
    ingredient::{create_ingredient, get_ingredient, list_ingredients},
    recipe::{
        create_recipe, delete_recipe, get_recipe, get_recipe_image, list_recipes, update_recipe,
    },
    recipe_list::{add_favorite, add_to_shopping_cart, remove_favorite, remove_from_shopping_cart},
    shopping_list::download_shopping_cart,
    tag::{create_tag, get_tag, list_tags},
    user::{create_user, get_me, get_user, list_users},
};
use crate::state::AppState;

pub fn build_router(state: AppState, body_limit_bytes: usize) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Users
        .route("/users", get(list_users).post(create_user))
        .route("/users/me", get(get_me))
        .route("/users/subscriptions", get(list_subscriptions))
        .route("/users/{id}", get(get_user))
        .route("/users/{id}/subscribe", post(subscribe).delete(unsubscribe))
        // Catalog
        .route("/tags", get(list_tags).post(create_tag))
        .route("/tags/{id}", get(get_tag))
        .route("/ingredients", get(list_ingredients).post(create_ingredient))
        .route("/ingredients/{id}", get(get_ingredient))
        // Recipes
        .route("/recipes", get(list_recipes).post(create_recipe))
        .route(
            "/recipes/download_shopping_cart",
            get(download_shopping_cart),
        )
        .route(
            "/recipes/{id}",
            get(get_recipe)
                .patch(update_recipe)
                .put(update_recipe)
                .delete(delete_recipe),
        )
        .route("/recipes/{id}/image", get(get_recipe_image))
        .route(
            "/recipes/{id}/favorite",
            post(add_favorite).delete(remove_favorite),
        )
        .route(
            "/recipes/{id}/shopping_cart",
            post(add_to_shopping_cart).delete(remove_from_shopping_cart),
        )
        .layer(DefaultBodyLimit::max(body_limit_bytes))
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
