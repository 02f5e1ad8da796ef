use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
};

use foodgram_auth_types::identity::IdentityHeaders;

use crate::error::ApiError;
use crate::state::AppState;
use crate::usecase::shopping_list::DownloadShoppingListUseCase;

pub const SHOPPING_LIST_FILENAME: &str = "shoping_list.txt";

// ── GET /recipes/download_shopping_cart ──────────────────────────────────────

pub async fn download_shopping_cart(
    identity: IdentityHeaders,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let uc = DownloadShoppingListUseCase {
        repo: state.shopping_list_repo(),
    };
    let list = uc.execute(identity.user_id).await?;
    tracing::info!(
        user_id = %identity.user_id,
        lines = list.items().len(),
        "shopping list downloaded"
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{SHOPPING_LIST_FILENAME}\""),
            ),
        ],
        list.render(),
    ))
}
