use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Recipe service error variants.
///
/// Duplicate relations answer 400 rather than 409, matching what existing
/// clients of this API expect.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    // validation
    #[error("at least one ingredient required")]
    NoIngredients,
    #[error("amount below minimum")]
    AmountBelowMinimum,
    #[error("duplicate ingredient")]
    DuplicateIngredient,
    #[error("at least one tag required")]
    NoTags,
    #[error("cooking time below minimum")]
    CookingTimeBelowMinimum,
    #[error("invalid name")]
    InvalidName,
    #[error("invalid text")]
    InvalidText,
    #[error("invalid image")]
    InvalidImage,
    #[error("image required")]
    ImageRequired,
    #[error("invalid username")]
    InvalidUsername,
    #[error("invalid email")]
    InvalidEmail,
    #[error("invalid slug")]
    InvalidSlug,
    #[error("invalid color")]
    InvalidColor,
    #[error("cannot follow self")]
    SelfFollow,
    #[error("shopping cart is empty")]
    EmptyShoppingCart,
    #[error("invalid query")]
    InvalidQuery,
    #[error("missing data")]
    MissingData,

    // conflicts
    #[error("recipe already in favorites")]
    FavoriteAlreadyExists,
    #[error("recipe already in shopping cart")]
    ShoppingCartEntryAlreadyExists,
    #[error("already subscribed")]
    FollowAlreadyExists,
    #[error("user already exists")]
    UserAlreadyExists,
    #[error("tag already exists")]
    TagAlreadyExists,
    #[error("ingredient already exists")]
    IngredientAlreadyExists,

    // not found
    #[error("recipe not found")]
    RecipeNotFound,
    #[error("ingredient not found")]
    IngredientNotFound,
    #[error("tag not found")]
    TagNotFound,
    #[error("user not found")]
    UserNotFound,
    #[error("image not found")]
    ImageNotFound,
    #[error("recipe not in favorites")]
    FavoriteNotFound,
    #[error("recipe not in shopping cart")]
    ShoppingCartEntryNotFound,
    #[error("subscription not found")]
    FollowNotFound,

    #[error("profile required")]
    ProfileRequired,
    #[error("forbidden")]
    Forbidden,
    #[error("unauthorized")]
    Unauthorized,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NoIngredients => "NO_INGREDIENTS",
            Self::AmountBelowMinimum => "AMOUNT_BELOW_MINIMUM",
            Self::DuplicateIngredient => "DUPLICATE_INGREDIENT",
            Self::NoTags => "NO_TAGS",
            Self::CookingTimeBelowMinimum => "COOKING_TIME_BELOW_MINIMUM",
            Self::InvalidName => "INVALID_NAME",
            Self::InvalidText => "INVALID_TEXT",
            Self::InvalidImage => "INVALID_IMAGE",
            Self::ImageRequired => "IMAGE_REQUIRED",
            Self::InvalidUsername => "INVALID_USERNAME",
            Self::InvalidEmail => "INVALID_EMAIL",
            Self::InvalidSlug => "INVALID_SLUG",
            Self::InvalidColor => "INVALID_COLOR",
            Self::SelfFollow => "SELF_FOLLOW",
            Self::EmptyShoppingCart => "EMPTY_SHOPPING_CART",
            Self::InvalidQuery => "INVALID_QUERY",
            Self::MissingData => "MISSING_DATA",
            Self::FavoriteAlreadyExists => "FAVORITE_ALREADY_EXISTS",
            Self::ShoppingCartEntryAlreadyExists => "SHOPPING_CART_ENTRY_ALREADY_EXISTS",
            Self::FollowAlreadyExists => "FOLLOW_ALREADY_EXISTS",
            Self::UserAlreadyExists => "USER_ALREADY_EXISTS",
            Self::TagAlreadyExists => "TAG_ALREADY_EXISTS",
            Self::IngredientAlreadyExists => "INGREDIENT_ALREADY_EXISTS",
            Self::RecipeNotFound => "RECIPE_NOT_FOUND",
            Self::IngredientNotFound => "INGREDIENT_NOT_FOUND",
            Self::TagNotFound => "TAG_NOT_FOUND",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::ImageNotFound => "IMAGE_NOT_FOUND",
            Self::FavoriteNotFound => "FAVORITE_NOT_FOUND",
            Self::ShoppingCartEntryNotFound => "SHOPPING_CART_ENTRY_NOT_FOUND",
            Self::FollowNotFound => "FOLLOW_NOT_FOUND",
            Self::ProfileRequired => "PROFILE_REQUIRED",
            Self::Forbidden => "FORBIDDEN",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::RecipeNotFound
            | Self::IngredientNotFound
            | Self::TagNotFound
            | Self::UserNotFound
            | Self::ImageNotFound
            | Self::FavoriteNotFound
            | Self::ShoppingCartEntryNotFound
            | Self::FollowNotFound => StatusCode::NOT_FOUND,
            Self::Forbidden | Self::ProfileRequired => StatusCode::FORBIDDEN,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let Self::Internal(ref e) = self {
            tracing::error!(error = ?e, kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
