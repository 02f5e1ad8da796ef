//! Gateway-injected identity headers extractor.

use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use http::request::Parts;
use uuid::Uuid;

use foodgram_domain::user::UserRole;

pub const USER_ID_HEADER: &str = "x-foodgram-user-id";
pub const USER_ROLE_HEADER: &str = "x-foodgram-user-role";

/// User identity injected by the gateway via `x-foodgram-user-id` and `x-foodgram-user-role`.
///
/// Required form returns 401 if either header is absent or malformed.
/// `Option<IdentityHeaders>` treats a request without `x-foodgram-user-id` as anonymous
/// but still rejects malformed headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityHeaders {
    pub user_id: Uuid,
    pub user_role: UserRole,
}

/// 401 with the same JSON body shape services use for their own errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityRejection;

impl IntoResponse for IdentityRejection {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "kind": "UNAUTHORIZED",
            "message": "unauthorized",
        });
        (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response()
    }
}

fn parse_identity(parts: &Parts) -> Option<Result<IdentityHeaders, IdentityRejection>> {
    let raw_user_id = parts.headers.get(USER_ID_HEADER)?;
    let user_id = raw_user_id
        .to_str()
        .ok()
        .and_then(|s| s.parse::<Uuid>().ok());
    let user_role = parts
        .headers
        .get(USER_ROLE_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<u8>().ok())
        .and_then(UserRole::from_u8);
    Some(match (user_id, user_role) {
        (Some(user_id), Some(user_role)) => Ok(IdentityHeaders { user_id, user_role }),
        _ => Err(IdentityRejection),
    })
}

impl<S> FromRequestParts<S> for IdentityHeaders
where
    S: Send + Sync,
{
    type Rejection = IdentityRejection;

    // Resolve synchronously and return a 'static future so the parts borrow
    // does not leak into the returned future.
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let identity = parse_identity(parts).unwrap_or(Err(IdentityRejection));
        async move { identity }
    }
}

impl<S> OptionalFromRequestParts<S> for IdentityHeaders
where
    S: Send + Sync,
{
    type Rejection = IdentityRejection;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Option<Self>, Self::Rejection>> + Send {
        let identity = parse_identity(parts).transpose();
        async move { identity }
    }
}

impl IdentityHeaders {
    pub fn is_admin(&self) -> bool {
        self.user_role.can_manage_catalog()
    }
}
