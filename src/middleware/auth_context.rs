use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};

use crate::models::AppState;

/// Bearer token exactly as the page presented it, if it presented one.
/// Identity resolution happens against the external directory, so extraction
/// never rejects; an absent or malformed header surfaces downstream as an
/// absent session.
#[derive(Debug, Clone)]
pub struct MaybeBearer(pub Option<String>);

impl FromRequestParts<AppState> for MaybeBearer {
    type Rejection = std::convert::Infallible;

    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        async move {
            let authz: Option<TypedHeader<Authorization<Bearer>>> =
                TypedHeader::from_request_parts(parts, state).await.ok();

            Ok(MaybeBearer(
                authz.map(|TypedHeader(a)| a.token().to_string()),
            ))
        }
    }
}
