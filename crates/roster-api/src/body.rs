//! JSON request bodies whose rejections use the API's error body.

use axum::{
  Json,
  extract::{FromRequest, Request, rejection::JsonRejection},
};

use crate::error::ApiError;

/// [`Json`] with [`ApiError`] as its rejection, so a malformed body or a
/// missing content type still answers with `{"error": ...}`.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
  Json<T>: FromRequest<S, Rejection = JsonRejection>,
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
    let Json(value) = Json::<T>::from_request(req, state).await?;
    Ok(Self(value))
  }
}
