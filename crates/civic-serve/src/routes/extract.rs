use crate::middleware::correlation::CorrelationId;
use crate::routes::error::{ErrorEnvelope, map_error};
use axum::Json;
use axum::extract::{FromRequestParts, Query};
use axum::http::StatusCode;
use axum::http::request::Parts;
use civic_core::error::CivicError;
use serde::de::DeserializeOwned;

/// `Query` whose rejection is reported through the error envelope.
pub struct ApiQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorEnvelope>);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => {
                let correlation_id = parts
                    .extensions
                    .get::<CorrelationId>()
                    .map(|id| id.0.clone());
                Err(map_error(
                    &CivicError::invalid_input(rejection.body_text()),
                    correlation_id,
                ))
            }
        }
    }
}
