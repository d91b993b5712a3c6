use axum::{
    async_trait,
    extract::{
        FromRequest, FromRequestParts, Request,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, request::Parts},
};
use axum_valid::{Valid, ValidRejection};
use tracing::warn;
use validator::ValidationErrors;

use crate::helpers::errors::{ApiError, api_error};
use crate::schemas::ErrorResponse;

/// `axum_valid::Valid` with rejections reported through [`ErrorResponse`].
///
/// Wraps `Json<T>` or `Query<T>` where `T: Validate`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Checked<E>(pub E);

/// Status and message of an extractor rejection, read without consuming it.
pub trait RejectionDetail {
    fn status(&self) -> StatusCode;
    fn body_text(&self) -> String;
}

impl RejectionDetail for JsonRejection {
    fn status(&self) -> StatusCode {
        JsonRejection::status(self)
    }

    fn body_text(&self) -> String {
        JsonRejection::body_text(self)
    }
}

impl RejectionDetail for QueryRejection {
    fn status(&self) -> StatusCode {
        QueryRejection::status(self)
    }

    fn body_text(&self) -> String {
        QueryRejection::body_text(self)
    }
}

/// Failed `validator` rules; `field` is the first offending field by name.
pub fn validation_failed(errors: &ValidationErrors) -> ApiError {
    let field = errors
        .field_errors()
        .into_iter()
        .map(|(field, _)| field.to_string())
        .min();
    warn!("Request validation failed: {}", errors);

    let response = ErrorResponse::new(errors.to_string(), "VALIDATION_ERROR");
    let response = match field {
        Some(field) => response.with_field(&field),
        None => response,
    };
    api_error(StatusCode::BAD_REQUEST, response)
}

fn rejected<R: RejectionDetail>(rejection: ValidRejection<R>) -> ApiError {
    match rejection {
        ValidRejection::Valid(errors) => validation_failed(&errors),
        ValidRejection::Inner(inner) => {
            let message = inner.body_text();
            warn!("Malformed request: {}", message);
            api_error(inner.status(), ErrorResponse::new(message, "INVALID_REQUEST"))
        }
    }
}

#[async_trait]
impl<S, E, R> FromRequest<S> for Checked<E>
where
    S: Send + Sync,
    E: Send,
    R: RejectionDetail + Send,
    Valid<E>: FromRequest<S, Rejection = ValidRejection<R>>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Valid::<E>::from_request(req, state).await {
            Ok(Valid(inner)) => Ok(Checked(inner)),
            Err(rejection) => Err(rejected(rejection)),
        }
    }
}

#[async_trait]
impl<S, E, R> FromRequestParts<S> for Checked<E>
where
    S: Send + Sync,
    E: Send,
    R: RejectionDetail + Send,
    Valid<E>: FromRequestParts<S, Rejection = ValidRejection<R>>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Valid::<E>::from_request_parts(parts, state).await {
            Ok(Valid(inner)) => Ok(Checked(inner)),
            Err(rejection) => Err(rejected(rejection)),
        }
    }
}
