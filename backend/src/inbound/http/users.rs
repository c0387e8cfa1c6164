//! Login handler establishing the cookie session.
//!
//! ```text
//! POST /api/v1/login {"email":"admin@example.com","password":"password"}
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, LoginCredentials, LoginValidationError, Message};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Login request body for `POST /api/v1/login`.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

fn map_login_validation_error(err: LoginValidationError) -> DomainError {
    match err {
        LoginValidationError::EmptyEmail => {
            DomainError::bad_request("email must not be empty")
        }
        LoginValidationError::EmptyPassword => {
            DomainError::bad_request("password must not be empty")
        }
    }
}

/// Authenticate a user and establish a session.
///
/// Login sits outside the `.{fmt}`-negotiated surface, so failures render
/// as JSON through the centralized `ResponseError` mapping.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success",
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Message),
        (status = 401, description = "Invalid credentials", body = Message)
    ),
    tags = ["login"],
    operation_id = "login",
    security([])
)]
#[post("/api/v1/login")]
pub async fn login(
    session: SessionContext,
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials = LoginCredentials::try_from_parts(&payload.email, &payload.password)
        .map_err(map_login_validation_error)?;
    let identity = state.login.authenticate(&credentials).await?;
    session.persist_identity(&identity)?;
    Ok(HttpResponse::Ok().finish())
}
