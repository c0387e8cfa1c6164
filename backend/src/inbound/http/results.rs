//! Results API handlers.
//!
//! ```text
//! GET     /api/v1/results[.json|.xml]
//! GET     /api/v1/results/{id}[.json|.xml]
//! GET     /api/v1/results/all/{userId}[.json|.xml]
//! POST    /api/v1/results[.json|.xml]
//! PUT     /api/v1/results/{id}[.json|.xml]
//! DELETE  /api/v1/results/{id}[.json|.xml]
//! OPTIONS /api/v1/results[/{id}][.json|.xml]
//! ```
//!
//! Control flow per request: parse format, authorize, look up, mutate if
//! applicable, serialize with headers. Mutating operations require the
//! admin role.

use actix_web::{HttpRequest, HttpResponse, routes, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{ResultRepositoryError, UserPersistenceError};
use crate::domain::{
    DomainError, FORBIDDEN_MESSAGE, Identity, Message, ResultDraft, ResultEntry, Role,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::format::Format;
use crate::inbound::http::respond;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Canonical base path of the Results resource.
pub const RESULTS_PATH: &str = "/api/v1/results";

const ALLOW_COLLECTION: &str = "GET, POST, OPTIONS";
const ALLOW_ITEM: &str = "GET, PUT, DELETE, OPTIONS";

/// Serialized user inside a result body.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserBody {
    pub id: i32,
    pub email: String,
    pub roles: Vec<String>,
}

/// Serialized result entity.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ResultBody {
    pub id: i32,
    pub result: i32,
    pub user: UserBody,
    #[schema(format = "date-time")]
    pub time: String,
}

/// Single-entity envelope: `{"resultEnt": {...}}`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ResultEnvelope {
    #[serde(rename = "resultEnt")]
    pub result_ent: ResultBody,
}

/// Collection envelope: `{"results": [{"resultEnt": {...}}, ...]}`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ResultsEnvelope {
    pub results: Vec<ResultEnvelope>,
}

impl From<&ResultEntry> for ResultBody {
    fn from(entry: &ResultEntry) -> Self {
        let user = entry.user();
        Self {
            id: entry.id(),
            result: entry.result(),
            user: UserBody {
                id: user.id(),
                email: user.email().to_string(),
                roles: user.roles().iter().map(|role| role.to_string()).collect(),
            },
            time: entry.time().to_rfc3339(),
        }
    }
}

impl From<&ResultEntry> for ResultEnvelope {
    fn from(entry: &ResultEntry) -> Self {
        Self {
            result_ent: ResultBody::from(entry),
        }
    }
}

impl From<&[ResultEntry]> for ResultsEnvelope {
    fn from(entries: &[ResultEntry]) -> Self {
        Self {
            results: entries.iter().map(ResultEnvelope::from).collect(),
        }
    }
}

/// Creation payload; both `result` and `user` are mandatory.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateResultRequest {
    /// Integer score to record.
    pub result: Option<i32>,
    /// Email of the owning user.
    pub user: Option<String>,
    /// RFC 3339 timestamp; defaults to the creation instant.
    pub time: Option<String>,
}

/// Update payload; only `result` is mutable, `time` resets to now.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateResultRequest {
    pub result: Option<i32>,
}

fn not_found() -> DomainError {
    DomainError::not_found("Not Found")
}

fn unprocessable() -> DomainError {
    DomainError::unprocessable_entity("Unprocessable Entity")
}

fn map_results_error(err: ResultRepositoryError) -> DomainError {
    tracing::error!(error = %err, "result repository failure");
    DomainError::internal("Internal Server Error")
}

fn map_users_error(err: UserPersistenceError) -> DomainError {
    tracing::error!(error = %err, "user repository failure");
    DomainError::internal("Internal Server Error")
}

fn require_admin(session: &SessionContext) -> Result<Identity, DomainError> {
    let identity = session.require_identity()?;
    if identity.has_role(Role::Admin) {
        Ok(identity)
    } else {
        Err(DomainError::forbidden(FORBIDDEN_MESSAGE))
    }
}

/// Parse a numeric path segment; route regexes already constrain it to
/// digits, so overflow is the only way this fails.
fn path_id(req: &HttpRequest, name: &str) -> Result<i32, DomainError> {
    req.match_info()
        .get(name)
        .and_then(|raw| raw.parse().ok())
        .ok_or_else(not_found)
}

/// Retrieve the collection of Result resources.
#[utoipa::path(
    get,
    path = "/api/v1/results",
    responses(
        (status = 200, description = "All results", body = ResultsEnvelope),
        (status = 401, description = "Unauthorized", body = Message),
        (status = 404, description = "No results exist", body = Message)
    ),
    tags = ["results"],
    operation_id = "listResults"
)]
#[routes]
#[get("/api/v1/results")]
#[get("/api/v1/results.{format:json|xml}")]
pub async fn list(
    req: HttpRequest,
    session: SessionContext,
    state: web::Data<HttpState>,
) -> HttpResponse {
    let format = Format::negotiate(&req);
    list_inner(format, &session, &state)
        .await
        .unwrap_or_else(|err| respond::error(format, &err))
}

async fn list_inner(
    format: Format,
    session: &SessionContext,
    state: &HttpState,
) -> ApiResult<HttpResponse> {
    session.require_identity()?;
    let results = state.results.find_all().await.map_err(map_results_error)?;
    // An empty collection is treated as absence, not as an empty success.
    if results.is_empty() {
        return Err(not_found());
    }
    respond::ok_cached(format, &ResultsEnvelope::from(results.as_slice()))
}

/// Retrieve a Result resource based on a single id.
#[utoipa::path(
    get,
    path = "/api/v1/results/{id}",
    params(("id" = i32, Path, description = "Result id")),
    responses(
        (status = 200, description = "The result", body = ResultEnvelope),
        (status = 401, description = "Unauthorized", body = Message),
        (status = 404, description = "No such result", body = Message)
    ),
    tags = ["results"],
    operation_id = "getResult"
)]
#[routes]
#[get("/api/v1/results/{id:\\d+}")]
#[get("/api/v1/results/{id:\\d+}.{format:json|xml}")]
pub async fn get_by_id(
    req: HttpRequest,
    session: SessionContext,
    state: web::Data<HttpState>,
) -> HttpResponse {
    let format = Format::negotiate(&req);
    get_by_id_inner(format, &req, &session, &state)
        .await
        .unwrap_or_else(|err| respond::error(format, &err))
}

async fn get_by_id_inner(
    format: Format,
    req: &HttpRequest,
    session: &SessionContext,
    state: &HttpState,
) -> ApiResult<HttpResponse> {
    session.require_identity()?;
    let id = path_id(req, "id")?;
    let entry = state
        .results
        .find(id)
        .await
        .map_err(map_results_error)?
        .ok_or_else(not_found)?;
    respond::ok_cached(format, &ResultEnvelope::from(&entry))
}

/// Retrieve the Results belonging to a user.
///
/// Two-stage existence check: the user must exist and must own at least one
/// result; both stages collapse to the same not-found error.
#[utoipa::path(
    get,
    path = "/api/v1/results/all/{userId}",
    params(("userId" = i32, Path, description = "User id")),
    responses(
        (status = 200, description = "The user's results", body = ResultsEnvelope),
        (status = 401, description = "Unauthorized", body = Message),
        (status = 404, description = "No such user or no results", body = Message)
    ),
    tags = ["results"],
    operation_id = "getUserResults"
)]
#[routes]
#[get("/api/v1/results/all/{user_id:\\d+}")]
#[get("/api/v1/results/all/{user_id:\\d+}.{format:json|xml}")]
pub async fn get_by_user(
    req: HttpRequest,
    session: SessionContext,
    state: web::Data<HttpState>,
) -> HttpResponse {
    let format = Format::negotiate(&req);
    get_by_user_inner(format, &req, &session, &state)
        .await
        .unwrap_or_else(|err| respond::error(format, &err))
}

async fn get_by_user_inner(
    format: Format,
    req: &HttpRequest,
    session: &SessionContext,
    state: &HttpState,
) -> ApiResult<HttpResponse> {
    session.require_identity()?;
    let user_id = path_id(req, "user_id")?;
    let user = state
        .users
        .find_by_id(user_id)
        .await
        .map_err(map_users_error)?
        .ok_or_else(not_found)?;
    let results = state
        .results
        .find_by_user(user.id())
        .await
        .map_err(map_results_error)?;
    if results.is_empty() {
        return Err(not_found());
    }
    respond::ok_cached(format, &ResultsEnvelope::from(results.as_slice()))
}

/// Create a Result resource.
#[utoipa::path(
    post,
    path = "/api/v1/results",
    request_body = CreateResultRequest,
    responses(
        (status = 201, description = "Created", body = ResultEnvelope,
            headers(("Location" = String, description = "Canonical URL of the new result"))),
        (status = 400, description = "Referenced user does not exist", body = Message),
        (status = 401, description = "Unauthorized", body = Message),
        (status = 403, description = "Admin role required", body = Message),
        (status = 422, description = "Missing required fields", body = Message)
    ),
    tags = ["results"],
    operation_id = "createResult"
)]
#[routes]
#[post("/api/v1/results")]
#[post("/api/v1/results.{format:json|xml}")]
pub async fn create(
    req: HttpRequest,
    session: SessionContext,
    state: web::Data<HttpState>,
    body: web::Bytes,
) -> HttpResponse {
    let format = Format::negotiate(&req);
    create_inner(format, &session, &state, &body)
        .await
        .unwrap_or_else(|err| respond::error(format, &err))
}

async fn create_inner(
    format: Format,
    session: &SessionContext,
    state: &HttpState,
    body: &[u8],
) -> ApiResult<HttpResponse> {
    require_admin(session)?;
    // An unreadable body degrades to an empty payload, surfacing as 422.
    let payload: CreateResultRequest = serde_json::from_slice(body).unwrap_or_default();
    let (Some(score), Some(email)) = (payload.result, payload.user.as_deref()) else {
        return Err(unprocessable());
    };

    // The referenced sub-resource being absent is a client data error, not a
    // missing primary resource: 400, distinguished from 404.
    let user = state
        .users
        .find_by_email(email)
        .await
        .map_err(map_users_error)?
        .ok_or_else(|| DomainError::bad_request("Bad Request"))?;

    let time = match payload.time {
        Some(raw) => DateTime::parse_from_rfc3339(&raw)
            .map(|time| time.with_timezone(&Utc))
            .map_err(|_| unprocessable())?,
        None => state.clock.utc(),
    };

    let draft = ResultDraft {
        result: score,
        user,
        time,
    };
    let entry = state.results.add(&draft).await.map_err(map_results_error)?;
    let location = format!("{RESULTS_PATH}/{}", entry.id());
    respond::created(format, &ResultEnvelope::from(&entry), location)
}

/// Update the Result resource.
///
/// Responds with the non-standard 209 "Content Returned" status; preserved
/// verbatim as an observable contract.
#[utoipa::path(
    put,
    path = "/api/v1/results/{id}",
    params(("id" = i32, Path, description = "Result id")),
    request_body = UpdateResultRequest,
    responses(
        (status = 209, description = "Updated; content returned", body = ResultEnvelope),
        (status = 401, description = "Unauthorized", body = Message),
        (status = 403, description = "Admin role required", body = Message),
        (status = 404, description = "No such result", body = Message),
        (status = 422, description = "Missing required fields", body = Message)
    ),
    tags = ["results"],
    operation_id = "updateResult"
)]
#[routes]
#[put("/api/v1/results/{id:\\d+}")]
#[put("/api/v1/results/{id:\\d+}.{format:json|xml}")]
pub async fn update(
    req: HttpRequest,
    session: SessionContext,
    state: web::Data<HttpState>,
    body: web::Bytes,
) -> HttpResponse {
    let format = Format::negotiate(&req);
    update_inner(format, &req, &session, &state, &body)
        .await
        .unwrap_or_else(|err| respond::error(format, &err))
}

async fn update_inner(
    format: Format,
    req: &HttpRequest,
    session: &SessionContext,
    state: &HttpState,
    body: &[u8],
) -> ApiResult<HttpResponse> {
    require_admin(session)?;
    let id = path_id(req, "id")?;
    let mut entry = state
        .results
        .find(id)
        .await
        .map_err(map_results_error)?
        .ok_or_else(not_found)?;

    let payload: UpdateResultRequest = serde_json::from_slice(body).unwrap_or_default();
    let Some(score) = payload.result else {
        return Err(unprocessable());
    };

    entry.set_result(score);
    entry.set_time(state.clock.utc());
    state
        .results
        .save(&entry)
        .await
        .map_err(map_results_error)?;
    respond::content_returned(format, &ResultEnvelope::from(&entry))
}

/// Remove the Result resource.
#[utoipa::path(
    delete,
    path = "/api/v1/results/{id}",
    params(("id" = i32, Path, description = "Result id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Unauthorized", body = Message),
        (status = 403, description = "Admin role required", body = Message),
        (status = 404, description = "No such result", body = Message)
    ),
    tags = ["results"],
    operation_id = "deleteResult"
)]
#[routes]
#[delete("/api/v1/results/{id:\\d+}")]
#[delete("/api/v1/results/{id:\\d+}.{format:json|xml}")]
pub async fn remove(
    req: HttpRequest,
    session: SessionContext,
    state: web::Data<HttpState>,
) -> HttpResponse {
    let format = Format::negotiate(&req);
    remove_inner(&req, &session, &state)
        .await
        .unwrap_or_else(|err| respond::error(format, &err))
}

async fn remove_inner(
    req: &HttpRequest,
    session: &SessionContext,
    state: &HttpState,
) -> ApiResult<HttpResponse> {
    require_admin(session)?;
    let id = path_id(req, "id")?;
    let removed = state.results.remove(id).await.map_err(map_results_error)?;
    if !removed {
        return Err(not_found());
    }
    Ok(HttpResponse::NoContent().finish())
}

/// List the HTTP methods supported by the collection path.
#[utoipa::path(
    options,
    path = "/api/v1/results",
    responses(
        (status = 204, description = "Supported methods in the Allow header")
    ),
    tags = ["results"],
    operation_id = "optionsResults",
    security([])
)]
#[routes]
#[options("/api/v1/results")]
#[options("/api/v1/results.{format:json|xml}")]
pub async fn options_collection() -> HttpResponse {
    respond::options_allow(ALLOW_COLLECTION)
}

/// List the HTTP methods supported by an item path.
#[utoipa::path(
    options,
    path = "/api/v1/results/{id}",
    params(("id" = i32, Path, description = "Result id")),
    responses(
        (status = 204, description = "Supported methods in the Allow header")
    ),
    tags = ["results"],
    operation_id = "optionsResult",
    security([])
)]
#[routes]
#[options("/api/v1/results/{id:\\d+}")]
#[options("/api/v1/results/{id:\\d+}.{format:json|xml}")]
pub async fn options_item() -> HttpResponse {
    respond::options_allow(ALLOW_ITEM)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockResultRepository;
    use crate::inbound::http::test_utils::{ADMIN_EMAIL, PASSWORD, seeded_state, test_app};
    use actix_web::http::StatusCode;
    use actix_web::{test as actix_test, web, App};
    use mockable::DefaultClock;
    use serde_json::{Value, json};
    use std::sync::Arc;

    #[actix_web::test]
    async fn repository_failures_surface_as_redacted_internal_errors() {
        let (seeded, _store) = seeded_state();
        let mut results = MockResultRepository::new();
        results
            .expect_find_all()
            .returning(|| Err(crate::domain::ports::ResultRepositoryError::connection(
                "connection refused at 10.0.0.7",
            )));
        let state = HttpState::new(
            Arc::new(results),
            seeded.users.clone(),
            seeded.login.clone(),
            Arc::new(DefaultClock),
        );

        let app = actix_test::init_service(test_app(state)).await;
        let login = actix_test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(json!({ "email": ADMIN_EMAIL, "password": PASSWORD }))
            .to_request();
        let login_res = actix_test::call_service(&app, login).await;
        let cookie = login_res
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie")
            .into_owned();

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/results")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["message"], "Internal Server Error");
    }

    #[actix_web::test]
    async fn envelope_serializes_the_wrapped_shape() {
        let (state, store) = seeded_state();
        let user = store
            .seed_user("scored@example.com", "secret", vec![crate::domain::Role::User])
            .expect("seed user");
        let entry = state
            .results
            .add(&ResultDraft {
                result: 7,
                user,
                time: chrono::Utc::now(),
            })
            .await
            .expect("add result");

        let value = serde_json::to_value(ResultEnvelope::from(&entry)).expect("serializes");
        assert_eq!(value["resultEnt"]["result"], 7);
        assert_eq!(value["resultEnt"]["user"]["email"], "scored@example.com");
        assert!(value["resultEnt"]["id"].is_i64());
    }

    #[actix_web::test]
    async fn path_id_rejects_overflowing_ids() {
        let app = actix_test::init_service(
            App::new().route(
                "/probe/{id:\\d+}",
                web::get().to(|req: actix_web::HttpRequest| async move {
                    match path_id(&req, "id") {
                        Ok(id) => actix_web::HttpResponse::Ok().body(id.to_string()),
                        Err(_) => actix_web::HttpResponse::NotFound().finish(),
                    }
                }),
            ),
        )
        .await;

        let ok = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/probe/42").to_request(),
        )
        .await;
        assert_eq!(ok.status(), StatusCode::OK);

        let overflow = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/probe/99999999999999999999")
                .to_request(),
        )
        .await;
        assert_eq!(overflow.status(), StatusCode::NOT_FOUND);
    }
}
