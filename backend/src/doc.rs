//! OpenAPI documentation surface.

use utoipa::OpenApi;

use crate::domain::Message;
use crate::inbound::http::results::{
    CreateResultRequest, ResultBody, ResultEnvelope, ResultsEnvelope, UpdateResultRequest,
    UserBody,
};
use crate::inbound::http::users::LoginRequest;

/// Aggregated API description served to tooling.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::inbound::http::results::list,
        crate::inbound::http::results::get_by_id,
        crate::inbound::http::results::get_by_user,
        crate::inbound::http::results::create,
        crate::inbound::http::results::update,
        crate::inbound::http::results::remove,
        crate::inbound::http::results::options_collection,
        crate::inbound::http::results::options_item,
        crate::inbound::http::users::login,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Message,
        UserBody,
        ResultBody,
        ResultEnvelope,
        ResultsEnvelope,
        CreateResultRequest,
        UpdateResultRequest,
        LoginRequest,
    )),
    tags(
        (name = "results", description = "Results resource"),
        (name = "login", description = "Session establishment"),
        (name = "health", description = "Probes")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_includes_the_results_paths() {
        let doc = ApiDoc::openapi();
        let json = serde_json::to_string(&doc).expect("openapi serializes");
        assert!(json.contains("/api/v1/results"));
        assert!(json.contains("/api/v1/login"));
    }
}
