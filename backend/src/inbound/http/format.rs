//! Response format negotiation for the `.{fmt}` path suffix.
//!
//! The suffix wins when present; otherwise the `Accept` header is consulted
//! and JSON is the default. Routes constrain the suffix to `json|xml`, so an
//! unknown suffix never reaches a handler.

use actix_web::HttpRequest;
use actix_web::http::header;
use serde::Serialize;

use crate::domain::DomainError;

/// Negotiated wire format for a request/response pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Xml,
}

impl Format {
    /// Resolve the format from the matched route and request headers.
    pub fn negotiate(req: &HttpRequest) -> Self {
        if let Some(suffix) = req.match_info().get("format") {
            return if suffix == "xml" { Self::Xml } else { Self::Json };
        }

        let accepts_xml = req
            .headers()
            .get(header::ACCEPT)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|accept| {
                accept.contains("application/xml") || accept.contains("text/xml")
            });
        if accepts_xml { Self::Xml } else { Self::Json }
    }

    /// Media type advertised on responses in this format.
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Xml => "application/xml",
        }
    }

    /// Serialize a payload in this format.
    ///
    /// `root` names the XML document element; JSON ignores it.
    pub fn render<T: Serialize>(self, root: &str, value: &T) -> Result<String, DomainError> {
        match self {
            Self::Json => serde_json::to_string(value)
                .map_err(|err| DomainError::internal(format!("json serialization failed: {err}"))),
            Self::Xml => quick_xml::se::to_string_with_root(root, value)
                .map_err(|err| DomainError::internal(format!("xml serialization failed: {err}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;
    use rstest::rstest;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Sample {
        code: u16,
        message: String,
    }

    #[rstest]
    #[case(None, Format::Json)]
    #[case(Some("application/json"), Format::Json)]
    #[case(Some("application/xml"), Format::Xml)]
    #[case(Some("text/xml, application/json;q=0.5"), Format::Xml)]
    fn negotiates_from_accept_header(#[case] accept: Option<&str>, #[case] expected: Format) {
        let mut request = TestRequest::default();
        if let Some(accept) = accept {
            request = request.insert_header((header::ACCEPT, accept));
        }
        let req = request.to_http_request();
        assert_eq!(Format::negotiate(&req), expected);
    }

    #[rstest]
    fn renders_json() {
        let sample = Sample {
            code: 404,
            message: "Not Found".to_owned(),
        };
        let body = Format::Json.render("message", &sample).expect("renders");
        assert_eq!(body, r#"{"code":404,"message":"Not Found"}"#);
    }

    #[rstest]
    fn renders_xml_with_root_element() {
        let sample = Sample {
            code: 404,
            message: "Not Found".to_owned(),
        };
        let body = Format::Xml.render("message", &sample).expect("renders");
        assert!(body.starts_with("<message>"), "body: {body}");
        assert!(body.contains("<code>404</code>"), "body: {body}");
        assert!(body.ends_with("</message>"), "body: {body}");
    }
}
