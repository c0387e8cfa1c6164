//! Results REST API: a CRUD resource over score entries with role-based
//! authorization, JSON/XML negotiation, and ETag/cache headers.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod outbound;
pub mod server;


/// Public OpenAPI surface used by tooling.
pub use doc::ApiDoc;
