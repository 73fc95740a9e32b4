//! Upstream routing: static endpoint table, query encoding and the router

mod encoding;
mod endpoints;
mod router;

pub use encoding::{build_query, encode_component, query_value};
pub use endpoints::{lookup as lookup_endpoint, Endpoint, ENDPOINTS};
pub use router::{Route, ToolRouter};
