//! Society management backend library modules.

pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

pub mod doc;

pub use doc::ApiDoc;
pub use middleware::Trace;
