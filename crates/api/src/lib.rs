//! HTTP API: server wiring, session middleware, access guard and the
//! response envelope.

pub mod app;
pub mod authz;
pub mod context;
pub mod middleware;
