//! REST backend adapters.
//!
//! [`RestClient`] is the shared transport; [`HttpAuthGateway`] implements the
//! authentication port and [`ResourceEndpoint`] gives typed CRUD access to
//! each collection.

mod auth;
mod client;
mod dto;
mod endpoint;
mod errors;

pub use auth::HttpAuthGateway;
pub use client::RestClient;
pub use endpoint::ResourceEndpoint;
