//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **storage**: session entries in a local state directory
//! - **rest**: the hospital REST backend over HTTP
//! - **openfda**: the public drug information API
//!
//! Adapters are thin translators between domain types and wire formats. They
//! contain no business logic.

pub mod openfda;
mod preview;
pub mod rest;
pub mod storage;
