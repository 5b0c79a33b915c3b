//! openFDA outbound adapter.
//!
//! This module provides a thin HTTP implementation of the
//! `DrugInformationSource` port.

mod dto;
mod http_source;

pub use http_source::OpenFdaHttpSource;
