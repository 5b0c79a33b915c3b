//! Hospital administration frontend.
//!
//! The crate models the client side of a hospital management system: a
//! session store holding the logged-in identity, a route guard deciding
//! which views each role may open, and adapters for the REST backend, the
//! public drug information API and the on-disk session state.
//!
//! - [`domain`]: session, routing, records and the ports adapters implement.
//! - [`outbound`]: HTTP and filesystem adapters.
//! - [`config`]: `HOSPITAL_*` settings.
//! - [`app`]: the [`app::Frontend`] context wiring it all together.

pub mod app;
pub mod config;
pub mod domain;
pub mod outbound;
