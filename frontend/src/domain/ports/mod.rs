//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod auth_gateway;
mod drug_information;
mod session_storage;

#[cfg(test)]
pub use auth_gateway::MockAuthGateway;
pub use auth_gateway::{ApiError, AuthGateway};
#[cfg(test)]
pub use drug_information::MockDrugInformationSource;
pub use drug_information::{DrugInformationSource, DrugSourceError};
#[cfg(test)]
pub use session_storage::MockSessionStorage;
pub use session_storage::{
    InMemorySessionStorage, SessionStorage, SessionStorageError, StoredSession,
};
