//! Durable session storage on the local filesystem.

mod atomic_io;
mod file_session;

pub use file_session::{FileSessionStorage, TOKEN_ENTRY, USER_ENTRY};
