//! External integrations
//!
//! - [`sender`] - transport contract and the HTTP ingestion client

pub mod sender;
