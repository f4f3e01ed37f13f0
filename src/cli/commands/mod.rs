//! CLI command implementations

pub mod drain;
pub mod init;
pub mod send;
pub mod status;
pub mod validate;
