//! Data transfer objects for inbound chat traffic

mod incoming;

pub use incoming::{Command, IncomingMessage};
