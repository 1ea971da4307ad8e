//! Headless host adapter: JSON-line protocol and the tick loop that serves it

pub mod protocol;
pub mod runner;

pub use protocol::{encode_event, parse_command, HostCommand, HostEvent};
pub use runner::{Flow, HostRunner};
