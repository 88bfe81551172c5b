//! Outbound HTTP

pub mod client;
