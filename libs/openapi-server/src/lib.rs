//! Wire models shared by the pushgate HTTP API and its webhook payloads

pub mod models;
