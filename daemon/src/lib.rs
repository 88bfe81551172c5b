//! Pushgate library
//!
//! Core modules for the pushgate deployment daemon.

pub mod app;
pub mod deploy;
pub mod errors;
pub mod events;
pub mod fetch;
pub mod filesys;
pub mod http;
pub mod logs;
pub mod server;
pub mod storage;
pub mod utils;
