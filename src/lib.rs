// src/lib.rs
pub mod config;
pub mod connectors;
pub mod core;
pub mod error;
pub mod storage;
pub mod strategies;
pub mod tui;
pub mod types;
pub mod utils;
