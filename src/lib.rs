//! TabDB - a small relational engine over tab-separated table files
//!
//! This crate provides:
//! - A statement language front end (tokenizer, classifier, recursive-descent parser)
//! - WHERE-clause condition trees and their evaluation
//! - Command execution against whole in-memory tables
//! - Pluggable table storage (on-disk and in-memory)
//! - A line-oriented TCP transport

pub mod config;
pub mod error;
pub mod server;
pub mod sql;
pub mod storage;

pub use config::Config;
pub use error::{Error, Result};
pub use sql::engine::Session;
pub use storage::{Storage, file::FileStorage, memory::MemoryStorage};
