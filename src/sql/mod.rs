//! Statement processing
//!
//! - `parser`: tokenizer, command grammar and WHERE conditions
//! - `types`: cell values and comparison rules
//! - `schema`: in-memory table model and its line format
//! - `executor`: one executor per command
//! - `engine`: session state and statement dispatch

pub mod parser;
pub mod types;
pub mod schema;
pub mod executor;
pub mod engine;
