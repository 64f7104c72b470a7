#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Core application primitives (types, state, execution context, routing).

pub mod app;
pub mod config;
pub mod context;
pub mod errors;
pub mod pagination;
pub mod router;
pub mod state;
pub mod types;
