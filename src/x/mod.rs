#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Application modules.

pub mod authz;
