#![forbid(unsafe_code)]

pub mod model;
pub mod snapshot;
pub mod store;
