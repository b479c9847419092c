#![forbid(unsafe_code)]

pub mod roster;
pub mod script;
pub mod timeline;
