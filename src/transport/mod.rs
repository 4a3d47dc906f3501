//! Terminal front-end over the backend client

pub mod cli;
pub mod table;
