//! mcp-console: admin console and chat front-end for an access-control and
//! chat-routing backend
//!
//! This library provides:
//! - A typed client for the backend's REST surface (users, roles,
//!   permissions, resources, associations, permission tests, chat routing)
//! - Normalized `{status, data, message}` envelopes for every call
//! - A chat session with an in-memory transcript
//! - Terminal rendering for the console binary

pub mod chat;
pub mod client;
pub mod config;
pub mod transport;

pub use client::{BackendClient, ClientError, Envelope, ResourceFamily};
pub use config::Config;
