//! API module
//!
//! This module provides the API functionality for the agency portal,
//! including the server, the HTML views, and the clients.

pub mod client;
pub mod server;
pub mod ui;

// Re-export commonly used types
pub use client::{Client, ClientConfig, ClientError, CoreClient, HttpClientImpl, PostRequest};
pub use server::{router, serve, ServerConfig};
