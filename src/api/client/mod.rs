//! Client module
//!
//! This module provides client implementations that drive a portal, either over
//! HTTP or by wrapping a `Core` directly.

mod core;
mod http;
mod trait_def;

// Re-export the trait and types
pub use self::core::CoreClient;
pub use http::{ClientConfig, ClientError, HttpClientImpl};
pub use trait_def::{Client, PostRequest};
