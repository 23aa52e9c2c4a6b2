//! Agency portal library crate
//!
//! A social media management portal shared by an agency and its client
//! brands. The portal state lives in a [`Context`] that is changed only by
//! dispatching [`Action`]s; everything the views show is derived from it.

pub mod admin;
pub mod api;
pub mod cli;
pub mod composer;
pub mod context;
pub mod models;
pub mod nav;
pub mod scope;
pub mod seed;
pub mod views;

pub use context::{Action, Context, Core, Outcome, PortalConfig, PortalError, Snapshot};
pub use scope::{ClientSelection, Session};
