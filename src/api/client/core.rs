//! Core client implementation
//!
//! This module provides a client implementation that wraps Core directly,
//! providing the same interface as HttpClientImpl but without HTTP overhead.

use super::{Client, ClientError};
use crate::context::{Action, Core, Outcome, PortalError, PortalResponse, Snapshot};

/// A client implementation that wraps Core directly
#[derive(Clone)]
pub struct CoreClient {
    core: Core,
}

impl CoreClient {
    /// Create a new CoreClient with the given Core instance
    pub fn new(core: Core) -> Self {
        Self { core }
    }
}

/// Convert PortalError to ClientError for interface compatibility
impl From<PortalError> for ClientError {
    fn from(error: PortalError) -> Self {
        match error {
            PortalError::NotAuthenticated => ClientError::NotAuthenticated,
            PortalError::InvalidInput(msg) => ClientError::Api(msg),
        }
    }
}

#[async_trait::async_trait]
impl Client for CoreClient {
    async fn get_state(&self) -> Result<Snapshot, ClientError> {
        Ok(self.core.snapshot())
    }

    async fn dispatch(&self, action: Action) -> Result<PortalResponse<Outcome>, ClientError> {
        self.core.dispatch(action).map_err(ClientError::from)
    }

    async fn dispatch_all(
        &self,
        actions: Vec<Action>,
    ) -> Result<PortalResponse<Outcome>, ClientError> {
        self.core.dispatch_all(actions).map_err(ClientError::from)
    }
}
