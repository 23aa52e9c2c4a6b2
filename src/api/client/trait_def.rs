//! Client trait definition
//!
//! This module defines the `Client` trait that abstracts over different client implementations.

use serde::{Deserialize, Serialize};

use super::ClientError;
use crate::context::{Action, Outcome, PortalResponse, Snapshot};
use crate::models::Platform;
use crate::nav::Tab;

/// Everything needed to schedule a post in one go
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostRequest {
    /// Ignored when a brand is in scope; the composer is locked to it
    pub client_id: Option<String>,
    pub title: String,
    pub content: String,
    /// Local date-time, e.g. `2024-06-01T10:00`
    pub date: String,
    pub platforms: Vec<Platform>,
}

/// Trait defining the client interface for the portal.
///
/// Implementors provide state access and dispatch; the form workflows are
/// built on top of those as sequences of actions.
#[async_trait::async_trait]
pub trait Client: Send + Sync {
    /// Get the current portal state
    async fn get_state(&self) -> Result<Snapshot, ClientError>;

    /// Apply a single action
    async fn dispatch(&self, action: Action) -> Result<PortalResponse<Outcome>, ClientError>;

    /// Apply several actions in order as one transition. If any action fails
    /// none of them take effect.
    async fn dispatch_all(
        &self,
        actions: Vec<Action>,
    ) -> Result<PortalResponse<Outcome>, ClientError>;

    /// Fill in the login form and submit it
    async fn login(
        &self,
        email: String,
        password: String,
    ) -> Result<PortalResponse<Outcome>, ClientError> {
        self.dispatch_all(vec![
            Action::UpdateLogin {
                email: Some(email),
                password: Some(password),
            },
            Action::SubmitLogin,
        ])
        .await
    }

    async fn logout(&self) -> Result<PortalResponse<Outcome>, ClientError> {
        self.dispatch(Action::Logout).await
    }

    /// Select a brand by id, or `"global"` for the agency-wide view
    async fn switch_client(&self, client_id: String) -> Result<PortalResponse<Outcome>, ClientError> {
        self.dispatch(Action::SwitchClient { client_id }).await
    }

    async fn select_tab(&self, tab: Tab) -> Result<PortalResponse<Outcome>, ClientError> {
        self.dispatch(Action::SelectTab { tab }).await
    }

    async fn toggle_todo(&self, id: String) -> Result<PortalResponse<Outcome>, ClientError> {
        self.dispatch(Action::ToggleTodo { id }).await
    }

    /// Run the composer workflow with a fresh buffer. An ignored submission
    /// closes the composer again so the next attempt starts clean.
    async fn create_post(
        &self,
        request: PostRequest,
    ) -> Result<PortalResponse<Outcome>, ClientError> {
        let actions = vec![
            Action::CloseComposer,
            Action::OpenComposer,
            Action::UpdateComposer {
                client_id: request.client_id,
                title: Some(request.title),
                content: Some(request.content),
                date: Some(request.date),
            },
            Action::SetComposerPlatforms {
                platforms: request.platforms,
            },
            Action::SubmitComposer,
        ];

        let response = self.dispatch_all(actions).await?;
        if !response.inner().is_applied() {
            self.dispatch(Action::CloseComposer).await?;
        }
        Ok(response)
    }

    /// Run the "new team member" modal with a fresh buffer
    async fn add_member(
        &self,
        name: String,
        role: String,
        email: String,
    ) -> Result<PortalResponse<Outcome>, ClientError> {
        let response = self
            .dispatch_all(vec![
                Action::CloseMemberForm,
                Action::OpenMemberForm,
                Action::UpdateMemberForm {
                    name: Some(name),
                    role: Some(role),
                    email: Some(email),
                },
                Action::SubmitMemberForm,
            ])
            .await?;
        if !response.inner().is_applied() {
            self.dispatch(Action::CloseMemberForm).await?;
        }
        Ok(response)
    }

    /// Run the "new brand" modal with a fresh buffer
    async fn add_brand(
        &self,
        name: String,
        industry: String,
    ) -> Result<PortalResponse<Outcome>, ClientError> {
        let response = self
            .dispatch_all(vec![
                Action::CloseBrandForm,
                Action::OpenBrandForm,
                Action::UpdateBrandForm {
                    name: Some(name),
                    industry: Some(industry),
                },
                Action::SubmitBrandForm,
            ])
            .await?;
        if !response.inner().is_applied() {
            self.dispatch(Action::CloseBrandForm).await?;
        }
        Ok(response)
    }
}
