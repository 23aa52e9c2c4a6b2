//! Session and client scope
//!
//! Resolves which brand the signed-in user is looking at and filters the
//! brand-owned collections down to that scope.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::{Client, ClientScoped, User, UserRole};

/// Value the client switcher uses for the agency-wide view
pub const GLOBAL_SENTINEL: &str = "global";

/// What an agency user has picked in the client switcher
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum ClientSelection {
    #[default]
    Global,
    Client(String),
}

impl ClientSelection {
    pub fn client_id(&self) -> Option<&str> {
        match self {
            ClientSelection::Global => None,
            ClientSelection::Client(id) => Some(id),
        }
    }
}

impl FromStr for ClientSelection {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == GLOBAL_SENTINEL {
            Ok(ClientSelection::Global)
        } else {
            Ok(ClientSelection::Client(s.to_string()))
        }
    }
}

impl fmt::Display for ClientSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientSelection::Global => f.write_str(GLOBAL_SENTINEL),
            ClientSelection::Client(id) => f.write_str(id),
        }
    }
}

/// An authenticated session. Each variant carries only what is valid for its role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "role")]
pub enum Session {
    Agency {
        user: User,
        selection: ClientSelection,
    },
    Client {
        user: User,
        client_id: String,
    },
}

impl Session {
    /// Starts a session for the given user.
    ///
    /// Agency sessions start in the global scope. Returns `None` for a client
    /// user without a linked brand.
    pub fn start(user: User) -> Option<Self> {
        match user.role {
            UserRole::Agency => Some(Session::Agency {
                user,
                selection: ClientSelection::Global,
            }),
            UserRole::Client => {
                let client_id = user.client_id.clone()?;
                Some(Session::Client { user, client_id })
            }
        }
    }

    pub fn user(&self) -> &User {
        match self {
            Session::Agency { user, .. } | Session::Client { user, .. } => user,
        }
    }

    pub fn role(&self) -> UserRole {
        match self {
            Session::Agency { .. } => UserRole::Agency,
            Session::Client { .. } => UserRole::Client,
        }
    }

    /// Applies a switcher selection. Client sessions are pinned to their own
    /// brand, so this returns `false` for them and changes nothing.
    pub fn select(&mut self, new_selection: ClientSelection) -> bool {
        match self {
            Session::Agency { selection, .. } => {
                *selection = new_selection;
                true
            }
            Session::Client { .. } => false,
        }
    }

    /// The client id this session is scoped to, if any
    pub fn scoped_client_id(&self) -> Option<&str> {
        match self {
            Session::Agency { selection, .. } => selection.client_id(),
            Session::Client { client_id, .. } => Some(client_id),
        }
    }
}

/// Resolves the brand currently in scope.
///
/// An id that matches no client resolves to `None`, the same as the global view.
pub fn active_client<'a>(session: Option<&Session>, clients: &'a [Client]) -> Option<&'a Client> {
    let id = session?.scoped_client_id()?;
    clients.iter().find(|c| c.id == id)
}

/// Keeps the items owned by the active client, or all of them in global scope.
/// Source order is preserved.
pub fn filter_scoped<'a, T: ClientScoped>(items: &'a [T], active: Option<&Client>) -> Vec<&'a T> {
    match active {
        None => items.iter().collect(),
        Some(client) => items
            .iter()
            .filter(|item| item.client_id() == client.id)
            .collect(),
    }
}
