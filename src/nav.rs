//! Navigation shell
//!
//! Role-aware sidebar: the tab list, the agency client switcher, and the brand
//! card shown to client users.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::Client;
use crate::scope::{Session, GLOBAL_SENTINEL};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Dashboard,
    Calendar,
    Todos,
    Performance,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Dashboard, Tab::Calendar, Tab::Todos, Tab::Performance];

    /// Tabs that only make sense with a brand in scope
    pub fn is_client_only(&self) -> bool {
        matches!(self, Tab::Calendar | Tab::Todos)
    }

    pub fn is_enabled(&self, active: Option<&Client>) -> bool {
        !self.is_client_only() || active.is_some()
    }

    pub fn label(&self, active: Option<&Client>) -> &'static str {
        match self {
            Tab::Dashboard => "Dashboard",
            Tab::Calendar => "Calendario",
            Tab::Todos => "To-do List",
            Tab::Performance if active.is_some() => "Report",
            Tab::Performance => "Management Agency",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tab::Dashboard => "dashboard",
            Tab::Calendar => "calendar",
            Tab::Todos => "todos",
            Tab::Performance => "performance",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tab '{0}'")]
pub struct UnknownTab(pub String);

impl FromStr for Tab {
    type Err = UnknownTab;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tab::ALL
            .into_iter()
            .find(|tab| tab.as_str() == s.trim())
            .ok_or_else(|| UnknownTab(s.to_string()))
    }
}

/// One entry in the sidebar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavItem {
    pub tab: Tab,
    pub label: String,
    /// Disabled items are shown but inert
    pub enabled: bool,
    pub active: bool,
}

/// An option in the agency client switcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitcherOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// Sidebar content for the signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ScopeHeader {
    /// Agency users pick the brand from a switcher
    Switcher { options: Vec<SwitcherOption> },
    /// Client users see their own brand
    BrandCard { name: String, logo: String },
    /// Client user whose brand is missing from the collection
    None,
}

pub fn navigation(active_tab: Tab, active: Option<&Client>) -> Vec<NavItem> {
    Tab::ALL
        .into_iter()
        .map(|tab| NavItem {
            tab,
            label: tab.label(active).to_string(),
            enabled: tab.is_enabled(active),
            active: tab == active_tab,
        })
        .collect()
}

/// Switcher options: the global view first, then every brand
pub fn switcher_options(clients: &[Client], active: Option<&Client>) -> Vec<SwitcherOption> {
    let mut options = vec![SwitcherOption {
        value: GLOBAL_SENTINEL.to_string(),
        label: "TUTTI I PARTNER".to_string(),
        selected: active.is_none(),
    }];
    options.extend(clients.iter().map(|c| SwitcherOption {
        value: c.id.clone(),
        label: c.name.clone(),
        selected: active.map(|a| a.id == c.id).unwrap_or(false),
    }));
    options
}

pub fn scope_header(session: &Session, clients: &[Client], active: Option<&Client>) -> ScopeHeader {
    match session {
        Session::Agency { .. } => ScopeHeader::Switcher {
            options: switcher_options(clients, active),
        },
        Session::Client { .. } => match active {
            Some(client) => ScopeHeader::BrandCard {
                name: client.name.clone(),
                logo: client.logo.clone(),
            },
            None => ScopeHeader::None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_navigation_in_global_scope() {
        let items = navigation(Tab::Dashboard, None);
        let enabled: Vec<_> = items.iter().map(|i| (i.tab, i.enabled)).collect();
        assert_eq!(
            enabled,
            vec![
                (Tab::Dashboard, true),
                (Tab::Calendar, false),
                (Tab::Todos, false),
                (Tab::Performance, true),
            ]
        );
        assert_eq!(items[3].label, "Management Agency");
        assert!(items[0].active);
    }

    #[test]
    fn test_navigation_with_brand() {
        let clients = seed::default_clients();
        let items = navigation(Tab::Todos, Some(&clients[1]));
        assert!(items.iter().all(|i| i.enabled));
        assert_eq!(items[3].label, "Report");
        assert!(items[2].active);
    }

    #[test]
    fn test_switcher_marks_selection() {
        let clients = seed::default_clients();
        let options = switcher_options(&clients, Some(&clients[2]));
        assert_eq!(options.len(), 4);
        assert_eq!(options[0].value, "global");
        assert!(!options[0].selected);
        assert!(options[3].selected);
    }

    #[test]
    fn test_tab_parsing() {
        assert_eq!("todos".parse::<Tab>(), Ok(Tab::Todos));
        assert!("settings".parse::<Tab>().is_err());
    }
}
