//! Tab content derived from portal state

use serde::{Deserialize, Serialize};

use crate::models::{AgencyMember, Client, Platform, Post, Todo};

/// How many posts the brand dashboard lists under "recent & upcoming"
pub const RECENT_POSTS_LIMIT: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum SecondTile {
    /// The scoped brand's channels
    Channels { platforms: Vec<Platform> },
    /// Number of brands managed by the agency
    Brands { count: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dashboard {
    pub eyebrow: String,
    pub heading: String,
    pub post_count: usize,
    pub second_tile: SecondTile,
    pub open_actions: usize,
    /// Brand list, only in global scope
    pub portfolio: Vec<Client>,
    /// Latest posts, only with a brand in scope
    pub recent_posts: Vec<Post>,
    pub can_compose: bool,
}

/// Agency management screen, shown on the performance tab in global scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamOverview {
    pub members: Vec<AgencyMember>,
    pub clients: Vec<Client>,
}

/// Calendar and to-do tabs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ScopedTab {
    /// A brand is in scope
    Brand { client_name: String, todos: Vec<Todo> },
    /// Global scope: the user has to pick a brand first
    PickBrand { clients: Vec<Client> },
}

pub fn dashboard(
    active: Option<&Client>,
    clients: &[Client],
    posts: &[&Post],
    todos: &[&Todo],
) -> Dashboard {
    let open_actions = todos.iter().filter(|t| !t.completed).count();

    match active {
        Some(client) => Dashboard {
            eyebrow: "Account Overview".to_string(),
            heading: client.name.clone(),
            post_count: posts.len(),
            second_tile: SecondTile::Channels {
                platforms: client.platforms.clone(),
            },
            open_actions,
            portfolio: Vec::new(),
            recent_posts: posts
                .iter()
                .take(RECENT_POSTS_LIMIT)
                .map(|p| (*p).clone())
                .collect(),
            can_compose: true,
        },
        None => Dashboard {
            eyebrow: "Agency Control".to_string(),
            heading: "Global Dashboard".to_string(),
            post_count: posts.len(),
            second_tile: SecondTile::Brands {
                count: clients.len(),
            },
            open_actions,
            portfolio: clients.to_vec(),
            recent_posts: Vec::new(),
            can_compose: false,
        },
    }
}

pub fn scoped_tab(active: Option<&Client>, clients: &[Client], todos: &[&Todo]) -> ScopedTab {
    match active {
        Some(client) => ScopedTab::Brand {
            client_name: client.name.clone(),
            todos: todos.iter().map(|t| (*t).clone()).collect(),
        },
        None => ScopedTab::PickBrand {
            clients: clients.to_vec(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::filter_scoped;
    use crate::seed;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_global_dashboard() {
        let clients = seed::default_clients();
        let posts = seed::default_posts();
        let todos = seed::default_todos();

        let view = dashboard(
            None,
            &clients,
            &filter_scoped(&posts, None),
            &filter_scoped(&todos, None),
        );
        assert_eq!(view.heading, "Global Dashboard");
        assert_eq!(view.post_count, 3);
        assert_eq!(view.second_tile, SecondTile::Brands { count: 3 });
        assert_eq!(view.open_actions, 2);
        assert_eq!(view.portfolio.len(), 3);
        assert!(view.recent_posts.is_empty());
        assert!(!view.can_compose);
    }

    #[test]
    fn test_brand_dashboard() {
        let clients = seed::default_clients();
        let posts = seed::default_posts();
        let todos = seed::default_todos();
        let active = Some(&clients[0]);

        let view = dashboard(
            active,
            &clients,
            &filter_scoped(&posts, active),
            &filter_scoped(&todos, active),
        );
        assert_eq!(view.heading, "TechCorp Solutions");
        assert_eq!(view.post_count, 2);
        assert_eq!(view.open_actions, 1);
        assert!(view.portfolio.is_empty());
        assert_eq!(view.recent_posts.len(), 2);
        assert!(view.can_compose);
    }

    #[test]
    fn test_scoped_tab_prompts_for_brand() {
        let clients = seed::default_clients();
        match scoped_tab(None, &clients, &[]) {
            ScopedTab::PickBrand { clients } => assert_eq!(clients.len(), 3),
            other => panic!("unexpected view: {:?}", other),
        }
    }
}
