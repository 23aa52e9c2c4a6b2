//! Predefined portal data
//!
//! This module defines the static users, brands, posts, to-dos and staff the
//! portal starts with, plus the placeholder image URLs used for generated
//! records.

use lazy_static::lazy_static;

use crate::models::{AgencyMember, Client, Platform, Post, PostStatus, Todo, User, UserRole};

/// Static agency logo asset shown in the sidebar and on the login page
pub const AGENCY_LOGO_URL: &str = "https://static.wixstatic.com/media/6bebeb_af6ef406ff5b41b1b66210a58fb32782~mv2.png/v1/fill/w_443,h_86,al_c,q_85,usm_0.66_1.00_0.01,enc_avif,quality_auto/logo%20anusual%20header%20sito%20vert%20bianco.png";

/// Domain that identifies agency staff at login
pub const DEFAULT_AGENCY_DOMAIN: &str = "anusual.com";

/// Platforms every newly created brand starts with
pub const DEFAULT_BRAND_PLATFORMS: [Platform; 2] = [Platform::Instagram, Platform::Facebook];

/// Industry used when a brand is created without one
pub const DEFAULT_INDUSTRY: &str = "General";

lazy_static! {
    static ref SEED_CLIENTS: Vec<Client> = vec![
        client(
            "1",
            "TechCorp Solutions",
            "tech",
            "Technology",
            12,
            &[Platform::Linkedin, Platform::Facebook],
            "#1a1a1a",
        ),
        client(
            "2",
            "Gourmet Delights",
            "food",
            "Food & Beverage",
            8,
            &[Platform::Instagram, Platform::Tiktok, Platform::Facebook],
            "#f59e0b",
        ),
        client(
            "3",
            "FitLife Gym",
            "gym",
            "Health & Fitness",
            5,
            &[Platform::Instagram, Platform::Facebook],
            "#ef4444",
        ),
    ];

    static ref SEED_POSTS: Vec<Post> = vec![
        Post {
            id: "p1".to_string(),
            client_id: "1".to_string(),
            title: "Future of AI 2024".to_string(),
            content: "Exploring the impact of AI on small businesses...".to_string(),
            scheduled_date: "2024-01-05T10:00:00Z".to_string(),
            platforms: vec![Platform::Linkedin, Platform::Facebook],
            status: PostStatus::Scheduled,
            media_url: Some(media_url("ai")),
        },
        Post {
            id: "p2".to_string(),
            client_id: "1".to_string(),
            title: "New Web Release".to_string(),
            content: "Our new platform is finally live and ready!".to_string(),
            scheduled_date: "2024-01-15T09:00:00Z".to_string(),
            platforms: vec![Platform::Facebook],
            status: PostStatus::Scheduled,
            media_url: Some(
                "https://images.unsplash.com/photo-1460925895917-afdab827c52f?w=800&auto=format&fit=crop&q=60"
                    .to_string(),
            ),
        },
        Post {
            id: "p3".to_string(),
            client_id: "2".to_string(),
            title: "Christmas Special Menu".to_string(),
            content: "Come try our holiday special starting this weekend!".to_string(),
            scheduled_date: "2023-12-24T18:00:00Z".to_string(),
            platforms: vec![Platform::Instagram, Platform::Facebook],
            status: PostStatus::Published,
            media_url: Some(media_url("food2")),
        },
    ];

    static ref SEED_TODOS: Vec<Todo> = vec![
        todo("t1", "1", "Approvare set grafiche Gennaio", false, UserRole::Client),
        todo(
            "t2",
            "1",
            "Configurazione API Facebook Business",
            true,
            UserRole::Agency,
        ),
        todo("t3", "2", "Revisione copy TikTok promo", false, UserRole::Agency),
    ];

    static ref SEED_MEMBERS: Vec<AgencyMember> = vec![
        member("Andrea Boss", "Creative Director", "a.boss@anusual.com"),
        member("Elena Social", "Account Manager", "e.social@anusual.com"),
        member("Marco Dev", "Technical Lead", "m.dev@anusual.com"),
    ];
}

/// Deterministic placeholder logo for a brand
pub fn logo_url(seed: &str) -> String {
    format!("https://picsum.photos/seed/{}/100/100", seed)
}

/// Placeholder media image for a post
pub fn media_url(seed: &str) -> String {
    format!("https://picsum.photos/seed/{}/800/400", seed)
}

/// The single agency identity
pub fn agency_user() -> User {
    User {
        id: "a1".to_string(),
        name: "Creative Director".to_string(),
        email: "studio@anusual.com".to_string(),
        role: UserRole::Agency,
        client_id: None,
    }
}

/// The single client identity, linked to TechCorp Solutions
pub fn client_user() -> User {
    User {
        id: "c1".to_string(),
        name: "Marketing Manager".to_string(),
        email: "marketing@techcorp.com".to_string(),
        role: UserRole::Client,
        client_id: Some("1".to_string()),
    }
}

pub fn default_clients() -> Vec<Client> {
    SEED_CLIENTS.clone()
}

pub fn default_posts() -> Vec<Post> {
    SEED_POSTS.clone()
}

pub fn default_todos() -> Vec<Todo> {
    SEED_TODOS.clone()
}

pub fn default_members() -> Vec<AgencyMember> {
    SEED_MEMBERS.clone()
}

fn client(
    id: &str,
    name: &str,
    logo_seed: &str,
    industry: &str,
    active_posts: u32,
    platforms: &[Platform],
    brand_color: &str,
) -> Client {
    Client {
        id: id.to_string(),
        name: name.to_string(),
        logo: logo_url(logo_seed),
        industry: industry.to_string(),
        active_posts,
        platforms: platforms.to_vec(),
        brand_color: Some(brand_color.to_string()),
    }
}

fn todo(id: &str, client_id: &str, task: &str, completed: bool, assigned_to: UserRole) -> Todo {
    Todo {
        id: id.to_string(),
        client_id: client_id.to_string(),
        task: task.to_string(),
        completed,
        assigned_to,
        due_date: None,
    }
}

fn member(name: &str, role: &str, email: &str) -> AgencyMember {
    AgencyMember {
        name: name.to_string(),
        role: role.to_string(),
        email: email.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_references_are_consistent() {
        let clients = default_clients();
        let known = |id: &str| clients.iter().any(|c| c.id == id);

        assert!(default_posts().iter().all(|p| known(&p.client_id)));
        assert!(default_todos().iter().all(|t| known(&t.client_id)));
        assert!(known(client_user().client_id.as_deref().unwrap()));
    }

    #[test]
    fn test_seed_collections_are_fresh_copies() {
        let mut todos = default_todos();
        todos[0].completed = !todos[0].completed;
        todos.clear();

        assert_eq!(default_todos().len(), 3);
        assert!(!default_todos()[0].completed);
        assert_eq!(default_members(), default_members());
        assert_eq!(default_members().len(), 3);
    }

    #[test]
    fn test_placeholder_urls() {
        assert_eq!(logo_url("Acme"), "https://picsum.photos/seed/Acme/100/100");
        assert_eq!(media_url("42"), "https://picsum.photos/seed/42/800/400");
    }
}
