//! CLI module
//!
//! This module provides the command-line interface for the agency portal:
//! running the server, and driving a running server through its JSON API.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use colored::Colorize;
use std::io;

use crate::{
    api::{serve, Client, ClientConfig, HttpClientImpl, PostRequest, ServerConfig},
    context::{Context, Core, Outcome, PortalConfig, PortalResponse, Snapshot},
    models::{Platform, Post, Todo},
    nav::{ScopeHeader, Tab},
    seed,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// API server URL
    #[arg(
        short,
        long,
        global = true,
        env = "AGENCY_PORTAL_SERVER",
        default_value = "http://localhost:3000"
    )]
    server: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the portal server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value_t = 3000)]
        port: u16,

        /// Emails containing this domain sign in as the agency
        #[arg(
            long,
            env = "AGENCY_PORTAL_AGENCY_DOMAIN",
            default_value = seed::DEFAULT_AGENCY_DOMAIN
        )]
        agency_domain: String,
    },

    /// Sign in; agency emails get the global view, anything else the demo brand
    Login {
        email: String,

        /// Accepted but not checked
        #[arg(short, long, default_value = "")]
        password: String,
    },

    /// Sign out
    Logout,

    /// Select a brand by id, or `global` for every brand (agency only)
    Scope { id: String },

    /// Switch the active tab
    Tab {
        #[arg(value_parser = parse_tab)]
        tab: Tab,
    },

    /// Show the session, scope and dashboard
    Status,

    /// List posts in the current scope
    Posts,

    /// List to-dos in the current scope
    Todos,

    /// To-do commands
    Todo {
        #[command(subcommand)]
        command: TodoCommands,
    },

    /// Post commands
    Post {
        #[command(subcommand)]
        command: PostCommands,
    },

    /// Agency team commands
    Member {
        #[command(subcommand)]
        command: MemberCommands,
    },

    /// Brand commands
    Brand {
        #[command(subcommand)]
        command: BrandCommands,
    },

    /// Generate shell completions
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum TodoCommands {
    /// Flip a to-do between open and done
    Toggle { id: String },
}

#[derive(Subcommand)]
enum PostCommands {
    /// Schedule a new post
    Add {
        #[arg(long)]
        title: String,

        #[arg(long)]
        content: String,

        /// Local date-time, e.g. 2024-06-01T10:00
        #[arg(long)]
        date: String,

        /// Repeat for several platforms
        #[arg(long = "platform", required = true, value_parser = parse_platform)]
        platforms: Vec<Platform>,

        /// Target brand; ignored while a brand is in scope
        #[arg(long)]
        client: Option<String>,
    },
}

#[derive(Subcommand)]
enum MemberCommands {
    /// Add a team member
    Add {
        name: String,
        email: String,

        #[arg(short, long, default_value = "")]
        role: String,
    },
}

#[derive(Subcommand)]
enum BrandCommands {
    /// Add a brand; industry defaults to "General"
    Add {
        name: String,

        #[arg(short, long, default_value = "")]
        industry: String,
    },
}

fn parse_tab(s: &str) -> Result<Tab, String> {
    s.parse().map_err(|e| format!("{}", e))
}

fn parse_platform(s: &str) -> Result<Platform, String> {
    s.parse().map_err(|e| format!("{}", e))
}

/// Run the CLI application
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Serve {
            port,
            agency_domain,
        } => {
            println!("Starting agency portal on port {}...", port);

            let context = Context::new(PortalConfig {
                agency_domain: agency_domain.clone(),
                ..PortalConfig::default()
            });
            let core = Core::new(context);

            let config = ServerConfig {
                address: ([127, 0, 0, 1], *port).into(),
            };

            serve(core, config).await?;
            Ok(())
        }

        Commands::Login { email, password } => {
            let client = create_client(&cli.server);
            let response = client.login(email.clone(), password.clone()).await?;

            match response.snapshot().session.as_ref() {
                Some(session) if response.inner().is_applied() => {
                    println!(
                        "{} {} ({})",
                        "Signed in as".green(),
                        session.user().name.bold(),
                        session.role()
                    );
                    print_scope(response.snapshot());
                }
                _ => println!("{}", "Invalid credentials".red()),
            }
            Ok(())
        }

        Commands::Logout => {
            let client = create_client(&cli.server);
            client.logout().await?;
            println!("Signed out");
            Ok(())
        }

        Commands::Scope { id } => {
            let client = create_client(&cli.server);
            let response = client.switch_client(id.clone()).await?;

            print_response(&response, "Scope unchanged", |snapshot| {
                print_scope(snapshot)
            });
            Ok(())
        }

        Commands::Tab { tab } => {
            let client = create_client(&cli.server);
            let response = client.select_tab(*tab).await?;

            print_response(
                &response,
                "That tab needs a brand in scope",
                |snapshot| println!("Active tab: {}", snapshot.active_tab),
            );
            Ok(())
        }

        Commands::Status => {
            let client = create_client(&cli.server);
            let snapshot = client.get_state().await?;
            print_status(&snapshot);
            Ok(())
        }

        Commands::Posts => {
            let client = create_client(&cli.server);
            let snapshot = client.get_state().await?;
            print_posts(&snapshot.posts);
            Ok(())
        }

        Commands::Todos => {
            let client = create_client(&cli.server);
            let snapshot = client.get_state().await?;
            print_todos(&snapshot.todos);
            Ok(())
        }

        Commands::Todo {
            command: TodoCommands::Toggle { id },
        } => {
            let client = create_client(&cli.server);
            let response = client.toggle_todo(id.clone()).await?;

            print_response(&response, "No such to-do", |snapshot| {
                print_todos(&snapshot.todos)
            });
            Ok(())
        }

        Commands::Post {
            command:
                PostCommands::Add {
                    title,
                    content,
                    date,
                    platforms,
                    client: target,
                },
        } => {
            let client = create_client(&cli.server);
            let response = client
                .create_post(PostRequest {
                    client_id: target.clone(),
                    title: title.clone(),
                    content: content.clone(),
                    date: date.clone(),
                    platforms: platforms.clone(),
                })
                .await?;

            print_response(
                &response,
                "Post not scheduled; check the brand, every field and the date format",
                |snapshot| {
                    if let Some(post) = snapshot.posts.first() {
                        println!("Scheduled {}", post.title.bold());
                    }
                },
            );
            Ok(())
        }

        Commands::Member {
            command: MemberCommands::Add { name, email, role },
        } => {
            let client = create_client(&cli.server);
            let response = client
                .add_member(name.clone(), role.clone(), email.clone())
                .await?;

            print_response(
                &response,
                "Member not added; agency sessions need a name and an email",
                |snapshot| println!("Team now has {} members", snapshot.members.len()),
            );
            Ok(())
        }

        Commands::Brand {
            command: BrandCommands::Add { name, industry },
        } => {
            let client = create_client(&cli.server);
            let response = client.add_brand(name.clone(), industry.clone()).await?;

            print_response(
                &response,
                "Brand not added; only agency sessions can create brands",
                |snapshot| {
                    if let Some(brand) = snapshot.clients.last() {
                        println!("Created {} (id {})", brand.name.bold(), brand.id);
                    }
                },
            );
            Ok(())
        }

        Commands::Completions { shell } => {
            // Generate completions for the specified shell
            let mut cmd = Cli::command();
            let bin_name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, bin_name, &mut io::stdout());
            Ok(())
        }
    }
}

fn create_client(server_url: &str) -> HttpClientImpl {
    let config = ClientConfig {
        base_url: server_url.to_string(),
    };

    HttpClientImpl::with_config(config)
}

/// Prints the applied branch, or the reason when the action was ignored
fn print_response<F>(response: &PortalResponse<Outcome>, ignored: &str, print_applied: F)
where
    F: FnOnce(&Snapshot),
{
    match response.inner() {
        Outcome::Applied => print_applied(response.snapshot()),
        Outcome::Ignored => println!("{}", ignored.yellow()),
    }
}

fn print_scope(snapshot: &Snapshot) {
    match &snapshot.active_client {
        Some(client) => println!("Scope: {} ({})", client.name.bold(), client.id),
        None => println!("Scope: {}", "all brands".bold()),
    }
}

fn print_status(snapshot: &Snapshot) {
    let Some(session) = &snapshot.session else {
        println!("{}", "Not signed in".yellow());
        return;
    };

    println!(
        "{} {} <{}> ({})",
        "User:".bold(),
        session.user().name,
        session.user().email,
        session.role()
    );
    print_scope(snapshot);

    if let Some(ScopeHeader::Switcher { options }) = &snapshot.scope_header {
        let values = options
            .iter()
            .map(|o| {
                if o.selected {
                    format!("[{}]", o.value)
                } else {
                    o.value.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(" ");
        println!("Brands: {}", values);
    }

    let tabs = snapshot
        .navigation
        .iter()
        .map(|item| {
            let label = format!("{} ({})", item.label, item.tab);
            if item.active {
                label.bold().to_string()
            } else if !item.enabled {
                label.dimmed().to_string()
            } else {
                label
            }
        })
        .collect::<Vec<_>>()
        .join("  ");
    println!("Tabs: {}", tabs);

    let dashboard = snapshot.dashboard();
    println!("\n{}", dashboard.eyebrow.to_uppercase().dimmed());
    println!("{}", dashboard.heading.bold());
    println!("  Posts: {}", dashboard.post_count);
    match &dashboard.second_tile {
        crate::views::SecondTile::Channels { platforms } => println!(
            "  Channels: {}",
            platforms
                .iter()
                .map(Platform::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        ),
        crate::views::SecondTile::Brands { count } => println!("  Brands: {}", count),
    }
    println!("  Open actions: {}", dashboard.open_actions);

    if !dashboard.recent_posts.is_empty() {
        println!("\nRecent & upcoming:");
        print_posts(&dashboard.recent_posts);
    }
}

fn print_posts(posts: &[Post]) {
    if posts.is_empty() {
        println!("No posts.");
        return;
    }
    for post in posts {
        let platforms = post
            .platforms
            .iter()
            .map(Platform::as_str)
            .collect::<Vec<_>>()
            .join(",");
        println!(
            "  {} {} [{}] {} (client {}, {})",
            post.scheduled_date.dimmed(),
            post.title.bold(),
            platforms,
            post.status,
            post.client_id,
            post.id
        );
    }
}

fn print_todos(todos: &[Todo]) {
    if todos.is_empty() {
        println!("No to-dos.");
        return;
    }
    for todo in todos {
        let mark = if todo.completed {
            "✓".green()
        } else {
            "○".normal()
        };
        println!(
            "  {} {} {} ({}{})",
            mark,
            todo.id,
            todo.task,
            todo.assigned_to,
            todo.due_date
                .as_deref()
                .map(|d| format!(", due {}", d))
                .unwrap_or_default()
        );
    }
}
