//! HTML rendering for the portal UI
//!
//! Pages are plain server-rendered HTML with form posts; the page reloads
//! itself when the events stream reports a change.

use html_escape::{encode_quoted_attribute as attr, encode_text as text};

use crate::composer::PostComposer;
use crate::context::Snapshot;
use crate::models::{Platform, Post, Todo};
use crate::nav::{ScopeHeader, Tab};
use crate::scope::Session;
use crate::seed::AGENCY_LOGO_URL;
use crate::views::{ScopedTab, SecondTile};

/// Renders the login page or the portal shell, depending on the session
pub fn render(snapshot: &Snapshot) -> String {
    let mut html = String::from(HTML_TEMPLATE_HEADER);
    match &snapshot.session {
        None => render_login(&mut html, snapshot),
        Some(session) => render_shell(&mut html, snapshot, session),
    }
    html.push_str(HTML_TEMPLATE_FOOTER);
    html
}

fn render_login(html: &mut String, snapshot: &Snapshot) {
    html.push_str("<main class='login'>");
    html.push_str(&format!(
        "<img class='agency-logo' src='{}' alt='Agency'>",
        attr(AGENCY_LOGO_URL)
    ));
    html.push_str("<h1>Portal Login</h1>");
    html.push_str("<form method='post' action='/ui/login'>");
    html.push_str(&format!(
        "<label>Email<input type='email' name='email' value='{}' required></label>",
        attr(&snapshot.login.email)
    ));
    html.push_str("<label>Password<input type='password' name='password'></label>");
    if snapshot.login.error {
        html.push_str("<p class='error'>Credenziali non valide</p>");
    }
    html.push_str("<button type='submit'>Accedi</button></form></main>");
}

fn render_shell(html: &mut String, snapshot: &Snapshot, session: &Session) {
    // --- Sidebar ---
    html.push_str("<aside class='sidebar'>");
    html.push_str(&format!(
        "<img class='agency-logo' src='{}' alt='Agency'>",
        attr(AGENCY_LOGO_URL)
    ));

    match &snapshot.scope_header {
        Some(ScopeHeader::Switcher { options }) => {
            html.push_str("<form method='post' action='/ui/scope' class='switcher'>");
            html.push_str("<select name='client_id' onchange='this.form.submit()'>");
            for option in options {
                html.push_str(&format!(
                    "<option value='{}'{}>{}</option>",
                    attr(&option.value),
                    if option.selected { " selected" } else { "" },
                    text(&option.label)
                ));
            }
            html.push_str("</select><noscript><button>Go</button></noscript></form>");
        }
        Some(ScopeHeader::BrandCard { name, logo }) => {
            html.push_str(&format!(
                "<div class='brand-card'><img src='{}' alt=''><span>{}</span></div>",
                attr(logo),
                text(name)
            ));
        }
        Some(ScopeHeader::None) | None => {}
    }

    html.push_str("<nav>");
    for item in &snapshot.navigation {
        let class = match (item.active, item.enabled) {
            (true, _) => "active",
            (false, false) => "disabled",
            (false, true) => "",
        };
        html.push_str(&format!(
            "<form method='post' action='/ui/tab'><button name='tab' value='{}' class='{}'{}>{}</button></form>",
            item.tab,
            class,
            if item.enabled { "" } else { " disabled" },
            text(&item.label)
        ));
    }
    html.push_str("</nav>");

    let user = session.user();
    html.push_str(&format!(
        "<div class='user'><strong>{}</strong><span>{}</span></div>",
        text(&user.name),
        session.role()
    ));
    html.push_str(
        "<form method='post' action='/ui/logout'><button class='logout'>Logout</button></form>",
    );
    html.push_str("</aside>");

    // --- Content ---
    html.push_str("<main class='content'>");
    match snapshot.active_tab {
        Tab::Dashboard => render_dashboard(html, snapshot),
        Tab::Calendar => render_scoped_tab(html, snapshot, "Calendario", false),
        Tab::Todos => render_scoped_tab(html, snapshot, "To-do List", true),
        Tab::Performance => render_performance(html, snapshot),
    }
    render_history(html, snapshot);
    html.push_str("</main>");

    if let Some(composer) = &snapshot.composer {
        render_composer(html, snapshot, composer);
    }
    if let Some(form) = &snapshot.member_form {
        html.push_str("<div class='modal'><h2>Nuovo membro</h2>");
        html.push_str("<form method='post' action='/ui/members'>");
        html.push_str(&format!(
            "<label>Nome<input name='name' value='{}' required></label>",
            attr(&form.name)
        ));
        html.push_str(&format!(
            "<label>Ruolo<input name='role' value='{}'></label>",
            attr(&form.role)
        ));
        html.push_str(&format!(
            "<label>Email<input type='email' name='email' value='{}' required></label>",
            attr(&form.email)
        ));
        html.push_str("<button type='submit'>Aggiungi</button></form>");
        html.push_str("<form method='post' action='/ui/members/close'><button>Annulla</button></form></div>");
    }
    if let Some(form) = &snapshot.brand_form {
        html.push_str("<div class='modal'><h2>Nuovo brand</h2>");
        html.push_str("<form method='post' action='/ui/brands'>");
        html.push_str(&format!(
            "<label>Nome<input name='name' value='{}' required></label>",
            attr(&form.name)
        ));
        html.push_str(&format!(
            "<label>Settore<input name='industry' value='{}' placeholder='General'></label>",
            attr(&form.industry)
        ));
        html.push_str("<button type='submit'>Crea</button></form>");
        html.push_str("<form method='post' action='/ui/brands/close'><button>Annulla</button></form></div>");
    }
}

fn render_dashboard(html: &mut String, snapshot: &Snapshot) {
    let view = snapshot.dashboard();

    html.push_str(&format!(
        "<header><span class='eyebrow'>{}</span><h1>{}</h1>",
        text(&view.eyebrow),
        text(&view.heading)
    ));
    if view.can_compose {
        html.push_str("<form method='post' action='/ui/composer/open'><button class='primary'>+ Nuovo post</button></form>");
    }
    html.push_str("</header>");

    html.push_str("<section class='tiles'>");
    html.push_str(&format!(
        "<div class='tile'><span>Post</span><strong>{}</strong></div>",
        view.post_count
    ));
    match &view.second_tile {
        SecondTile::Channels { platforms } => html.push_str(&format!(
            "<div class='tile'><span>Canali</span><strong>{}</strong></div>",
            platforms
                .iter()
                .map(Platform::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        )),
        SecondTile::Brands { count } => html.push_str(&format!(
            "<div class='tile'><span>Brand</span><strong>{}</strong></div>",
            count
        )),
    }
    html.push_str(&format!(
        "<div class='tile'><span>Azioni aperte</span><strong>{}</strong></div>",
        view.open_actions
    ));
    html.push_str("</section>");

    if !view.portfolio.is_empty() {
        html.push_str("<section><h2>Portfolio</h2><div class='portfolio'>");
        for client in &view.portfolio {
            html.push_str(&format!(
                "<form method='post' action='/ui/scope' class='brand'><input type='hidden' name='client_id' value='{}'><button><img src='{}' alt=''><strong>{}</strong><span>{}</span><span>{} post attivi</span></button></form>",
                attr(&client.id),
                attr(&client.logo),
                text(&client.name),
                text(&client.industry),
                client.active_posts
            ));
        }
        html.push_str("</div></section>");
    }

    if snapshot.active_client.is_some() {
        html.push_str("<section><h2>Recenti e in programma</h2>");
        if view.recent_posts.is_empty() {
            html.push_str("<p>Nessun post.</p>");
        }
        for post in &view.recent_posts {
            render_post(html, post);
        }
        html.push_str("</section>");
    }
}

fn render_post(html: &mut String, post: &Post) {
    html.push_str("<article class='post'>");
    if let Some(media) = &post.media_url {
        html.push_str(&format!("<img src='{}' alt=''>", attr(media)));
    }
    html.push_str(&format!(
        "<h3>{}</h3><p>{}</p><span class='status {}'>{}</span><time>{}</time><span class='platforms'>{}</span>",
        text(&post.title),
        text(&post.content),
        post.status,
        post.status,
        text(&post.scheduled_date),
        post.platforms
            .iter()
            .map(Platform::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    ));
    html.push_str("</article>");
}

fn render_scoped_tab(html: &mut String, snapshot: &Snapshot, title: &str, with_todos: bool) {
    match snapshot.scoped_tab() {
        ScopedTab::Brand { client_name, todos } => {
            html.push_str(&format!(
                "<header><span class='eyebrow'>{}</span><h1>{}</h1></header>",
                text(title),
                text(&client_name)
            ));
            if with_todos {
                render_todos(html, &todos);
            } else {
                html.push_str("<p class='placeholder'>Calendario editoriale in arrivo.</p>");
            }
        }
        ScopedTab::PickBrand { clients } => {
            html.push_str(&format!("<h1>{}</h1>", text(title)));
            html.push_str("<p>Seleziona un brand per continuare.</p><div class='portfolio'>");
            for client in &clients {
                html.push_str(&format!(
                    "<form method='post' action='/ui/scope'><button name='client_id' value='{}'>{}</button></form>",
                    attr(&client.id),
                    text(&client.name)
                ));
            }
            html.push_str("</div>");
        }
    }
}

fn render_todos(html: &mut String, todos: &[Todo]) {
    if todos.is_empty() {
        html.push_str("<p>Nessuna attività.</p>");
        return;
    }
    html.push_str("<ul class='todos'>");
    for todo in todos {
        html.push_str(&format!(
            "<li class='{}'><form method='post' action='/ui/todos/{}/toggle'><button>{}</button></form><span>{}</span><span class='assignee'>{}</span>{}</li>",
            if todo.completed { "completed" } else { "" },
            attr(&todo.id),
            if todo.completed { "✓" } else { "○" },
            text(&todo.task),
            todo.assigned_to,
            todo.due_date
                .as_deref()
                .map(|d| format!("<time>{}</time>", text(d)))
                .unwrap_or_default()
        ));
    }
    html.push_str("</ul>");
}

fn render_performance(html: &mut String, snapshot: &Snapshot) {
    let Some(team) = snapshot.team() else {
        let name = snapshot
            .active_client
            .as_ref()
            .map(|c| c.name.as_str())
            .unwrap_or_default();
        html.push_str(&format!(
            "<header><span class='eyebrow'>Report</span><h1>{}</h1></header><p class='placeholder'>Report in arrivo.</p>",
            text(name)
        ));
        return;
    };

    html.push_str("<header><span class='eyebrow'>Agency</span><h1>Management Agency</h1></header>");

    html.push_str("<section><h2>Team</h2>");
    html.push_str("<form method='post' action='/ui/members/open'><button>+ Membro</button></form>");
    html.push_str("<table><tr><th>Nome</th><th>Ruolo</th><th>Email</th></tr>");
    for member in &team.members {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            text(&member.name),
            text(&member.role),
            text(&member.email)
        ));
    }
    html.push_str("</table></section>");

    html.push_str("<section><h2>Brand</h2>");
    html.push_str("<form method='post' action='/ui/brands/open'><button>+ Brand</button></form>");
    html.push_str("<table><tr><th>Nome</th><th>Settore</th><th>Canali</th></tr>");
    for client in &team.clients {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            text(&client.name),
            text(&client.industry),
            client
                .platforms
                .iter()
                .map(Platform::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }
    html.push_str("</table></section>");
}

fn render_composer(html: &mut String, snapshot: &Snapshot, composer: &PostComposer) {
    html.push_str("<div class='modal'><h2>Nuovo post</h2>");
    html.push_str("<form method='post' action='/ui/composer'>");

    if composer.is_client_locked() {
        // Locked composers still post the id so the form stays uniform
        html.push_str(&format!(
            "<input type='hidden' name='client_id' value='{}'>",
            attr(composer.client_id())
        ));
    } else {
        html.push_str("<label>Brand<select name='client_id' required><option value=''>Seleziona</option>");
        for client in &snapshot.clients {
            html.push_str(&format!(
                "<option value='{}'{}>{}</option>",
                attr(&client.id),
                if client.id == composer.client_id() {
                    " selected"
                } else {
                    ""
                },
                text(&client.name)
            ));
        }
        html.push_str("</select></label>");
    }

    html.push_str(&format!(
        "<label>Titolo<input name='title' value='{}' required></label>",
        attr(composer.title())
    ));
    html.push_str(&format!(
        "<label>Contenuto<textarea name='content' required>{}</textarea></label>",
        text(composer.content())
    ));
    html.push_str(&format!(
        "<label>Data<input type='datetime-local' name='date' value='{}' required></label>",
        attr(composer.date())
    ));

    html.push_str("<fieldset><legend>Piattaforme</legend>");
    for platform in Platform::ALL {
        html.push_str(&format!(
            "<label><input type='checkbox' name='{}'{}>{}</label>",
            platform,
            if composer.platforms().contains(&platform) {
                " checked"
            } else {
                ""
            },
            platform
        ));
    }
    html.push_str("</fieldset>");

    html.push_str("<button type='submit' class='primary'>Programma</button></form>");
    html.push_str("<form method='post' action='/ui/composer/close'><button>Annulla</button></form></div>");
}

fn render_history(html: &mut String, snapshot: &Snapshot) {
    html.push_str("<details class='history-panel'><summary>Attività recenti</summary><ul>");
    if snapshot.transition_history.is_empty() {
        html.push_str("<li>No history yet.</li>");
    }
    // Newest first
    for entry in snapshot.transition_history.iter().rev() {
        html.push_str(&format!(
            "<li><span class='history-ts'>{}</span><span class='history-action'>{}</span><span class='history-details'>{}</span></li>",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            text(&entry.action),
            text(entry.details.as_deref().unwrap_or(""))
        ));
    }
    html.push_str("</ul></details>");
}

// HTML template header with CSS styles
const HTML_TEMPLATE_HEADER: &str = r#"<!DOCTYPE html>
<html lang="it">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Agency Portal</title>
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, 'Helvetica Neue', sans-serif;
            margin: 0;
            display: flex;
            min-height: 100vh;
            color: #1f2937;
            background-color: #f7f9fc;
        }
        .login { margin: 10vh auto; width: 320px; display: flex; flex-direction: column; gap: 12px; }
        .login form, .modal form { display: flex; flex-direction: column; gap: 8px; }
        .error { color: #dc2626; }
        .agency-logo { max-width: 140px; }
        .sidebar {
            width: 240px;
            background: #111827;
            color: #f9fafb;
            padding: 20px;
            display: flex;
            flex-direction: column;
            gap: 16px;
        }
        .sidebar nav button { width: 100%; text-align: left; background: none; color: inherit; border: 0; padding: 8px; cursor: pointer; }
        .sidebar nav button.active { background: #374151; border-radius: 6px; }
        .sidebar nav button.disabled { opacity: 0.4; cursor: not-allowed; }
        .brand-card { display: flex; align-items: center; gap: 8px; }
        .brand-card img { width: 32px; border-radius: 50%; }
        .user { margin-top: auto; display: flex; flex-direction: column; font-size: 0.9em; }
        .content { flex: 1; padding: 32px; }
        .eyebrow { text-transform: uppercase; font-size: 0.75em; color: #6b7280; letter-spacing: 0.1em; }
        .tiles { display: flex; gap: 16px; margin: 24px 0; }
        .tile { background: white; border-radius: 12px; padding: 16px; flex: 1; display: flex; flex-direction: column; }
        .portfolio { display: flex; flex-wrap: wrap; gap: 12px; }
        .portfolio img { width: 48px; border-radius: 50%; }
        .post { background: white; border-radius: 12px; padding: 12px; margin-bottom: 12px; }
        .post img { width: 100%; max-height: 160px; object-fit: cover; border-radius: 8px; }
        .status { font-size: 0.75em; text-transform: uppercase; margin-right: 8px; }
        .todos li { display: flex; gap: 12px; align-items: center; }
        .todos li.completed span:first-of-type { text-decoration: line-through; color: #9ca3af; }
        .modal {
            position: fixed;
            top: 10vh;
            left: 50%;
            transform: translateX(-50%);
            background: white;
            padding: 24px;
            border-radius: 12px;
            box-shadow: 0 10px 40px rgba(0, 0, 0, 0.2);
            width: 420px;
        }
        .primary { background: #2563eb; color: white; border: 0; border-radius: 6px; padding: 8px 12px; }
        .history-panel { margin-top: 32px; font-size: 0.85em; color: #6b7280; }
        .history-panel span { margin-right: 8px; }
        table { width: 100%; border-collapse: collapse; background: white; }
        td, th { padding: 8px; text-align: left; border-bottom: 1px solid #e5e7eb; }
    </style>
</head>
<body>
"#;

const HTML_TEMPLATE_FOOTER: &str = r#"
    <script>
        // Reload whenever the portal state changes elsewhere
        const eventSource = new EventSource('/ui/events');
        eventSource.addEventListener('update', () => window.location.reload());
    </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{Action, Context, PortalConfig};

    fn context() -> Context {
        Context::new(PortalConfig {
            rng_seed: Some(11),
            ..PortalConfig::default()
        })
    }

    fn login(context: &mut Context, email: &str) {
        context
            .dispatch(Action::UpdateLogin {
                email: Some(email.to_string()),
                password: None,
            })
            .unwrap();
        context.dispatch(Action::SubmitLogin).unwrap();
    }

    #[test]
    fn test_login_page_when_signed_out() {
        let html = render(&context().snapshot());
        assert!(html.contains("action='/ui/login'"));
        assert!(!html.contains("Credenziali non valide"));
    }

    #[test]
    fn test_login_error_is_shown() {
        let mut context = context();
        login(&mut context, "ab");
        let html = render(&context.snapshot());
        assert!(html.contains("Credenziali non valide"));
        assert!(html.contains("value='ab'"));
    }

    #[test]
    fn test_agency_shell_has_switcher_and_portfolio() {
        let mut context = context();
        login(&mut context, "studio@anusual.com");
        let html = render(&context.snapshot());

        assert!(html.contains("TUTTI I PARTNER"));
        assert!(html.contains("Global Dashboard"));
        assert!(html.contains("TechCorp Solutions"));
        // Client-only tabs are rendered disabled
        assert!(html.contains("value='calendar' class='disabled' disabled"));
        assert!(!html.contains("/ui/composer/open"));
    }

    #[test]
    fn test_client_shell_has_brand_card() {
        let mut context = context();
        login(&mut context, "marketing@techcorp.com");
        let html = render(&context.snapshot());

        assert!(html.contains("brand-card"));
        assert!(!html.contains("TUTTI I PARTNER"));
        assert!(html.contains("/ui/composer/open"));
    }

    #[test]
    fn test_user_text_is_escaped() {
        let mut context = context();
        login(&mut context, "studio@anusual.com");
        context.dispatch(Action::OpenBrandForm).unwrap();
        context
            .dispatch(Action::UpdateBrandForm {
                name: Some("<script>x</script>".to_string()),
                industry: None,
            })
            .unwrap();
        context.dispatch(Action::SubmitBrandForm).unwrap();

        let html = render(&context.snapshot());
        assert!(!html.contains("<script>x</script>"));
        assert!(html.contains("&lt;script&gt;x&lt;/script&gt;"));
    }
}
