//! Portal state and reducer
//!
//! `Context` owns every piece of mutable portal state and applies [`Action`]s
//! to it. `Core` shares one `Context` between request handlers and notifies
//! subscribers whenever it changes.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

use crate::admin::{BrandForm, MemberForm};
use crate::composer::PostComposer;
use crate::models::{AgencyMember, Client, Platform, Post, Todo};
use crate::nav::{self, NavItem, ScopeHeader, Tab};
use crate::scope::{self, ClientSelection, Session};
use crate::seed;
use crate::views::{self, Dashboard, ScopedTab, TeamOverview};

// Define the maximum size for the history buffer
const MAX_HISTORY_SIZE: usize = 20;

/// Portal settings
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// Emails containing this substring sign in as the agency
    pub agency_domain: String,
    /// Fixed seed for placeholder media, random when `None`
    pub rng_seed: Option<u64>,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            agency_domain: seed::DEFAULT_AGENCY_DOMAIN.to_string(),
            rng_seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortalError {
    #[error("Not signed in")]
    NotAuthenticated,

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Whether an action changed the portal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Applied,
    /// The action was a no-op, e.g. a form submitted with missing fields
    Ignored,
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied)
    }

    fn from_bool(applied: bool) -> Self {
        if applied {
            Outcome::Applied
        } else {
            Outcome::Ignored
        }
    }
}

/// Every event the portal reacts to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    UpdateLogin {
        email: Option<String>,
        password: Option<String>,
    },
    SubmitLogin,
    Logout,
    /// Client id, or `"global"` for the agency-wide view
    SwitchClient {
        client_id: String,
    },
    SelectTab {
        tab: Tab,
    },
    OpenComposer,
    UpdateComposer {
        client_id: Option<String>,
        title: Option<String>,
        content: Option<String>,
        date: Option<String>,
    },
    ToggleComposerPlatform {
        platform: Platform,
    },
    /// Replaces the whole platform selection
    SetComposerPlatforms {
        platforms: Vec<Platform>,
    },
    SubmitComposer,
    CloseComposer,
    OpenMemberForm,
    UpdateMemberForm {
        name: Option<String>,
        role: Option<String>,
        email: Option<String>,
    },
    SubmitMemberForm,
    CloseMemberForm,
    OpenBrandForm,
    UpdateBrandForm {
        name: Option<String>,
        industry: Option<String>,
    },
    SubmitBrandForm,
    CloseBrandForm,
    ToggleTodo {
        id: String,
    },
}

impl Action {
    /// Actions that can be dispatched without a session
    pub fn is_public(&self) -> bool {
        matches!(
            self,
            Action::UpdateLogin { .. } | Action::SubmitLogin | Action::Logout
        )
    }

    fn name(&self) -> &'static str {
        match self {
            Action::UpdateLogin { .. } => "update_login",
            Action::SubmitLogin => "submit_login",
            Action::Logout => "logout",
            Action::SwitchClient { .. } => "switch_client",
            Action::SelectTab { .. } => "select_tab",
            Action::OpenComposer => "open_composer",
            Action::UpdateComposer { .. } => "update_composer",
            Action::ToggleComposerPlatform { .. } => "toggle_composer_platform",
            Action::SetComposerPlatforms { .. } => "set_composer_platforms",
            Action::SubmitComposer => "submit_composer",
            Action::CloseComposer => "close_composer",
            Action::OpenMemberForm => "open_member_form",
            Action::UpdateMemberForm { .. } => "update_member_form",
            Action::SubmitMemberForm => "submit_member_form",
            Action::CloseMemberForm => "close_member_form",
            Action::OpenBrandForm => "open_brand_form",
            Action::UpdateBrandForm { .. } => "update_brand_form",
            Action::SubmitBrandForm => "submit_brand_form",
            Action::CloseBrandForm => "close_brand_form",
            Action::ToggleTodo { .. } => "toggle_todo",
        }
    }
}

/// Login form buffer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginForm {
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password: String,
    /// Set after a rejected login
    pub error: bool,
}

/// Represents a single state transition event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionLogEntry {
    pub timestamp: DateTime<Utc>,
    pub action: String,
    pub details: Option<String>,
}

impl TransitionLogEntry {
    pub fn new(action: String, details: Option<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            action,
            details,
        }
    }
}

#[derive(Clone)]
pub struct Context {
    config: PortalConfig,
    session: Option<Session>,
    active_tab: Tab,
    clients: Vec<Client>,
    posts: Vec<Post>,
    todos: Vec<Todo>,
    members: Vec<AgencyMember>,
    login: LoginForm,
    composer: Option<PostComposer>,
    member_form: Option<MemberForm>,
    brand_form: Option<BrandForm>,
    history: VecDeque<TransitionLogEntry>,
    rng: StdRng,
}

impl Default for Context {
    fn default() -> Self {
        Self::new(PortalConfig::default())
    }
}

impl Context {
    /// Creates a signed-out portal populated with the seed data
    pub fn new(config: PortalConfig) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Self {
            config,
            session: None,
            active_tab: Tab::default(),
            clients: seed::default_clients(),
            posts: seed::default_posts(),
            todos: seed::default_todos(),
            members: seed::default_members(),
            login: LoginForm::default(),
            composer: None,
            member_form: None,
            brand_form: None,
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
            rng,
        }
    }

    /// Logs a state transition, maintaining the history buffer size.
    fn log_transition(&mut self, action: &str, details: Option<String>) {
        if self.history.len() == MAX_HISTORY_SIZE {
            self.history.pop_front();
        }
        self.history
            .push_back(TransitionLogEntry::new(action.to_string(), details));
    }

    /// Applies an action. Everything except the login actions needs a session.
    pub fn dispatch(&mut self, action: Action) -> Result<Outcome, PortalError> {
        if !action.is_public() && self.session.is_none() {
            tracing::debug!(action = action.name(), "rejected action without session");
            return Err(PortalError::NotAuthenticated);
        }
        let name = action.name();

        let outcome = match action {
            Action::UpdateLogin { email, password } => self.update_login(email, password),
            Action::SubmitLogin => self.submit_login(),
            Action::Logout => self.logout(),
            Action::SwitchClient { client_id } => {
                self.switch_client(client_id.parse().unwrap_or_default())
            }
            Action::SelectTab { tab } => self.select_tab(tab),
            Action::OpenComposer => self.open_composer(),
            Action::UpdateComposer {
                client_id,
                title,
                content,
                date,
            } => self.update_composer(client_id, title, content, date),
            Action::ToggleComposerPlatform { platform } => self.toggle_composer_platform(platform),
            Action::SetComposerPlatforms { platforms } => self.set_composer_platforms(platforms),
            Action::SubmitComposer => self.submit_composer(),
            Action::CloseComposer => Outcome::from_bool(self.composer.take().is_some()),
            Action::OpenMemberForm => self.open_member_form(),
            Action::UpdateMemberForm { name, role, email } => {
                self.update_member_form(name, role, email)
            }
            Action::SubmitMemberForm => self.submit_member_form(),
            Action::CloseMemberForm => Outcome::from_bool(self.member_form.take().is_some()),
            Action::OpenBrandForm => self.open_brand_form(),
            Action::UpdateBrandForm { name, industry } => self.update_brand_form(name, industry),
            Action::SubmitBrandForm => self.submit_brand_form(),
            Action::CloseBrandForm => Outcome::from_bool(self.brand_form.take().is_some()),
            Action::ToggleTodo { id } => self.toggle_todo(&id),
        };

        tracing::debug!(action = name, ?outcome, "dispatched");
        Ok(outcome)
    }

    // --- Session --- //

    fn update_login(&mut self, email: Option<String>, password: Option<String>) -> Outcome {
        if let Some(email) = email {
            self.login.email = email;
        }
        if let Some(password) = password {
            self.login.password = password;
        }
        Outcome::Applied
    }

    /// Signs in with the buffered credentials.
    ///
    /// This is a placeholder check, not credential verification: the password
    /// is never looked at. Returns `Ignored` when the login is rejected, in
    /// which case only the error flag changes.
    fn submit_login(&mut self) -> Outcome {
        self.login.error = false;
        let email = self.login.email.to_lowercase();
        let domain = self.config.agency_domain.to_lowercase();

        let user = if !domain.is_empty() && email.contains(&domain) {
            seed::agency_user()
        } else if self.login.email.chars().count() > 3 {
            seed::client_user()
        } else {
            self.login.error = true;
            tracing::info!("login rejected");
            self.log_transition("login_failed", None);
            return Outcome::Ignored;
        };

        match Session::start(user) {
            Some(session) => {
                tracing::info!(user = %session.user().email, role = %session.role(), "signed in");
                self.log_transition(
                    "login",
                    Some(format!(
                        "Signed in as {} ({})",
                        session.user().name,
                        session.role()
                    )),
                );
                self.session = Some(session);
                Outcome::Applied
            }
            None => {
                self.login.error = true;
                self.log_transition("login_failed", Some("User has no brand".to_string()));
                Outcome::Ignored
            }
        }
    }

    fn logout(&mut self) -> Outcome {
        if let Some(session) = self.session.take() {
            tracing::info!(user = %session.user().email, "signed out");
        }
        self.active_tab = Tab::Dashboard;
        self.login = LoginForm::default();
        self.composer = None;
        self.member_form = None;
        self.brand_form = None;
        self.log_transition("logout", None);
        Outcome::Applied
    }

    // --- Scope and navigation --- //

    fn switch_client(&mut self, selection: ClientSelection) -> Outcome {
        let details = format!("Scope set to {}", selection);
        let applied = self
            .session
            .as_mut()
            .map(|session| session.select(selection))
            .unwrap_or(false);

        if applied {
            self.log_transition("switch_client", Some(details));
        }
        Outcome::from_bool(applied)
    }

    fn select_tab(&mut self, tab: Tab) -> Outcome {
        if !tab.is_enabled(self.active_client()) {
            return Outcome::Ignored;
        }
        self.active_tab = tab;
        Outcome::Applied
    }

    // --- Post composer --- //

    fn open_composer(&mut self) -> Outcome {
        if self.composer.is_some() {
            return Outcome::Ignored;
        }
        let locked_to = self.active_client().map(|c| c.id.clone());
        self.composer = Some(PostComposer::open(locked_to.as_deref()));
        Outcome::Applied
    }

    fn update_composer(
        &mut self,
        client_id: Option<String>,
        title: Option<String>,
        content: Option<String>,
        date: Option<String>,
    ) -> Outcome {
        let Some(composer) = self.composer.as_mut() else {
            return Outcome::Ignored;
        };
        if let Some(client_id) = client_id {
            composer.set_client(client_id);
        }
        if let Some(title) = title {
            composer.set_title(title);
        }
        if let Some(content) = content {
            composer.set_content(content);
        }
        if let Some(date) = date {
            composer.set_date(date);
        }
        Outcome::Applied
    }

    fn toggle_composer_platform(&mut self, platform: Platform) -> Outcome {
        match self.composer.as_mut() {
            Some(composer) => {
                composer.toggle_platform(platform);
                Outcome::Applied
            }
            None => Outcome::Ignored,
        }
    }

    fn set_composer_platforms(&mut self, platforms: Vec<Platform>) -> Outcome {
        match self.composer.as_mut() {
            Some(composer) => {
                composer.set_platforms(platforms);
                Outcome::Applied
            }
            None => Outcome::Ignored,
        }
    }

    /// Schedules the composed post at the top of the list and closes the
    /// composer. Incomplete input leaves everything, composer included, as is.
    fn submit_composer(&mut self) -> Outcome {
        let Some(draft) = self.composer.as_ref().and_then(|c| c.draft()) else {
            return Outcome::Ignored;
        };
        if !self.clients.iter().any(|c| c.id == draft.client_id) {
            return Outcome::Ignored;
        }

        let media_seed = self.rng.random::<f64>().to_string();
        let post = draft.into_post(Uuid::new_v4().to_string(), &media_seed);

        tracing::info!(post = %post.id, client = %post.client_id, "post scheduled");
        self.log_transition(
            "schedule_post",
            Some(format!(
                "Scheduled '{}' for client {} at {}",
                post.title, post.client_id, post.scheduled_date
            )),
        );
        self.posts.insert(0, post);
        self.composer = None;
        Outcome::Applied
    }

    // --- Team and brand admin --- //

    fn is_agency(&self) -> bool {
        matches!(self.session, Some(Session::Agency { .. }))
    }

    fn open_member_form(&mut self) -> Outcome {
        if !self.is_agency() || self.member_form.is_some() {
            return Outcome::Ignored;
        }
        self.member_form = Some(MemberForm::default());
        Outcome::Applied
    }

    fn update_member_form(
        &mut self,
        name: Option<String>,
        role: Option<String>,
        email: Option<String>,
    ) -> Outcome {
        let Some(form) = self.member_form.as_mut() else {
            return Outcome::Ignored;
        };
        if let Some(name) = name {
            form.name = name;
        }
        if let Some(role) = role {
            form.role = role;
        }
        if let Some(email) = email {
            form.email = email;
        }
        Outcome::Applied
    }

    fn submit_member_form(&mut self) -> Outcome {
        let Some(member) = self.member_form.as_ref().and_then(|f| f.member()) else {
            return Outcome::Ignored;
        };

        tracing::info!(email = %member.email, "team member added");
        self.log_transition("add_member", Some(format!("Added {}", member.name)));
        self.members.push(member);
        self.member_form = None;
        Outcome::Applied
    }

    fn open_brand_form(&mut self) -> Outcome {
        if !self.is_agency() || self.brand_form.is_some() {
            return Outcome::Ignored;
        }
        self.brand_form = Some(BrandForm::default());
        Outcome::Applied
    }

    fn update_brand_form(&mut self, name: Option<String>, industry: Option<String>) -> Outcome {
        let Some(form) = self.brand_form.as_mut() else {
            return Outcome::Ignored;
        };
        if let Some(name) = name {
            form.name = name;
        }
        if let Some(industry) = industry {
            form.industry = industry;
        }
        Outcome::Applied
    }

    fn submit_brand_form(&mut self) -> Outcome {
        let Some(client) = self
            .brand_form
            .as_ref()
            .and_then(|f| f.client(Uuid::new_v4().to_string()))
        else {
            return Outcome::Ignored;
        };

        tracing::info!(client = %client.id, name = %client.name, "brand created");
        self.log_transition("add_brand", Some(format!("Created brand {}", client.name)));
        self.clients.push(client);
        self.brand_form = None;
        Outcome::Applied
    }

    // --- To-dos --- //

    fn toggle_todo(&mut self, id: &str) -> Outcome {
        let Some(todo) = self.todos.iter_mut().find(|t| t.id == id) else {
            return Outcome::Ignored;
        };
        todo.completed = !todo.completed;
        let details = format!("To-do {} completed: {}", todo.id, todo.completed);
        self.log_transition("toggle_todo", Some(details));
        Outcome::Applied
    }

    // --- Derived state --- //

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    pub fn active_client(&self) -> Option<&Client> {
        scope::active_client(self.session.as_ref(), &self.clients)
    }

    pub fn filtered_posts(&self) -> Vec<&Post> {
        scope::filter_scoped(&self.posts, self.active_client())
    }

    pub fn filtered_todos(&self) -> Vec<&Todo> {
        scope::filter_scoped(&self.todos, self.active_client())
    }

    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn members(&self) -> &[AgencyMember] {
        &self.members
    }

    pub fn login_form(&self) -> &LoginForm {
        &self.login
    }

    pub fn composer(&self) -> Option<&PostComposer> {
        self.composer.as_ref()
    }

    pub fn member_form(&self) -> Option<&MemberForm> {
        self.member_form.as_ref()
    }

    pub fn brand_form(&self) -> Option<&BrandForm> {
        self.brand_form.as_ref()
    }

    /// Everything a view needs to render the current portal state
    pub fn snapshot(&self) -> Snapshot {
        let active = self.active_client();

        Snapshot {
            session: self.session.clone(),
            active_client: active.cloned(),
            active_tab: self.active_tab,
            navigation: nav::navigation(self.active_tab, active),
            scope_header: self
                .session
                .as_ref()
                .map(|s| nav::scope_header(s, &self.clients, active)),
            posts: self.filtered_posts().into_iter().cloned().collect(),
            todos: self.filtered_todos().into_iter().cloned().collect(),
            clients: self.clients.clone(),
            members: self.members.clone(),
            login: self.login.clone(),
            composer: self.composer.clone(),
            member_form: self.member_form.clone(),
            brand_form: self.brand_form.clone(),
            transition_history: self.history.iter().cloned().collect(),
        }
    }
}

/// Point-in-time view of the portal, with posts and to-dos already filtered
/// to the active scope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub session: Option<Session>,
    pub active_client: Option<Client>,
    pub active_tab: Tab,
    pub navigation: Vec<NavItem>,
    pub scope_header: Option<ScopeHeader>,
    pub posts: Vec<Post>,
    pub todos: Vec<Todo>,
    pub clients: Vec<Client>,
    pub members: Vec<AgencyMember>,
    pub login: LoginForm,
    pub composer: Option<PostComposer>,
    pub member_form: Option<MemberForm>,
    pub brand_form: Option<BrandForm>,
    pub transition_history: Vec<TransitionLogEntry>,
}

impl Snapshot {
    pub fn dashboard(&self) -> Dashboard {
        let posts: Vec<&Post> = self.posts.iter().collect();
        let todos: Vec<&Todo> = self.todos.iter().collect();
        views::dashboard(self.active_client.as_ref(), &self.clients, &posts, &todos)
    }

    /// The management screen, available to agency users in global scope
    pub fn team(&self) -> Option<TeamOverview> {
        match (&self.session, &self.active_client) {
            (Some(Session::Agency { .. }), None) => Some(TeamOverview {
                members: self.members.clone(),
                clients: self.clients.clone(),
            }),
            _ => None,
        }
    }

    pub fn scoped_tab(&self) -> ScopedTab {
        let todos: Vec<&Todo> = self.todos.iter().collect();
        views::scoped_tab(self.active_client.as_ref(), &self.clients, &todos)
    }
}

/// Result of a portal call together with the state it left behind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalResponse<T> {
    pub res: T,
    pub snapshot: Snapshot,
}

impl<T> PortalResponse<T> {
    pub fn new(res: T, snapshot: Snapshot) -> Self {
        Self { res, snapshot }
    }

    pub fn inner(&self) -> &T {
        &self.res
    }

    pub fn into_inner(self) -> T {
        self.res
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }
}

#[derive(Clone)]
pub struct Core {
    inner: Arc<Mutex<Context>>,
    update_tx: Arc<tokio::sync::broadcast::Sender<()>>,
}

impl Core {
    pub fn new(context: Context) -> Self {
        // Create a broadcast channel with capacity for 100 messages
        let (tx, _rx) = tokio::sync::broadcast::channel(100);

        Self {
            inner: Arc::new(Mutex::new(context)),
            update_tx: Arc::new(tx),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Context> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Read-only access to the context
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Context) -> R,
    {
        f(&self.lock())
    }

    pub fn snapshot(&self) -> Snapshot {
        self.read(|context| context.snapshot())
    }

    pub fn dispatch(&self, action: Action) -> Result<PortalResponse<Outcome>, PortalError> {
        let response = {
            let mut context = self.lock();
            let outcome = context.dispatch(action)?;
            PortalResponse::new(outcome, context.snapshot())
        };

        if response.res.is_applied() {
            // Nobody listening is fine
            let _ = self.update_tx.send(());
        }
        Ok(response)
    }

    /// Runs several actions under one lock, all or nothing. The batch runs
    /// against a copy of the context that replaces it only if every action
    /// succeeds, so an error leaves the state untouched.
    /// Returns the outcome of the last action.
    pub fn dispatch_all(
        &self,
        actions: Vec<Action>,
    ) -> Result<PortalResponse<Outcome>, PortalError> {
        if actions.is_empty() {
            return Err(PortalError::InvalidInput("empty action batch".to_string()));
        }

        let (response, changed) = {
            let mut context = self.lock();
            let mut draft = context.clone();
            let mut outcome = Outcome::Ignored;
            let mut changed = false;
            for action in actions {
                outcome = draft.dispatch(action)?;
                changed |= outcome.is_applied();
            }
            *context = draft;
            (PortalResponse::new(outcome, context.snapshot()), changed)
        };

        if changed {
            let _ = self.update_tx.send(());
        }
        Ok(response)
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<()> {
        self.update_tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PostStatus;
    use pretty_assertions::assert_eq;

    fn context() -> Context {
        Context::new(PortalConfig {
            rng_seed: Some(7),
            ..PortalConfig::default()
        })
    }

    fn login(context: &mut Context, email: &str) -> Outcome {
        context
            .dispatch(Action::UpdateLogin {
                email: Some(email.to_string()),
                password: Some("secret".to_string()),
            })
            .unwrap();
        context.dispatch(Action::SubmitLogin).unwrap()
    }

    fn switch(context: &mut Context, id: &str) -> Outcome {
        context
            .dispatch(Action::SwitchClient {
                client_id: id.to_string(),
            })
            .unwrap()
    }

    #[test]
    fn test_agency_login() {
        let mut context = context();
        assert_eq!(login(&mut context, "Someone@ANUSUAL.com"), Outcome::Applied);

        let session = context.session().unwrap();
        assert_eq!(session.user().id, "a1");
        assert!(context.active_client().is_none());
        assert!(!context.login_form().error);
    }

    #[test]
    fn test_client_login_selects_brand() {
        let mut context = context();
        assert_eq!(login(&mut context, "boss@techcorp.com"), Outcome::Applied);
        assert_eq!(context.active_client().unwrap().id, "1");
    }

    #[test]
    fn test_short_email_is_rejected() {
        let mut context = context();
        assert_eq!(login(&mut context, "ab"), Outcome::Ignored);
        assert!(context.session().is_none());
        assert!(context.login_form().error);
        assert_eq!(context.login_form().email, "ab");
        assert_eq!(context.login_form().password, "secret");

        // A later successful attempt clears the flag
        login(&mut context, "abcd");
        assert!(!context.login_form().error);
    }

    #[test]
    fn test_custom_agency_domain() {
        let mut context = Context::new(PortalConfig {
            agency_domain: "studio.test".to_string(),
            rng_seed: Some(1),
        });
        login(&mut context, "me@studio.test");
        assert_eq!(
            context.session().unwrap().role(),
            crate::models::UserRole::Agency
        );
    }

    #[test]
    fn test_actions_require_session() {
        let mut context = context();
        assert_eq!(
            context.dispatch(Action::OpenComposer),
            Err(PortalError::NotAuthenticated)
        );
        assert_eq!(
            context.dispatch(Action::ToggleTodo {
                id: "t1".to_string()
            }),
            Err(PortalError::NotAuthenticated)
        );
    }

    #[test]
    fn test_logout_resets_state() {
        let mut context = context();
        login(&mut context, "studio@anusual.com");
        switch(&mut context, "2");
        context
            .dispatch(Action::SelectTab { tab: Tab::Calendar })
            .unwrap();
        context.dispatch(Action::OpenComposer).unwrap();

        context.dispatch(Action::Logout).unwrap();
        assert!(context.session().is_none());
        assert_eq!(context.active_tab(), Tab::Dashboard);
        assert_eq!(context.login_form(), &LoginForm::default());
        assert!(context.composer().is_none());

        // Logging back in as the agency starts in global scope again
        login(&mut context, "studio@anusual.com");
        assert!(context.active_client().is_none());
    }

    #[test]
    fn test_client_only_tabs_are_inert_in_global_scope() {
        let mut context = context();
        login(&mut context, "studio@anusual.com");

        for tab in [Tab::Calendar, Tab::Todos] {
            assert_eq!(
                context.dispatch(Action::SelectTab { tab }).unwrap(),
                Outcome::Ignored
            );
            assert_eq!(context.active_tab(), Tab::Dashboard);
        }

        switch(&mut context, "1");
        assert_eq!(
            context
                .dispatch(Action::SelectTab { tab: Tab::Todos })
                .unwrap(),
            Outcome::Applied
        );
        assert_eq!(context.active_tab(), Tab::Todos);
    }

    #[test]
    fn test_scope_filters_lists() {
        let mut context = context();
        login(&mut context, "studio@anusual.com");
        assert_eq!(context.filtered_posts().len(), context.posts().len());

        switch(&mut context, "2");
        let posts = context.filtered_posts();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id, "p3");
        let todos: Vec<_> = context.filtered_todos().iter().map(|t| t.id.clone()).collect();
        assert_eq!(todos, vec!["t3".to_string()]);

        switch(&mut context, "global");
        assert!(context.active_client().is_none());
    }

    #[test]
    fn test_client_cannot_switch_scope() {
        let mut context = context();
        login(&mut context, "marketing@techcorp.com");
        assert_eq!(switch(&mut context, "2"), Outcome::Ignored);
        assert_eq!(switch(&mut context, "global"), Outcome::Ignored);
        assert_eq!(context.active_client().unwrap().id, "1");
    }

    fn compose(context: &mut Context, client_id: Option<&str>) {
        context.dispatch(Action::OpenComposer).unwrap();
        context
            .dispatch(Action::UpdateComposer {
                client_id: client_id.map(str::to_string),
                title: Some("Promo".to_string()),
                content: Some("text".to_string()),
                date: Some("2024-06-01T10:00".to_string()),
            })
            .unwrap();
    }

    #[test]
    fn test_submit_composer_prepends_post() {
        let mut context = context();
        login(&mut context, "studio@anusual.com");
        let before = context.posts().len();

        compose(&mut context, Some("2"));
        context
            .dispatch(Action::ToggleComposerPlatform {
                platform: Platform::Instagram,
            })
            .unwrap();
        assert_eq!(
            context.dispatch(Action::SubmitComposer).unwrap(),
            Outcome::Applied
        );

        assert_eq!(context.posts().len(), before + 1);
        let post = &context.posts()[0];
        assert_eq!(post.client_id, "2");
        assert_eq!(post.title, "Promo");
        assert_eq!(post.status, PostStatus::Scheduled);
        assert_eq!(post.platforms, vec![Platform::Instagram]);
        assert!(Uuid::parse_str(&post.id).is_ok());
        assert!(context.composer().is_none());
        // Brand statistics are left alone
        assert_eq!(context.clients()[1].active_posts, 8);
    }

    #[test]
    fn test_incomplete_composer_is_ignored() {
        let mut context = context();
        login(&mut context, "studio@anusual.com");
        let before = context.posts().to_vec();

        // No platform selected
        compose(&mut context, Some("2"));
        assert_eq!(
            context.dispatch(Action::SubmitComposer).unwrap(),
            Outcome::Ignored
        );
        assert_eq!(context.posts(), before.as_slice());
        assert!(context.composer().is_some());

        // No client selected
        context.dispatch(Action::CloseComposer).unwrap();
        compose(&mut context, None);
        context
            .dispatch(Action::ToggleComposerPlatform {
                platform: Platform::Tiktok,
            })
            .unwrap();
        assert_eq!(
            context.dispatch(Action::SubmitComposer).unwrap(),
            Outcome::Ignored
        );
        assert_eq!(context.posts(), before.as_slice());
        assert!(context.composer().is_some());
    }

    #[test]
    fn test_composer_rejects_unknown_client() {
        let mut context = context();
        login(&mut context, "studio@anusual.com");
        compose(&mut context, Some("404"));
        context
            .dispatch(Action::ToggleComposerPlatform {
                platform: Platform::Facebook,
            })
            .unwrap();
        assert_eq!(
            context.dispatch(Action::SubmitComposer).unwrap(),
            Outcome::Ignored
        );
    }

    #[test]
    fn test_composer_locks_to_scope() {
        let mut context = context();
        login(&mut context, "marketing@techcorp.com");
        compose(&mut context, Some("3"));

        let composer = context.composer().unwrap();
        assert!(composer.is_client_locked());
        assert_eq!(composer.client_id(), "1");
    }

    #[test]
    fn test_toggle_todo_twice_restores() {
        let mut context = context();
        login(&mut context, "studio@anusual.com");
        let before = context.todos().to_vec();

        let toggle = Action::ToggleTodo {
            id: "t1".to_string(),
        };
        context.dispatch(toggle.clone()).unwrap();
        assert!(context.todos()[0].completed);
        assert_eq!(&context.todos()[1..], &before[1..]);

        context.dispatch(toggle).unwrap();
        assert_eq!(context.todos(), before.as_slice());

        assert_eq!(
            context
                .dispatch(Action::ToggleTodo {
                    id: "t99".to_string()
                })
                .unwrap(),
            Outcome::Ignored
        );
    }

    #[test]
    fn test_add_brand() {
        let mut context = context();
        login(&mut context, "studio@anusual.com");

        context.dispatch(Action::OpenBrandForm).unwrap();
        assert_eq!(
            context.dispatch(Action::SubmitBrandForm).unwrap(),
            Outcome::Ignored
        );
        assert!(context.brand_form().is_some());

        context
            .dispatch(Action::UpdateBrandForm {
                name: Some("Acme".to_string()),
                industry: Some(String::new()),
            })
            .unwrap();
        assert_eq!(
            context.dispatch(Action::SubmitBrandForm).unwrap(),
            Outcome::Applied
        );

        let acme = context.clients().last().unwrap().clone();
        assert_eq!(acme.name, "Acme");
        assert_eq!(acme.industry, "General");
        assert_eq!(acme.active_posts, 0);
        assert_eq!(acme.platforms, vec![Platform::Instagram, Platform::Facebook]);
        assert!(context.brand_form().is_none());

        // The new brand can be selected right away
        switch(&mut context, &acme.id);
        assert_eq!(context.active_client().unwrap().name, "Acme");
    }

    #[test]
    fn test_add_member_and_cancel() {
        let mut context = context();
        login(&mut context, "studio@anusual.com");
        let before = context.members().len();

        context.dispatch(Action::OpenMemberForm).unwrap();
        context
            .dispatch(Action::UpdateMemberForm {
                name: Some("Giulia".to_string()),
                role: None,
                email: None,
            })
            .unwrap();
        assert_eq!(
            context.dispatch(Action::SubmitMemberForm).unwrap(),
            Outcome::Ignored
        );
        context.dispatch(Action::CloseMemberForm).unwrap();
        assert_eq!(context.members().len(), before);

        // Reopening starts from an empty buffer
        context.dispatch(Action::OpenMemberForm).unwrap();
        assert_eq!(context.member_form(), Some(&MemberForm::default()));
        context
            .dispatch(Action::UpdateMemberForm {
                name: Some("Giulia".to_string()),
                role: Some("Copywriter".to_string()),
                email: Some("a.boss@anusual.com".to_string()),
            })
            .unwrap();
        context.dispatch(Action::SubmitMemberForm).unwrap();
        assert_eq!(context.members().len(), before + 1);
        assert_eq!(context.members().last().unwrap().name, "Giulia");
    }

    #[test]
    fn test_client_cannot_open_admin_forms() {
        let mut context = context();
        login(&mut context, "marketing@techcorp.com");
        assert_eq!(
            context.dispatch(Action::OpenMemberForm).unwrap(),
            Outcome::Ignored
        );
        assert_eq!(
            context.dispatch(Action::OpenBrandForm).unwrap(),
            Outcome::Ignored
        );
    }

    #[test]
    fn test_transition_history_is_bounded() {
        let mut context = context();
        login(&mut context, "studio@anusual.com");
        for _ in 0..(MAX_HISTORY_SIZE + 5) {
            context
                .dispatch(Action::ToggleTodo {
                    id: "t2".to_string(),
                })
                .unwrap();
        }
        let snapshot = context.snapshot();
        assert_eq!(snapshot.transition_history.len(), MAX_HISTORY_SIZE);
        assert_eq!(
            snapshot.transition_history.last().unwrap().action,
            "toggle_todo"
        );
    }

    #[test]
    fn test_snapshot_team_only_for_agency_in_global_scope() {
        let mut context = context();
        login(&mut context, "studio@anusual.com");
        assert!(context.snapshot().team().is_some());

        switch(&mut context, "1");
        assert!(context.snapshot().team().is_none());
    }

    #[test]
    fn test_core_notifies_on_change() {
        let core = Core::new(context());
        let mut rx = core.subscribe();

        core.dispatch(Action::UpdateLogin {
            email: Some("studio@anusual.com".to_string()),
            password: None,
        })
        .unwrap();
        assert!(rx.try_recv().is_ok());

        let response = core
            .dispatch(Action::SelectTab { tab: Tab::Calendar })
            .map(|r| r.into_inner());
        assert_eq!(response, Err(PortalError::NotAuthenticated));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_core_dispatch_all() {
        let core = Core::new(context());
        let response = core
            .dispatch_all(vec![
                Action::UpdateLogin {
                    email: Some("studio@anusual.com".to_string()),
                    password: Some("x".to_string()),
                },
                Action::SubmitLogin,
                Action::SwitchClient {
                    client_id: "3".to_string(),
                },
            ])
            .unwrap();
        assert_eq!(response.inner(), &Outcome::Applied);
        assert_eq!(
            response.snapshot().active_client.as_ref().map(|c| c.id.as_str()),
            Some("3")
        );

        assert!(matches!(
            core.dispatch_all(Vec::new()),
            Err(PortalError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_failed_batch_leaves_state_untouched() {
        let core = Core::new(context());
        let mut rx = core.subscribe();

        // The login edit is allowed on its own, the toggle needs a session
        let result = core.dispatch_all(vec![
            Action::UpdateLogin {
                email: Some("typed@x.com".to_string()),
                password: None,
            },
            Action::ToggleTodo {
                id: "t1".to_string(),
            },
        ]);
        assert!(matches!(result, Err(PortalError::NotAuthenticated)));
        assert_eq!(core.read(|c| c.login_form().email.clone()), "");
        assert!(core.read(|c| c.snapshot().transition_history.is_empty()));
        assert!(rx.try_recv().is_err());

        // A batch that only partly applies still notifies
        core.dispatch_all(vec![
            Action::UpdateLogin {
                email: Some("studio@anusual.com".to_string()),
                password: None,
            },
            Action::SubmitLogin,
            Action::SelectTab { tab: Tab::Todos },
        ])
        .unwrap();
        assert!(rx.try_recv().is_ok());
        assert!(core.read(|c| c.session().is_some()));
    }

    #[test]
    fn test_set_composer_platforms() {
        let mut context = context();
        login(&mut context, "studio@anusual.com");
        assert_eq!(
            context
                .dispatch(Action::SetComposerPlatforms {
                    platforms: vec![Platform::Tiktok],
                })
                .unwrap(),
            Outcome::Ignored
        );

        compose(&mut context, Some("2"));
        context
            .dispatch(Action::ToggleComposerPlatform {
                platform: Platform::Facebook,
            })
            .unwrap();
        context
            .dispatch(Action::SetComposerPlatforms {
                platforms: vec![Platform::Tiktok, Platform::Instagram],
            })
            .unwrap();
        assert_eq!(
            context.composer().unwrap().platforms(),
            &[Platform::Tiktok, Platform::Instagram]
        );
    }
}
