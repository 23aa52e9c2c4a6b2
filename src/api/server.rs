//! API Server module
//!
//! This module provides the HTTP server for the portal: a JSON API around the
//! action reducer, and the server-rendered HTML portal.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::broadcast::error::RecvError;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::ui;
use crate::context::{Action, Core, PortalError};
use crate::models::Platform;
use crate::nav::Tab;

/// Server configuration
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub address: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: ([127, 0, 0, 1], 3000).into(),
        }
    }
}

/// API responses
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

/// Helper function to map Core results to Axum responses
fn map_core_result<T: Serialize>(result: Result<T, PortalError>) -> Response {
    match result {
        Ok(data) => (StatusCode::OK, Json(ApiResponse::success(data))).into_response(),
        Err(e @ PortalError::NotAuthenticated) => (
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::<T>::error(e.to_string())),
        )
            .into_response(),
        Err(e @ PortalError::InvalidInput(_)) => (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<T>::error(e.to_string())),
        )
            .into_response(),
    }
}

/// Builds the application router
pub fn router(core: Core) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(|| async { Redirect::temporary("/ui") }))
        // --- JSON API --- //
        .route("/api/state", get(get_state))
        .route("/api/dispatch", post(dispatch))
        .route("/api/dispatch/batch", post(dispatch_batch))
        .route("/api/posts", get(get_posts))
        .route("/api/todos", get(get_todos))
        .route("/api/clients", get(get_clients))
        .route("/api/members", get(get_members))
        // --- UI --- //
        .route("/ui", get(ui_handler))
        .route("/ui/events", get(events_handler))
        .route("/ui/login", post(ui_login))
        .route("/ui/logout", post(ui_logout))
        .route("/ui/scope", post(ui_scope))
        .route("/ui/tab", post(ui_tab))
        .route("/ui/composer", post(ui_submit_composer))
        .route("/ui/composer/open", post(ui_open_composer))
        .route("/ui/composer/close", post(ui_close_composer))
        .route("/ui/members", post(ui_submit_member))
        .route("/ui/members/open", post(ui_open_member))
        .route("/ui/members/close", post(ui_close_member))
        .route("/ui/brands", post(ui_submit_brand))
        .route("/ui/brands/open", post(ui_open_brand))
        .route("/ui/brands/close", post(ui_close_brand))
        .route("/ui/todos/:id/toggle", post(ui_toggle_todo))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(core)
}

/// Starts the API server
pub async fn serve(core: Core, config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let app = router(core);

    tracing::info!("Starting server on {}", config.address);
    let listener = TcpListener::bind(config.address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- JSON handlers --- //

async fn get_state(State(core): State<Core>) -> impl IntoResponse {
    map_core_result(Ok(core.snapshot()))
}

async fn dispatch(State(core): State<Core>, Json(action): Json<Action>) -> impl IntoResponse {
    map_core_result(core.dispatch(action))
}

async fn dispatch_batch(
    State(core): State<Core>,
    Json(actions): Json<Vec<Action>>,
) -> impl IntoResponse {
    map_core_result(core.dispatch_all(actions))
}

async fn get_posts(State(core): State<Core>) -> impl IntoResponse {
    let posts: Vec<_> = core.read(|c| c.filtered_posts().into_iter().cloned().collect());
    map_core_result(Ok(posts))
}

async fn get_todos(State(core): State<Core>) -> impl IntoResponse {
    let todos: Vec<_> = core.read(|c| c.filtered_todos().into_iter().cloned().collect());
    map_core_result(Ok(todos))
}

async fn get_clients(State(core): State<Core>) -> impl IntoResponse {
    map_core_result(Ok(core.read(|c| c.clients().to_vec())))
}

async fn get_members(State(core): State<Core>) -> impl IntoResponse {
    map_core_result(Ok(core.read(|c| c.members().to_vec())))
}

// --- UI handlers --- //

async fn ui_handler(State(core): State<Core>) -> impl IntoResponse {
    Html(ui::render(&core.snapshot()))
}

/// Applies the actions and sends the browser back to the portal page.
/// A missing session just lands on the login page.
fn apply_and_redirect(core: &Core, actions: Vec<Action>) -> Redirect {
    if let Err(e) = core.dispatch_all(actions) {
        tracing::warn!("UI action rejected: {}", e);
    }
    Redirect::to("/ui")
}

#[derive(Deserialize)]
struct LoginForm {
    email: String,
    #[serde(default)]
    password: String,
}

async fn ui_login(State(core): State<Core>, Form(form): Form<LoginForm>) -> Redirect {
    apply_and_redirect(
        &core,
        vec![
            Action::UpdateLogin {
                email: Some(form.email),
                password: Some(form.password),
            },
            Action::SubmitLogin,
        ],
    )
}

async fn ui_logout(State(core): State<Core>) -> Redirect {
    apply_and_redirect(&core, vec![Action::Logout])
}

#[derive(Deserialize)]
struct ScopeForm {
    client_id: String,
}

async fn ui_scope(State(core): State<Core>, Form(form): Form<ScopeForm>) -> Redirect {
    apply_and_redirect(
        &core,
        vec![Action::SwitchClient {
            client_id: form.client_id,
        }],
    )
}

#[derive(Deserialize)]
struct TabForm {
    tab: Tab,
}

async fn ui_tab(State(core): State<Core>, Form(form): Form<TabForm>) -> Redirect {
    apply_and_redirect(&core, vec![Action::SelectTab { tab: form.tab }])
}

async fn ui_open_composer(State(core): State<Core>) -> Redirect {
    apply_and_redirect(&core, vec![Action::OpenComposer])
}

async fn ui_close_composer(State(core): State<Core>) -> Redirect {
    apply_and_redirect(&core, vec![Action::CloseComposer])
}

/// The whole composer form; platforms arrive as one checkbox field each
#[derive(Deserialize)]
struct ComposerForm {
    client_id: Option<String>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    date: String,
    facebook: Option<String>,
    instagram: Option<String>,
    linkedin: Option<String>,
    tiktok: Option<String>,
}

impl ComposerForm {
    fn is_checked(&self, platform: Platform) -> bool {
        match platform {
            Platform::Facebook => self.facebook.is_some(),
            Platform::Instagram => self.instagram.is_some(),
            Platform::Linkedin => self.linkedin.is_some(),
            Platform::Tiktok => self.tiktok.is_some(),
        }
    }
}

async fn ui_submit_composer(State(core): State<Core>, Form(form): Form<ComposerForm>) -> Redirect {
    let platforms = Platform::ALL
        .into_iter()
        .filter(|p| form.is_checked(*p))
        .collect();

    apply_and_redirect(
        &core,
        vec![
            Action::UpdateComposer {
                client_id: form.client_id,
                title: Some(form.title),
                content: Some(form.content),
                date: Some(form.date),
            },
            Action::SetComposerPlatforms { platforms },
            Action::SubmitComposer,
        ],
    )
}

async fn ui_open_member(State(core): State<Core>) -> Redirect {
    apply_and_redirect(&core, vec![Action::OpenMemberForm])
}

async fn ui_close_member(State(core): State<Core>) -> Redirect {
    apply_and_redirect(&core, vec![Action::CloseMemberForm])
}

#[derive(Deserialize)]
struct MemberForm {
    #[serde(default)]
    name: String,
    #[serde(default)]
    role: String,
    #[serde(default)]
    email: String,
}

async fn ui_submit_member(State(core): State<Core>, Form(form): Form<MemberForm>) -> Redirect {
    apply_and_redirect(
        &core,
        vec![
            Action::UpdateMemberForm {
                name: Some(form.name),
                role: Some(form.role),
                email: Some(form.email),
            },
            Action::SubmitMemberForm,
        ],
    )
}

async fn ui_open_brand(State(core): State<Core>) -> Redirect {
    apply_and_redirect(&core, vec![Action::OpenBrandForm])
}

async fn ui_close_brand(State(core): State<Core>) -> Redirect {
    apply_and_redirect(&core, vec![Action::CloseBrandForm])
}

#[derive(Deserialize)]
struct BrandForm {
    #[serde(default)]
    name: String,
    #[serde(default)]
    industry: String,
}

async fn ui_submit_brand(State(core): State<Core>, Form(form): Form<BrandForm>) -> Redirect {
    apply_and_redirect(
        &core,
        vec![
            Action::UpdateBrandForm {
                name: Some(form.name),
                industry: Some(form.industry),
            },
            Action::SubmitBrandForm,
        ],
    )
}

async fn ui_toggle_todo(State(core): State<Core>, Path(id): Path<String>) -> Redirect {
    apply_and_redirect(&core, vec![Action::ToggleTodo { id }])
}

// --- Change notifications --- //

async fn events_handler(State(core): State<Core>) -> impl IntoResponse {
    let receiver = core.subscribe();

    let stream = futures::stream::unfold(receiver, |mut rx| async move {
        match rx.recv().await {
            // Missed notifications still mean something changed
            Ok(()) | Err(RecvError::Lagged(_)) => Some((
                Ok::<_, Infallible>("event: update\ndata: change\n\n".to_string()),
                rx,
            )),
            Err(RecvError::Closed) => None,
        }
    });

    // Set headers for event stream
    let headers = [
        (
            axum::http::header::CONTENT_TYPE,
            axum::http::HeaderValue::from_static("text/event-stream"),
        ),
        (
            axum::http::header::CACHE_CONTROL,
            axum::http::HeaderValue::from_static("no-cache"),
        ),
    ];

    (headers, axum::body::Body::from_stream(stream))
}
