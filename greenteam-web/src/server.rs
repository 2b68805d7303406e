//! HTTP surface.
//!
//! # Endpoints
//!
//! - `GET /` - the form, `?mode=` and `?specialist=` preselect the route
//! - `POST /run` - multipart submission, renders the page with the answer
//! - `GET /api/agents` - the team as JSON
//! - `GET /health` - health check

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use greenteam::prelude::{
    Agent, AgentRegistry, DispatchSettings, Dispatcher, Error, ErrorKind, ToolKind,
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::API_KEY_ENV;
use crate::error::{AppError, AppResult};
use crate::form::Submission;
use crate::page::Page;

/// Largest accepted form body.
pub const BODY_LIMIT: usize = 25 * 1024 * 1024;

/// Shared state of the server.
#[derive(Debug)]
pub struct AppState {
    dispatcher: Option<Dispatcher>,
    catalog: AgentRegistry,
}

impl AppState {
    /// Connect the team from settings.
    ///
    /// Without a usable credential the server still starts: the page shows a
    /// banner and every submission is refused before any request is sent.
    #[must_use]
    pub fn from_settings(settings: &DispatchSettings) -> Self {
        match Dispatcher::connect(settings) {
            Ok(dispatcher) => Self::with_dispatcher(dispatcher),
            Err(e) => {
                warn!(error = %e, "Team not connected, submissions will be refused");
                Self::unconnected(&settings.model)
            }
        }
    }

    /// Serve an existing dispatcher.
    #[must_use]
    pub fn with_dispatcher(dispatcher: Dispatcher) -> Self {
        Self {
            catalog: dispatcher.registry().clone(),
            dispatcher: Some(dispatcher),
        }
    }

    /// A state that refuses every submission.
    #[must_use]
    pub fn unconnected(model: &str) -> Self {
        Self {
            dispatcher: None,
            catalog: AgentRegistry::unconnected(model),
        }
    }

    /// Returns `true` if submissions can reach the model.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.dispatcher.is_some()
    }

    fn page(&self, page: Page) -> Page {
        page.credential(self.is_connected(), credential_error().to_string())
    }
}

fn credential_error() -> Error {
    Error::credential_missing(API_KEY_ENV)
}

/// Create the router with all routes configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/run", post(run))
        .route("/api/agents", get(agents))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until Ctrl+C.
///
/// # Errors
///
/// Returns [`AppError::Server`] if the address cannot be bound and
/// [`AppError::Io`] if the server stops with an error.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> AppResult<()> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::server(format!("cannot bind {addr}: {e}")))?;
    info!(%addr, "Green Team listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

/// Route preselection of the form page.
#[derive(Debug, Default, Deserialize)]
pub struct IndexQuery {
    /// Routing-mode label.
    pub mode: Option<String>,
    /// Specialist display name.
    pub specialist: Option<String>,
}

async fn index(State(state): State<Arc<AppState>>, Query(query): Query<IndexQuery>) -> Html<String> {
    let page = Page::new(query.mode.as_deref(), query.specialist.as_deref());
    Html(state.page(page).render())
}

async fn run(State(state): State<Arc<AppState>>, multipart: Multipart) -> (StatusCode, Html<String>) {
    let submission = match Submission::read(multipart).await {
        Ok(submission) => submission,
        Err(e) => return failure(state.page(Page::new(None, None)), &e),
    };
    let mut page = state.page(Page::from_submission(&submission));

    let Some(dispatcher) = &state.dispatcher else {
        return failure(page, &credential_error());
    };

    let result = match submission.into_request() {
        Ok(form) => dispatcher.dispatch(form).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(outcome) => {
            info!(
                agent = %outcome.reply.agent_name,
                tokens = outcome.reply.usage.total_tokens,
                "Submission answered"
            );
            page.outcome = Some(outcome);
            (StatusCode::OK, Html(page.render()))
        }
        Err(e) => failure(page, &e),
    }
}

fn failure(mut page: Page, err: &Error) -> (StatusCode, Html<String>) {
    let kind = err.kind();
    warn!(kind = kind.as_str(), error = %err, "Submission failed");
    page.error = Some(err.to_string());
    (status_for(kind), Html(page.render()))
}

/// HTTP status for an error category.
#[must_use]
pub const fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::CredentialMissing => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::InvocationFailed => StatusCode::BAD_GATEWAY,
        ErrorKind::UploadFailed | ErrorKind::InvalidRequest => StatusCode::BAD_REQUEST,
    }
}

/// One agent as listed by `/api/agents`.
#[derive(Debug, Clone, Serialize)]
pub struct AgentSummary {
    /// Display name.
    pub name: String,
    /// Role description.
    pub role: String,
    /// Model identifier.
    pub model: String,
    /// Configured tool identifiers.
    pub tools: Vec<ToolKind>,
    /// Names of the agents this one can delegate to.
    pub members: Vec<String>,
}

impl From<&Agent> for AgentSummary {
    fn from(agent: &Agent) -> Self {
        Self {
            name: agent.name().to_owned(),
            role: agent.get_role().to_owned(),
            model: agent.get_model().to_owned(),
            tools: agent.get_tools().to_vec(),
            members: agent
                .get_managed_agents()
                .iter()
                .map(|a| a.name().to_owned())
                .collect(),
        }
    }
}

/// Summaries of the whole team, coordinator first.
#[must_use]
pub fn agent_summaries(registry: &AgentRegistry) -> Vec<AgentSummary> {
    registry.all().map(|a| AgentSummary::from(a.as_ref())).collect()
}

async fn agents(State(state): State<Arc<AppState>>) -> Json<Vec<AgentSummary>> {
    Json(agent_summaries(&state.catalog))
}

async fn health() -> &'static str {
    "ok"
}
