//! HTTP API Layer
//!
//! This crate provides the REST API for the quote builder using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers per resource (pricing, columns, companies,
//!   documents, clients, export, assistant, tickets)
//! - **Middleware**: Tracing and request logging
//! - **DTOs**: Request/Response data transfer objects, validated with `validator`
//! - **Error Handling**: Consistent JSON error responses
//!
//! The workspace lives behind a single async mutex. Every mutating handler
//! edits a copy under the lock, writes back only the parts it touched, and
//! swaps the copy in once the store accepted it.
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let state = AppState::new(workspace, store, assistant, config);
//! let app = create_router(state);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use domain_assistant::SuggestionService;
use domain_document::Workspace;
use infra_store::{StoreKey, WorkspaceStore};

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::handlers::{assistant, clients, columns, companies, documents, export, health, pricing, tickets};
use crate::middleware::request_log_middleware;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub workspace: Arc<Mutex<Workspace>>,
    pub store: Arc<dyn WorkspaceStore>,
    pub assistant: SuggestionService,
    pub config: ApiConfig,
}

impl AppState {
    pub fn new(
        workspace: Workspace,
        store: Arc<dyn WorkspaceStore>,
        assistant: SuggestionService,
        config: ApiConfig,
    ) -> Self {
        Self {
            workspace: Arc::new(Mutex::new(workspace)),
            store,
            assistant,
            config,
        }
    }

    /// Applies `edit` to a copy of the workspace and saves the given parts.
    /// The in-memory workspace changes only when both succeed.
    pub async fn commit<T, F>(&self, keys: &[StoreKey], edit: F) -> Result<T, ApiError>
    where
        F: FnOnce(&mut Workspace) -> Result<T, ApiError>,
    {
        let mut guard = self.workspace.lock().await;
        let mut next = guard.clone();
        let value = edit(&mut next)?;
        self.store.save_parts(&next, keys).await?;
        *guard = next;
        Ok(value)
    }
}

/// Creates the main API router
///
/// # Arguments
///
/// * `state` - Workspace, store, assistant and configuration
///
/// # Returns
///
/// Configured Axum router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    // Public routes
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    // Pricing routes
    let pricing_routes = Router::new()
        .route("/preview", post(pricing::preview))
        .route("/payment-plan", post(pricing::payment_plan));

    // Column registry routes
    let column_routes = Router::new()
        .route("/", get(columns::list_columns).post(columns::create_column))
        .route("/:key", put(columns::update_column).delete(columns::delete_column));

    // Company routes
    let company_routes = Router::new()
        .route("/", get(companies::list_companies).post(companies::create_company))
        .route("/:id", put(companies::update_company).delete(companies::delete_company))
        .route("/:id/activate", post(companies::activate_company));

    // Document routes
    let document_routes = Router::new()
        .route("/", get(documents::list_documents).post(documents::new_document))
        .route("/current", get(documents::get_current).put(documents::replace_current))
        .route("/current/save", post(documents::save_current))
        .route(
            "/current/categories/:category_id/apply-markup",
            post(documents::apply_markup),
        )
        .route("/:id", get(documents::get_document).delete(documents::delete_document))
        .route("/:id/open", post(documents::open_document));

    // Client routes
    let client_routes = Router::new()
        .route("/", get(clients::list_clients).post(clients::save_client))
        .route("/:id", delete(clients::delete_client));

    // Export routes
    let export_routes = Router::new()
        .route("/pdf", post(export::export_pdf))
        .route("/layout", post(export::layout))
        .route("/docx", post(export::export_docx));

    // Assistant routes
    let assistant_routes = Router::new()
        .route("/text", post(assistant::suggest_text))
        .route("/items", post(assistant::suggest_items))
        .route("/bulk", post(assistant::suggest_bulk))
        .route("/receipt", post(assistant::interpret_receipt));

    let api_routes = Router::new()
        .nest("/pricing", pricing_routes)
        .nest("/columns", column_routes)
        .nest("/companies", company_routes)
        .nest("/documents", document_routes)
        .nest("/clients", client_routes)
        .nest("/export", export_routes)
        .nest("/assistant", assistant_routes)
        .route("/tickets/check", post(tickets::check_ticket))
        .layer(axum_middleware::from_fn(request_log_middleware));

    // Combine all routes
    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
