//! Export handlers
//!
//! Documents are rendered as sent, under the company they belong to (or the
//! active company when they name none).

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};

use domain_document::{ColumnRegistry, Company, DocumentState};
use export_pdf::RenderSummary;

use crate::{error::ApiError, AppState};

async fn render_context(
    state: &AppState,
    document: &DocumentState,
) -> Result<(Company, ColumnRegistry), ApiError> {
    let workspace = state.workspace.lock().await;
    let company = workspace.company_for(document)?.clone();
    Ok((company, workspace.column_registry.clone()))
}

/// Runs layout or rendering on the blocking pool
async fn render_blocking<T, F>(task: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| ApiError::Internal(format!("Export task failed: {}", e)))
}

fn file_name(document: &DocumentState, extension: &str) -> String {
    let stem: String = document
        .doc_number
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    if stem.is_empty() {
        format!("{}.{}", document.doc_type.label().to_lowercase(), extension)
    } else {
        format!("{}.{}", stem, extension)
    }
}

/// Renders the document to a PDF download
pub async fn export_pdf(
    State(state): State<AppState>,
    Json(document): Json<DocumentState>,
) -> Result<Response, ApiError> {
    let (company, registry) = render_context(&state, &document).await?;
    let (name, bytes) = render_blocking(move || {
        ::export_pdf::export_pdf(&document, &company, &registry)
            .map(|bytes| (file_name(&document, "pdf"), bytes))
    })
    .await??;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", name),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// Page assignment of every block, without producing a file
pub async fn layout(
    State(state): State<AppState>,
    Json(document): Json<DocumentState>,
) -> Result<Json<RenderSummary>, ApiError> {
    let (company, registry) = render_context(&state, &document).await?;
    let summary =
        render_blocking(move || export_pdf::layout_preview(&document, &company, &registry)).await?;
    Ok(Json(summary))
}

/// Word export is not available
pub async fn export_docx(
    State(state): State<AppState>,
    Json(document): Json<DocumentState>,
) -> Result<Response, ApiError> {
    let (company, registry) = render_context(&state, &document).await?;
    let bytes =
        render_blocking(move || export_pdf::export_docx(&document, &company, &registry)).await??;
    Ok((
        [(
            header::CONTENT_TYPE,
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        )],
        bytes,
    )
        .into_response())
}
