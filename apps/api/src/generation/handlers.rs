//! Axum route handlers for the Generation API.
//!
//! Both endpoints answer with JSON by default. With `"stream": true` they
//! answer with server-sent events: `delta` for each text chunk, then a single
//! `done` carrying the cleaned result or an `error`.

use std::convert::Infallible;

use axum::{
    extract::State,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{info, warn};

use crate::ai::{create_provider, AiProvider, ProgressFn, ProviderConfig, StreamProgress};
use crate::document::{editor, DocumentStore};
use crate::errors::AppError;
use crate::generation::generator::{
    generate_cover_letter, generate_summary, DocumentKind, GenerationOutcome,
};
use crate::models::resume::ResumeData;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct GenerateRequest {
    /// Overrides the job description saved in the AI settings.
    pub job_description: Option<String>,
    #[serde(default)]
    pub stream: bool,
    /// Writes the result into the document once generation succeeds.
    #[serde(default)]
    pub apply: bool,
}

#[derive(Debug, Serialize)]
struct DeltaPayload<'a> {
    content: &'a str,
}

/// POST /api/v1/generate/summary
pub async fn handle_generate_summary(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Response, AppError> {
    generate(state, DocumentKind::Summary, request).await
}

/// POST /api/v1/generate/cover-letter
pub async fn handle_generate_cover_letter(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Response, AppError> {
    generate(state, DocumentKind::CoverLetter, request).await
}

async fn generate(
    state: AppState,
    kind: DocumentKind,
    request: GenerateRequest,
) -> Result<Response, AppError> {
    let settings = state.settings.current().await;
    let job_description = request
        .job_description
        .filter(|jd| !jd.trim().is_empty())
        .unwrap_or(settings.job_description.clone());

    let provider = create_provider(&ProviderConfig::from_settings(&settings))?;
    let resume = state.documents.snapshot().await;

    if !request.stream {
        let outcome = run(
            provider.as_ref(),
            kind,
            &resume,
            &job_description,
            false,
            &|_: StreamProgress| {},
        )
        .await?;
        if request.apply {
            apply_outcome(&state.documents, kind, &outcome).await?;
        }
        return Ok(Json(outcome).into_response());
    }

    let (tx, rx) = mpsc::unbounded_channel::<Event>();
    tokio::spawn(stream_generation(
        provider,
        kind,
        resume,
        job_description,
        request.apply.then(|| state.documents.clone()),
        tx,
    ));

    let events = UnboundedReceiverStream::new(rx).map(Ok::<_, Infallible>);
    Ok(Sse::new(events)
        .keep_alive(KeepAlive::default())
        .into_response())
}

async fn run(
    provider: &dyn AiProvider,
    kind: DocumentKind,
    resume: &ResumeData,
    job_description: &str,
    stream: bool,
    on_progress: ProgressFn<'_>,
) -> Result<GenerationOutcome, AppError> {
    match kind {
        DocumentKind::Summary => {
            generate_summary(provider, resume, job_description, stream, on_progress).await
        }
        DocumentKind::CoverLetter => {
            generate_cover_letter(provider, resume, job_description, stream, on_progress).await
        }
    }
}

/// Runs one generation and reports it over `tx`. A client that disconnects
/// closes the channel; the generation still completes and is applied.
async fn stream_generation(
    provider: Box<dyn AiProvider>,
    kind: DocumentKind,
    resume: ResumeData,
    job_description: String,
    apply_to: Option<DocumentStore>,
    tx: mpsc::UnboundedSender<Event>,
) {
    let progress_tx = tx.clone();
    let on_progress = move |progress: StreamProgress| {
        if let Some(content) = progress.content.as_deref() {
            let _ = progress_tx.send(json_event("delta", &DeltaPayload { content }));
        }
    };

    let result = run(
        provider.as_ref(),
        kind,
        &resume,
        &job_description,
        true,
        &on_progress,
    )
    .await;

    let result = match (result, apply_to) {
        (Ok(outcome), Some(documents)) => apply_outcome(&documents, kind, &outcome)
            .await
            .map(|_| outcome),
        (result, _) => result,
    };

    let event = match result {
        Ok(outcome) => json_event("done", &outcome),
        Err(e) => {
            let (code, message) = e.code_and_message();
            warn!("Streamed {} generation failed: {message}", kind.label().to_lowercase());
            json_event("error", &json!({ "code": code, "message": message }))
        }
    };
    let _ = tx.send(event);
}

async fn apply_outcome(
    documents: &DocumentStore,
    kind: DocumentKind,
    outcome: &GenerationOutcome,
) -> Result<(), AppError> {
    let field = match kind {
        DocumentKind::Summary => "summary",
        DocumentKind::CoverLetter => "content",
    };
    let value = Value::String(outcome.content.clone());
    documents
        .update(|doc| editor::set_field(doc, field, &value))
        .await?;
    info!("Applied generated {} to the document", kind.label().to_lowercase());
    Ok(())
}

fn json_event<T: Serialize>(name: &str, payload: &T) -> Event {
    Event::default()
        .event(name)
        .json_data(payload)
        .unwrap_or_else(|_| Event::default().event(name))
}
