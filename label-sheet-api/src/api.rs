use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use label_sheet::{
    compose_uploads, encode_sheet_pdf, preview, ComposedSheet, LabelPlacement, LabelUpload,
    LabelSheetError, PixelRect, PixelSize, Slot,
};
use serde::Serialize;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info};

/// Response header carrying [`ComposeInfo`] as JSON
pub const COMPOSE_INFO_HEADER: &str = "x-compose-info";

/// File name offered for the downloaded sheet
pub const DOWNLOAD_FILE_NAME: &str = "label_sheet.pdf";

const INDEX_HTML: &str = include_str!("../static/index.html");

/// Summary of a composed sheet, sent alongside the PDF
#[derive(Debug, Serialize)]
pub struct ComposeInfo {
    pub dpi: u32,
    pub sheet: PixelSize,
    pub placements: Vec<LabelPlacement>,
    /// Size of the PDF body; zero for previews
    pub pdf_bytes: usize,
}

impl ComposeInfo {
    fn new(sheet: &ComposedSheet, pdf_bytes: usize) -> Self {
        Self {
            dpi: sheet.dpi,
            sheet: PixelSize::new(sheet.image.width(), sheet.image.height()),
            placements: sheet.placements.clone(),
            pdf_bytes,
        }
    }

    fn header_value(&self) -> Result<HeaderValue, AppError> {
        let json = serde_json::to_string(self).map_err(|e| AppError::Response(e.to_string()))?;
        HeaderValue::from_str(&json).map_err(|e| AppError::Response(e.to_string()))
    }
}

/// Geometry of the sheet template
#[derive(Debug, Serialize)]
pub struct TemplateInfo {
    pub dpi: u32,
    pub sheet_mm: (f64, f64),
    pub slot_mm: (f64, f64),
    pub margin_mm: (f64, f64),
    pub gap_mm: (f64, f64),
    pub sheet_px: PixelSize,
    pub slot_px: PixelSize,
    /// Pixels by which the slot grid reaches past the sheet's right and bottom edges
    pub overflow_px: (u32, u32),
    pub slots: Vec<SlotInfo>,
}

#[derive(Debug, Serialize)]
pub struct SlotInfo {
    pub number: u8,
    pub name: &'static str,
    pub rect: PixelRect,
}

/// Build the application router with all routes configured
pub fn app(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes;

    Router::new()
        .route("/", get(index))
        .route("/api/health", get(health_check))
        // Template
        .route("/api/template", get(template_info))
        .route("/api/template/preview", get(template_preview))
        // Sheet operations
        .route("/api/preview", post(preview_sheet))
        .route("/api/compose", post(compose_pdf))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(Arc::new(state))
}

/// The upload page
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "label-sheet-api",
        "version": env!("CARGO_PKG_VERSION"),
        "rasterizer": state.rasterizer.name(),
    }))
}

pub async fn template_info(State(state): State<Arc<AppState>>) -> Json<TemplateInfo> {
    let layout = state.composer.layout();
    let slots = layout
        .slot_rects()
        .into_iter()
        .map(|(slot, rect)| SlotInfo {
            number: slot.number(),
            name: slot.name(),
            rect,
        })
        .collect();

    Json(TemplateInfo {
        dpi: layout.dpi,
        sheet_mm: layout.sheet_mm,
        slot_mm: layout.slot_mm,
        margin_mm: layout.margin_mm,
        gap_mm: layout.gap_mm,
        sheet_px: layout.sheet_size(),
        slot_px: layout.slot_size(),
        overflow_px: layout.overflow_px(),
        slots,
    })
}

/// Empty template with the slot outlines drawn in
pub async fn template_preview(State(state): State<Arc<AppState>>) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "image/png"),
            (header::CACHE_CONTROL, "public, max-age=3600"),
        ],
        state.template_png.clone(),
    )
        .into_response()
}

/// Compose the uploads and return a screen-sized PNG of the sheet
pub async fn preview_sheet(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let uploads = read_uploads(multipart, state.max_upload_bytes).await?;

    let worker = Arc::clone(&state);
    let (png, info) = tokio::task::spawn_blocking(move || -> label_sheet::Result<_> {
        let sheet = compose_uploads(worker.rasterizer.as_ref(), &worker.composer, &uploads)?;
        let png = preview::render_png(&sheet.image, worker.preview_width)?;
        Ok((png, ComposeInfo::new(&sheet, 0)))
    })
    .await??;

    debug!("Preview rendered ({} bytes)", png.len());

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("image/png")),
            (header::CACHE_CONTROL, HeaderValue::from_static("no-store")),
        ],
        [(COMPOSE_INFO_HEADER, info.header_value()?)],
        png,
    )
        .into_response())
}

/// Compose the uploads and return the sheet as a PDF download
pub async fn compose_pdf(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let uploads = read_uploads(multipart, state.max_upload_bytes).await?;

    let worker = Arc::clone(&state);
    let (pdf, info) = tokio::task::spawn_blocking(move || -> label_sheet::Result<_> {
        let sheet = compose_uploads(worker.rasterizer.as_ref(), &worker.composer, &uploads)?;
        let pdf = encode_sheet_pdf(&sheet, &worker.pdf_options)?;
        let info = ComposeInfo::new(&sheet, pdf.len());
        Ok((pdf, info))
    })
    .await??;

    info!(
        labels = info.placements.len(),
        bytes = pdf.len(),
        "Composed label sheet"
    );

    let disposition = format!("attachment; filename=\"{DOWNLOAD_FILE_NAME}\"");
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
            (
                header::CONTENT_DISPOSITION,
                HeaderValue::from_str(&disposition)
                    .map_err(|e| AppError::Response(e.to_string()))?,
            ),
        ],
        [(COMPOSE_INFO_HEADER, info.header_value()?)],
        pdf,
    )
        .into_response())
}

/// Collect `file` parts and their `slot` choices from a multipart form.
///
/// Slots pair with files by order. A file without a slot (or with a blank
/// one) goes into the slot matching its position.
async fn read_uploads(
    mut multipart: Multipart,
    limit: usize,
) -> Result<Vec<LabelUpload>, AppError> {
    let upload_error = |e: MultipartError| AppError::from_multipart(e, limit);
    let mut files: Vec<Vec<u8>> = Vec::new();
    let mut slots: Vec<Option<Slot>> = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(upload_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" | "files" | "files[]" => {
                debug!(
                    "Received {} ({})",
                    field.file_name().unwrap_or("unnamed upload"),
                    field.content_type().unwrap_or("no content type")
                );
                files.push(field.bytes().await.map_err(upload_error)?.to_vec());
            }
            "slot" | "slots" | "slots[]" => {
                let value = field.text().await.map_err(upload_error)?;
                let value = value.trim();
                slots.push(if value.is_empty() {
                    None
                } else {
                    Some(value.parse()?)
                });
            }
            other => debug!("Ignoring form field {:?}", other),
        }
    }

    if files.is_empty() {
        return Err(AppError::MissingUpload);
    }
    if files.len() > Slot::ALL.len() {
        return Err(LabelSheetError::TooManyLabels(files.len()).into());
    }
    if slots.len() > files.len() {
        debug!("Ignoring {} slot(s) without a file", slots.len() - files.len());
    }

    Ok(files
        .into_iter()
        .enumerate()
        .map(|(i, pdf)| {
            let slot = slots.get(i).copied().flatten().unwrap_or(Slot::ALL[i]);
            LabelUpload::new(slot, pdf)
        })
        .collect())
}
