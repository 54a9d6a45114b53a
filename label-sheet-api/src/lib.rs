//! # label-sheet-api
//!
//! Web UI and REST API for placing PDF shipping labels on a four-slot A4 sheet
//!

mod api;
pub mod config;
mod error;
mod state;

pub use api::{
    app, compose_pdf, health_check, index, preview_sheet, template_info, template_preview,
    ComposeInfo, SlotInfo, TemplateInfo, COMPOSE_INFO_HEADER, DOWNLOAD_FILE_NAME,
};
pub use config::Config;
pub use error::{AppError, ErrorResponse};
pub use state::AppState;
