//! # Folio PDF
//!
//! lopdf-backed collaborators for `folio-editor`:
//!
//! - [`LopdfBackend`] opens sources and builds the reconstructed document
//! - [`LopdfRenderer`] produces size-only previews at load time
//!
//! Copied pages carry their inherited attributes (`/Resources`, `/MediaBox`,
//! `/CropBox`, `/Rotate`) explicitly, and objects shared between pages are
//! written to the output once.

mod backend;
mod copier;
mod error;
mod page_tree;
mod render;

pub use backend::{LopdfBackend, OutputPdf, SourcePdf};
pub use error::PdfError;
pub use render::{inspect, LopdfRenderer, PageInfo};
