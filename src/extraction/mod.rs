//! PDF-to-JSON batch extraction.
//!
//! # Pipeline
//!
//! - [`BatchProcessor`] - walks the input directory and drives each file
//! - [`validate_and_parse_json`] - fence stripping and strict parsing
//! - [`ErrorRecord`] - contents of `*_error.json` artifacts
//! - [`io`] - prompt loading and best-effort JSON persistence
//!
//! # Usage
//!
//! ```rust,ignore
//! use pdf_json_extract::extraction::{BatchProcessor, BatchSettings};
//!
//! let processor = BatchProcessor::new(client, BatchSettings::from_config(&config), prompt);
//! let summary = processor.run().await?;
//! println!("{summary}");
//! ```

mod batch;
pub mod io;
mod record;
mod validator;

pub use batch::{ArtifactPaths, BatchProcessor, BatchSettings, BatchSummary, FileOutcome};
pub use record::{CALL_FAILED, ErrorDetail, ErrorRecord, INVALID_JSON, READ_FAILED};
pub use validator::{ResponseError, strip_code_fence, validate_and_parse_json};
