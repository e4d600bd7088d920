//! Batch extraction of structured JSON from PDF documents.
//!
//! Each PDF in an input directory is sent, together with a fixed instruction
//! prompt, to the Gemini document API. The response text is stripped of code
//! fences, parsed as JSON and written to `<name>.json`; anything that goes
//! wrong for a file is written to `<name>_error.json` instead.
//!
//! # Modules
//!
//! - [`config`]: layered configuration (defaults, file, environment, CLI)
//! - [`llm`]: the [`llm::DocumentExtractor`] trait and the Gemini client
//! - [`extraction`]: response validation, artifacts and the batch loop
//! - [`startup`]: preflight checks and [`run`]

pub mod config;
pub mod extraction;
pub mod llm;
pub mod startup;

pub use startup::{StartupError, run, run_with};
