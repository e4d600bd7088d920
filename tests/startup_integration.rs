mod common;

use common::{MockExtractor, Workspace, shared};
use pdf_json_extract::config::API_KEY_VAR;
use pdf_json_extract::{StartupError, run, run_with};
use serial_test::serial;
use std::env;
use std::sync::Arc;

#[tokio::test]
async fn test_run_with_creates_output_and_reports() {
    let ws = Workspace::new();
    ws.add_input("doc1.pdf");
    let mock = Arc::new(MockExtractor::new().with_text("doc1.pdf", r#"{"title":"X"}"#));

    let summary = run_with(&ws.config(), |_| Ok(shared(&mock))).await.unwrap();

    assert!(ws.output_dir.is_dir());
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.output_dir, ws.output_dir);
    assert_eq!(ws.output_files(), vec!["doc1.json"]);
}

#[tokio::test]
async fn test_missing_input_directory() {
    let ws = Workspace::new();
    let mut config = ws.config();
    config.paths.input_dir = ws.dir.path().join("does-not-exist");

    let err = run_with(&config, |_| Ok(shared(&Arc::new(MockExtractor::new()))))
        .await
        .unwrap_err();

    assert!(matches!(err, StartupError::InputDirectory(_)));
    assert!(!ws.output_dir.exists());
}

#[tokio::test]
async fn test_input_path_is_a_file() {
    let ws = Workspace::new();
    let mut config = ws.config();
    config.paths.input_dir = ws.prompt_file.clone();

    let err = run_with(&config, |_| Ok(shared(&Arc::new(MockExtractor::new()))))
        .await
        .unwrap_err();

    assert!(matches!(err, StartupError::InputDirectory(_)));
}

#[tokio::test]
async fn test_missing_prompt_file() {
    let ws = Workspace::new();
    ws.add_input("doc.pdf");
    let mut config = ws.config();
    config.paths.prompt_file = ws.dir.path().join("missing.md");

    let mock = Arc::new(MockExtractor::new());
    let err = run_with(&config, |_| Ok(shared(&mock))).await.unwrap_err();

    assert!(matches!(err, StartupError::Prompt(_)));
    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn test_client_construction_failure() {
    let ws = Workspace::new();
    ws.add_input("doc.pdf");

    let err = run_with(&ws.config(), |_| Err(anyhow::anyhow!("no TLS backend")))
        .await
        .unwrap_err();

    assert!(matches!(err, StartupError::Client { .. }));
    assert_eq!(
        err.to_string(),
        "Error initializing Gemini model 'gemini-1.5-flash': no TLS backend"
    );
    assert!(ws.output_files().is_empty());
}

#[tokio::test]
#[serial]
async fn test_missing_credential_aborts_before_anything_else() {
    unsafe {
        env::remove_var(API_KEY_VAR);
    }
    let ws = Workspace::new();
    ws.add_input("doc.pdf");

    let err = run(&ws.config()).await.unwrap_err();

    assert!(matches!(err, StartupError::MissingCredential(_)));
    assert_eq!(err.to_string(), "GOOGLE_API_KEY not found.");
    assert!(!ws.output_dir.exists());
}

#[tokio::test]
#[serial]
async fn test_blank_credential_counts_as_missing() {
    unsafe {
        env::set_var(API_KEY_VAR, "   ");
    }
    let ws = Workspace::new();

    let err = run(&ws.config()).await.unwrap_err();
    assert!(matches!(err, StartupError::MissingCredential(_)));

    unsafe {
        env::remove_var(API_KEY_VAR);
    }
}
