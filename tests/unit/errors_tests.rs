/*!
 * Tests for error types and conversions
 */

use retitle::errors::{AppError, ConfigError, MigrationError};

#[test]
fn test_migrationError_noMatches_shouldNameStepAndSelector() {
    let error = MigrationError::NoMatches {
        step: 3,
        description: "changing old nikkud history".to_string(),
        title: "Tanach with Nikkud".to_string(),
        language: "he".to_string(),
    };
    let display = format!("{}", error);
    assert!(display.contains("Step 3"));
    assert!(display.contains("changing old nikkud history"));
    assert!(display.contains("'Tanach with Nikkud' [he]"));
}

#[test]
fn test_migrationError_invalidLanguage_shouldDisplayCode() {
    let error = MigrationError::InvalidLanguage {
        step: 0,
        code: "hebrew".to_string(),
    };
    assert!(format!("{}", error).contains("invalid language code 'hebrew'"));
}

#[test]
fn test_migrationError_fromAnyhow_shouldBecomeDatabaseError() {
    let error: MigrationError = anyhow::anyhow!("disk I/O error").into();
    match error {
        MigrationError::Database(message) => assert!(message.contains("disk I/O error")),
        other => panic!("unexpected variant: {:?}", other),
    }
}

#[test]
fn test_configError_fromMigrationError_shouldWrapAsPlan() {
    let error: ConfigError = MigrationError::EmptyTitle { step: 1 }.into();
    let display = format!("{}", error);
    assert!(display.starts_with("Invalid plan"));
    assert!(display.contains("Step 1"));
}

#[test]
fn test_appError_fromMigrationError_shouldWrapCorrectly() {
    let error: AppError = MigrationError::Checkpoint("locked".to_string()).into();
    assert!(matches!(error, AppError::Migration(_)));
    assert!(format!("{}", error).contains("Checkpoint error: locked"));
}

#[test]
fn test_appError_fromIoError_shouldBecomeFileError() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
    let error: AppError = io.into();
    assert!(matches!(error, AppError::File(_)));
}

#[test]
fn test_migrationError_fromAnyhowWrappingTypedError_shouldKeepVariant() {
    let wrapped: anyhow::Error = MigrationError::EmptySelector.into();
    let error: MigrationError = wrapped.into();
    assert!(matches!(error, MigrationError::EmptySelector));
}
