/*!
 * Full app lifecycle tests against a file-backed corpus
 */

use std::path::{Path, PathBuf};

use retitle::app_config::Config;
use retitle::app_controller::{self, Controller};
use retitle::database::{DatabaseConnection, Repository};
use retitle::migration::RunOptions;

use crate::common::*;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn config_for(path: &Path) -> Config {
    Config {
        database_path: Some(path.to_path_buf()),
        ..Config::default()
    }
}

async fn seeded_corpus_file(dir: &Path) -> PathBuf {
    let path = dir.join("corpus.db");
    let repo = Repository::new(DatabaseConnection::new(&path).unwrap());
    seed_tanach_corpus(&repo).await.unwrap();
    path
}

/// A corpus created by another application: only `texts` and `history`
fn foreign_corpus_file(dir: &Path) -> PathBuf {
    let path = dir.join("foreign.db");
    rusqlite::Connection::open(&path)
        .unwrap()
        .execute_batch(
            "CREATE TABLE texts (id INTEGER PRIMARY KEY, title TEXT, version_title TEXT, language TEXT, chapter TEXT);
             CREATE TABLE history (id INTEGER PRIMARY KEY, ref TEXT, version TEXT, language TEXT, revision INTEGER, date TEXT);
             INSERT INTO texts (title, version_title, language, chapter)
                 VALUES ('Genesis', 'Tanach with Nikkud', 'he', '[]');",
        )
        .unwrap();
    path
}

fn table_names(path: &Path) -> Vec<String> {
    let conn = rusqlite::Connection::open(path).unwrap();
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
        .unwrap();
    stmt.query_map([], |row| row.get(0))
        .unwrap()
        .collect::<rusqlite::Result<Vec<String>>>()
        .unwrap()
}

#[tokio::test]
async fn test_controllerRun_shouldMigrateFileDatabase() {
    init_logging();
    let dir = create_temp_dir().unwrap();
    let db_path = seeded_corpus_file(dir.path()).await;

    let controller = Controller::with_config(config_for(&db_path)).unwrap();
    let report = controller.run(RunOptions::default()).await.unwrap();
    assert_eq!(report.executed_steps(), 12);

    // Reopen to make sure the changes were persisted
    let repo = controller.open_repository().unwrap();
    let rows = controller.status(&repo).await.unwrap();
    let texts_for = |title: &str| rows.iter().find(|r| r.title == title).unwrap().texts;

    assert_eq!(texts_for(LEGACY_CANTILLATION), 1);
    assert_eq!(texts_for(LEGACY_VOWELS), 1);
    assert_eq!(texts_for(LEGACY_CONSONANTS), 1);
    assert_eq!(texts_for(RENAMED_CANTILLATION), 0);
    assert_eq!(texts_for(RENAMED_VOWELS), 0);
    assert_eq!(texts_for(CODEX_CANTILLATION), 0);
}

#[tokio::test]
async fn test_controllerRun_withCheckpoint_secondRunShouldSkipEverything() {
    init_logging();
    let dir = create_temp_dir().unwrap();
    let db_path = seeded_corpus_file(dir.path()).await;
    let controller = Controller::with_config(config_for(&db_path)).unwrap();
    let options = RunOptions {
        checkpoint: true,
        ..Default::default()
    };

    controller.run(options).await.unwrap();
    let repo = controller.open_repository().unwrap();
    let after_first = repo.list_texts().await.unwrap();

    let report = controller.run(options).await.unwrap();

    assert_eq!(report.skipped_steps(), 12);
    assert_eq!(report.total_affected(), 0);
    assert_eq!(repo.list_texts().await.unwrap(), after_first);
}

#[tokio::test]
async fn test_controllerRun_dryRun_shouldPrintReport() {
    let dir = create_temp_dir().unwrap();
    let db_path = seeded_corpus_file(dir.path()).await;
    let controller = Controller::with_config(config_for(&db_path)).unwrap();

    let repo = controller.open_repository().unwrap();
    let report = controller
        .run_with_repository(
            &repo,
            RunOptions {
                dry_run: true,
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();
    let text = app_controller::format_report(&report);

    assert!(text.contains("  1. renaming default taamei hamikra: would affect 2 record(s)"));
    assert!(text.contains("Total: would affect"));
    assert_eq!(repo.list_texts().await.unwrap().len(), 7);
}

#[tokio::test]
async fn test_controllerRun_withMissingDatabase_shouldFailWithoutCreatingIt() {
    let dir = create_temp_dir().unwrap();
    let missing = dir.path().join("typo").join("corpsu.db");
    let controller = Controller::with_config(config_for(&missing)).unwrap();

    let dry_run = RunOptions {
        dry_run: true,
        ..Default::default()
    };
    let err = controller.run(dry_run).await.unwrap_err();

    assert!(format!("{:#}", err).contains("does not exist"));
    assert!(controller.open_repository().is_err());
    assert!(!missing.exists());
    assert!(!dir.path().join("typo").exists());
}

#[tokio::test]
async fn test_controllerRun_dryRunOnForeignCorpus_shouldLeaveSchemaUnchanged() {
    let dir = create_temp_dir().unwrap();
    let db_path = foreign_corpus_file(dir.path());
    let controller = Controller::with_config(config_for(&db_path)).unwrap();

    let report = controller
        .run(RunOptions {
            dry_run: true,
            ..Default::default()
        })
        .await
        .unwrap();

    assert!(report.dry_run);
    assert_eq!(table_names(&db_path), vec!["history", "texts"]);
}

#[tokio::test]
async fn test_controllerRun_withCheckpointOnForeignCorpus_shouldAddOnlyCheckpointTable() {
    let dir = create_temp_dir().unwrap();
    let db_path = foreign_corpus_file(dir.path());
    let controller = Controller::with_config(config_for(&db_path)).unwrap();

    controller
        .run(RunOptions {
            checkpoint: true,
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(
        table_names(&db_path),
        vec!["history", "migration_checkpoints", "texts"]
    );
}

#[test]
fn test_controller_withInvalidPlan_shouldRefuseToStart() {
    let dir = create_temp_dir().unwrap();
    let path = create_test_file(
        dir.path(),
        "retitle.json",
        r#"{ "plan": { "name": "bad", "steps": [ { "kind": "delete_texts", "title": "", "language": "he" } ] } }"#,
    )
    .unwrap();
    let config = Config::load(&path).unwrap();

    assert!(Controller::with_config(config).is_err());
}

#[test]
fn test_controllerStatus_onEmptyCorpus_shouldReportZeros() {
    let dir = create_temp_dir().unwrap();
    let db_path = dir.path().join("empty.db");
    DatabaseConnection::new(&db_path).unwrap();
    let controller = Controller::with_config(config_for(&db_path)).unwrap();

    let rows = tokio_test::block_on(async {
        let repo = controller.open_repository().unwrap();
        controller.status(&repo).await.unwrap()
    });

    assert_eq!(rows.len(), 8);
    assert!(rows.iter().all(|r| r.texts == 0 && r.history == 0));
    assert!(app_controller::format_status(&rows).starts_with("Title"));
}
