//! End-to-end tests: SQLite → `ExportJob` → delimited file

mod support;

use std::fs;
use std::sync::Arc;

use activity_export_core::{ExportJob, JobPhase};
use activity_export_domain::{ExportError, FailurePolicy, WriterConfig};
use activity_export_infra::{DelimitedFileWriter, SqliteActivityLogRepository};
use support::{TestDatabase, MARCH_13, MARCH_1_0930};

fn job_for(db: &TestDatabase, policy: FailurePolicy) -> ExportJob {
    let source = Arc::new(SqliteActivityLogRepository::new(db.manager.clone()));
    let writer = Arc::new(DelimitedFileWriter::new(&WriterConfig::default()));
    ExportJob::with_policy(source, writer, policy)
}

fn seed_every_action(db: &TestDatabase) {
    db.insert_invitation(1, MARCH_13);
    db.insert_recipient("R1", Some(1));
    db.insert_activity("REQUEST", "S1", MARCH_1_0930, Some("R1"));
    db.insert_activity("LINK", "S1", MARCH_1_0930 + 60, Some("R1"));
    db.insert_activity("REJECT", "S1", MARCH_1_0930 + 120, Some("R1"));
    db.insert_activity("EXPIRE", "S1", MARCH_1_0930 + 180, Some("R1"));
    db.insert_activity("ACCEPT", "S1", MARCH_1_0930 + 240, Some("R1"));
}

#[tokio::test]
async fn export_writes_one_line_per_activity_in_fetch_order() {
    let db = TestDatabase::new();
    seed_every_action(&db);
    let output = db.dir().join("out").join("activity.dat");

    let job = job_for(&db, FailurePolicy::AbortRun);
    let summary = job.execute(output.to_str().unwrap()).await.expect("export succeeds");
    assert_eq!(summary.exported, 5);

    let content = fs::read_to_string(&output).expect("output written");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(
        lines,
        vec![
            "REQUEST|GB01|R1|S1|Alice|Bob||||C100|2024-03-01T09:30:00Z",
            "LINK|GB01|R1||||FR03|C200||C100|2024-03-01T09:31:00Z",
            "REJECT|GB01|R1||||FR03|C200||C100|2024-03-01T09:32:00Z",
            "EXPIRE|GB01|R1||||||2024-03-13T00:00:00Z|C100|2024-03-01T09:33:00Z",
            "ACCEPT|GB01|R1|||||||C100|2024-03-01T09:34:00Z",
        ]
    );
    assert!(content.ends_with('\n'));
}

#[tokio::test]
async fn repeated_runs_on_unchanged_data_are_byte_identical() {
    let db = TestDatabase::new();
    seed_every_action(&db);
    let output = db.dir().join("activity.dat");
    let job = job_for(&db, FailurePolicy::AbortRun);

    job.run(output.to_str().unwrap()).await;
    let first = fs::read(&output).expect("first run output");

    job.run(output.to_str().unwrap()).await;
    let second = fs::read(&output).expect("second run output");

    assert_eq!(first, second);
}

#[tokio::test]
async fn empty_database_produces_an_empty_file() {
    let db = TestDatabase::new();
    let output = db.dir().join("activity.dat");

    job_for(&db, FailurePolicy::AbortRun).run(output.to_str().unwrap()).await;

    assert_eq!(fs::read_to_string(&output).expect("output written"), "");
}

#[tokio::test]
async fn expire_without_invitation_produces_no_file() {
    let db = TestDatabase::new();
    db.insert_recipient("R1", None);
    db.insert_activity("REQUEST", "S1", MARCH_1_0930, Some("R1"));
    db.insert_activity("EXPIRE", "S1", MARCH_1_0930 + 60, Some("R1"));
    let output = db.dir().join("activity.dat");

    let job = job_for(&db, FailurePolicy::AbortRun);
    let err = job.execute(output.to_str().unwrap()).await.expect_err("run aborts");

    assert!(matches!(err, ExportError::NullReference(_)));
    assert!(!output.exists());
    assert_eq!(job.phase(), JobPhase::Idle);

    job.run(output.to_str().unwrap()).await;
    assert!(!output.exists());
    assert_eq!(job.phase(), JobPhase::Idle);
}

#[tokio::test]
async fn aborted_run_keeps_the_previous_file() {
    let db = TestDatabase::new();
    db.insert_recipient("R1", None);
    db.insert_activity("LINK", "S1", MARCH_1_0930, Some("R1"));
    let output = db.dir().join("activity.dat");
    let job = job_for(&db, FailurePolicy::AbortRun);

    job.run(output.to_str().unwrap()).await;
    let previous = fs::read_to_string(&output).expect("first run output");

    db.insert_activity("LINK", "S1", MARCH_1_0930 + 60, None);
    job.run(output.to_str().unwrap()).await;

    assert_eq!(fs::read_to_string(&output).expect("output kept"), previous);
}

#[tokio::test]
async fn skip_policy_exports_around_bad_records() {
    let db = TestDatabase::new();
    db.insert_recipient("R1", None);
    db.insert_activity("LINK", "S1", MARCH_1_0930, None);
    db.insert_activity("REQUEST", "S1", MARCH_1_0930 + 60, Some("R1"));
    db.insert_activity("EXPIRE", "S1", MARCH_1_0930 + 120, Some("R1"));
    let output = db.dir().join("activity.dat");

    let summary = job_for(&db, FailurePolicy::SkipRecord)
        .execute(output.to_str().unwrap())
        .await
        .expect("export succeeds");

    assert_eq!((summary.fetched, summary.exported, summary.skipped), (3, 1, 2));
    assert_eq!(
        fs::read_to_string(&output).expect("output written"),
        "REQUEST|GB01|R1|S1|Alice|Bob||||C100|2024-03-01T09:31:00Z\n"
    );
}
