// tests/config_loading.rs

use std::io::Write;
use std::time::Duration;

use critpath::config::{
    default_project_path, load_and_validate, load_from_path, load_relay_config, ProjectFile,
};
use critpath::dag::analyze;
use critpath::errors::CritpathError;
use critpath_test_utils::builders::{date, ProjectFileBuilder, TaskConfigBuilder};
use tempfile::NamedTempFile;

fn project_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", contents).unwrap();
    file
}

#[test]
fn loads_project_with_defaults_applied() {
    let file = project_file(
        r#"
[project]
id = 7
name = "Website relaunch"
start_date = "2024-03-04"
budget = 12000.0

[[task]]
id = 1
name = "Design"
duration = 2

[[task]]
id = 2
name = "Build"
duration = 3
depends_on = 1
start_date = "2024-03-06"
end_date = "2024-03-09"
"#,
    );

    let project = load_and_validate(file.path()).unwrap();

    assert_eq!(project.project.id, 7);
    assert_eq!(project.project.status, "active");
    assert_eq!(project.project.start_date, date(2024, 3, 4));
    assert_eq!(project.task.len(), 2);
    assert_eq!(project.task[1].depends_on, Some(1));
    assert!(!project.task[0].completed);

    let records = project.task_records();
    assert_eq!(records[1].depends_on, vec![1]);
    let (_, schedule) = analyze(&records, 0).unwrap();
    assert_eq!(schedule.project_finish(), 5);
}

#[test]
fn project_without_tasks_is_valid() {
    let file = project_file(
        r#"
[project]
name = "Empty"
start_date = "2024-01-01"
"#,
    );

    let project = load_and_validate(file.path()).unwrap();

    assert_eq!(project.project.id, 1);
    assert!(project.task.is_empty());
}

#[test]
fn duplicate_task_id_is_rejected() {
    let file = project_file(
        r#"
[project]
name = "Dup"
start_date = "2024-01-01"

[[task]]
id = 3
name = "A"
duration = 1

[[task]]
id = 3
name = "B"
duration = 1
"#,
    );

    assert!(matches!(
        load_and_validate(file.path()),
        Err(CritpathError::DuplicateTask(3))
    ));
}

#[test]
fn zero_duration_is_a_config_error() {
    let file = project_file(
        r#"
[project]
name = "Zero"
start_date = "2024-01-01"

[[task]]
id = 1
name = "Nothing"
duration = 0
"#,
    );

    match load_and_validate(file.path()) {
        Err(CritpathError::ConfigError(msg)) => assert!(msg.contains("positive duration")),
        other => panic!("Expected ConfigError, got: {:?}", other),
    }
}

#[test]
fn malformed_toml_is_a_toml_error() {
    let file = project_file("[project\nname = ");

    assert!(matches!(
        load_from_path(file.path()),
        Err(CritpathError::TomlError(_))
    ));
}

#[test]
fn missing_file_is_an_io_error() {
    assert!(matches!(
        load_and_validate("/definitely/not/here/Project.toml"),
        Err(CritpathError::IoError(_))
    ));
    assert_eq!(default_project_path().to_str(), Some("Project.toml"));
}

#[test]
fn dangling_dependency_loads_but_fails_to_schedule() {
    let project = ProjectFileBuilder::new("Dangling", date(2024, 1, 1))
        .with_task(TaskConfigBuilder::new(1, "Only", 2).depends_on(9).build())
        .build();

    assert!(matches!(
        analyze(&project.task_records(), 0),
        Err(CritpathError::DataIntegrityError { task: 1, missing: 9 })
    ));
}

#[test]
fn project_section_checks() {
    let mut raw = ProjectFileBuilder::new("   ", date(2024, 1, 1)).build_raw();
    assert!(matches!(
        ProjectFile::try_from(raw.clone()),
        Err(CritpathError::ConfigError(_))
    ));

    raw.project.name = "Ok".to_string();
    raw.project.end_date = Some(date(2023, 12, 31));
    assert!(matches!(
        ProjectFile::try_from(raw.clone()),
        Err(CritpathError::ConfigError(_))
    ));

    raw.project.end_date = None;
    raw.project.budget = Some(-1.0);
    assert!(matches!(
        ProjectFile::try_from(raw.clone()),
        Err(CritpathError::ConfigError(_))
    ));

    raw.project.budget = Some(0.0);
    assert!(ProjectFile::try_from(raw).is_ok());
}

#[test]
fn relay_config_defaults_without_file() {
    let cfg = load_relay_config(None).unwrap();

    assert_eq!(cfg.bind.to_string(), "127.0.0.1:5000");
    assert_eq!(cfg.send_timeout, Duration::from_millis(5000));
    assert_eq!(cfg.outbox_capacity, 64);
}

#[test]
fn relay_config_reads_overrides() {
    let file = project_file(
        r#"
[relay]
bind = "0.0.0.0:9100"
send_timeout_ms = 250
"#,
    );

    let cfg = load_relay_config(Some(file.path())).unwrap();

    assert_eq!(cfg.bind.port(), 9100);
    assert_eq!(cfg.send_timeout, Duration::from_millis(250));
    assert_eq!(cfg.outbox_capacity, 64);
}

#[test]
fn relay_config_rejects_bad_values() {
    let bad_bind = project_file("[relay]\nbind = \"not-an-address\"\n");
    assert!(matches!(
        load_relay_config(Some(bad_bind.path())),
        Err(CritpathError::ConfigError(_))
    ));

    let zero_capacity = project_file("[relay]\noutbox_capacity = 0\n");
    assert!(matches!(
        load_relay_config(Some(zero_capacity.path())),
        Err(CritpathError::ConfigError(_))
    ));
}
