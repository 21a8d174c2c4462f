//! Logging setup writes to the configured directory

use tripbuddy::config::Settings;
use tripbuddy::utils::logging::{init_logging, log_swipe};
use tripbuddy::{ErrorKind, TripBuddyError};
use uuid::Uuid;

#[test]
fn test_init_logging_writes_file_and_refuses_reinit() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Settings::default().logging;
    config.directory = dir.path().to_string_lossy().into_owned();
    config.file_prefix = "core-test.log".to_string();
    config.level = "debug".to_string();

    let guard = init_logging(&config).unwrap();
    log_swipe(Uuid::new_v4(), Uuid::new_v4(), "like");

    let err = init_logging(&config).unwrap_err();
    assert!(matches!(err, TripBuddyError::Config(_)));
    assert_eq!(err.kind(), ErrorKind::Internal);
    drop(guard);

    let files: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    assert!(files.iter().any(|name| name.starts_with("core-test.log")));
}
