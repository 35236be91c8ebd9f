use super::*;
use tempfile::tempdir;

#[test]
fn test_logger_creation() {
    let temp_dir = tempdir().unwrap();
    let log_path = temp_dir.path().join("test.md");

    let logger = Logger::new(Some(&log_path), Some("DEBUG"));
    assert!(logger.is_ok());

    let logger = logger.unwrap();
    assert_eq!(logger.log_file(), &log_path);
    assert_eq!(logger.log_level(), "DEBUG");
}

#[test]
fn test_log_file_creation() {
    let temp_dir = tempdir().unwrap();
    let log_path = temp_dir.path().join("logs").join("test.md");

    let _logger = Logger::new(Some(&log_path), None).unwrap();
    assert!(log_path.exists());

    let content = std::fs::read_to_string(&log_path).unwrap();
    assert!(content.contains("# PayloadBuilder X Session Log"));
    assert!(content.contains("Log started:"));
}

#[test]
fn test_existing_file_is_appended() {
    let temp_dir = tempdir().unwrap();
    let log_path = temp_dir.path().join("test.md");

    Logger::new(Some(&log_path), None)
        .unwrap()
        .log_session_end("first")
        .unwrap();
    Logger::new(Some(&log_path), None)
        .unwrap()
        .log_session_end("second")
        .unwrap();

    let content = std::fs::read_to_string(&log_path).unwrap();
    assert_eq!(content.matches("# PayloadBuilder X Session Log").count(), 1);
    assert!(content.contains("first"));
    assert!(content.contains("second"));
}

#[test]
fn test_session_transcript() {
    let temp_dir = tempdir().unwrap();
    let log_path = temp_dir.path().join("test.md");
    let logger = Logger::new(Some(&log_path), None).unwrap();

    logger
        .log_session_start(Path::new("/tmp/history.txt"), &["downloader", "reverse_shell"])
        .unwrap();
    logger
        .log_command("set payload_type reverse_shell", "ok")
        .unwrap();

    let spec: SessionConfig = [("payload_type", "reverse_shell"), ("port", "4444")]
        .into_iter()
        .collect();
    logger
        .log_build(&spec, EntryStatus::Success, Some(1), Some(Path::new("out/x.toml")))
        .unwrap();
    logger.log_error("port must be a valid integer.", Some("set")).unwrap();
    logger.log_session_end("exit").unwrap();

    let content = std::fs::read_to_string(&log_path).unwrap();
    assert!(content.contains("Session Started"));
    assert!(content.contains("downloader, reverse_shell"));
    assert!(content.contains("`set payload_type reverse_shell`"));
    assert!(content.contains("### Build SUCCESS"));
    assert!(content.contains("**Serial:** 1"));
    assert!(content.contains("| port | 4444 |"));
    assert!(content.contains("**Context:** set"));
    assert!(content.contains("Session Ended"));
}

#[test]
fn test_build_without_serial_or_output() {
    let temp_dir = tempdir().unwrap();
    let log_path = temp_dir.path().join("test.md");
    let logger = Logger::new(Some(&log_path), None).unwrap();

    logger
        .log_build(&SessionConfig::new(), EntryStatus::Fail, None, None)
        .unwrap();

    let content = std::fs::read_to_string(&log_path).unwrap();
    assert!(content.contains("### Build FAIL"));
    assert!(!content.contains("**Serial:**"));
    assert!(!content.contains("**Output:**"));
}
