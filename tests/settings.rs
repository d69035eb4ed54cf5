//! Integration tests for settings loading and logger initialisation.
use ratesheet::log::{init, is_logger_initialised};
use ratesheet::settings::Settings;
use std::fs;
use tempfile::tempdir;

/// Load settings from a file and use them to initialise the logger.
///
/// We also check that the logger is initialised after it is run. This lives in its own
/// test binary because the logger can only be initialised once per process.
#[test]
fn test_settings_drive_logger_init() {
    let dir = tempdir().unwrap();
    let settings_path = dir.path().join("ratesheet.toml");
    fs::write(&settings_path, "log_level = \"off\"\n").unwrap();

    let settings = Settings::load_from_path(&settings_path).unwrap();
    assert_eq!(settings.log_level, "off");

    assert!(!is_logger_initialised());
    init(Some(&settings.log_level), Some(dir.path())).unwrap();
    assert!(is_logger_initialised());

    assert!(dir.path().join("ratesheet.log").is_file());
}

#[test]
fn test_default_file_contents_round_trip() {
    // Every commented key must deserialise once uncommented
    let dir = tempdir().unwrap();
    let settings_path = dir.path().join("ratesheet.toml");

    let uncommented: String = Settings::default_file_contents()
        .lines()
        .filter_map(|line| {
            if line.starts_with('[') {
                return Some(format!("{line}\n"));
            }
            // Keep commented keys, drop doc lines and the file header
            let stripped = line.strip_prefix("# ")?;
            (!stripped.starts_with('#') && stripped.contains('='))
                .then(|| format!("{stripped}\n"))
        })
        .collect();
    fs::write(&settings_path, uncommented).unwrap();

    assert_eq!(
        Settings::load_from_path(&settings_path).unwrap(),
        Settings::default()
    );
}
