use portcullis::settings::parse_settings;
use std::fs;

const FULL_SETTINGS: &str = r#"
[auth]
issuer = "portcullis.auth"
audience = "portcullis-clients"
token_ttl_secs = 1800
sweep_interval_secs = 600
retention_secs = 43200

[http]
address = "127.0.0.1:9090"

[log]
filter = "debug"
"#;

#[test]
fn parses_a_full_settings_file() {
    let dir = std::env::temp_dir().join("portcullis-settings-tests");
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("full.toml");
    fs::write(&path, FULL_SETTINGS).unwrap();

    let settings = parse_settings(path.to_str()).unwrap();
    assert_eq!(settings.auth.issuer, "portcullis.auth");
    assert_eq!(settings.auth.token_ttl_secs, 1800);
    assert_eq!(settings.auth.sweep_interval_secs, 600);
    assert_eq!(settings.auth.retention_secs, 43200);
    assert_eq!(settings.http.address, "127.0.0.1:9090");
    assert_eq!(settings.log.filter, "debug");
}

#[test]
fn missing_file_is_an_error() {
    assert!(parse_settings(Some("settings/does-not-exist.toml")).is_err());
}

#[test]
fn missing_section_is_an_error() {
    let dir = std::env::temp_dir().join("portcullis-settings-tests");
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("partial.toml");
    fs::write(&path, "[log]\nfilter = \"info\"\n").unwrap();

    assert!(parse_settings(path.to_str()).is_err());
}

#[test]
fn checked_in_dev_settings_parse() {
    assert!(parse_settings(Some("settings/dev.toml")).is_ok());
}
