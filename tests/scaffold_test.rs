// Checks on the files shipped alongside the binary.

use std::path::Path;

use tictactoe_client::config::Config;

/// Verify that defaults/client.toml is valid TOML.
#[test]
fn default_client_toml_is_valid() {
    let content =
        std::fs::read_to_string("defaults/client.toml").expect("defaults/client.toml should exist");
    let parsed: Result<toml::Value, _> = toml::from_str(&content);
    assert!(
        parsed.is_ok(),
        "defaults/client.toml is not valid TOML: {:?}",
        parsed.err()
    );
}

/// Verify that the shipped defaults deserialize into a usable Config.
#[test]
fn default_client_toml_matches_config_schema() {
    let content = std::fs::read_to_string("defaults/client.toml").unwrap();
    let config: Config = toml::from_str(&content).expect("defaults should match Config");
    assert!(config.server.url.starts_with("ws://"));
    assert_eq!(config.game.registration_timeout_secs, 10);
    assert!(!config.logging.file.is_empty());
}

/// Verify that all expected directories exist.
#[test]
fn directory_structure_exists() {
    for dir in ["src", "src/tui", "src/tui/widgets", "defaults", "tests"] {
        assert!(Path::new(dir).is_dir(), "directory {dir} should exist");
    }
}
