use super::*;
use crate::store::{AuthLookup, GameStore};

#[test]
fn test_empty_file_is_defaults() {
    let config = ServerConfig::from_toml_str("").unwrap();
    assert_eq!(config, ServerConfig::default());
    assert_eq!(config.bind_addr, "127.0.0.1:8080");
    assert_eq!(config.ws_path, "/ws");
    assert_eq!(config.outbound_buffer, 64);
}

#[test]
fn test_full_config() {
    let text = r#"
        bind_addr = "0.0.0.0:9000"
        ws_path = "/connect"
        log_filter = "game_server=debug"

        [[users]]
        auth_token = "t-alice"
        username = "alice"

        [[users]]
        auth_token = "t-bob"
        username = "bob"

        [[games]]
        id = 1
        name = "casual"
        white = "alice"
        black = "bob"

        [[games]]
        id = 2
        name = "open seat"
        white = "bob"
    "#;
    let config = ServerConfig::from_toml_str(text).unwrap();
    assert_eq!(config.bind_addr, "0.0.0.0:9000");
    assert_eq!(config.outbound_buffer, 64);
    assert_eq!(config.users.len(), 2);
    assert_eq!(config.games[1].black, None);

    let store = MemoryStore::new();
    config.seed(&store).unwrap();
    assert_eq!(store.find_auth("t-bob").unwrap().as_deref(), Some("bob"));
    let record = store.find_game(2).unwrap().unwrap();
    assert_eq!(record.name, "open seat");
    assert_eq!(record.white_username.as_deref(), Some("bob"));
    assert!(record.game.is_active());
}

#[test]
fn test_invalid_values() {
    assert!(matches!(
        ServerConfig::from_toml_str("outbound_buffer = 0"),
        Err(ConfigError::Invalid(_))
    ));
    assert!(matches!(
        ServerConfig::from_toml_str(r#"ws_path = "ws""#),
        Err(ConfigError::Invalid(_))
    ));
    let dup = r#"
        [[games]]
        id = 1
        name = "a"
        [[games]]
        id = 1
        name = "b"
    "#;
    assert!(matches!(ServerConfig::from_toml_str(dup), Err(ConfigError::Invalid(_))));
    assert!(matches!(
        ServerConfig::from_toml_str("bind_addr = 5"),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn test_missing_file() {
    let err = ServerConfig::load("/definitely/not/here.toml").unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}
