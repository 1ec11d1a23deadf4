use figment::Jail;
use health_records::{AppConfig, ConfigError};
use std::path::PathBuf;

#[test]
fn defaults_apply_without_sources() {
    Jail::expect_with(|_jail| {
        let config = AppConfig::load().map_err(|e| e.to_string())?;
        assert_eq!(config, AppConfig::default());
        Ok(())
    });
}

#[test]
fn toml_file_overrides_defaults() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "health-records.toml",
            r#"
                database_path = "data/records.db"
                log_level = "debug"
            "#,
        )?;
        let config = AppConfig::load().map_err(|e| e.to_string())?;
        assert_eq!(config.database_path, PathBuf::from("data/records.db"));
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.http_addr, "127.0.0.1:3000");
        Ok(())
    });
}

#[test]
fn env_overrides_toml() {
    Jail::expect_with(|jail| {
        jail.create_file("health-records.toml", r#"http_addr = "127.0.0.1:4000""#)?;
        jail.set_env("HEALTH_RECORDS_HTTP_ADDR", "0.0.0.0:8080");
        let config = AppConfig::load().map_err(|e| e.to_string())?;
        assert_eq!(config.http_addr, "0.0.0.0:8080");
        Ok(())
    });
}

#[test]
fn bad_http_addr_is_rejected() {
    Jail::expect_with(|jail| {
        jail.set_env("HEALTH_RECORDS_HTTP_ADDR", "not-an-address");
        match AppConfig::load() {
            Err(ConfigError::InvalidValue { field, .. }) => assert_eq!(field, "http_addr"),
            other => panic!("expected invalid http_addr, got {other:?}"),
        }
        Ok(())
    });
}
