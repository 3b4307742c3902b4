use lodr::{EnvOptions, Error, Record};
use serde::{Deserialize, Serialize};
use serial_test::serial;
use std::fs;
use std::time::Duration;

#[derive(Debug, Default, Serialize, Deserialize, Record)]
#[serde(default)]
struct Db {
    #[lodr(env = "LODR_CHAIN_DB_HOST", cmd = "db.host")]
    host: String,
    #[serde(with = "lodr::duration")]
    #[lodr(env = "LODR_CHAIN_DB_TIMEOUT")]
    timeout: Duration,
}

#[derive(Debug, Default, Serialize, Deserialize, Record)]
#[serde(default)]
struct Config {
    #[lodr(cmd = "name")]
    name: String,
    #[lodr(env = "PORT")]
    port: u16,
    #[lodr(nested)]
    db: Db,
}

#[test]
#[serial]
fn test_env_then_flags() {
    unsafe { std::env::set_var("PORT", "8080") };

    let mut config = Config::default();
    let result = lodr::load(&mut config)
        .env()
        .cmd_from(["svc", "--name=svc1"])
        .run();

    unsafe { std::env::remove_var("PORT") };

    result.unwrap();
    assert_eq!(config.port, 8080);
    assert_eq!(config.name, "svc1");
}

#[test]
#[serial]
fn test_later_sources_override_earlier() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    fs::write(
        &path,
        "name: from-file\nport: 1000\ndb:\n  host: file-host\n  timeout: 5s\n",
    )
    .unwrap();
    unsafe {
        std::env::remove_var("PORT");
        std::env::set_var("LODR_CHAIN_DB_HOST", "env-host");
    }

    let mut config = Config::default();
    let result = lodr::load(&mut config)
        .file(&path)
        .env()
        .cmd_from(["svc", "--db.host", "flag-host"])
        .run();

    unsafe { std::env::remove_var("LODR_CHAIN_DB_HOST") };

    result.unwrap();
    assert_eq!(config.name, "from-file");
    assert_eq!(config.port, 1000);
    assert_eq!(config.db.host, "flag-host");
    assert_eq!(config.db.timeout, Duration::from_secs(5));
}

#[test]
#[serial]
fn test_all_step_errors_reported_together() {
    unsafe {
        std::env::remove_var("PORT");
        std::env::set_var("LODR_CHAIN_DB_TIMEOUT", "eventually");
    }

    let mut config = Config::default();
    let result = lodr::load(&mut config)
        .file("missing/config.json")
        .env_with_options(EnvOptions::new().on_invalid(lodr::InvalidValuePolicy::Report))
        .cmd_from(["svc", "--port=1"])
        .run();

    unsafe { std::env::remove_var("LODR_CHAIN_DB_TIMEOUT") };

    let errors = result.unwrap_err();
    assert_eq!(errors.len(), 3);
    assert!(matches!(errors.errors()[0], Error::FileNotFound { .. }));
    assert!(matches!(errors.errors()[1], Error::EnvParse { .. }));
    assert!(matches!(errors.errors()[2], Error::Cmd(_)));

    let report = errors.to_string();
    assert!(report.contains("missing/config.json"));
    assert!(report.contains("eventually"));
}

#[derive(Debug, Default, Serialize, Deserialize, Record)]
#[serde(default)]
struct Service {
    name: String,
    #[serde(skip)]
    #[lodr(env = "LODR_CHAIN_API_KEY", secret)]
    api_key: String,
}

#[test]
#[serial]
fn test_file_after_env_keeps_serde_skipped_field() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("service.json");
    fs::write(&path, r#"{"name": "from-file"}"#).unwrap();
    unsafe { std::env::set_var("LODR_CHAIN_API_KEY", "s3cr3t") };

    let mut service = Service::default();
    let result = lodr::load(&mut service).env().file(&path).run();

    unsafe { std::env::remove_var("LODR_CHAIN_API_KEY") };

    result.unwrap();
    assert_eq!(service.name, "from-file");
    assert_eq!(service.api_key, "s3cr3t");

    let docs = lodr::docs::render_markdown(&lodr::docs::describe(&mut service, &EnvOptions::new()));
    assert!(!docs.contains("s3cr3t"));
}
