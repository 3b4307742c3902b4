use lodr::{EnvOptions, Record, docs};
use serde::{Deserialize, Serialize};
use std::{path::Path, process::ExitCode, time::Duration};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default, Serialize, Deserialize, Record)]
#[serde(default)]
struct DemoConfig {
    /// Service name
    #[lodr(cmd = "name")]
    name: String,

    #[lodr(nested)]
    db: Database,
}

#[derive(Debug, Default, Serialize, Deserialize, Record)]
#[serde(default)]
struct Database {
    /// Database host
    #[lodr(env = "DB_HOST", cmd = "db.host")]
    host: String,

    /// Database port
    #[lodr(env = "DB_PORT", cmd = "db.port")]
    port: u16,

    /// Database password, only read from the environment
    #[serde(skip)]
    #[lodr(env = "DB_PASSWORD", secret)]
    password: String,

    /// Connection timeout
    #[serde(with = "lodr::duration")]
    #[lodr(env = "DB_TIMEOUT", cmd = "db.timeout")]
    timeout: Duration,

    /// Connect over TLS
    #[lodr(env = "DB_TLS", cmd = "db.tls")]
    tls: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let file = std::env::var("LODR_DEMO_FILE").unwrap_or_else(|_| "config.yaml".to_string());
    let mut env_opts = EnvOptions::new().prefix("MY_APP");
    if Path::new(".env").exists() {
        env_opts = env_opts.dotenv(".env");
    }

    let mut config = DemoConfig::default();
    let result = lodr::load(&mut config)
        .file(&file)
        .env_with_options(env_opts.clone())
        .cmd()
        .run();

    if let Err(errors) = result {
        eprintln!("{errors}");
    }

    if let Ok(path) = std::env::var("LODR_DEMO_DOCS") {
        let fields = docs::describe(&mut config, &env_opts);
        match docs::write_docs(&path, &fields) {
            Ok(_) => println!("✓ Documentation written to {path}"),
            Err(e) => {
                eprintln!("✗ Failed to write documentation: {e}");
                return ExitCode::FAILURE;
            }
        }
    }

    println!("Config loaded:");
    println!("  name: {}", config.name);
    println!("  db: {}:{}", config.db.host, config.db.port);
    println!("  password set: {}", !config.db.password.is_empty());
    println!("  timeout: {}", humantime::format_duration(config.db.timeout));
    println!("  tls: {}", config.db.tls);

    ExitCode::SUCCESS
}
