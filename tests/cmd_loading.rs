use lodr::cmd::discover;
use lodr::{Kind, Record, load_cmd_from};
use std::ffi::OsString;
use std::time::Duration;

#[derive(Debug, Default, Record)]
struct Db {
    /// Database host
    #[lodr(cmd = "db.host")]
    host: String,
    #[lodr(cmd = "db.port")]
    port: u16,
    #[lodr(cmd = "db.timeout")]
    timeout: Duration,
}

#[derive(Debug, Default, Record)]
struct Replica {
    #[lodr(cmd = "db.host")]
    host: String,
}

#[derive(Debug, Default, Record)]
struct Config {
    #[lodr(cmd = "string")]
    string_param: String,
    #[lodr(cmd = "int")]
    int_param: i64,
    #[lodr(cmd = "float")]
    float_param: f64,
    #[lodr(cmd = "bool")]
    bool_param: bool,
    #[lodr(cmd = "time")]
    time_param: Duration,
    #[lodr(nested)]
    db: Db,
    #[lodr(nested)]
    replica: Replica,
}

#[test]
fn test_flags_for_every_kind() {
    let mut config = Config::default();
    load_cmd_from(
        &mut config,
        [
            "app",
            "--string=cmd_string",
            "--int=-3",
            "--float=3.1415",
            "--bool",
            "--time=15s",
        ],
    )
    .unwrap();

    assert_eq!(config.string_param, "cmd_string");
    assert_eq!(config.int_param, -3);
    assert_eq!(config.float_param, 3.1415);
    assert!(config.bool_param);
    assert_eq!(config.time_param, Duration::from_secs(15));
}

#[test]
fn test_dotted_nested_flags() {
    let mut config = Config::default();
    load_cmd_from(&mut config, ["app", "--db.port", "3306", "--db.timeout", "250ms"]).unwrap();

    assert_eq!(config.db.port, 3306);
    assert_eq!(config.db.timeout, Duration::from_millis(250));
}

#[test]
fn test_shared_tag_sets_every_field() {
    let mut config = Config::default();
    let specs = discover(&mut config);
    assert_eq!(specs.iter().filter(|s| s.name == "db.host").count(), 1);

    load_cmd_from(&mut config, ["app", "--db.host=primary"]).unwrap();

    assert_eq!(config.db.host, "primary");
    assert_eq!(config.replica.host, "primary");
}

#[test]
fn test_discovered_flag_metadata() {
    let mut config = Config::default();
    let specs = discover(&mut config);

    let host = specs.iter().find(|s| s.name == "db.host").unwrap();
    assert_eq!(host.kind, Kind::String);
    assert_eq!(host.help, "Database host");

    let time = specs.iter().find(|s| s.name == "time").unwrap();
    assert_eq!(time.kind, Kind::Duration);
}

#[test]
fn test_repeated_load_is_idempotent() {
    let args = ["app", "--string=again", "--db.port=1", "--time=2s"];
    let mut config = Config::default();

    load_cmd_from(&mut config, args).unwrap();
    load_cmd_from(&mut config, args).unwrap();

    assert_eq!(config.string_param, "again");
    assert_eq!(config.db.port, 1);
    assert_eq!(config.time_param, Duration::from_secs(2));
}

#[test]
fn test_invalid_duration_rejected() {
    let mut config = Config::default();
    let err = load_cmd_from(&mut config, ["app", "--time=whenever"]).unwrap_err();

    assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    assert_eq!(config.time_param, Duration::ZERO);
}

#[derive(Debug, Default, Record)]
struct Tool {
    #[lodr(cmd = "output")]
    output: String,
    /// Print usage
    #[lodr(cmd = "help")]
    help: bool,
}

#[test]
fn test_operands_after_flags_are_left_alone() {
    let args = ["tool", "--output", "-", "a.txt", "--output=ignored"];
    let mut tool = Tool::default();
    load_cmd_from(&mut tool, args).unwrap();

    assert_eq!(tool.output, "-");

    let specs = discover(&mut tool);
    let rest = lodr::cmd::operands(&specs, args).unwrap();
    assert_eq!(rest, [OsString::from("a.txt"), OsString::from("--output=ignored")]);
}

#[test]
fn test_help_tag_is_an_ordinary_flag() {
    let mut tool = Tool::default();
    load_cmd_from(&mut tool, ["tool", "--help", "--output=x"]).unwrap();

    assert!(tool.help);
    assert_eq!(tool.output, "x");
}
