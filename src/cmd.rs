//! Command-line flags.
//!
//! Loading runs in three steps. Every `cmd`-tagged field is collected into a
//! [`FlagSpec`], all flags are parsed from the argument list in a single
//! pass, and the parsed values are written back into the record.
//!
//! Parsing stops at the first argument that is not a flag. That argument and
//! everything after it are operands left to the application (see
//! [`operands`]). A non-boolean flag always takes the next argument as its
//! value, even when it starts with `-`.

use crate::field::{FieldMeta, Record};
use crate::value::{Kind, Scalar, Value};
use crate::walk::{FieldPath, Visitor, walk};
use clap::builder::BoolishValueParser;
use clap::error::ErrorKind;
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use std::collections::HashMap;
use std::ffi::OsString;
use std::time::Duration;
use tracing::debug;

// Id of the catch-all positional. It contains a space, so no flag can clash.
const OPERANDS: &str = "lodr operands";

/// One flag to register, derived from a tagged field
#[derive(Debug, Clone, PartialEq)]
pub struct FlagSpec {
    pub name: &'static str,
    pub kind: Kind,
    /// The field's value before parsing, if it has one
    pub default: Option<Value>,
    pub help: &'static str,
    /// Keep the default out of `--help`
    pub secret: bool,
}

impl FlagSpec {
    fn arg(&self) -> Arg {
        let mut arg = Arg::new(self.name)
            .long(self.name)
            .help(self.help)
            .action(ArgAction::Set);

        arg = match self.kind {
            Kind::String => arg
                .value_parser(value_parser!(String))
                .allow_hyphen_values(true),
            Kind::Integer => arg
                .value_parser(value_parser!(i64))
                .allow_hyphen_values(true),
            Kind::Float => arg
                .value_parser(value_parser!(f64))
                .allow_hyphen_values(true),
            Kind::Bool => arg
                .value_parser(BoolishValueParser::new())
                .num_args(0..=1)
                .require_equals(true)
                .default_missing_value("true"),
            Kind::Duration => arg
                .value_parser(humantime::parse_duration)
                .allow_hyphen_values(true),
        };

        if let Some(default) = &self.default {
            arg = arg.default_value(default.to_string());
        }
        if self.secret {
            arg = arg.hide_default_value(true);
        }
        arg
    }

    fn value(&self, matches: &ArgMatches) -> Option<Value> {
        match self.kind {
            Kind::String => matches.get_one::<String>(self.name).cloned().map(Value::String),
            Kind::Integer => matches.get_one::<i64>(self.name).copied().map(Value::Integer),
            Kind::Float => matches.get_one::<f64>(self.name).copied().map(Value::Float),
            Kind::Bool => matches.get_one::<bool>(self.name).copied().map(Value::Bool),
            Kind::Duration => matches
                .get_one::<Duration>(self.name)
                .copied()
                .map(Value::Duration),
        }
    }
}

/// Collect one [`FlagSpec`] per distinct `cmd` tag, in field order.
///
/// Fields sharing a tag share the flag defined by the first of them.
pub fn discover(record: &mut dyn Record) -> Vec<FlagSpec> {
    let mut discovery = Discovery { specs: Vec::new() };
    walk(record, &mut discovery);
    discovery.specs
}

struct Discovery {
    specs: Vec<FlagSpec>,
}

impl Visitor for Discovery {
    fn visit(&mut self, path: &FieldPath, meta: &FieldMeta, value: &mut dyn Scalar) {
        let Some(name) = meta.cmd else {
            return;
        };
        if self.specs.iter().any(|spec| spec.name == name) {
            debug!(flag = name, field = %path, "flag already registered, sharing it");
            return;
        }

        debug!(flag = name, field = %path, kind = %value.kind(), "registering flag");
        self.specs.push(FlagSpec {
            name,
            kind: value.kind(),
            default: value.value(),
            help: meta.doc,
            secret: meta.secret,
        });
    }
}

/// Build the command that accepts every flag in `specs`, followed by any
/// number of operands.
///
/// A field tagged `help` replaces the generated `--help` flag.
pub fn command(specs: &[FlagSpec]) -> Command {
    let mut cmd = Command::new(env!("CARGO_PKG_NAME"));
    if specs.iter().any(|spec| spec.name == "help") {
        cmd = cmd.disable_help_flag(true);
    }

    specs
        .iter()
        .fold(cmd, |cmd, spec| cmd.arg(spec.arg()))
        .arg(
            Arg::new(OPERANDS)
                .value_name("ARGS")
                .value_parser(value_parser!(OsString))
                .num_args(0..)
                .trailing_var_arg(true)
                .hide(true),
        )
}

/// Arguments left after the last flag, in order.
///
/// `args` is the same list given to [`load_cmd_from`], binary name first.
pub fn operands<I, T>(specs: &[FlagSpec], args: I) -> Result<Vec<OsString>, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = command(specs).try_get_matches_from(args)?;
    Ok(matches
        .get_many::<OsString>(OPERANDS)
        .map(|values| values.cloned().collect())
        .unwrap_or_default())
}

/// Parse `args` (binary name first) once against all flags.
pub fn parse<I, T>(specs: &[FlagSpec], args: I) -> Result<HashMap<&'static str, Value>, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = command(specs).try_get_matches_from(args)?;
    if let Some(rest) = matches.get_many::<OsString>(OPERANDS) {
        debug!(count = rest.len(), "leaving operands to the application");
    }

    Ok(specs
        .iter()
        .filter_map(|spec| spec.value(&matches).map(|value| (spec.name, value)))
        .collect())
}

struct WriteBack<'v> {
    values: &'v HashMap<&'static str, Value>,
    failures: Vec<String>,
}

impl Visitor for WriteBack<'_> {
    fn visit(&mut self, _path: &FieldPath, meta: &FieldMeta, value: &mut dyn Scalar) {
        let Some(name) = meta.cmd else {
            return;
        };
        let Some(parsed) = self.values.get(name) else {
            return;
        };
        if let Err(e) = value.assign(parsed.clone()) {
            self.failures.push(format!("--{name}: {e}"));
        }
    }
}

/// Overwrite every `cmd`-tagged field that has a parsed value.
pub fn apply(record: &mut dyn Record, values: &HashMap<&'static str, Value>) -> Result<(), clap::Error> {
    let mut write_back = WriteBack {
        values,
        failures: Vec::new(),
    };
    walk(record, &mut write_back);

    if write_back.failures.is_empty() {
        Ok(())
    } else {
        Err(clap::Error::raw(
            ErrorKind::ValueValidation,
            format!("invalid value for {}\n", write_back.failures.join(", ")),
        ))
    }
}

/// Load `record` from `args`, where the first item is the binary name.
pub fn load_cmd_from<I, T>(record: &mut dyn Record, args: I) -> Result<(), clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let specs = discover(record);
    let values = parse(&specs, args)?;
    apply(record, &values)
}

/// Load `record` from the process arguments.
///
/// Misuse of the command line is fatal: the error (or `--help` output) is
/// printed and the process exits.
pub fn load_cmd(record: &mut dyn Record) {
    if let Err(e) = load_cmd_from(record, std::env::args_os()) {
        e.exit();
    }
}
