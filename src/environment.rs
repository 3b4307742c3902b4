use crate::error::Error;
use crate::field::{FieldMeta, Record};
use crate::naming;
use crate::value::Scalar;
use crate::walk::{FieldPath, Visitor, walk};
use std::{env, path::PathBuf};
use tracing::{debug, warn};

/// What to do when an environment variable is set but does not parse
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InvalidValuePolicy {
    /// Log a warning and keep the field's previous value
    #[default]
    Ignore,
    /// Keep the previous value and report an [`Error::EnvParse`]
    Report,
}

/// Options for loading a record from environment variables
///
/// # Example
/// ```rust
/// use lodr::EnvOptions;
///
/// let opts = EnvOptions::new().prefix("MY_APP").process_all(true);
/// assert_eq!(opts.prefix, "MY_APP");
/// ```
#[derive(Debug, Clone, Default)]
pub struct EnvOptions {
    /// Prepended to every variable name, joined with `_`
    pub prefix: String,
    /// Load every scalar field by its path instead of by its `env` tag
    pub process_all: bool,
    pub on_invalid: InvalidValuePolicy,
    /// Dotenv file loaded into the process environment before lookup
    pub dotenv: Option<PathBuf>,
}

impl EnvOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn process_all(mut self, process_all: bool) -> Self {
        self.process_all = process_all;
        self
    }

    pub fn on_invalid(mut self, policy: InvalidValuePolicy) -> Self {
        self.on_invalid = policy;
        self
    }

    pub fn dotenv(mut self, path: impl Into<PathBuf>) -> Self {
        self.dotenv = Some(path.into());
        self
    }

    /// Variable consulted for a field, `None` when the field is not loaded
    /// from the environment under these options.
    pub fn var_name(&self, path: &FieldPath, meta: &FieldMeta) -> Option<String> {
        if self.process_all {
            Some(path.env_var(&self.prefix))
        } else {
            meta.env.map(|tag| naming::tagged_var(&self.prefix, tag))
        }
    }
}

/// Load `record` from the process environment.
///
/// Variables that are not set leave their field untouched.
pub fn load_env(record: &mut dyn Record, opts: &EnvOptions) -> Result<(), Vec<Error>> {
    let mut errors = Vec::new();

    if let Some(path) = &opts.dotenv {
        debug!(path = %path.display(), "loading dotenv file");
        if let Err(e) = dotenvy::from_path(path) {
            errors.push(Error::Dotenv(e));
        }
    }

    if let Err(mut lookup_errors) = load_env_with(record, opts, |var| env::var(var).ok()) {
        errors.append(&mut lookup_errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Like [`load_env`] but reads variables through `lookup`, and ignores
/// [`EnvOptions::dotenv`].
pub fn load_env_with<F>(record: &mut dyn Record, opts: &EnvOptions, lookup: F) -> Result<(), Vec<Error>>
where
    F: Fn(&str) -> Option<String>,
{
    let mut visitor = EnvVisitor {
        opts,
        lookup,
        errors: Vec::new(),
    };
    walk(record, &mut visitor);

    if visitor.errors.is_empty() {
        Ok(())
    } else {
        Err(visitor.errors)
    }
}

struct EnvVisitor<'o, F> {
    opts: &'o EnvOptions,
    lookup: F,
    errors: Vec<Error>,
}

impl<F> Visitor for EnvVisitor<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn visit(&mut self, path: &FieldPath, meta: &FieldMeta, value: &mut dyn Scalar) {
        let Some(var) = self.opts.var_name(path, meta) else {
            return;
        };
        let Some(raw) = (self.lookup)(&var) else {
            debug!(var = %var, "environment variable not set");
            return;
        };

        debug!(var = %var, field = %path, "loading field from environment");
        if let Err(source) = value.assign_str(&raw) {
            match self.opts.on_invalid {
                InvalidValuePolicy::Ignore => {
                    warn!(var = %var, value = %raw, error = %source, "ignoring malformed environment value");
                }
                InvalidValuePolicy::Report => self.errors.push(Error::EnvParse {
                    var,
                    value: raw,
                    source,
                }),
            }
        }
    }
}
