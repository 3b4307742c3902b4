use crate::cmd;
use crate::environment::{self, EnvOptions};
use crate::error::{Error, LoadErrors};
use crate::field::Record;
use crate::file;
use serde::{Serialize, de::DeserializeOwned};
use std::{ffi::OsString, path::Path};
use tracing::debug;

/// Start a load chain over `record`.
///
/// # Example
/// ```no_run
/// use lodr::{EnvOptions, Record};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Default, Serialize, Deserialize, Record)]
/// #[serde(default)]
/// struct Config {
///     #[lodr(cmd = "name")]
///     name: String,
///     #[lodr(env = "PORT")]
///     port: u16,
/// }
///
/// let mut config = Config::default();
/// lodr::load(&mut config)
///     .file("config.yaml")
///     .env_with_options(EnvOptions::new().prefix("MY_APP"))
///     .cmd()
///     .run()
///     .unwrap();
/// ```
pub fn load<T>(record: &mut T) -> Loader<'_, T> {
    Loader::new(record)
}

/// Fluent chain loading one record from files, the environment and the
/// command line, with error collection
///
/// Steps run in call order and each may overwrite fields set by the previous
/// ones. A failing step records its errors and the chain carries on, so the
/// caller inspects every failure once at the end with [`Loader::run`] or
/// [`Loader::errors`].
pub struct Loader<'a, T> {
    record: &'a mut T,
    errors: Vec<Error>,
}

impl<'a, T> Loader<'a, T> {
    pub fn new(record: &'a mut T) -> Self {
        Self {
            record,
            errors: Vec::new(),
        }
    }

    /// Errors collected so far, in step order
    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    /// Finish the chain and return any errors that were collected
    pub fn run(self) -> Result<(), LoadErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(LoadErrors(self.errors))
        }
    }

    fn collect(&mut self, step: &str, errors: impl IntoIterator<Item = Error>) {
        let before = self.errors.len();
        self.errors.extend(errors);
        let failed = self.errors.len() - before;
        if failed > 0 {
            debug!(step, failed, "load step reported errors");
        }
    }
}

impl<T> Loader<'_, T>
where
    T: Serialize + DeserializeOwned + Record,
{
    /// Load a YAML or JSON file.
    pub fn file(mut self, path: impl AsRef<Path>) -> Self {
        let result = file::load_file(path, &mut *self.record);
        self.collect("file", result.err());
        self
    }
}

impl<T> Loader<'_, T>
where
    T: Record,
{
    /// Load tagged fields from the environment, without a prefix.
    pub fn env(self) -> Self {
        self.env_with_options(EnvOptions::default())
    }

    pub fn env_with_options(mut self, opts: EnvOptions) -> Self {
        let result = environment::load_env(&mut *self.record, &opts);
        self.collect("env", result.err().into_iter().flatten());
        self
    }

    /// Load flags from the process arguments.
    ///
    /// Exits the process on malformed arguments or `--help`.
    pub fn cmd(self) -> Self {
        cmd::load_cmd(&mut *self.record);
        self
    }

    /// Load flags from `args` (binary name first), recording a parse
    /// failure as [`Error::Cmd`] instead of exiting.
    pub fn cmd_from<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString> + Clone,
    {
        let result = cmd::load_cmd_from(&mut *self.record, args);
        self.collect("cmd", result.err().map(Error::Cmd));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{Field, FieldMeta};
    use serde::Deserialize;
    use std::io::Write;

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(default)]
    struct Config {
        name: String,
        port: u16,
    }

    impl Record for Config {
        fn fields(&mut self) -> Vec<Field<'_>> {
            vec![
                Field::scalar(FieldMeta::new("name").cmd("name"), &mut self.name),
                Field::scalar(FieldMeta::new("port").env("LODR_BUILDER_TEST_PORT"), &mut self.port),
            ]
        }
    }

    #[test]
    fn test_loader_new() {
        let mut config = Config::default();
        let loader = Loader::new(&mut config);
        assert_eq!(loader.errors().len(), 0);
        assert!(loader.run().is_ok());
    }

    #[test]
    fn test_errors_accumulate_and_chain_continues() {
        let mut config = Config::default();
        let loader = load(&mut config)
            .file("no-such-file.yaml")
            .file("no-extension")
            .cmd_from(["app", "--name=after-failures"]);

        assert_eq!(loader.errors().len(), 2);
        assert!(matches!(loader.errors()[0], Error::FileNotFound { .. }));
        assert!(matches!(loader.errors()[1], Error::FileNotFound { .. }));

        let errors = loader.run().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(config.name, "after-failures");
    }

    #[test]
    fn test_cmd_error_recorded() {
        let mut config = Config::default();
        let result = load(&mut config).cmd_from(["app", "--bogus"]).run();

        let errors = result.unwrap_err();
        assert!(matches!(errors.errors()[0], Error::Cmd(_)));
    }

    #[test]
    fn test_file_then_flags_override() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"name": "from-file", "port": 7000}}"#).unwrap();

        let mut config = Config::default();
        load(&mut config)
            .file(file.path())
            .cmd_from(["app", "--name", "from-flag"])
            .run()
            .unwrap();

        assert_eq!(config.name, "from-flag");
        assert_eq!(config.port, 7000);
    }
}
