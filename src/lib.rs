//! Populate one typed configuration struct from a YAML/JSON file,
//! environment variables and command-line flags.
//!
//! ```no_run
//! use lodr::{EnvOptions, Record};
//! use serde::{Deserialize, Serialize};
//! use std::time::Duration;
//!
//! #[derive(Default, Serialize, Deserialize, Record)]
//! #[serde(default)]
//! struct MyConfig {
//!     #[lodr(cmd = "name")]
//!     name: String,
//!     #[lodr(nested)]
//!     db: Db,
//! }
//!
//! #[derive(Default, Serialize, Deserialize, Record)]
//! #[serde(default)]
//! struct Db {
//!     #[lodr(env = "DB_HOST", cmd = "db.host")]
//!     host: String,
//!     #[lodr(env = "DB_PORT", cmd = "db.port")]
//!     port: u16,
//!     #[serde(with = "lodr::duration")]
//!     #[lodr(env = "DB_TIMEOUT", cmd = "db.timeout")]
//!     timeout: Duration,
//! }
//!
//! let mut config = MyConfig::default();
//! lodr::load(&mut config)
//!     .file("config.yaml")
//!     .env_with_options(EnvOptions::new().prefix("MY_APP"))
//!     .cmd()
//!     .run()
//!     .unwrap();
//! ```

// Lets the derive's `::lodr::` paths resolve inside this crate.
extern crate self as lodr;

pub mod builder;
pub mod cmd;
pub mod docs;
pub mod duration;
pub mod environment;
pub mod error;
pub mod field;
pub mod file;
pub mod naming;
pub mod value;
pub mod walk;

// Re-export main types
pub use builder::{Loader, load};
pub use cmd::{load_cmd, load_cmd_from};
pub use environment::{EnvOptions, InvalidValuePolicy, load_env, load_env_with};
pub use error::{Error, FormatError, LoadErrors, ValueError};
pub use field::{Field, FieldMeta, Record, Slot, Tag};
pub use file::load_file;
pub use value::{Kind, Scalar, Value};
pub use walk::{FieldPath, Visitor, walk};

// Re-export macro
pub use lodr_macros::Record;
