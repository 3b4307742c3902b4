//! Configuration file loading.
//!
//! A file is located by trying the path as given, then the same path relative
//! to the directory of the running executable. The format is chosen from the
//! extension alone: `yaml`/`yml` or `json`.
//!
//! Loading is sparse. The record is serialized, the file's document is
//! deep-merged over it and the result is deserialized back, so keys the file
//! does not mention keep whatever value the record already had. Fields serde
//! cannot carry through that round trip (`#[serde(skip)]` and the like) are
//! restored afterwards unless the file changed them. On any error the record
//! is left untouched.

use crate::error::{Error, FormatError};
use crate::field::{FieldMeta, Record};
use crate::value::{self, Scalar};
use crate::walk::{FieldPath, Visitor, walk};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use tracing::debug;

/// Supported file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Json,
}

impl Format {
    /// Pick a format from the file extension.
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        match path.extension().map(|ext| ext.to_string_lossy()) {
            None => Err(Error::UnsupportedFormat("extension missing".to_string())),
            Some(ext) => match ext.as_ref() {
                "yaml" | "yml" => Ok(Format::Yaml),
                "json" => Ok(Format::Json),
                other => Err(Error::UnsupportedFormat(format!(".{other}"))),
            },
        }
    }

    /// Parse a document into a format-independent value tree.
    pub fn parse(self, blob: &[u8]) -> Result<Value, FormatError> {
        match self {
            Format::Yaml => Ok(serde_yaml::from_slice(blob)?),
            Format::Json => Ok(serde_json::from_slice(blob)?),
        }
    }
}

/// Find the file to read: `path` itself, or `path` relative to the directory
/// holding the current executable.
pub fn resolve(path: &Path) -> Result<PathBuf, Error> {
    if path.exists() {
        return Ok(path.to_path_buf());
    }

    let exe = env::current_exe().map_err(Error::CurrentExe)?;
    if let Some(candidate) = exe.parent().map(|dir| dir.join(path)) {
        if candidate.exists() {
            debug!(path = %candidate.display(), "using configuration file next to executable");
            return Ok(candidate);
        }
    }

    Err(Error::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn read(path: &Path) -> Result<Vec<u8>, Error> {
    let io_err = |source| Error::Io {
        path: path.to_path_buf(),
        source,
    };

    if fs::metadata(path).map_err(io_err)?.len() == 0 {
        return Err(Error::EmptyFile {
            path: path.to_path_buf(),
        });
    }
    fs::read(path).map_err(io_err)
}

/// Load the file at `path` into `record`.
pub fn load_file<T>(path: impl AsRef<Path>, record: &mut T) -> Result<(), Error>
where
    T: Serialize + DeserializeOwned + Record,
{
    let resolved = resolve(path.as_ref())?;
    let blob = read(&resolved)?;
    let format = Format::from_path(&resolved)?;
    debug!(path = %resolved.display(), ?format, "loading configuration file");

    let deserialize_err = |source: FormatError| Error::Deserialize {
        path: resolved.clone(),
        source,
    };

    let overlay = format.parse(&blob).map_err(deserialize_err)?;
    if overlay.is_null() {
        debug!(path = %resolved.display(), "configuration file holds no document");
        return Ok(());
    }

    let base = serde_json::to_value(&*record).map_err(|e| deserialize_err(e.into()))?;
    let mut round_trip: T =
        serde_json::from_value(base.clone()).map_err(|e| deserialize_err(e.into()))?;
    let lost = lost_fields(snapshot(&mut *record), snapshot(&mut round_trip));

    let merged = deep_merge(base, overlay);
    *record = serde_json::from_value(merged).map_err(|e| deserialize_err(e.into()))?;

    if !lost.is_empty() {
        debug!(count = lost.len(), "restoring fields hidden from serde");
        walk(&mut *record, &mut Restore { index: 0, lost });
    }
    Ok(())
}

/// Current value of every scalar field, in walk order
fn snapshot(record: &mut dyn Record) -> Vec<Option<value::Value>> {
    let mut snapshot = Snapshot(Vec::new());
    walk(record, &mut snapshot);
    snapshot.0
}

struct Snapshot(Vec<Option<value::Value>>);

impl Visitor for Snapshot {
    fn visit(&mut self, _path: &FieldPath, _meta: &FieldMeta, value: &mut dyn Scalar) {
        self.0.push(value.value());
    }
}

/// A field whose value did not survive a serde round trip
struct Lost {
    index: usize,
    round_trip: Option<value::Value>,
    original: value::Value,
}

fn lost_fields(before: Vec<Option<value::Value>>, after: Vec<Option<value::Value>>) -> Vec<Lost> {
    before
        .into_iter()
        .zip(after)
        .enumerate()
        .filter(|(_, (before, after))| before != after)
        .filter_map(|(index, (before, after))| {
            before.map(|original| Lost {
                index,
                round_trip: after,
                original,
            })
        })
        .collect()
}

// Puts a lost field back, unless the file set it to something new.
struct Restore {
    index: usize,
    lost: Vec<Lost>,
}

impl Visitor for Restore {
    fn visit(&mut self, path: &FieldPath, _meta: &FieldMeta, value: &mut dyn Scalar) {
        let index = self.index;
        self.index += 1;

        let Some(lost) = self.lost.iter().find(|lost| lost.index == index) else {
            return;
        };
        if value.value() != lost.round_trip {
            return;
        }
        if let Err(e) = value.assign(lost.original.clone()) {
            debug!(field = %path, error = %e, "cannot restore field");
        }
    }
}

/// Deep-merge `overlay` on top of `base`.
/// If both sides hold an object for the same key, recurse.
/// Otherwise, `overlay`'s value wins.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base), Value::Object(overlay)) => {
            for (key, overlay_val) in overlay {
                let merged = match base.remove(&key) {
                    Some(base_val) => deep_merge(base_val, overlay_val),
                    None => overlay_val,
                };
                base.insert(key, merged);
            }
            Value::Object(base)
        }
        (_, overlay) => overlay,
    }
}
