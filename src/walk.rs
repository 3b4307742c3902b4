use crate::field::{Field, FieldMeta, Record, Slot};
use crate::naming;
use crate::value::Scalar;
use std::fmt;
use tracing::trace;

/// Declared field names from the root record down to the current field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath {
    segments: Vec<&'static str>,
}

impl FieldPath {
    pub fn segments(&self) -> &[&'static str] {
        &self.segments
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Environment variable name used when every field is loaded by path.
    pub fn env_var(&self, prefix: &str) -> String {
        naming::path_var(prefix, self.segments.iter().copied())
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

/// Per-source action applied to every scalar field of a record
pub trait Visitor {
    fn visit(&mut self, path: &FieldPath, meta: &FieldMeta, value: &mut dyn Scalar);
}

/// Visit every scalar field of `record` depth first, in declaration order.
///
/// A nested record is fully visited before the walk moves on to the next
/// field of its parent.
pub fn walk(record: &mut dyn Record, visitor: &mut dyn Visitor) {
    let mut path = FieldPath::default();
    descend(record, &mut path, visitor);
}

fn descend(record: &mut dyn Record, path: &mut FieldPath, visitor: &mut dyn Visitor) {
    for Field { meta, slot } in record.fields() {
        path.segments.push(meta.name);
        match slot {
            Slot::Scalar(value) => visitor.visit(path, &meta, value),
            Slot::Nested(inner) => {
                trace!(path = %path, "descending into nested record");
                descend(inner, path, visitor);
            }
        }
        path.segments.pop();
    }
}
