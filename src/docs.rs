use crate::environment::EnvOptions;
use crate::field::{FieldMeta, Record};
use crate::value::{Kind, Scalar};
use crate::walk::{FieldPath, Visitor, walk};
use std::{fs, path::Path};

/// Where one scalar field can be set from, and what it holds now
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDoc {
    /// Dotted path from the root record
    pub path: String,
    pub kind: Kind,
    pub description: String,
    /// Environment variable under the options passed to [`describe`]
    pub env: Option<String>,
    pub flag: Option<String>,
    /// Current value as text, masked for secret fields
    pub value: Option<String>,
}

const MASK: &str = "***";

/// Describe every scalar field of `record` in walk order.
///
/// Takes `&mut` only because fields are reached through [`Record::fields`];
/// nothing is modified.
pub fn describe(record: &mut dyn Record, opts: &EnvOptions) -> Vec<FieldDoc> {
    let mut collector = Collector {
        opts,
        docs: Vec::new(),
    };
    walk(record, &mut collector);
    collector.docs
}

struct Collector<'o> {
    opts: &'o EnvOptions,
    docs: Vec<FieldDoc>,
}

impl Visitor for Collector<'_> {
    fn visit(&mut self, path: &FieldPath, meta: &FieldMeta, value: &mut dyn Scalar) {
        self.docs.push(FieldDoc {
            path: path.to_string(),
            kind: value.kind(),
            description: meta.doc.to_string(),
            env: self.opts.var_name(path, meta),
            flag: meta.cmd.map(|name| format!("--{name}")),
            value: value.value().map(|v| {
                if meta.secret {
                    MASK.to_string()
                } else {
                    v.to_string()
                }
            }),
        });
    }
}

/// Render field docs as a markdown table
pub fn render_markdown(fields: &[FieldDoc]) -> String {
    let mut md = String::new();

    md.push_str("## Configuration Summary\n\n");
    md.push_str("| Field | Type | Environment | Flag | Description | Current |\n");
    md.push_str("|-------|------|-------------|------|-------------|---------|\n");
    for field in fields {
        let cell = |v: &Option<String>| match v {
            Some(s) if !s.is_empty() => format!("`{s}`"),
            _ => "-".to_string(),
        };
        let description = if field.description.is_empty() {
            "-"
        } else {
            field.description.as_str()
        };
        md.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} |\n",
            field.path,
            field.kind,
            cell(&field.env),
            cell(&field.flag),
            description,
            cell(&field.value),
        ));
    }

    md
}

/// Write configuration documentation to a markdown file
///
/// # Example
/// ```no_run
/// use lodr::{EnvOptions, Record, docs};
///
/// #[derive(Default, Record)]
/// struct Config {
///     /// Server port
///     #[lodr(env = "PORT", cmd = "port")]
///     port: u16,
/// }
///
/// let mut config = Config::default();
/// let fields = docs::describe(&mut config, &EnvOptions::new().prefix("APP"));
/// docs::write_docs("CONFIG.md", &fields).unwrap();
/// ```
pub fn write_docs(path: impl AsRef<Path>, fields: &[FieldDoc]) -> std::io::Result<()> {
    fs::write(path, render_markdown(fields))
}
