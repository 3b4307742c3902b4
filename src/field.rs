use crate::value::Scalar;

/// Which per-source tag to read from a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Env,
    Cmd,
}

/// Static description of one field of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMeta {
    /// Declared field name
    pub name: &'static str,
    /// First line of the field's documentation, empty when undocumented
    pub doc: &'static str,
    /// Environment variable name (suffix when a prefix is configured)
    pub env: Option<&'static str>,
    /// Command-line flag name, used verbatim
    pub cmd: Option<&'static str>,
    /// Current value must not be shown in docs or help output
    pub secret: bool,
}

impl FieldMeta {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            doc: "",
            env: None,
            cmd: None,
            secret: false,
        }
    }

    pub fn doc(mut self, doc: &'static str) -> Self {
        self.doc = doc;
        self
    }

    pub fn env(mut self, tag: &'static str) -> Self {
        self.env = Some(tag);
        self
    }

    pub fn cmd(mut self, tag: &'static str) -> Self {
        self.cmd = Some(tag);
        self
    }

    pub fn secret(mut self) -> Self {
        self.secret = true;
        self
    }

    pub fn tag(&self, tag: Tag) -> Option<&'static str> {
        match tag {
            Tag::Env => self.env,
            Tag::Cmd => self.cmd,
        }
    }
}

/// Mutable access to the storage behind a field
pub enum Slot<'a> {
    Scalar(&'a mut dyn Scalar),
    Nested(&'a mut dyn Record),
}

/// One entry of a record's field table
pub struct Field<'a> {
    pub meta: FieldMeta,
    pub slot: Slot<'a>,
}

impl<'a> Field<'a> {
    pub fn scalar(meta: FieldMeta, value: &'a mut dyn Scalar) -> Self {
        Self {
            meta,
            slot: Slot::Scalar(value),
        }
    }

    pub fn nested(meta: FieldMeta, record: &'a mut dyn Record) -> Self {
        Self {
            meta,
            slot: Slot::Nested(record),
        }
    }
}

/// A configuration record the loaders can populate in place.
///
/// Usually derived:
///
/// ```rust
/// use lodr::Record;
///
/// #[derive(Default, Record)]
/// struct Config {
///     /// Service name
///     #[lodr(cmd = "name")]
///     name: String,
///     #[lodr(env = "PORT")]
///     port: u16,
/// }
///
/// let mut config = Config::default();
/// let fields = lodr::Record::fields(&mut config);
/// assert_eq!(fields[0].meta.doc, "Service name");
/// assert_eq!(fields[1].meta.env, Some("PORT"));
/// ```
pub trait Record {
    /// Every loadable field, in declaration order.
    fn fields(&mut self) -> Vec<Field<'_>>;
}

impl<T: Record + ?Sized> Record for Box<T> {
    fn fields(&mut self) -> Vec<Field<'_>> {
        (**self).fields()
    }
}

impl<T: Record + ?Sized> Record for &mut T {
    fn fields(&mut self) -> Vec<Field<'_>> {
        (**self).fields()
    }
}
