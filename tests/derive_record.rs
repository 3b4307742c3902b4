use lodr::{FieldPath, FieldMeta, Record, Scalar, Slot, Visitor, walk};

#[derive(Debug, Default, Record)]
struct Inner {
    /// Listen address
    ///
    /// Extra lines are not part of the summary.
    #[lodr(env = "ADDR")]
    addr: String,
    #[lodr(doc = "Explicit description")]
    limit: Option<u16>,
}

#[derive(Debug, Default, Record)]
struct Empty;

#[derive(Debug, Default, Record)]
struct Outer {
    #[lodr(cmd = "first")]
    first: i32,
    #[lodr(skip)]
    secret: Vec<String>,
    #[lodr(nested)]
    inner: Inner,
    #[lodr(nested)]
    boxed: Box<Inner>,
    #[lodr(nested)]
    nothing: Empty,
    #[lodr(env = "TYPE")]
    r#type: String,
}

struct Paths(Vec<String>);

impl Visitor for Paths {
    fn visit(&mut self, path: &FieldPath, _meta: &FieldMeta, _value: &mut dyn Scalar) {
        self.0.push(path.to_string());
    }
}

#[test]
fn test_walk_order_and_paths() {
    let mut outer = Outer::default();
    let mut paths = Paths(Vec::new());
    walk(&mut outer, &mut paths);

    assert_eq!(
        paths.0,
        [
            "first",
            "inner.addr",
            "inner.limit",
            "boxed.addr",
            "boxed.limit",
            "type",
        ]
    );
}

#[test]
fn test_skipped_field_is_absent() {
    let mut outer = Outer {
        secret: vec!["hunter2".to_string()],
        ..Outer::default()
    };
    let names: Vec<_> = outer.fields().iter().map(|f| f.meta.name).collect();

    assert_eq!(names, ["first", "inner", "boxed", "nothing", "type"]);
}

#[test]
fn test_doc_and_tags() {
    let mut inner = Inner::default();
    let fields = inner.fields();

    assert_eq!(fields[0].meta.doc, "Listen address");
    assert_eq!(fields[0].meta.env, Some("ADDR"));
    assert_eq!(fields[0].meta.cmd, None);
    assert_eq!(fields[1].meta.doc, "Explicit description");
}

#[test]
fn test_nested_slots() {
    let mut outer = Outer::default();
    let fields = outer.fields();

    assert!(matches!(fields[0].slot, Slot::Scalar(_)));
    assert!(matches!(fields[1].slot, Slot::Nested(_)));
    assert!(matches!(fields[3].slot, Slot::Nested(_)));
}

#[test]
fn test_unit_struct_has_no_fields() {
    let mut empty = Empty;
    assert!(empty.fields().is_empty());
}

#[test]
fn test_optional_scalar_assigned_from_env() {
    let mut inner = Inner::default();
    let lookup = |var: &str| (var == "ADDR").then(|| "0.0.0.0:80".to_string());
    lodr::load_env_with(&mut inner, &lodr::EnvOptions::new(), lookup).unwrap();
    assert_eq!(inner.addr, "0.0.0.0:80");

    let opts = lodr::EnvOptions::new().process_all(true);
    let lookup = |var: &str| (var == "LIMIT").then(|| "12".to_string());
    lodr::load_env_with(&mut inner, &opts, lookup).unwrap();
    assert_eq!(inner.limit, Some(12));
}

#[derive(Debug, Default, Record)]
struct Credentials {
    #[lodr(env = "USER")]
    user: String,
    #[lodr(env = "PASSWORD", cmd = "password", secret)]
    password: String,
}

#[test]
fn test_secret_attribute() {
    let mut creds = Credentials::default();
    let fields = creds.fields();

    assert!(!fields[0].meta.secret);
    assert!(fields[1].meta.secret);
    assert_eq!(fields[1].meta.cmd, Some("password"));
}
