/// Insert `token` before every run of uppercase ASCII letters that does not
/// start a word.
///
/// `DbHost` becomes `Db_Host` and `db_host` is returned untouched. A run
/// that opens the name keeps only its first letter: `TLSConfig` becomes
/// `T_LSConfig`.
pub fn split_camel_case(name: &str, token: &str) -> String {
    let mut out = String::with_capacity(name.len() + token.len());
    let mut prev: Option<char> = None;
    // true while inside a run that already received a token
    let mut split_run = false;

    for c in name.chars() {
        if !c.is_ascii_uppercase() {
            split_run = false;
        } else if !split_run && prev.is_some_and(is_word_char) {
            out.push_str(token);
            split_run = true;
        }
        out.push(c);
        prev = Some(c);
    }

    out
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Build the name of a tag-driven environment variable.
pub fn tagged_var(prefix: &str, tag: &str) -> String {
    if prefix.is_empty() {
        tag.to_uppercase()
    } else {
        format!("{prefix}_{tag}").to_uppercase()
    }
}

/// Build the name of a path-driven environment variable from the declared
/// field names leading to a leaf.
pub fn path_var<'a>(prefix: &str, segments: impl IntoIterator<Item = &'a str>) -> String {
    let mut parts: Vec<String> = Vec::new();
    if !prefix.is_empty() {
        parts.push(prefix.to_string());
    }
    parts.extend(segments.into_iter().map(|s| split_camel_case(s, "_")));
    parts.join("_").to_uppercase()
}
