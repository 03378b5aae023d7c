//! `${NAME}` placeholder substitution

use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::sync::OnceLock;

static PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();

fn placeholder_re() -> &'static Regex {
    PLACEHOLDER_RE
        .get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("placeholder regex is valid"))
}

/// Replace every `${NAME}` in `text` with its value in `vars`.
///
/// Undefined names become the empty string.
///
/// # Examples
///
/// ```
/// use jm_cli::interpolate::interpolate;
/// use std::collections::BTreeMap;
///
/// let vars = BTreeMap::from([("HOST".to_string(), "localhost".to_string())]);
/// assert_eq!(interpolate("http://${HOST}:${PORT}", &vars), "http://localhost:");
/// ```
pub fn interpolate(text: &str, vars: &BTreeMap<String, String>) -> String {
    interpolate_with(text, |name| vars.get(name).cloned().unwrap_or_default())
}

/// Replace every `${NAME}` in `text` with whatever `lookup` returns for `NAME`
pub fn interpolate_with(text: &str, mut lookup: impl FnMut(&str) -> String) -> String {
    placeholder_re()
        .replace_all(text, |caps: &Captures| lookup(caps[1].trim()))
        .into_owned()
}
