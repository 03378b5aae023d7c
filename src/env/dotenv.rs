//! `.env` file parsing and `${VAR}` expansion

use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;

use crate::infra::FileSystem;
use crate::interpolate::interpolate_with;

/// Nesting limit for `${VAR}` references between dotenv values
const MAX_EXPANSION_DEPTH: usize = 32;

/// A value read from a dotenv file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DotenvValue {
    /// Value with surrounding quotes removed
    pub value: String,
    /// Single-quoted values are taken literally
    pub expand: bool,
}

/// Parse dotenv `contents` into key/value pairs in file order.
///
/// Supports blank lines, `#` comments, an `export ` prefix, single and
/// double quotes, `\n` escapes inside double quotes, and trailing ` #`
/// comments on unquoted values.
///
/// # Examples
///
/// ```
/// use jm_cli::env::dotenv::parse;
///
/// let entries = parse("# comment\nexport PORT=3000\nNAME='${literal}'\n");
/// assert_eq!(entries[0].0, "PORT");
/// assert_eq!(entries[0].1.value, "3000");
/// assert!(!entries[1].1.expand);
/// ```
pub fn parse(contents: &str) -> Vec<(String, DotenvValue)> {
    let mut entries = Vec::new();

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }

        let value = value.trim();
        let bytes = value.as_bytes();
        let parsed = if value.len() >= 2 && bytes[0] == b'"' && bytes[bytes.len() - 1] == b'"' {
            DotenvValue {
                value: value[1..value.len() - 1].replace("\\n", "\n"),
                expand: true,
            }
        } else if value.len() >= 2 && bytes[0] == b'\'' && bytes[bytes.len() - 1] == b'\'' {
            DotenvValue {
                value: value[1..value.len() - 1].to_string(),
                expand: false,
            }
        } else {
            let value = match value.find(" #") {
                Some(index) => value[..index].trim_end(),
                None => value,
            };
            DotenvValue {
                value: value.to_string(),
                expand: true,
            }
        };

        entries.push((key.to_string(), parsed));
    }

    entries
}

/// Read `files` in order, later files overriding earlier ones. Missing files are skipped.
pub fn load_chain<FS: FileSystem>(
    fs: &FS,
    files: &[PathBuf],
) -> io::Result<BTreeMap<String, DotenvValue>> {
    let mut merged = BTreeMap::new();

    for file in files {
        if !fs.is_file(file) {
            continue;
        }
        let contents = fs.read_to_string(file)?;
        let entries = parse(&contents);
        log::debug!("loaded {} variable(s) from {}", entries.len(), file.display());
        merged.extend(entries);
    }

    Ok(merged)
}

fn resolve(
    name: &str,
    defined: &BTreeMap<String, DotenvValue>,
    process_env: &BTreeMap<String, String>,
    stack: &mut Vec<String>,
) -> String {
    if let Some(value) = process_env.get(name) {
        return value.clone();
    }
    let Some(entry) = defined.get(name) else {
        return String::new();
    };
    if !entry.expand {
        return entry.value.clone();
    }
    if stack.iter().any(|n| n == name) || stack.len() >= MAX_EXPANSION_DEPTH {
        log::warn!("cyclic reference to ${{{}}} in .env files, using an empty value", name);
        return String::new();
    }

    stack.push(name.to_string());
    let expanded = interpolate_with(&entry.value, |reference| {
        resolve(reference, defined, process_env, stack)
    });
    stack.pop();
    expanded
}

/// Expand `${VAR}` references in every dotenv value.
///
/// References resolve against the process environment first, then against
/// other dotenv values, recursively. Undefined and cyclic references become
/// the empty string. Variables already set in the process environment keep
/// their process value.
pub fn expand(
    defined: &BTreeMap<String, DotenvValue>,
    process_env: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    defined
        .keys()
        .map(|key| {
            let mut stack = Vec::new();
            (key.clone(), resolve(key, defined, process_env, &mut stack))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::RealFileSystem;
    use tempfile::TempDir;

    fn defined(pairs: &[(&str, &str)]) -> BTreeMap<String, DotenvValue> {
        pairs
            .iter()
            .map(|(k, v)| {
                (
                    k.to_string(),
                    DotenvValue {
                        value: v.to_string(),
                        expand: true,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_parse_handles_quotes_comments_and_export() {
        let entries = parse(
            "\n# header\nexport A=1\nB=\"two words\"\nC='${A}'\nD=plain # trailing\nE=\"x\\ny\"\n=skipped\nnot a pair\n",
        );
        let map: BTreeMap<_, _> = entries.into_iter().collect();

        assert_eq!(map.len(), 5);
        assert_eq!(map["A"].value, "1");
        assert_eq!(map["B"].value, "two words");
        assert_eq!(map["C"].value, "${A}");
        assert!(!map["C"].expand);
        assert_eq!(map["D"].value, "plain");
        assert_eq!(map["E"].value, "x\ny");
    }

    #[test]
    fn test_expand_resolves_nested_references() {
        let vars = defined(&[
            ("HOST", "localhost"),
            ("ORIGIN", "http://${HOST}:${PORT}"),
            ("API", "${ORIGIN}/api"),
        ]);
        let process = BTreeMap::from([("PORT".to_string(), "3000".to_string())]);

        let expanded = expand(&vars, &process);
        assert_eq!(expanded["API"], "http://localhost:3000/api");
    }

    #[test]
    fn test_expand_undefined_reference_is_empty() {
        let expanded = expand(&defined(&[("A", "x${NOPE}y")]), &BTreeMap::new());
        assert_eq!(expanded["A"], "xy");
    }

    #[test]
    fn test_expand_terminates_on_cycles() {
        let vars = defined(&[("A", "a${B}"), ("B", "b${A}"), ("SELF", "${SELF}!")]);
        let expanded = expand(&vars, &BTreeMap::new());

        assert_eq!(expanded["A"], "ab");
        assert_eq!(expanded["B"], "ba");
        assert_eq!(expanded["SELF"], "!");
    }

    #[test]
    fn test_expand_keeps_process_value_for_defined_keys() {
        let vars = defined(&[("PORT", "8080")]);
        let process = BTreeMap::from([("PORT".to_string(), "9000".to_string())]);
        assert_eq!(expand(&vars, &process)["PORT"], "9000");
    }

    #[test]
    fn test_load_chain_later_files_override() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join(".env");
        let local = dir.path().join(".env.local");
        std::fs::write(&base, "A=base\nB=base\n").unwrap();
        std::fs::write(&local, "B=local\n").unwrap();

        let merged = load_chain(
            &RealFileSystem,
            &[base, dir.path().join(".env.missing"), local],
        )
        .unwrap();

        assert_eq!(merged["A"].value, "base");
        assert_eq!(merged["B"].value, "local");
    }
}
