//! Pluggable validation of the `jm` options block
//!
//! Validators report backend-neutral [`ValidationError`] values addressed by
//! JSON pointer. [`aggregate`] then folds them into the list shown to the
//! user: one entry per path, and never a parent path next to one of its
//! children.

use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;

/// A single schema violation
///
/// # Examples
///
/// ```
/// use jm_cli::options::ValidationError;
///
/// let error = ValidationError::new("/proxy", "should be string");
/// assert_eq!(error.path, "/proxy");
/// assert_eq!(error.to_string(), "/proxy: should be string");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// JSON pointer into the options block; empty for the block itself
    pub path: String,
    /// Human-readable description
    pub message: String,
}

impl ValidationError {
    /// Create a new validation error
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Build a JSON pointer from a parent pointer and a key, escaping `~` and `/`
pub fn pointer(parent: &str, key: impl std::fmt::Display) -> String {
    let key = key.to_string().replace('~', "~0").replace('/', "~1");
    format!("{}/{}", parent, key)
}

/// Trait for pluggable option validators
pub trait OptionValidator: Send + Sync {
    /// Validator name
    fn name(&self) -> &str;

    /// Validate the raw options block
    fn validate(&self, options: &serde_json::Value) -> Vec<ValidationError>;

    /// Get validator priority (lower runs first)
    fn priority(&self) -> u32 {
        100
    }
}

/// Registry for managing option validators
#[derive(Default)]
pub struct ValidatorRegistry {
    validators: Mutex<Vec<Arc<dyn OptionValidator>>>,
}

impl ValidatorRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a validator
    pub fn register(&self, validator: Arc<dyn OptionValidator>) {
        let mut validators = self.validators.lock();
        validators.push(validator);
        validators.sort_by_key(|v| v.priority());
    }

    /// Run all validators, returning their raw, unaggregated errors
    pub fn validate_all(&self, options: &serde_json::Value) -> Vec<ValidationError> {
        let validators = self.validators.lock();
        let mut errors = Vec::new();

        for validator in validators.iter() {
            let found = validator.validate(options);
            if !found.is_empty() {
                log::debug!("validator '{}' reported {} error(s)", validator.name(), found.len());
            }
            errors.extend(found);
        }

        errors
    }

    /// Get validator count
    pub fn count(&self) -> usize {
        self.validators.lock().len()
    }
}

fn paths_overlap(a: &str, b: &str) -> bool {
    fn nested(parent: &str, child: &str) -> bool {
        parent.is_empty()
            || child
                .strip_prefix(parent)
                .is_some_and(|rest| rest.starts_with('/'))
    }
    a == b || nested(a, b) || nested(b, a)
}

/// Fold raw errors into the list presented to the user.
///
/// Errors sharing a path are merged, their messages joined with `" or "`.
/// When two paths overlap (one is the other, or an ancestor of it), the more
/// specific path replaces the broader one.
///
/// # Examples
///
/// ```
/// use jm_cli::options::{aggregate, ValidationError};
///
/// let errors = aggregate(vec![
///     ValidationError::new("/proxy", "should be string"),
///     ValidationError::new("/proxy", "should be object"),
///     ValidationError::new("/proxy/target", "should be string"),
/// ]);
///
/// assert_eq!(errors, vec![ValidationError::new("/proxy/target", "should be string")]);
/// ```
pub fn aggregate(errors: Vec<ValidationError>) -> Vec<ValidationError> {
    let mut messages: Vec<(String, Vec<String>)> = Vec::new();
    for error in errors {
        match messages.iter_mut().find(|(path, _)| *path == error.path) {
            Some((_, seen)) => {
                if !seen.contains(&error.message) {
                    seen.push(error.message);
                }
            }
            None => messages.push((error.path, vec![error.message])),
        }
    }
    let grouped = messages
        .into_iter()
        .map(|(path, seen)| ValidationError::new(path, seen.join(" or ")));

    grouped.fold(Vec::new(), |mut all, current| {
        match all.iter().position(|e| paths_overlap(&e.path, &current.path)) {
            Some(index) => {
                if all[index].path.len() <= current.path.len() {
                    all[index] = current;
                }
            }
            None => all.push(current),
        }
        all
    })
}
