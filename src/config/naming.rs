//! Output filename conventions
//!
//! Named builds prefix every emitted basename with `{name}_`. Production
//! filenames carry a content hash query for cache-busting; development
//! filenames never do.

use super::types::BuildMode;

/// Content-hash query appended to production filenames
pub const CONTENT_HASH: &str = "?[contenthash:8]";

/// Filename patterns for one composed configuration
///
/// # Examples
///
/// ```
/// use jm_cli::config::{BuildMode, Naming};
///
/// let naming = Naming::new(Some("admin"), BuildMode::Production);
/// assert_eq!(naming.script(), "static/js/admin_[name].js?[contenthash:8]");
/// assert_eq!(naming.page("index"), "admin_index.html");
///
/// let dev = Naming::new(None, BuildMode::Development);
/// assert_eq!(dev.style(), "static/css/[name].css");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Naming {
    prefix: String,
    hashed: bool,
}

impl Naming {
    /// Conventions for an optional group name and a build mode
    pub fn new(name: Option<&str>, mode: BuildMode) -> Self {
        Self {
            prefix: name
                .filter(|n| !n.is_empty())
                .map(|n| format!("{}_", n))
                .unwrap_or_default(),
            hashed: mode.is_production(),
        }
    }

    /// `{name}_`, or empty for unnamed builds
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn suffix(&self) -> &'static str {
        if self.hashed {
            CONTENT_HASH
        } else {
            ""
        }
    }

    /// Entry script pattern
    pub fn script(&self) -> String {
        format!("static/js/{}[name].js{}", self.prefix, self.suffix())
    }

    /// Lazily loaded script pattern
    pub fn script_chunk(&self) -> String {
        format!("static/js/{}[name].chunk.js{}", self.prefix, self.suffix())
    }

    /// Extracted stylesheet pattern
    pub fn style(&self) -> String {
        format!("static/css/{}[name].css{}", self.prefix, self.suffix())
    }

    /// Lazily loaded stylesheet pattern
    pub fn style_chunk(&self) -> String {
        format!("static/css/{}[name].chunk.css{}", self.prefix, self.suffix())
    }

    /// Images, fonts and other emitted files
    pub fn media(&self) -> String {
        format!("static/media/{}[name].[ext]{}", self.prefix, self.suffix())
    }

    /// HTML output for `page`
    pub fn page(&self, page: &str) -> String {
        format!("{}{}.html", self.prefix, page)
    }
}
