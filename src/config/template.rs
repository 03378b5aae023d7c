//! Per-page HTML injection planning

use serde::Serialize;
use std::path::{Path, PathBuf};

use super::entry::{PageEntry, TemplateRef};

/// Template used when a page has none of its own and `public/index.html` is absent
pub const BUILTIN_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title><%= htmlWebpackPlugin.options.title %></title>
  </head>
  <body>
    <div id="root"></div>
  </body>
</html>
"#;

/// File name the built-in template is materialized under in the cache directory
pub const BUILTIN_TEMPLATE_FILE: &str = "index.html";

/// HTML minification settings for production pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MinifyPolicy {
    /// Strip comments
    pub remove_comments: bool,
    /// Collapse whitespace between tags
    pub collapse_whitespace: bool,
    /// Drop attributes equal to their defaults
    pub remove_redundant_attributes: bool,
    /// Use `<!DOCTYPE html>`
    pub use_short_doctype: bool,
    /// Drop empty attributes
    pub remove_empty_attributes: bool,
    /// Drop `type="text/css"` from style and link tags
    pub remove_style_link_type_attributes: bool,
    /// Keep `/>` on void elements
    pub keep_closing_slash: bool,
    /// Minify inline scripts
    #[serde(rename = "minifyJS")]
    pub minify_js: bool,
    /// Minify inline styles
    #[serde(rename = "minifyCSS")]
    pub minify_css: bool,
    /// Minify URLs
    #[serde(rename = "minifyURLs")]
    pub minify_urls: bool,
}

impl MinifyPolicy {
    /// Every minification enabled
    pub fn production() -> Self {
        Self {
            remove_comments: true,
            collapse_whitespace: true,
            remove_redundant_attributes: true,
            use_short_doctype: true,
            remove_empty_attributes: true,
            remove_style_link_type_attributes: true,
            keep_closing_slash: true,
            minify_js: true,
            minify_css: true,
            minify_urls: true,
        }
    }
}

/// How one page's HTML is generated
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HtmlPlan {
    /// Page name
    pub page: String,
    /// Output filename before naming conventions apply
    pub filename: String,
    /// Template to render
    pub template: TemplateRef,
    /// Chunks injected into the page, in order
    pub chunks: Vec<String>,
    /// Minification, production only
    pub minify: Option<MinifyPolicy>,
    /// Document title
    pub title: String,
}

/// Plan the HTML output of every page.
///
/// `shared_chunks` lists the shared chunks the optimization policy defines,
/// already in injection order; each page gets those followed by its own
/// chunk.
///
/// # Examples
///
/// ```
/// use jm_cli::config::entry::{PageEntry, TemplateRef};
/// use jm_cli::config::template::plan;
///
/// let pages = vec![PageEntry {
///     name: "index".to_string(),
///     script_path: "./index.tsx".to_string(),
///     template: TemplateRef::Builtin,
/// }];
/// let shared = vec!["runtime".to_string(), "vendor".to_string()];
///
/// let plans = plan(&pages, true, &shared);
/// assert_eq!(plans[0].filename, "index.html");
/// assert_eq!(plans[0].chunks, ["runtime", "vendor", "index"]);
/// assert!(plans[0].minify.is_some());
/// ```
pub fn plan(pages: &[PageEntry], is_production: bool, shared_chunks: &[String]) -> Vec<HtmlPlan> {
    pages
        .iter()
        .map(|page| HtmlPlan {
            page: page.name.clone(),
            filename: format!("{}.html", page.name),
            template: page.template.clone(),
            chunks: shared_chunks
                .iter()
                .cloned()
                .chain(std::iter::once(page.name.clone()))
                .collect(),
            minify: is_production.then(MinifyPolicy::production),
            title: page.name.clone(),
        })
        .collect()
}

/// Template every page without its own falls back to
pub fn default_template(app_html: &Path, exists: bool) -> TemplateRef {
    if exists {
        TemplateRef::File(app_html.to_path_buf())
    } else {
        TemplateRef::Builtin
    }
}

/// Path the bundler reads a template from
pub fn template_path(template: &TemplateRef, cache_dir: &Path) -> PathBuf {
    match template {
        TemplateRef::File(path) => path.clone(),
        TemplateRef::Builtin => cache_dir.join(BUILTIN_TEMPLATE_FILE),
    }
}
