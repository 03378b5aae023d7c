//! Page discovery
//!
//! A page is a script entry plus an HTML template. Three conventions are
//! recognised, applied in order of precedence:
//!
//! 1. `{name}{pageExt}` next to `{name}.{tsx,ts,jsx,js}`
//! 2. `{name}.page.{tsx,ts,jsx,js}`, whose script replaces the one from (1)
//!    and whose template is `{name}{pageExt}` when present
//! 3. In electron mode, the keys of `page.json`, for names not found above
//!
//! When nothing matches and no names were requested, a lone
//! `index.{tsx,ts,jsx,js}` becomes the `index` page.

use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::error::JmError;
use crate::infra::{FileSystem, RealFileSystem};

/// Script extensions, in lookup order
pub const SCRIPT_EXTENSIONS: [&str; 4] = [".tsx", ".ts", ".jsx", ".js"];

/// Electron page manifest inside the source directory
pub const ELECTRON_PAGE_MANIFEST: &str = "page.json";

/// Script used as the only page when nothing else is found
const LONE_INDEX: &str = "index";

static PAGELESS_RE: OnceLock<Regex> = OnceLock::new();

fn pageless_re() -> &'static Regex {
    PAGELESS_RE.get_or_init(|| {
        Regex::new(r"^(.+)\.page\.(tsx|ts|jsx|js)$").expect("pageless regex is valid")
    })
}

/// HTML template of a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TemplateRef {
    /// Template file on disk
    File(PathBuf),
    /// Template shipped with the tool
    Builtin,
}

/// One discovered page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageEntry {
    /// Logical name and output basename
    pub name: String,
    /// Entry script relative to the source directory, e.g. `./index.tsx`
    pub script_path: String,
    /// Template the page is rendered from
    pub template: TemplateRef,
}

/// Page discovery over one source directory
#[derive(Debug, Clone)]
pub struct Discovery<'a> {
    source_dir: &'a Path,
    page_ext: &'a str,
    explicit: Option<&'a [String]>,
    electron: bool,
    default_template: TemplateRef,
}

impl<'a> Discovery<'a> {
    /// Discover `*{page_ext}` pages in `source_dir`
    pub fn new(source_dir: &'a Path, page_ext: &'a str) -> Self {
        Self {
            source_dir,
            page_ext,
            explicit: None,
            electron: false,
            default_template: TemplateRef::Builtin,
        }
    }

    /// Restrict discovery to the requested page names
    pub fn with_entries(mut self, names: Option<&'a [String]>) -> Self {
        self.explicit = names;
        self
    }

    /// Also read pages from `page.json`
    pub fn electron(mut self, electron: bool) -> Self {
        self.electron = electron;
        self
    }

    /// Template for pages without one of their own
    pub fn default_template(mut self, template: TemplateRef) -> Self {
        self.default_template = template;
        self
    }

    fn wanted(&self, name: &str) -> bool {
        self.explicit
            .is_none_or(|names| names.iter().any(|n| n == name))
    }

    fn find_script<FS: FileSystem>(&self, fs: &FS, stem: &str) -> Option<String> {
        SCRIPT_EXTENSIONS
            .iter()
            .map(|ext| format!("{}{}", stem, ext))
            .find(|file| fs.is_file(&self.source_dir.join(file)))
    }

    fn script_missing(&self, page: &str) -> JmError {
        JmError::TemplateOrScriptMissing {
            page: page.to_string(),
            tried: SCRIPT_EXTENSIONS
                .iter()
                .map(|ext| format!("{}{}", page, ext))
                .chain(
                    SCRIPT_EXTENSIONS
                        .iter()
                        .map(|ext| format!("{}.page{}", page, ext)),
                )
                .collect(),
            context: self.source_dir.to_path_buf(),
        }
    }

    fn electron_pages<FS: FileSystem>(&self, fs: &FS) -> Result<Vec<String>, JmError> {
        if !self.electron {
            return Ok(Vec::new());
        }
        let manifest = self.source_dir.join(ELECTRON_PAGE_MANIFEST);
        if !fs.is_file(&manifest) {
            return Ok(Vec::new());
        }

        let contents = fs.read_to_string(&manifest).map_err(|source| JmError::Io {
            context: format!("reading {}", manifest.display()),
            source,
        })?;
        let pages: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&contents)
            .map_err(|e| JmError::Io {
                context: format!("parsing {}", manifest.display()),
                source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            })?;

        Ok(pages.keys().cloned().collect())
    }

    /// Run discovery
    pub fn run<FS: FileSystem>(&self, fs: &FS) -> Result<Vec<PageEntry>, JmError> {
        let files: Vec<String> = match fs.read_dir(self.source_dir) {
            Ok(children) => children
                .into_iter()
                .filter(|child| fs.is_file(child))
                .filter_map(|child| child.file_name().map(|n| n.to_string_lossy().into_owned()))
                .collect(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(source) => {
                return Err(JmError::Io {
                    context: format!("scanning {}", self.source_dir.display()),
                    source,
                })
            }
        };

        let templates: BTreeSet<String> = files
            .iter()
            .filter_map(|file| file.strip_suffix(self.page_ext))
            .filter(|stem| !stem.is_empty())
            .map(str::to_string)
            .collect();

        let pageless: BTreeSet<String> = files
            .iter()
            .filter_map(|file| pageless_re().captures(file))
            .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
            .collect();

        let electron = self.electron_pages(fs)?;

        let lone_index = if templates.is_empty() && pageless.is_empty() && electron.is_empty() {
            self.find_script(fs, LONE_INDEX)
        } else {
            None
        };

        if let Some(requested) = self.explicit {
            let mut missing: Vec<String> = Vec::new();
            for name in requested {
                let known = templates.contains(name)
                    || pageless.contains(name)
                    || electron.contains(name)
                    || (name == LONE_INDEX && lone_index.is_some());
                if !known && !missing.contains(name) {
                    missing.push(name.clone());
                }
            }
            if !missing.is_empty() {
                return Err(JmError::EntryNotFound {
                    missing,
                    context: self.source_dir.to_path_buf(),
                });
            }
        }

        let mut pages: Vec<PageEntry> = Vec::new();

        for name in templates.iter().filter(|n| self.wanted(n) && !pageless.contains(*n)) {
            let script = self
                .find_script(fs, name)
                .ok_or_else(|| self.script_missing(name))?;
            pages.push(PageEntry {
                name: name.clone(),
                script_path: format!("./{}", script),
                template: TemplateRef::File(self.source_dir.join(format!("{}{}", name, self.page_ext))),
            });
        }

        for name in pageless.iter().filter(|n| self.wanted(n)) {
            let script = self
                .find_script(fs, &format!("{}.page", name))
                .ok_or_else(|| self.script_missing(name))?;
            let template = if templates.contains(name) {
                TemplateRef::File(self.source_dir.join(format!("{}{}", name, self.page_ext)))
            } else {
                self.default_template.clone()
            };
            pages.push(PageEntry {
                name: name.clone(),
                script_path: format!("./{}", script),
                template,
            });
        }

        for name in electron.iter().filter(|n| self.wanted(n)) {
            if pages.iter().any(|p| &p.name == name) {
                continue;
            }
            let script = self
                .find_script(fs, name)
                .or_else(|| self.find_script(fs, &format!("{}.page", name)))
                .ok_or_else(|| self.script_missing(name))?;
            pages.push(PageEntry {
                name: name.clone(),
                script_path: format!("./{}", script),
                template: self.default_template.clone(),
            });
        }

        let index_wanted = self
            .explicit
            .is_none_or(|names| names.is_empty() || names.iter().any(|n| n == LONE_INDEX));
        if let Some(script) = lone_index.filter(|_| pages.is_empty() && index_wanted) {
            log::warn!("no pages found, using '{}' as the default entry", script);
            pages.push(PageEntry {
                name: LONE_INDEX.to_string(),
                script_path: format!("./{}", script),
                template: self.default_template.clone(),
            });
        }

        if pages.is_empty() {
            return Err(JmError::NoEntries {
                page_ext: self.page_ext.to_string(),
                context: self.source_dir.to_path_buf(),
            });
        }

        pages.sort_by(|a, b| a.name.cmp(&b.name));
        log::debug!(
            "discovered {} page(s): {}",
            pages.len(),
            crate::fmt::page_list(pages.iter().map(|p| p.name.as_str()))
        );
        Ok(pages)
    }
}

/// Discover pages with the conventional layout on the real filesystem
///
/// # Examples
///
/// ```no_run
/// use jm_cli::config::entry::discover;
/// use std::path::Path;
///
/// let pages = discover(Path::new("src"), ".html", None)?;
/// for page in &pages {
///     println!("{} -> {}", page.name, page.script_path);
/// }
/// # Ok::<(), jm_cli::error::JmError>(())
/// ```
pub fn discover(
    source_dir: &Path,
    page_ext: &str,
    explicit_names: Option<&[String]>,
) -> Result<Vec<PageEntry>, JmError> {
    Discovery::new(source_dir, page_ext)
        .with_entries(explicit_names)
        .run(&RealFileSystem)
}
