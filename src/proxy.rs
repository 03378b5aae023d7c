//! Dev-server proxy declarations and their interpolation

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::interpolate::interpolate;

/// One or several request path prefixes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProxyContext {
    /// Single prefix
    One(String),
    /// Several prefixes sharing a target
    Many(Vec<String>),
}

/// `{context, target, ...}` entry; extra keys are passed through to the dev server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyOrigin {
    /// Request prefix(es)
    pub context: ProxyContext,
    /// Upstream URL
    pub target: String,
    /// Dev-server specific settings such as `changeOrigin`
    #[serde(flatten)]
    pub rest: BTreeMap<String, serde_json::Value>,
}

/// `{target, ...}` value of a context map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyTargetOptions {
    /// Upstream URL
    pub target: String,
    /// Dev-server specific settings
    #[serde(flatten)]
    pub rest: BTreeMap<String, serde_json::Value>,
}

/// Value of a context map entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProxyTarget {
    /// Plain upstream URL
    Url(String),
    /// Upstream URL with extra settings
    Options(ProxyTargetOptions),
}

/// Array member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProxyEntry {
    /// Shorthand URL
    Shorthand(String),
    /// Explicit entry
    Origin(ProxyOrigin),
}

/// Every accepted shape of `jm.proxy`
///
/// # Examples
///
/// ```
/// use jm_cli::proxy::ProxyConfig;
///
/// let proxy: ProxyConfig = serde_json::from_str(r#"{"/api": "http://localhost:3000"}"#).unwrap();
/// assert!(matches!(proxy, ProxyConfig::Map(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProxyConfig {
    /// `"http://host:port/api"`
    Shorthand(String),
    /// `[ "...", {context, target} ]`
    List(Vec<ProxyEntry>),
    /// `{context, target}`
    Origin(ProxyOrigin),
    /// `{ "/api": "http://..." }` or `{ "/api": {target} }`
    Map(BTreeMap<String, ProxyTarget>),
}

fn interpolate_context(context: &ProxyContext, vars: &BTreeMap<String, String>) -> ProxyContext {
    match context {
        ProxyContext::One(c) => ProxyContext::One(interpolate(c, vars)),
        ProxyContext::Many(cs) => {
            ProxyContext::Many(cs.iter().map(|c| interpolate(c, vars)).collect())
        }
    }
}

fn interpolate_origin(origin: &ProxyOrigin, vars: &BTreeMap<String, String>) -> ProxyOrigin {
    ProxyOrigin {
        context: interpolate_context(&origin.context, vars),
        target: interpolate(&origin.target, vars),
        rest: origin.rest.clone(),
    }
}

/// Substitute `${NAME}` references in contexts and targets.
///
/// Other settings are copied unchanged.
pub fn interpolate_proxy(proxy: &ProxyConfig, vars: &BTreeMap<String, String>) -> ProxyConfig {
    match proxy {
        ProxyConfig::Shorthand(url) => ProxyConfig::Shorthand(interpolate(url, vars)),
        ProxyConfig::List(entries) => ProxyConfig::List(
            entries
                .iter()
                .map(|entry| match entry {
                    ProxyEntry::Shorthand(url) => ProxyEntry::Shorthand(interpolate(url, vars)),
                    ProxyEntry::Origin(origin) => ProxyEntry::Origin(interpolate_origin(origin, vars)),
                })
                .collect(),
        ),
        ProxyConfig::Origin(origin) => ProxyConfig::Origin(interpolate_origin(origin, vars)),
        ProxyConfig::Map(map) => ProxyConfig::Map(
            map.iter()
                .map(|(context, target)| {
                    let target = match target {
                        ProxyTarget::Url(url) => ProxyTarget::Url(interpolate(url, vars)),
                        ProxyTarget::Options(options) => ProxyTarget::Options(ProxyTargetOptions {
                            target: interpolate(&options.target, vars),
                            rest: options.rest.clone(),
                        }),
                    };
                    (interpolate(context, vars), target)
                })
                .collect(),
        ),
    }
}

fn describe_origin(origin: &ProxyOrigin) -> String {
    let context = match &origin.context {
        ProxyContext::One(c) => c.clone(),
        ProxyContext::Many(cs) => cs.join(", "),
    };
    format!("{} ~> {}", context, origin.target)
}

/// Render one `context ~> target` line per proxied prefix
///
/// # Examples
///
/// ```
/// use jm_cli::proxy::{describe_proxy, ProxyConfig};
///
/// let proxy: ProxyConfig =
///     serde_json::from_str(r#"{"context": ["/api", "/auth"], "target": "http://backend"}"#).unwrap();
/// assert_eq!(describe_proxy(&proxy), "/api, /auth ~> http://backend");
/// ```
pub fn describe_proxy(proxy: &ProxyConfig) -> String {
    match proxy {
        ProxyConfig::Shorthand(url) => url.clone(),
        ProxyConfig::List(entries) => entries
            .iter()
            .map(|entry| match entry {
                ProxyEntry::Shorthand(url) => url.clone(),
                ProxyEntry::Origin(origin) => describe_origin(origin),
            })
            .collect::<Vec<_>>()
            .join("\n"),
        ProxyConfig::Origin(origin) => describe_origin(origin),
        ProxyConfig::Map(map) => map
            .iter()
            .map(|(context, target)| {
                let target = match target {
                    ProxyTarget::Url(url) => url.as_str(),
                    ProxyTarget::Options(options) => options.target.as_str(),
                };
                format!("{} ~> {}", context, target)
            })
            .collect::<Vec<_>>()
            .join("\n"),
    }
}
