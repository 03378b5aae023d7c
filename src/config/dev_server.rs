//! Dev-server settings derived from a composed configuration

use serde::Serialize;
use std::path::PathBuf;

use super::types::BundlerConfiguration;
use crate::env::EnvironmentSnapshot;
use crate::options::JmOptions;
use crate::paths::Paths;
use crate::proxy::{interpolate_proxy, ProxyConfig};

/// Port used when `PORT` is unset or invalid
pub const DEFAULT_PORT: u16 = 8080;

/// Interface the dev server listens on
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Settings handed to the external dev server
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DevServerConfig {
    /// Proxy rules with `${VAR}` references resolved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<ProxyConfig>,
    /// Path the bundle is served under
    pub public_path: String,
    /// Serve over HTTPS
    pub https: bool,
    /// Hot module replacement
    pub hot: bool,
    /// Static directories, in lookup order
    pub content_base: Vec<PathBuf>,
    /// Gzip responses
    pub compress: bool,
    /// Listening port
    pub port: u16,
    /// Listening host
    pub host: String,
}

fn port(env: &EnvironmentSnapshot) -> u16 {
    match env.get("PORT") {
        None => DEFAULT_PORT,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("Ignoring invalid PORT {:?}, using {}", raw, DEFAULT_PORT);
            DEFAULT_PORT
        }),
    }
}

/// Build the dev-server settings
///
/// # Examples
///
/// ```
/// use jm_cli::config::dev_server::{dev_server_config, DEFAULT_PORT};
/// use jm_cli::config::{BuildMode, BundlerConfiguration};
/// use jm_cli::env::EnvironmentSnapshot;
/// use jm_cli::manifest::Manifest;
/// use jm_cli::options::JmOptions;
/// use jm_cli::paths::Paths;
/// use std::collections::BTreeMap;
/// use std::path::Path;
///
/// let env = EnvironmentSnapshot::from_variables(
///     BuildMode::Development,
///     &BTreeMap::new(),
///     &Manifest::default(),
/// );
/// let paths = Paths::from_root(Path::new("/app"));
/// let server = dev_server_config(None, &env, &JmOptions::default(), &paths);
///
/// assert_eq!(server.port, DEFAULT_PORT);
/// assert_eq!(server.public_path, "/");
/// assert!(server.hot);
/// ```
pub fn dev_server_config(
    config: Option<&BundlerConfiguration>,
    env: &EnvironmentSnapshot,
    options: &JmOptions,
    paths: &Paths,
) -> DevServerConfig {
    let public_path = config
        .and_then(|c| c.output.public_path.clone())
        .unwrap_or_else(|| env.public_url().to_string());

    DevServerConfig {
        proxy: options
            .proxy
            .as_ref()
            .map(|proxy| interpolate_proxy(proxy, &env.raw)),
        public_path,
        https: env.flag("HTTPS"),
        hot: !options.ie8,
        content_base: vec![paths.app_public.clone(), paths.app_dist.clone()],
        compress: true,
        port: port(env),
        host: DEFAULT_HOST.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::BuildMode;
    use crate::manifest::Manifest;
    use std::collections::BTreeMap;
    use std::path::Path;

    fn env(vars: &[(&str, &str)]) -> EnvironmentSnapshot {
        let vars: BTreeMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EnvironmentSnapshot::from_variables(BuildMode::Development, &vars, &Manifest::default())
    }

    #[test]
    fn test_https_port_and_content_base() {
        let paths = Paths::from_root(Path::new("/app"));
        let server = dev_server_config(
            None,
            &env(&[("HTTPS", "true"), ("PORT", "3000")]),
            &JmOptions::default(),
            &paths,
        );

        assert!(server.https);
        assert_eq!(server.port, 3000);
        assert_eq!(
            server.content_base,
            [PathBuf::from("/app/public"), PathBuf::from("/app/dist")]
        );
        assert!(server.proxy.is_none());
    }

    #[test]
    fn test_invalid_port_falls_back() {
        let paths = Paths::from_root(Path::new("/app"));
        let server = dev_server_config(None, &env(&[("PORT", "http")]), &JmOptions::default(), &paths);
        assert_eq!(server.port, DEFAULT_PORT);
    }

    #[test]
    fn test_ie8_disables_hot_reload() {
        let paths = Paths::from_root(Path::new("/app"));
        let options = JmOptions {
            ie8: true,
            ..JmOptions::default()
        };
        assert!(!dev_server_config(None, &env(&[]), &options, &paths).hot);
    }

    #[test]
    fn test_proxy_is_interpolated_against_environment() {
        let paths = Paths::from_root(Path::new("/app"));
        let options = JmOptions {
            proxy: Some(ProxyConfig::Shorthand("http://${JM_HOST}:${PORT}/api".to_string())),
            ..JmOptions::default()
        };
        let server = dev_server_config(
            None,
            &env(&[("JM_HOST", "localhost"), ("PORT", "3000")]),
            &options,
            &paths,
        );

        assert_eq!(
            server.proxy,
            Some(ProxyConfig::Shorthand("http://localhost:3000/api".to_string()))
        );
    }
}
