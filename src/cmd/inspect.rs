//! `--inspect` output
//!
//! Prints one JSON document on stdout so the dump can be piped into other
//! tools. The banner goes to stderr.

use anyhow::Result;
use console::style;
use serde_json::{json, Value};

use crate::config::{BundlerConfiguration, DevServerConfig};
use crate::context::InvocationContext;
use crate::fmt::MICROSCOPE;

/// Environment, dev-server settings and configurations as one JSON value
pub fn inspection(
    ctx: &InvocationContext,
    dev_server: Option<&DevServerConfig>,
    configs: &[BundlerConfiguration],
) -> Value {
    json!({
        "mode": ctx.mode,
        "environment": ctx.env.raw,
        "devServer": dev_server,
        "configurations": configs,
    })
}

/// Print [`inspection`] as pretty JSON
pub fn print_inspection(
    ctx: &InvocationContext,
    dev_server: Option<&DevServerConfig>,
    configs: &[BundlerConfiguration],
) -> Result<()> {
    eprintln!(
        "{} {} {} configuration(s) for {}",
        MICROSCOPE,
        style("Inspect").bold(),
        configs.len(),
        style(&ctx.manifest.name).cyan()
    );
    println!(
        "{}",
        serde_json::to_string_pretty(&inspection(ctx, dev_server, configs))?
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::Capabilities;
    use crate::config::BuildMode;
    use crate::env::EnvironmentSnapshot;
    use crate::manifest::Manifest;
    use crate::options::JmOptions;
    use crate::paths::Paths;
    use std::collections::BTreeMap;
    use std::path::Path;

    #[test]
    fn test_inspection_contains_environment_and_mode() {
        let vars = BTreeMap::from([("JM_API".to_string(), "/api".to_string())]);
        let env = EnvironmentSnapshot::from_variables(BuildMode::Production, &vars, &Manifest::default());
        let ctx = InvocationContext::from_parts(
            Paths::from_root(Path::new("/app")),
            Manifest::default(),
            JmOptions::default(),
            env,
            Capabilities::default(),
        );

        let value = inspection(&ctx, None, &[]);

        assert_eq!(value["mode"], "production");
        assert_eq!(value["environment"]["JM_API"], "/api");
        assert!(value["devServer"].is_null());
        assert_eq!(value["configurations"], json!([]));
    }
}
