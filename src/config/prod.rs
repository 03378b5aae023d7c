//! Production fragment

use serde_json::json;

use super::fragment::{self, ConfigFragment, FragmentInputs};
use super::plugins::{self, PluginDescriptor};
use super::types::{Optimization, Performance, Target};

/// Assets exempt from size hints
pub const PERFORMANCE_EXCLUDE: &str = r"(\.map$)|(^(vendor\.|favicon\.))";

/// Name of the dedicated webpack runtime chunk
pub const RUNTIME_CHUNK: &str = "runtime";

/// Whether the production build references a previously generated DLL
pub fn dll_enabled(inputs: &FragmentInputs<'_>) -> bool {
    inputs.options.enable_dll_in_production && !inputs.env.flag("DISABLE_DLL") && inputs.dll_present
}

/// Extracted stylesheets, content-hashed names and the minimizer pipeline
pub fn fragment<'a>(inputs: &FragmentInputs<'a>) -> ConfigFragment<'a> {
    let electron = inputs.options.electron;
    let source_map = inputs.env.source_map_enabled();
    let use_dll = dll_enabled(inputs);
    if use_dll {
        log::info!("DLL references enabled in production");
    }

    let naming = inputs.naming;
    let mut descriptors = vec![PluginDescriptor::always(plugins::CSS_EXTRACT, move || {
        fragment::css_extract_plugin(naming)
    })];
    descriptors.extend(fragment::dll_reference_plugins(inputs, use_dll));

    ConfigFragment {
        target: Target::Web,
        devtool: fragment::devtool(inputs.mode, inputs.env),
        bail: true,
        entry_prelude: Vec::new(),
        rules: Vec::new(),
        plugins: descriptors,
        optimization: Optimization {
            split_chunks: Some(fragment::split_chunks(electron)),
            runtime_chunk: (!electron).then(|| RUNTIME_CHUNK.to_string()),
            minimize: true,
            minimizer: vec![
                fragment::terser_plugin(source_map),
                fragment::optimize_css_plugin(source_map),
            ],
            ..Optimization::default()
        },
        extract_css: true,
        performance: Some(Performance {
            hints: json!("warning"),
            exclude_assets: Some(PERFORMANCE_EXCLUDE.to_string()),
        }),
        externals: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::naming::Naming;
    use crate::config::types::BuildMode;
    use crate::env::EnvironmentSnapshot;
    use crate::manifest::Manifest;
    use crate::options::JmOptions;
    use crate::paths::Paths;
    use std::collections::BTreeMap;
    use std::path::Path;

    fn build(
        options: JmOptions,
        vars: &[(&str, &str)],
        dll_present: bool,
    ) -> (Vec<&'static str>, Optimization, Option<String>) {
        let vars: BTreeMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let manifest = Manifest::default();
        let env = EnvironmentSnapshot::from_variables(BuildMode::Production, &vars, &manifest);
        let paths = Paths::from_root(Path::new("/app"));
        let naming = Naming::new(None, BuildMode::Production);
        let inputs = FragmentInputs {
            env: &env,
            manifest: &manifest,
            paths: &paths,
            options: &options,
            naming: &naming,
            mode: BuildMode::Production,
            dll_present,
        };

        let fragment = fragment(&inputs);
        (fragment.enabled_plugins(), fragment.optimization, fragment.devtool)
    }

    #[test]
    fn test_production_extracts_css_and_minimizes() {
        let (active, optimization, devtool) = build(JmOptions::default(), &[], true);

        assert_eq!(active, [plugins::CSS_EXTRACT]);
        assert!(optimization.minimize);
        let minimizers: Vec<&str> = optimization.minimizer.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(minimizers, [plugins::TERSER, plugins::OPTIMIZE_CSS]);
        assert_eq!(optimization.runtime_chunk.as_deref(), Some(RUNTIME_CHUNK));
        assert_eq!(optimization.shared_chunks(), ["runtime", "vendor", "commons"]);
        assert_eq!(devtool.as_deref(), Some("source-map"));
    }

    #[test]
    fn test_source_map_flag_reaches_minimizers() {
        let (_, optimization, devtool) = build(JmOptions::default(), &[("SOURCE_MAP", "false")], false);
        assert_eq!(optimization.minimizer[0].options["sourceMap"], false);
        assert!(devtool.is_none());
    }

    #[test]
    fn test_dll_in_production_is_opt_in() {
        let (active, _, _) = build(JmOptions::default(), &[], true);
        assert!(!active.contains(&plugins::DLL_REFERENCE));

        let options = JmOptions {
            enable_dll_in_production: true,
            ..JmOptions::default()
        };
        let (active, _, _) = build(options.clone(), &[], true);
        assert!(active.contains(&plugins::DLL_REFERENCE));

        let (active, _, _) = build(options, &[("DISABLE_DLL", "true")], true);
        assert!(!active.contains(&plugins::DLL_REFERENCE));
    }

    #[test]
    fn test_electron_renderer_has_no_runtime_or_commons() {
        let options = JmOptions {
            electron: true,
            ..JmOptions::default()
        };
        let (_, optimization, _) = build(options, &[], false);
        assert!(optimization.runtime_chunk.is_none());
        assert_eq!(optimization.shared_chunks(), ["vendor"]);
    }
}
