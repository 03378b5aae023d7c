//! Development fragment

use super::fragment::{self, ConfigFragment, FragmentInputs};
use super::plugins::{self, PluginDescriptor};
use super::types::{Optimization, Plugin, Target};

/// Scripts prepended to every entry when hot reload is on
pub const HOT_CLIENT_PRELUDE: [&str; 2] = ["webpack-dev-server/client?/", "webpack/hot/dev-server"];

/// Whether the development build references a previously generated DLL
pub fn dll_enabled(inputs: &FragmentInputs<'_>) -> bool {
    !inputs.options.ie8 && !inputs.env.flag("DISABLE_DLL") && inputs.dll_present
}

/// Hot reload, case-sensitive path checks and, when available, DLL references.
///
/// IE8 cannot run the hot-reload client, so that mode extracts stylesheets
/// instead of injecting them.
pub fn fragment<'a>(inputs: &FragmentInputs<'a>) -> ConfigFragment<'a> {
    let ie8 = inputs.options.ie8;
    let use_dll = dll_enabled(inputs);
    if use_dll {
        log::info!("DLL references enabled");
    }
    if ie8 {
        log::info!("Hot reload disabled in ie8 mode");
    }

    let naming = inputs.naming;
    let mut descriptors = vec![
        PluginDescriptor::new(plugins::HOT_MODULE_REPLACEMENT, !ie8, || {
            Plugin::bare(plugins::HOT_MODULE_REPLACEMENT)
        }),
        PluginDescriptor::new(plugins::CSS_EXTRACT, ie8, move || {
            fragment::css_extract_plugin(naming)
        }),
        PluginDescriptor::always(plugins::CASE_SENSITIVE_PATHS, || {
            Plugin::bare(plugins::CASE_SENSITIVE_PATHS)
        }),
    ];
    descriptors.extend(fragment::dll_reference_plugins(inputs, use_dll));

    ConfigFragment {
        target: Target::Web,
        devtool: fragment::devtool(inputs.mode, inputs.env),
        bail: false,
        entry_prelude: if ie8 {
            Vec::new()
        } else {
            HOT_CLIENT_PRELUDE.iter().map(|s| s.to_string()).collect()
        },
        rules: Vec::new(),
        plugins: descriptors,
        optimization: Optimization {
            named_modules: true,
            named_chunks: true,
            no_emit_on_errors: true,
            ..Optimization::default()
        },
        extract_css: ie8,
        performance: None,
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

    struct Fixture {
        env: EnvironmentSnapshot,
        manifest: Manifest,
        paths: Paths,
        options: JmOptions,
        naming: Naming,
    }

    impl Fixture {
        fn new(vars: &[(&str, &str)]) -> Self {
            let vars: BTreeMap<String, String> = vars
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            let manifest = Manifest::default();
            Self {
                env: EnvironmentSnapshot::from_variables(BuildMode::Development, &vars, &manifest),
                manifest,
                paths: Paths::from_root(Path::new("/app")),
                options: JmOptions::default(),
                naming: Naming::new(None, BuildMode::Development),
            }
        }

        fn inputs(&self, dll_present: bool) -> FragmentInputs<'_> {
            FragmentInputs {
                env: &self.env,
                manifest: &self.manifest,
                paths: &self.paths,
                options: &self.options,
                naming: &self.naming,
                mode: BuildMode::Development,
                dll_present,
            }
        }
    }

    #[test]
    fn test_hot_reload_and_case_sensitivity_by_default() {
        let fixture = Fixture::new(&[]);
        let fragment = fragment(&fixture.inputs(false));

        assert_eq!(
            fragment.enabled_plugins(),
            [plugins::HOT_MODULE_REPLACEMENT, plugins::CASE_SENSITIVE_PATHS]
        );
        assert_eq!(fragment.entry_prelude, HOT_CLIENT_PRELUDE);
        assert!(!fragment.extract_css);
        assert!(fragment.optimization.no_emit_on_errors);
        assert!(fragment.optimization.split_chunks.is_none());
    }

    #[test]
    fn test_dll_reference_requires_generated_dll() {
        let fixture = Fixture::new(&[]);
        let with_dll = fragment(&fixture.inputs(true));
        assert!(with_dll.enabled_plugins().contains(&plugins::DLL_REFERENCE));
        assert!(with_dll.enabled_plugins().contains(&plugins::HTML_DLL_REFERENCES));

        let without = fragment(&fixture.inputs(false));
        assert!(!without.enabled_plugins().contains(&plugins::DLL_REFERENCE));
    }

    #[test]
    fn test_disable_dll_variable_wins() {
        let fixture = Fixture::new(&[("DISABLE_DLL", "true")]);
        assert!(!dll_enabled(&fixture.inputs(true)));
    }

    #[test]
    fn test_ie8_extracts_css_without_hot_reload() {
        let mut fixture = Fixture::new(&[]);
        fixture.options.ie8 = true;
        let fragment = fragment(&fixture.inputs(true));

        assert_eq!(
            fragment.enabled_plugins(),
            [plugins::CSS_EXTRACT, plugins::CASE_SENSITIVE_PATHS]
        );
        assert!(fragment.entry_prelude.is_empty());
        assert!(fragment.extract_css);
    }
}
