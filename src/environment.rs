//! Job environment collection
//!
//! Render workers start from a clean environment, so the submitter forwards
//! the variables the job needs. Sources overlay in order, later ones win:
//! instance env, render-job env, host allow-list, configured allow-list.
//! Search/replace rules run last over every value.

use std::collections::{BTreeMap, HashMap};

use crate::config::NukeSettings;
use crate::instance::{Context, Instance};

/// Host environment forwarded whenever it is set in the submitting process.
pub const HOST_ENV_KEYS: &[&str] = &[
    "NUKE_PATH",
    "FOUNDRY_LICENSE",
    "PHAROS_LOCATION",
    "PHAROS_NUKELIB",
    "CCCID",
    "NUKE_FONT_PATH",
    "OCIO",
    "PROJECT_LUT",
    "SHOT_LUT",
];

/// Read access to the submitting process environment.
pub trait EnvSource {
    fn var(&self, key: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl EnvSource for BTreeMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Collect the environment a render job carries, ordered by key.
pub fn collect_environment(
    instance: &Instance,
    context: &Context,
    settings: &NukeSettings,
    env: &dyn EnvSource,
) -> BTreeMap<String, String> {
    let mut environment = instance.job_env.clone();
    environment.extend(context.render_job_env.clone());

    let allowed = HOST_ENV_KEYS
        .iter()
        .copied()
        .chain(settings.env_allowed_keys.iter().map(String::as_str));
    for key in allowed {
        if let Some(value) = env.var(key) {
            environment.insert(key.to_string(), value);
        }
    }

    for value in environment.values_mut() {
        for rule in &settings.env_search_replace_values {
            if !rule.name.is_empty() {
                *value = value.replace(&rule.name, &rule.value);
            }
        }
    }

    environment
}
