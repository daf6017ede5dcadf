use crate::config::{to_camel_case, AppConfig, ModuleConfig};
use crate::logging;

/// Prefix value meaning "this provider has no prefix".
pub const NO_PREFIX: char = ' ';

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderDescriptor {
    pub module_id: String,
    pub enabled: bool,
    pub is_global: bool,
    pub priority: f64,
    pub prefix: char,
}

impl ProviderDescriptor {
    pub fn new(module_id: &str) -> Self {
        Self::from_config(module_id, &ModuleConfig::default())
    }

    pub fn from_config(module_id: &str, cfg: &ModuleConfig) -> Self {
        Self {
            module_id: module_id.to_string(),
            enabled: cfg.enabled,
            is_global: cfg.global,
            priority: cfg.priority,
            prefix: cfg.prefix_char(),
        }
    }

    pub fn with_prefix(mut self, prefix: char) -> Self {
        self.prefix = prefix;
        self
    }

    pub fn with_priority(mut self, priority: f64) -> Self {
        self.priority = priority;
        self
    }

    pub fn global(mut self, is_global: bool) -> Self {
        self.is_global = is_global;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn has_prefix(&self) -> bool {
        self.prefix != NO_PREFIX
    }

    pub fn config_key(&self) -> String {
        to_camel_case(&self.module_id)
    }
}

/// Provider descriptors in configured order. Disabled providers stay in the
/// list but are invisible to every lookup.
#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    descriptors: Vec<ProviderDescriptor>,
}

impl ModuleRegistry {
    pub fn new(descriptors: Vec<ProviderDescriptor>) -> Self {
        let registry = Self { descriptors };
        for (prefix, winner, loser) in registry.prefix_conflicts() {
            logging::warn(&format!(
                "prefix '{prefix}' claimed by '{winner}' and '{loser}'; '{winner}' wins"
            ));
        }
        registry
    }

    /// Builds descriptors for `modules` (name plus the provider's own default
    /// config) in the order given. Values from `cfg` win over defaults.
    pub fn from_config<'a>(
        cfg: &AppConfig,
        modules: impl IntoIterator<Item = (&'a str, Option<ModuleConfig>)>,
    ) -> Self {
        let mut descriptors = Vec::new();
        for (name, defaults) in modules {
            let module_cfg = cfg
                .module(name)
                .cloned()
                .or(defaults)
                .unwrap_or_default();
            descriptors.push(ProviderDescriptor::from_config(name, &module_cfg));
        }

        for key in cfg.modules.keys() {
            if !descriptors.iter().any(|d| &d.config_key() == key) {
                logging::warn(&format!("ignoring config for unknown module '{key}'"));
            }
        }

        Self::new(descriptors)
    }

    pub fn descriptors(&self) -> &[ProviderDescriptor] {
        &self.descriptors
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// The enabled descriptor for `module_id`, if any.
    pub fn descriptor(&self, module_id: &str) -> Option<&ProviderDescriptor> {
        self.enabled().find(|d| d.module_id == module_id)
    }

    pub fn priority_of(&self, module_id: &str) -> Option<f64> {
        self.descriptor(module_id).map(|d| d.priority)
    }

    pub fn find_prefix_match(&self, first_char: char) -> Option<&ProviderDescriptor> {
        if first_char == NO_PREFIX {
            return None;
        }
        self.enabled().find(|d| d.prefix == first_char)
    }

    pub fn global_providers(&self) -> Vec<&ProviderDescriptor> {
        self.enabled().filter(|d| d.is_global).collect()
    }

    /// `(prefix, first claimant, shadowed claimant)` for every enabled pair
    /// sharing a prefix.
    pub fn prefix_conflicts(&self) -> Vec<(char, String, String)> {
        let mut conflicts = Vec::new();
        let claimants: Vec<&ProviderDescriptor> =
            self.enabled().filter(|d| d.has_prefix()).collect();
        for (index, later) in claimants.iter().enumerate() {
            if let Some(earlier) = claimants[..index].iter().find(|d| d.prefix == later.prefix) {
                conflicts.push((
                    later.prefix,
                    earlier.module_id.clone(),
                    later.module_id.clone(),
                ));
            }
        }
        conflicts
    }

    fn enabled(&self) -> impl Iterator<Item = &ProviderDescriptor> {
        self.descriptors.iter().filter(|d| d.enabled)
    }
}
