//! Muscle-group vocabulary.
//!
//! The editing core stores muscle groups as plain strings; callers check them
//! against this vocabulary before issuing commands.

use crate::config::TaxonomyConfig;
use once_cell::sync::Lazy;

const BUILT_IN: &[&str] = &[
    "Peito",
    "Costas",
    "Ombros",
    "Bíceps",
    "Tríceps",
    "Antebraço",
    "Abdômen",
    "Quadríceps",
    "Posterior de coxa",
    "Glúteos",
    "Panturrilha",
    "Trapézio",
    "Lombar",
    "Cardio",
];

static DEFAULT_TAXONOMY: Lazy<Taxonomy> =
    Lazy::new(|| Taxonomy::new(BUILT_IN.iter().map(|s| s.to_string())));

/// Cached built-in vocabulary
pub fn default_taxonomy() -> &'static Taxonomy {
    &DEFAULT_TAXONOMY
}

/// Set of accepted muscle-group names
#[derive(Clone, Debug)]
pub struct Taxonomy {
    groups: Vec<String>,
}

impl Taxonomy {
    pub fn new(groups: impl IntoIterator<Item = String>) -> Self {
        let mut taxonomy = Self { groups: Vec::new() };
        for group in groups {
            taxonomy.push(group);
        }
        taxonomy
    }

    /// Built-in vocabulary plus configured extras
    pub fn from_config(config: &TaxonomyConfig) -> Self {
        let mut taxonomy = default_taxonomy().clone();
        for extra in &config.extra_muscle_groups {
            taxonomy.push(extra.clone());
        }
        taxonomy
    }

    fn push(&mut self, group: String) {
        let group = group.trim().to_string();
        if !group.is_empty() && self.canonical(&group).is_none() {
            self.groups.push(group);
        }
    }

    /// Canonical spelling of `name`, matched case-insensitively
    pub fn canonical(&self, name: &str) -> Option<&str> {
        let wanted = name.trim().to_lowercase();
        self.groups
            .iter()
            .find(|g| g.to_lowercase() == wanted)
            .map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.canonical(name).is_some()
    }

    pub fn names(&self) -> &[String] {
        &self.groups
    }
}
