//! Compile-time catalog of design modules.
//!
//! Each entry is a `(name, toml_content)` pair embedded via `include_str!`.
//! Adding a module requires creating a TOML file in `modules/` and adding a
//! corresponding entry here.

use bedah_gang_design_models::DesignModule;

use crate::DesignError;

/// Number of catalogued modules. Enforced by a test.
#[cfg(test)]
const EXPECTED_MODULE_COUNT: usize = 5;

/// Embedded TOML module definitions.
const MODULE_TOMLS: &[(&str, &str)] = &[
    (
        "permeable_paving",
        include_str!("../modules/permeable_paving.toml"),
    ),
    (
        "infiltration_tank",
        include_str!("../modules/infiltration_tank.toml"),
    ),
    ("flood_signage", include_str!("../modules/flood_signage.toml")),
    (
        "rainwater_harvesting",
        include_str!("../modules/rainwater_harvesting.toml"),
    ),
    (
        "vertical_garden",
        include_str!("../modules/vertical_garden.toml"),
    ),
];

/// Returns every catalogued module, ordered by id.
///
/// # Panics
///
/// Panics if any embedded TOML file fails to parse. Since these are
/// compile-time constants, parse failures indicate a development error
/// and are caught during CI.
#[must_use]
pub fn all_modules() -> Vec<DesignModule> {
    let mut modules: Vec<DesignModule> = MODULE_TOMLS
        .iter()
        .map(|(name, toml_str)| {
            toml::de::from_str(toml_str)
                .unwrap_or_else(|e| panic!("Failed to parse design module '{name}': {e}"))
        })
        .collect();
    modules.sort_by_key(|m| m.id);
    modules
}

/// Looks up a module by id.
///
/// # Errors
///
/// Returns [`DesignError::UnknownModule`] if no module has this id.
pub fn module(id: u32) -> Result<DesignModule, DesignError> {
    all_modules()
        .into_iter()
        .find(|m| m.id == id)
        .ok_or(DesignError::UnknownModule { id })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RuleTable;
    use std::collections::BTreeSet;

    #[test]
    fn loads_all_modules() {
        let modules = all_modules();
        assert_eq!(
            modules.len(),
            EXPECTED_MODULE_COUNT,
            "Expected {EXPECTED_MODULE_COUNT} design modules, found {}. \
             Update EXPECTED_MODULE_COUNT after adding/removing modules.",
            modules.len()
        );
    }

    #[test]
    fn module_ids_are_unique_and_sorted() {
        let modules = all_modules();
        let mut seen = BTreeSet::new();
        for module in &modules {
            assert!(seen.insert(module.id), "Duplicate design module id: {}", module.id);
        }
        assert!(modules.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[test]
    fn all_modules_have_required_fields() {
        for module in &all_modules() {
            assert!(!module.name.is_empty(), "Module {} has empty name", module.id);
            assert!(
                !module.category.is_empty(),
                "Module {} has empty category",
                module.id
            );
            assert!(
                !module.description.is_empty(),
                "Module {} has empty description",
                module.id
            );
        }
    }

    #[test]
    fn embedded_rules_only_reference_catalogued_modules() {
        let table = RuleTable::embedded().unwrap();
        for rule in table.rules().iter() {
            assert!(
                module(rule.design_module).is_ok(),
                "Rule references unknown module {}",
                rule.design_module
            );
        }
    }

    #[test]
    fn looks_up_module_by_id() {
        assert_eq!(module(3).unwrap().name, "Rambu dan Jalur Evakuasi Banjir");
        assert!(matches!(module(99), Err(DesignError::UnknownModule { id: 99 })));
    }
}
