//! Tool configuration.
//!
//! Everything the resolver, the combat engine and the roster need to know
//! about attribute metadata lives here and is passed in explicitly. A TOML
//! file may override any section; missing sections keep their defaults.

use super::constants::*;
use crate::error::{ForgeError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeKind {
    Base,
    Custom,
}

/// Catalog entry describing one attribute for authoring and reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDefinition {
    pub name: String,
    pub display_name: String,
    pub default_value: f64,
    pub min_value: f64,
    pub max_value: f64,
    #[serde(default)]
    pub description: String,
    pub kind: AttributeKind,
}

impl AttributeDefinition {
    fn new(
        name: &str,
        display_name: &str,
        default_value: f64,
        (min_value, max_value): (f64, f64),
        description: &str,
        kind: AttributeKind,
    ) -> Self {
        Self {
            name: name.to_string(),
            display_name: display_name.to_string(),
            default_value,
            min_value,
            max_value,
            description: description.to_string(),
            kind,
        }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min_value, self.max_value)
    }
}

/// The stock attribute catalog: five base stats and six combat modifiers.
pub fn default_catalog() -> Vec<AttributeDefinition> {
    use AttributeKind::{Base, Custom};
    vec![
        AttributeDefinition::new("attack", "Attack", 10.0, (1.0, 9999.0), "Raw offensive power", Base),
        AttributeDefinition::new("defense", "Defense", 5.0, (0.0, 9999.0), "Softens incoming hits", Base),
        AttributeDefinition::new("health", "Health", 100.0, (1.0, 99999.0), "Dies at zero", Base),
        AttributeDefinition::new("crit", "Crit", 5.0, (0.0, 100.0), "Raises critical chance", Base),
        AttributeDefinition::new("crit_resist", "Crit Resist", 5.0, (0.0, 100.0), "Lowers chance of being crit", Base),
        AttributeDefinition::new("damage_boost", "Damage Boost", 0.0, (0.0, 100.0), "Percent bonus to final damage", Custom),
        AttributeDefinition::new("damage_reduction", "Damage Reduction", 0.0, (0.0, 100.0), "Percent cut to damage taken", Custom),
        AttributeDefinition::new("agility", "Agility", 10.0, (0.0, 9999.0), "Decides who strikes first", Custom),
        AttributeDefinition::new("accuracy", "Accuracy", 95.0, (0.0, 100.0), "Raises hit chance", Custom),
        AttributeDefinition::new("evasion", "Evasion", 5.0, (0.0, 100.0), "Lowers chance of being hit", Custom),
        AttributeDefinition::new("health_regen", "Health Regen", 2.0, (0.0, 100.0), "Health restored each round", Custom),
    ]
}

/// Scaling applied when projecting attributes from growth curves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthConfig {
    pub base_magnitude: f64,
    pub default_coefficient: f64,
    pub coefficients: BTreeMap<String, f64>,
    /// Upper bounds applied to projected values, by attribute.
    pub caps: BTreeMap<String, f64>,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            base_magnitude: BASE_MAGNITUDE,
            default_coefficient: DEFAULT_COEFFICIENT,
            coefficients: ATTRIBUTE_COEFFICIENTS
                .iter()
                .map(|(name, coef)| (name.to_string(), *coef))
                .collect(),
            caps: [("crit", PERCENT_STAT_CAP), ("crit_resist", PERCENT_STAT_CAP)]
                .iter()
                .map(|(name, cap)| (name.to_string(), *cap))
                .collect(),
        }
    }
}

impl GrowthConfig {
    pub fn coefficient(&self, attribute: &str) -> f64 {
        self.coefficients
            .get(attribute)
            .copied()
            .unwrap_or(self.default_coefficient)
    }

    pub fn cap(&self, attribute: &str) -> Option<f64> {
        self.caps.get(attribute).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    pub critical_multiplier: f64,
    pub max_rounds: u32,
    pub exchange_samples: u32,
    pub series_runs: u32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            critical_multiplier: DEFAULT_CRIT_MULTIPLIER,
            max_rounds: DEFAULT_MAX_ROUNDS,
            exchange_samples: DEFAULT_EXCHANGE_SAMPLES,
            series_runs: DEFAULT_SERIES_RUNS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForgeConfig {
    /// Roster directory. `None` uses the platform data directory.
    pub data_dir: Option<PathBuf>,
    pub growth: GrowthConfig,
    pub combat: CombatConfig,
    pub attributes: Vec<AttributeDefinition>,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            growth: GrowthConfig::default(),
            combat: CombatConfig::default(),
            attributes: default_catalog(),
        }
    }
}

impl ForgeConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut config: ForgeConfig = toml::from_str(content)?;
        // Partial tables extend the stock coefficients and caps
        let stock = GrowthConfig::default();
        for (name, coef) in stock.coefficients {
            config.growth.coefficients.entry(name).or_insert(coef);
        }
        for (name, cap) in stock.caps {
            config.growth.caps.entry(name).or_insert(cap);
        }
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !self.growth.base_magnitude.is_finite() {
            return Err(ForgeError::configuration(
                "growth.base_magnitude",
                "must be a finite number",
            ));
        }
        for (name, coef) in &self.growth.coefficients {
            if !coef.is_finite() {
                return Err(ForgeError::configuration(name, "coefficient must be finite"));
            }
        }
        let multiplier = self.combat.critical_multiplier;
        if !multiplier.is_finite() || multiplier < 0.0 {
            return Err(ForgeError::configuration(
                "combat.critical_multiplier",
                "must be a non-negative number",
            ));
        }
        for def in &self.attributes {
            if def.name.is_empty() {
                return Err(ForgeError::configuration("attributes", "name cannot be empty"));
            }
            if def.min_value > def.max_value {
                return Err(ForgeError::configuration(
                    &def.name,
                    format!("min {} exceeds max {}", def.min_value, def.max_value),
                ));
            }
        }
        Ok(())
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeDefinition> {
        self.attributes.iter().find(|def| def.name == name)
    }

    /// Display label for an attribute, falling back to its key.
    pub fn display_name<'a>(&'a self, name: &'a str) -> &'a str {
        self.attribute(name)
            .map(|def| def.display_name.as_str())
            .unwrap_or(name)
    }

    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(|def| def.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_has_combat_stats() {
        let config = ForgeConfig::default();
        for name in [
            "attack",
            "defense",
            "health",
            "crit",
            "crit_resist",
            "accuracy",
            "evasion",
            "damage_boost",
            "damage_reduction",
            "agility",
            "health_regen",
        ] {
            assert!(config.attribute(name).is_some(), "missing {name}");
        }
        assert_eq!(config.attribute("health").unwrap().default_value, 100.0);
    }

    #[test]
    fn test_coefficient_table() {
        let growth = GrowthConfig::default();
        assert_eq!(growth.coefficient("attack"), 1.2);
        assert_eq!(growth.coefficient("health"), 5.0);
        assert_eq!(growth.coefficient("crit_resist"), 0.2);
        assert_eq!(growth.coefficient("luck"), 1.0);
        assert_eq!(growth.cap("crit"), Some(100.0));
        assert_eq!(growth.cap("attack"), None);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ForgeConfig::from_toml_str(
            r#"
            [combat]
            max_rounds = 50

            [growth.coefficients]
            luck = 0.25
            "#,
        )
        .unwrap();

        assert_eq!(config.combat.max_rounds, 50);
        assert_eq!(config.combat.critical_multiplier, 2.0);
        assert_eq!(config.growth.coefficient("luck"), 0.25);
        assert_eq!(config.growth.coefficient("attack"), 1.2);
        assert_eq!(config.attributes.len(), default_catalog().len());
    }

    #[test]
    fn test_wrong_type_is_toml_error() {
        let err = ForgeConfig::from_toml_str("[combat]\nmax_rounds = \"many\"\n").unwrap_err();
        assert!(matches!(err, ForgeError::Toml(_)));
    }

    #[test]
    fn test_negative_crit_multiplier_rejected() {
        let err =
            ForgeConfig::from_toml_str("[combat]\ncritical_multiplier = -1.0\n").unwrap_err();
        assert!(matches!(err, ForgeError::Configuration { .. }));
    }

    #[test]
    fn test_display_name_falls_back_to_key() {
        let config = ForgeConfig::default();
        assert_eq!(config.display_name("crit_resist"), "Crit Resist");
        assert_eq!(config.display_name("luck"), "luck");
    }

    #[test]
    fn test_definition_clamp() {
        let config = ForgeConfig::default();
        let crit = config.attribute("crit").unwrap();
        assert_eq!(crit.clamp(150.0), 100.0);
        assert_eq!(crit.clamp(-3.0), 0.0);
    }
}
