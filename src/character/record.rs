use super::attributes::Attributes;
use crate::core::config::AttributeDefinition;
use crate::core::constants::DEFAULT_CURVE_TYPE;
use crate::curves::ParamBag;
use crate::error::{ForgeError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-attribute growth curve that takes precedence over the record default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttrCurveOverride {
    #[serde(default)]
    pub curve_type: Option<String>,
    #[serde(default)]
    pub curve_params: Option<ParamBag>,
}

impl AttrCurveOverride {
    pub fn new(curve_type: impl Into<String>, curve_params: Option<ParamBag>) -> Self {
        Self {
            curve_type: Some(curve_type.into()),
            curve_params,
        }
    }
}

/// Structural fields that can be edited after creation. The id is not one
/// of them.
#[derive(Debug, Clone, PartialEq)]
pub enum CharacterField {
    Name(String),
    Level(u32),
    GrowthCurveType(String),
    GrowthCurveParams {
        attribute: String,
        params: ParamBag,
    },
    AttrGrowthCurve {
        attribute: String,
        curve: Option<AttrCurveOverride>,
    },
}

fn default_curve_name() -> String {
    DEFAULT_CURVE_TYPE.to_string()
}

/// A character stat sheet: identity, level, growth configuration and the
/// attribute bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterRecord {
    id: u32,
    name: String,
    level: u32,
    #[serde(default = "default_curve_name")]
    growth_curve_type: String,
    #[serde(default)]
    growth_curve_params: BTreeMap<String, ParamBag>,
    #[serde(default)]
    attr_growth_curves: BTreeMap<String, AttrCurveOverride>,
    #[serde(default)]
    attributes: Attributes,
}

impl CharacterRecord {
    pub fn builder(id: u32, name: impl Into<String>) -> CharacterBuilder {
        CharacterBuilder {
            record: CharacterRecord {
                id,
                name: name.into(),
                level: 1,
                growth_curve_type: default_curve_name(),
                growth_curve_params: BTreeMap::new(),
                attr_growth_curves: BTreeMap::new(),
                attributes: Attributes::new(),
            },
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    /// Default curve name, stored verbatim even when it is not a known curve.
    pub fn growth_curve_type(&self) -> &str {
        &self.growth_curve_type
    }

    pub fn growth_curve_params(&self) -> &BTreeMap<String, ParamBag> {
        &self.growth_curve_params
    }

    pub fn attr_growth_curves(&self) -> &BTreeMap<String, AttrCurveOverride> {
        &self.attr_growth_curves
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> f64 {
        self.attributes.get(name)
    }

    pub fn curve_override(&self, attribute: &str) -> Option<&AttrCurveOverride> {
        self.attr_growth_curves.get(attribute)
    }

    pub fn default_params(&self, attribute: &str) -> Option<&ParamBag> {
        self.growth_curve_params.get(attribute)
    }

    /// Checks invariants that deserialization cannot enforce.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ForgeError::invalid_input(format!(
                "character {} has an empty name",
                self.id
            )));
        }
        if self.level == 0 {
            return Err(ForgeError::invalid_input(format!(
                "character '{}' has level 0; levels start at 1",
                self.name
            )));
        }
        Ok(())
    }

    pub fn set_field(&mut self, field: CharacterField) -> Result<()> {
        match field {
            CharacterField::Name(name) => {
                if name.trim().is_empty() {
                    return Err(ForgeError::invalid_input("name cannot be empty"));
                }
                self.name = name;
            }
            CharacterField::Level(level) => {
                if level == 0 {
                    return Err(ForgeError::invalid_input("level must be at least 1"));
                }
                self.level = level;
            }
            CharacterField::GrowthCurveType(curve) => self.growth_curve_type = curve,
            CharacterField::GrowthCurveParams { attribute, params } => {
                self.growth_curve_params.insert(attribute, params);
            }
            CharacterField::AttrGrowthCurve { attribute, curve } => match curve {
                Some(curve) => {
                    self.attr_growth_curves.insert(attribute, curve);
                }
                None => {
                    self.attr_growth_curves.remove(&attribute);
                }
            },
        }
        Ok(())
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: f64) -> Result<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(ForgeError::invalid_input("attribute name cannot be empty"));
        }
        if !value.is_finite() {
            return Err(ForgeError::invalid_input(format!(
                "attribute '{name}' must be a finite number"
            )));
        }
        self.attributes.set(name, value);
        Ok(())
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<f64> {
        self.attributes.remove(name)
    }

    /// Adds a stat, optionally with its own growth curve.
    pub fn add_attribute(
        &mut self,
        name: impl Into<String>,
        value: f64,
        curve_type: Option<&str>,
        curve_params: Option<ParamBag>,
    ) -> Result<()> {
        let name = name.into();
        self.set_attribute(name.clone(), value)?;
        if let Some(curve_type) = curve_type {
            let entry = self.attr_growth_curves.entry(name).or_default();
            entry.curve_type = Some(curve_type.to_string());
            if curve_params.is_some() {
                entry.curve_params = curve_params;
            }
        }
        Ok(())
    }

    pub(crate) fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }
}

pub struct CharacterBuilder {
    record: CharacterRecord,
}

impl CharacterBuilder {
    pub fn level(mut self, level: u32) -> Self {
        self.record.level = level;
        self
    }

    pub fn curve_type(mut self, curve: impl Into<String>) -> Self {
        self.record.growth_curve_type = curve.into();
        self
    }

    pub fn curve_params(mut self, attribute: impl Into<String>, params: ParamBag) -> Self {
        self.record
            .growth_curve_params
            .insert(attribute.into(), params);
        self
    }

    pub fn all_curve_params(mut self, params: BTreeMap<String, ParamBag>) -> Self {
        self.record.growth_curve_params.extend(params);
        self
    }

    pub fn attr_curve(mut self, attribute: impl Into<String>, curve: AttrCurveOverride) -> Self {
        self.record
            .attr_growth_curves
            .insert(attribute.into(), curve);
        self
    }

    pub fn all_attr_curves(mut self, curves: BTreeMap<String, AttrCurveOverride>) -> Self {
        self.record.attr_growth_curves.extend(curves);
        self
    }

    pub fn attribute(mut self, name: impl Into<String>, value: f64) -> Self {
        self.record.attributes.set(name, value);
        self
    }

    pub fn attributes<K: Into<String>>(mut self, values: impl IntoIterator<Item = (K, f64)>) -> Self {
        for (name, value) in values {
            self.record.attributes.set(name, value);
        }
        self
    }

    /// Seeds catalog default values for attributes not set explicitly.
    pub fn catalog_defaults(mut self, catalog: &[AttributeDefinition]) -> Self {
        for def in catalog {
            if !self.record.attributes.contains(&def.name) {
                self.record.attributes.set(def.name.clone(), def.default_value);
            }
        }
        self
    }

    pub fn build(self) -> Result<CharacterRecord> {
        self.record.validate()?;
        if let Some((name, _)) = self.record.attributes.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ForgeError::invalid_input(format!(
                "attribute '{name}' must be a finite number"
            )));
        }
        Ok(self.record)
    }
}
