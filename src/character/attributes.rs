use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attributes the combat engine reads by name. Any other key in an
/// [`Attributes`] bag is a custom stat the engine carries but ignores.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AttributeType {
    Attack,
    Defense,
    Health,
    Crit,
    CritResist,
    Accuracy,
    Evasion,
    DamageBoost,
    DamageReduction,
    Agility,
    HealthRegen,
}

impl AttributeType {
    pub fn all() -> [AttributeType; 11] {
        [
            AttributeType::Attack,
            AttributeType::Defense,
            AttributeType::Health,
            AttributeType::Crit,
            AttributeType::CritResist,
            AttributeType::Accuracy,
            AttributeType::Evasion,
            AttributeType::DamageBoost,
            AttributeType::DamageReduction,
            AttributeType::Agility,
            AttributeType::HealthRegen,
        ]
    }

    /// Key under which the attribute is stored.
    pub fn key(&self) -> &'static str {
        match self {
            AttributeType::Attack => "attack",
            AttributeType::Defense => "defense",
            AttributeType::Health => "health",
            AttributeType::Crit => "crit",
            AttributeType::CritResist => "crit_resist",
            AttributeType::Accuracy => "accuracy",
            AttributeType::Evasion => "evasion",
            AttributeType::DamageBoost => "damage_boost",
            AttributeType::DamageReduction => "damage_reduction",
            AttributeType::Agility => "agility",
            AttributeType::HealthRegen => "health_regen",
        }
    }

    pub fn from_key(key: &str) -> Option<AttributeType> {
        AttributeType::all().into_iter().find(|attr| attr.key() == key)
    }

    /// Stats shown as percentages in reports.
    pub fn is_percent(&self) -> bool {
        matches!(
            self,
            AttributeType::Crit
                | AttributeType::CritResist
                | AttributeType::DamageBoost
                | AttributeType::DamageReduction
        )
    }
}

/// Open-ended attribute bag keyed by case-sensitive name.
///
/// Reads never fail: an absent attribute is worth 0.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Attributes {
    values: BTreeMap<String, f64>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> f64 {
        self.values.get(name).copied().unwrap_or(0.0)
    }

    pub fn get_or(&self, name: &str, default: f64) -> f64 {
        self.values.get(name).copied().unwrap_or(default)
    }

    pub fn stat(&self, attr: AttributeType) -> f64 {
        self.get(attr.key())
    }

    pub fn set(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), value);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<f64> {
        self.values.remove(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Entries that are not one of the combat stats.
    pub fn custom(&self) -> impl Iterator<Item = (&str, f64)> {
        self.iter()
            .filter(|(name, _)| AttributeType::from_key(name).is_none())
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        }
    }
}
