use super::record::{AttrCurveOverride, CharacterRecord};
use super::resolver::{AttributeResolver, Diagnostic};
use crate::core::config::ForgeConfig;
use crate::core::constants::{
    DEFAULT_CURVE_TYPE, GENERATION_VARIANCE, MIN_GENERATED_HEALTH, MIN_GENERATED_STAT,
};
use crate::curves::ParamBag;
use crate::error::Result;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;

const NAME_ADJECTIVES: [&str; 8] = [
    "Brave", "Clever", "Swift", "Mighty", "Sly", "Gentle", "Wicked", "Mystic",
];

const NAME_NOUNS: [&str; 8] = [
    "Warrior", "Mage", "Archer", "Assassin", "Knight", "Sorcerer", "Hunter", "Rogue",
];

/// Level and growth setup for a new character.
#[derive(Debug, Clone)]
pub struct GrowthTemplate {
    pub level: u32,
    pub curve_type: String,
    pub curve_params: BTreeMap<String, ParamBag>,
    pub attr_growth_curves: BTreeMap<String, AttrCurveOverride>,
}

impl Default for GrowthTemplate {
    fn default() -> Self {
        Self {
            level: 1,
            curve_type: DEFAULT_CURVE_TYPE.to_string(),
            curve_params: BTreeMap::new(),
            attr_growth_curves: BTreeMap::new(),
        }
    }
}

impl GrowthTemplate {
    pub fn at_level(level: u32) -> Self {
        Self {
            level,
            ..Self::default()
        }
    }
}

pub fn random_name(rng: &mut impl Rng) -> String {
    let adjective = NAME_ADJECTIVES.choose(rng).copied().unwrap_or("Nameless");
    let noun = NAME_NOUNS.choose(rng).copied().unwrap_or("Hero");
    format!("{adjective} {noun}")
}

/// Lowest value a generated stat may take.
fn generated_floor(attribute: &str) -> f64 {
    match attribute {
        "health" => MIN_GENERATED_HEALTH,
        "crit" | "crit_resist" => 0.0,
        _ => MIN_GENERATED_STAT,
    }
}

/// Rolls a character whose stats scatter around their curve projection.
///
/// Every catalog attribute is projected at the template level, then moved by
/// up to ±30% and clamped to the catalog range.
pub fn generate_character(
    id: u32,
    name: &str,
    template: &GrowthTemplate,
    config: &ForgeConfig,
    rng: &mut impl Rng,
) -> Result<(CharacterRecord, Vec<Diagnostic>)> {
    let mut record = CharacterRecord::builder(id, name)
        .level(template.level)
        .curve_type(template.curve_type.clone())
        .all_curve_params(template.curve_params.clone())
        .all_attr_curves(template.attr_growth_curves.clone())
        .build()?;

    let resolver = AttributeResolver::new(&config.growth);
    let mut diagnostics = Vec::new();
    let mut rolled = Vec::with_capacity(config.attributes.len());

    for def in &config.attributes {
        let projection = resolver.project(&record, &def.name, template.level)?;
        diagnostics.extend(projection.diagnostic);

        let expected = projection.value;
        let spread = expected.abs() * GENERATION_VARIANCE;
        let value = if spread > 0.0 {
            rng.gen_range(expected - spread..=expected + spread)
        } else {
            expected
        };
        let value = def.clamp(value.trunc().max(generated_floor(&def.name)));
        rolled.push((def.name.clone(), value));
    }

    for (name, value) in rolled {
        record.set_attribute(name, value)?;
    }

    tracing::debug!(id, name, level = template.level, "generated character");
    Ok((record, diagnostics))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_random_name_uses_word_lists() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..20 {
            let name = random_name(&mut rng);
            let (adjective, noun) = name.split_once(' ').unwrap();
            assert!(NAME_ADJECTIVES.contains(&adjective));
            assert!(NAME_NOUNS.contains(&noun));
        }
    }

    #[test]
    fn test_generated_stats_within_variance() {
        let config = ForgeConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let template = GrowthTemplate::at_level(20);
        let (record, diagnostics) =
            generate_character(1, "Rolled", &template, &config, &mut rng).unwrap();
        assert!(diagnostics.is_empty());
        assert_eq!(record.level(), 20);

        // attack projects to 10 * 20 * 1.2 = 240
        let attack = record.attribute("attack");
        assert!((168.0..=312.0).contains(&attack), "attack {attack}");
        // health projects to 1000 and its catalog ceiling is far above
        let health = record.attribute("health");
        assert!((700.0..=1300.0).contains(&health), "health {health}");
    }

    #[test]
    fn test_generated_values_respect_catalog_range() {
        let config = ForgeConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let template = GrowthTemplate::at_level(90);
        let (record, _) = generate_character(1, "Capped", &template, &config, &mut rng).unwrap();
        for def in &config.attributes {
            let value = record.attribute(&def.name);
            assert!(value >= def.min_value && value <= def.max_value, "{}", def.name);
        }
    }

    #[test]
    fn test_low_level_floors() {
        let config = ForgeConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let template = GrowthTemplate {
            level: 1,
            curve_type: "sigmoid".into(),
            ..GrowthTemplate::default()
        };
        let (record, _) = generate_character(1, "Tiny", &template, &config, &mut rng).unwrap();
        assert!(record.attribute("health") >= 10.0);
        assert!(record.attribute("attack") >= 1.0);
        assert!(record.attribute("crit") >= 0.0);
    }

    #[test]
    fn test_unknown_template_curve_is_reported() {
        let config = ForgeConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let template = GrowthTemplate {
            level: 5,
            curve_type: "zigzag".into(),
            ..GrowthTemplate::default()
        };
        let (record, diagnostics) =
            generate_character(1, "Odd", &template, &config, &mut rng).unwrap();
        assert_eq!(record.growth_curve_type(), "zigzag");
        assert_eq!(diagnostics.len(), config.attributes.len());
    }

    #[test]
    fn test_same_seed_same_character() {
        let config = ForgeConfig::default();
        let template = GrowthTemplate::at_level(12);
        let a = generate_character(1, "Twin", &template, &config, &mut ChaCha8Rng::seed_from_u64(9))
            .unwrap()
            .0;
        let b = generate_character(1, "Twin", &template, &config, &mut ChaCha8Rng::seed_from_u64(9))
            .unwrap()
            .0;
        assert_eq!(a, b);
    }
}
