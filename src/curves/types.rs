use crate::core::constants::*;
use crate::error::{ForgeError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Raw curve parameters as supplied by storage or an authoring form.
///
/// Values are kept as JSON so malformed entries can be reported instead of
/// being lost at deserialization time; [`CurveSpec::from_params`] validates
/// them.
pub type ParamBag = BTreeMap<String, Value>;

/// Builds a parameter bag from numeric pairs.
pub fn param_bag<'a>(pairs: impl IntoIterator<Item = (&'a str, f64)>) -> ParamBag {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), Value::from(value)))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveType {
    #[default]
    Linear,
    Exponential,
    Logarithmic,
    Power,
    Sigmoid,
    Hybrid,
}

impl CurveType {
    pub fn all() -> [CurveType; 6] {
        [
            CurveType::Linear,
            CurveType::Exponential,
            CurveType::Logarithmic,
            CurveType::Power,
            CurveType::Sigmoid,
            CurveType::Hybrid,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            CurveType::Linear => "linear",
            CurveType::Exponential => "exponential",
            CurveType::Logarithmic => "logarithmic",
            CurveType::Power => "power",
            CurveType::Sigmoid => "sigmoid",
            CurveType::Hybrid => "hybrid",
        }
    }

    pub fn from_name(name: &str) -> Option<CurveType> {
        CurveType::all().into_iter().find(|curve| curve.name() == name)
    }

    /// Parameter keys the curve accepts.
    pub fn param_keys(&self) -> &'static [&'static str] {
        match self {
            CurveType::Linear => &["coefficient"],
            CurveType::Exponential => &["exponent"],
            CurveType::Logarithmic => &["base", "base_of_log"],
            CurveType::Power => &["exponent", "scaling"],
            CurveType::Sigmoid => &["midpoint", "steepness"],
            CurveType::Hybrid => &["early_coef", "late_coef", "transition_level"],
        }
    }
}

impl fmt::Display for CurveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CurveType {
    type Err = ForgeError;

    fn from_str(s: &str) -> Result<Self> {
        CurveType::from_name(s).ok_or_else(|| {
            ForgeError::invalid_input(format!(
                "unknown curve type '{s}' (expected one of linear, exponential, logarithmic, power, sigmoid, hybrid)"
            ))
        })
    }
}

/// A curve with validated numeric parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "curve", rename_all = "lowercase")]
pub enum CurveSpec {
    Linear {
        coefficient: f64,
    },
    Exponential {
        exponent: f64,
    },
    Logarithmic {
        log_base: f64,
    },
    Power {
        exponent: f64,
        scaling: f64,
    },
    Sigmoid {
        midpoint: f64,
        steepness: f64,
    },
    Hybrid {
        early_coef: f64,
        late_coef: f64,
        transition_level: f64,
    },
}

impl CurveSpec {
    /// Validates `params` for `curve`. `attribute` only labels errors.
    ///
    /// Missing keys take the curve's defaults. Non-numeric or non-finite
    /// values and keys the curve does not accept are configuration errors.
    pub fn from_params(curve: CurveType, params: &ParamBag, attribute: &str) -> Result<Self> {
        let reader = ParamReader {
            attribute,
            curve,
            params,
        };
        reader.reject_unknown_keys()?;

        let spec = match curve {
            CurveType::Linear => CurveSpec::Linear {
                coefficient: reader.number("coefficient", LINEAR_COEFFICIENT)?,
            },
            CurveType::Exponential => CurveSpec::Exponential {
                exponent: reader.number("exponent", EXPONENTIAL_EXPONENT)?,
            },
            CurveType::Logarithmic => {
                if params.contains_key("base") && params.contains_key("base_of_log") {
                    return Err(reader.error("give either 'base' or 'base_of_log', not both"));
                }
                let key = if params.contains_key("base_of_log") {
                    "base_of_log"
                } else {
                    "base"
                };
                let log_base = reader.number(key, std::f64::consts::E)?;
                if log_base <= 0.0 || log_base == 1.0 {
                    return Err(reader.error(format!(
                        "logarithm base must be positive and not 1, got {log_base}"
                    )));
                }
                CurveSpec::Logarithmic { log_base }
            }
            CurveType::Power => CurveSpec::Power {
                exponent: reader.number("exponent", POWER_EXPONENT)?,
                scaling: reader.number("scaling", POWER_SCALING)?,
            },
            CurveType::Sigmoid => CurveSpec::Sigmoid {
                midpoint: reader.number("midpoint", SIGMOID_MIDPOINT)?,
                steepness: reader.number("steepness", SIGMOID_STEEPNESS)?,
            },
            CurveType::Hybrid => CurveSpec::Hybrid {
                early_coef: reader.number("early_coef", HYBRID_EARLY_COEF)?,
                late_coef: reader.number("late_coef", HYBRID_LATE_COEF)?,
                transition_level: reader.number("transition_level", HYBRID_TRANSITION_LEVEL)?,
            },
        };
        Ok(spec)
    }

    pub fn curve_type(&self) -> CurveType {
        match self {
            CurveSpec::Linear { .. } => CurveType::Linear,
            CurveSpec::Exponential { .. } => CurveType::Exponential,
            CurveSpec::Logarithmic { .. } => CurveType::Logarithmic,
            CurveSpec::Power { .. } => CurveType::Power,
            CurveSpec::Sigmoid { .. } => CurveType::Sigmoid,
            CurveSpec::Hybrid { .. } => CurveType::Hybrid,
        }
    }
}

struct ParamReader<'a> {
    attribute: &'a str,
    curve: CurveType,
    params: &'a ParamBag,
}

impl ParamReader<'_> {
    fn error(&self, message: impl Into<String>) -> ForgeError {
        ForgeError::configuration(
            self.attribute,
            format!("{} curve: {}", self.curve, message.into()),
        )
    }

    fn reject_unknown_keys(&self) -> Result<()> {
        let accepted = self.curve.param_keys();
        match self.params.keys().find(|key| !accepted.contains(&key.as_str())) {
            Some(key) => Err(self.error(format!(
                "unexpected parameter '{key}' (accepted: {})",
                accepted.join(", ")
            ))),
            None => Ok(()),
        }
    }

    fn number(&self, key: &str, default: f64) -> Result<f64> {
        let Some(value) = self.params.get(key) else {
            return Ok(default);
        };
        match value.as_f64() {
            Some(number) if number.is_finite() => Ok(number),
            Some(number) => Err(self.error(format!("parameter '{key}' is not finite ({number})"))),
            None => Err(self.error(format!(
                "parameter '{key}' must be a number, got {}",
                json_kind(value)
            ))),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_curve_names_round_trip() {
        for curve in CurveType::all() {
            assert_eq!(CurveType::from_name(curve.name()), Some(curve));
            assert_eq!(curve.name().parse::<CurveType>().unwrap(), curve);
        }
        assert_eq!(CurveType::from_name("expo"), None);
        assert!("Linear".parse::<CurveType>().is_err());
    }

    #[test]
    fn test_missing_params_take_defaults() {
        let spec = CurveSpec::from_params(CurveType::Hybrid, &ParamBag::new(), "attack").unwrap();
        assert_eq!(
            spec,
            CurveSpec::Hybrid {
                early_coef: 1.5,
                late_coef: 1.0,
                transition_level: 30.0
            }
        );
    }

    #[test]
    fn test_integer_params_accepted() {
        let mut params = ParamBag::new();
        params.insert("midpoint".into(), json!(40));
        let spec = CurveSpec::from_params(CurveType::Sigmoid, &params, "health").unwrap();
        assert_eq!(
            spec,
            CurveSpec::Sigmoid {
                midpoint: 40.0,
                steepness: 0.1
            }
        );
    }

    #[test]
    fn test_string_param_is_configuration_error() {
        let mut params = ParamBag::new();
        params.insert("exponent".into(), json!("1.5"));
        let err = CurveSpec::from_params(CurveType::Power, &params, "attack").unwrap_err();
        match err {
            ForgeError::Configuration { attribute, message } => {
                assert_eq!(attribute, "attack");
                assert!(message.contains("'exponent' must be a number, got a string"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_unknown_key_rejected() {
        let params = param_bag([("exponent", 1.3)]);
        let err = CurveSpec::from_params(CurveType::Linear, &params, "defense").unwrap_err();
        assert!(matches!(err, ForgeError::Configuration { .. }));
    }

    #[test]
    fn test_log_base_alias_and_validation() {
        let spec =
            CurveSpec::from_params(CurveType::Logarithmic, &param_bag([("base_of_log", 2.0)]), "x")
                .unwrap();
        assert_eq!(spec, CurveSpec::Logarithmic { log_base: 2.0 });

        let spec =
            CurveSpec::from_params(CurveType::Logarithmic, &param_bag([("base", 10.0)]), "x")
                .unwrap();
        assert_eq!(spec, CurveSpec::Logarithmic { log_base: 10.0 });

        for bad in [1.0, 0.0, -2.0] {
            assert!(
                CurveSpec::from_params(CurveType::Logarithmic, &param_bag([("base", bad)]), "x")
                    .is_err()
            );
        }
        let both = param_bag([("base", 2.0), ("base_of_log", 3.0)]);
        assert!(CurveSpec::from_params(CurveType::Logarithmic, &both, "x").is_err());
    }

    #[test]
    fn test_curve_type_matches_spec() {
        for curve in CurveType::all() {
            let spec = CurveSpec::from_params(curve, &ParamBag::new(), "x").unwrap();
            assert_eq!(spec.curve_type(), curve);
        }
    }
}
