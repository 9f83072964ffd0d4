//! Solving curve parameters from two calibration points.
//!
//! Linear, exponential and power curves have closed forms. Logarithmic,
//! sigmoid and hybrid curves are fitted approximately and say so.

use super::types::{param_bag, CurveType, ParamBag};
use crate::core::constants::{BASE_MAGNITUDE, SIGMOID_STEEPNESS};
use crate::error::{ForgeError, Result};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Calibration {
    pub curve: CurveType,
    pub params: ParamBag,
    /// Base magnitude the parameters were fitted against.
    pub base_value: f64,
    /// False when the fit is approximate or fell back to defaults.
    pub closed_form: bool,
    pub formula: String,
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Solves `curve` parameters so it passes near `(l1, v1)` and `(l2, v2)`.
///
/// Points are reordered so the lower level comes first. Non-positive or equal
/// levels are rejected, as are non-positive values for curves that take
/// logarithms of them.
pub fn solve(curve: CurveType, first: (f64, f64), second: (f64, f64)) -> Result<Calibration> {
    let ((l1, v1), (l2, v2)) = if first.0 <= second.0 {
        (first, second)
    } else {
        (second, first)
    };

    if [l1, v1, l2, v2].iter().any(|x| !x.is_finite()) {
        return Err(ForgeError::invalid_input("calibration points must be finite"));
    }
    if l1 <= 0.0 || l2 <= 0.0 {
        return Err(ForgeError::invalid_input("calibration levels must be positive"));
    }
    if l1 == l2 {
        return Err(ForgeError::invalid_input("calibration levels must differ"));
    }

    let base = BASE_MAGNITUDE;
    let calibration = match curve {
        CurveType::Linear => {
            let coefficient = round_to((v2 - v1) / (base * (l2 - l1)), 4);
            Calibration {
                curve,
                params: param_bag([("coefficient", coefficient)]),
                base_value: base,
                closed_form: true,
                formula: format!("y = {base} * level * {coefficient}"),
            }
        }
        CurveType::Exponential => {
            require_positive_values(curve, v1, v2)?;
            let exponent = round_to((v2 / v1).ln() / (l2 / l1).ln(), 4);
            Calibration {
                curve,
                params: param_bag([("exponent", exponent)]),
                base_value: base,
                closed_form: true,
                formula: format!("y = {base} * level^{exponent}"),
            }
        }
        CurveType::Power => {
            require_positive_values(curve, v1, v2)?;
            let exponent = (v2 / v1).ln() / (l2 / l1).ln();
            if exponent == 0.0 {
                return Err(ForgeError::invalid_input(
                    "power curve needs two different values",
                ));
            }
            let scaling = (v1 / base).powf(1.0 / exponent) / l1;
            let (exponent, scaling) = (round_to(exponent, 4), round_to(scaling, 4));
            Calibration {
                curve,
                params: param_bag([("exponent", exponent), ("scaling", scaling)]),
                base_value: base,
                closed_form: true,
                formula: format!("y = {base} * ({scaling} * level)^{exponent}"),
            }
        }
        CurveType::Logarithmic => {
            // The base of the logarithm cancels out of the ratio, so only the
            // magnitude can be fitted; the base stays at e.
            let fitted = round_to(v1 / (1.0 + l1).ln(), 4);
            Calibration {
                curve,
                params: param_bag([("base", round_to(std::f64::consts::E, 4))]),
                base_value: fitted,
                closed_form: false,
                formula: format!("y = {fitted} * ln(level + 1)"),
            }
        }
        CurveType::Sigmoid => solve_sigmoid(l1, v1, l2, v2),
        CurveType::Hybrid => {
            let transition = (l1 + (l2 - l1) * 0.3).round();
            let early_coef = (v1 * 0.8) / (base * l1);
            let early_value = base * transition * early_coef;
            let additional = l2 - transition;
            let late_coef = if additional > 0.0 {
                (v2 - early_value) / (base * additional)
            } else {
                early_coef * 0.5
            };
            let (early_coef, late_coef) = (round_to(early_coef, 4), round_to(late_coef, 4));
            Calibration {
                curve,
                params: param_bag([
                    ("early_coef", early_coef),
                    ("late_coef", late_coef),
                    ("transition_level", transition),
                ]),
                base_value: base,
                closed_form: false,
                formula: format!(
                    "y = {base} * level * {early_coef} below level {transition}, \
                     then {} + {base} * (level - {transition}) * {late_coef}",
                    round_to(early_value, 2)
                ),
            }
        }
    };
    Ok(calibration)
}

fn require_positive_values(curve: CurveType, v1: f64, v2: f64) -> Result<()> {
    if v1 <= 0.0 || v2 <= 0.0 {
        return Err(ForgeError::invalid_input(format!(
            "{curve} calibration needs positive values"
        )));
    }
    Ok(())
}

fn solve_sigmoid(l1: f64, v1: f64, l2: f64, v2: f64) -> Calibration {
    let ceiling = (v2 * 1.1).max(1000.0);
    let a = ceiling / v1 - 1.0;
    let b = ceiling / v2 - 1.0;

    if v1 > 0.0 && v2 > 0.0 && a > 0.0 && b > 0.0 && a != b {
        let steepness = (b.ln() - a.ln()) / (l1 - l2);
        let midpoint = l1 + a.ln() / steepness;
        let (midpoint, steepness) = (round_to(midpoint, 2), round_to(steepness, 4));
        Calibration {
            curve: CurveType::Sigmoid,
            params: param_bag([("midpoint", midpoint), ("steepness", steepness)]),
            base_value: ceiling,
            closed_form: false,
            formula: format!("y = {ceiling} / (1 + e^(-{steepness} * (level - {midpoint})))"),
        }
    } else {
        let midpoint = round_to((l1 + l2) / 2.0, 2);
        Calibration {
            curve: CurveType::Sigmoid,
            params: param_bag([("midpoint", midpoint), ("steepness", SIGMOID_STEEPNESS)]),
            base_value: ceiling,
            closed_form: false,
            formula: format!(
                "y = {ceiling} / (1 + e^(-{SIGMOID_STEEPNESS} * (level - {midpoint}))) (defaults, no exact fit)"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curves::types::CurveSpec;

    fn param(calibration: &Calibration, key: &str) -> f64 {
        calibration.params[key].as_f64().unwrap()
    }

    fn evaluate(calibration: &Calibration, level: f64) -> f64 {
        let spec = CurveSpec::from_params(calibration.curve, &calibration.params, "x").unwrap();
        spec.evaluate(level, calibration.base_value)
    }

    #[test]
    fn test_degenerate_levels_rejected() {
        for curve in CurveType::all() {
            assert!(matches!(
                solve(curve, (5.0, 10.0), (5.0, 20.0)),
                Err(ForgeError::InvalidInput(_))
            ));
            assert!(matches!(
                solve(curve, (0.0, 10.0), (5.0, 20.0)),
                Err(ForgeError::InvalidInput(_))
            ));
            assert!(matches!(
                solve(curve, (-3.0, 10.0), (5.0, 20.0)),
                Err(ForgeError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn test_linear_solution() {
        let cal = solve(CurveType::Linear, (10.0, 200.0), (20.0, 400.0)).unwrap();
        assert_eq!(param(&cal, "coefficient"), 2.0);
        assert!(cal.closed_form);
        assert!((evaluate(&cal, 10.0) - 200.0).abs() < 1e-9);
        assert!((evaluate(&cal, 20.0) - 400.0).abs() < 1e-9);
    }

    #[test]
    fn test_points_are_reordered() {
        let forward = solve(CurveType::Linear, (10.0, 200.0), (20.0, 400.0)).unwrap();
        let backward = solve(CurveType::Linear, (20.0, 400.0), (10.0, 200.0)).unwrap();
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_exponential_solution() {
        let cal = solve(CurveType::Exponential, (1.0, 10.0), (4.0, 80.0)).unwrap();
        assert!((param(&cal, "exponent") - 1.5).abs() < 1e-9);
        assert!((evaluate(&cal, 4.0) - 80.0).abs() < 1e-6);
    }

    #[test]
    fn test_power_passes_through_both_points() {
        let cal = solve(CurveType::Power, (5.0, 120.0), (40.0, 2600.0)).unwrap();
        let at_first = evaluate(&cal, 5.0);
        let at_second = evaluate(&cal, 40.0);
        // Parameters are rounded to 4 places, so allow a small relative error
        assert!((at_first - 120.0).abs() / 120.0 < 1e-3, "{at_first}");
        assert!((at_second - 2600.0).abs() / 2600.0 < 1e-3, "{at_second}");
    }

    #[test]
    fn test_power_flat_values_rejected() {
        assert!(solve(CurveType::Power, (5.0, 100.0), (10.0, 100.0)).is_err());
        assert!(solve(CurveType::Exponential, (5.0, 0.0), (10.0, 100.0)).is_err());
    }

    #[test]
    fn test_logarithmic_fits_first_point() {
        let cal = solve(CurveType::Logarithmic, (3.0, 50.0), (30.0, 120.0)).unwrap();
        assert!(!cal.closed_form);
        assert!((evaluate(&cal, 3.0) - 50.0).abs() < 0.01);
    }

    #[test]
    fn test_sigmoid_fit() {
        let cal = solve(CurveType::Sigmoid, (10.0, 200.0), (60.0, 900.0)).unwrap();
        assert_eq!(cal.base_value, 1000.0);
        assert!((evaluate(&cal, 10.0) - 200.0).abs() < 1.0);
        assert!((evaluate(&cal, 60.0) - 900.0).abs() < 1.0);
    }

    #[test]
    fn test_sigmoid_fallback() {
        let cal = solve(CurveType::Sigmoid, (10.0, 0.0), (60.0, 900.0)).unwrap();
        assert_eq!(param(&cal, "midpoint"), 35.0);
        assert_eq!(param(&cal, "steepness"), 0.1);
        assert!(cal.formula.contains("no exact fit"));
    }

    #[test]
    fn test_hybrid_transition_and_end_point() {
        let cal = solve(CurveType::Hybrid, (10.0, 100.0), (50.0, 900.0)).unwrap();
        assert_eq!(param(&cal, "transition_level"), 22.0);
        assert_eq!(param(&cal, "early_coef"), 0.8);
        assert!((evaluate(&cal, 50.0) - 900.0).abs() < 0.1);
    }
}
