//! Growth curve functions.
//!
//! Each maps a level (>= 1) and a base magnitude to a value. Levels below 1
//! are not meaningful; callers validate before evaluating.

use super::types::CurveSpec;

pub fn linear(level: f64, base: f64, coefficient: f64) -> f64 {
    base * level * coefficient
}

pub fn exponential(level: f64, base: f64, exponent: f64) -> f64 {
    base * level.powf(exponent)
}

pub fn logarithmic(level: f64, base: f64, log_base: f64) -> f64 {
    base * (level + 1.0).log(log_base)
}

pub fn power(level: f64, base: f64, exponent: f64, scaling: f64) -> f64 {
    base * (scaling * level).powf(exponent)
}

pub fn sigmoid(level: f64, base: f64, midpoint: f64, steepness: f64) -> f64 {
    base / (1.0 + (-steepness * (level - midpoint)).exp())
}

/// Fast early growth up to `transition_level`, then `late_coef` per level.
///
/// The late branch starts from the early branch's value at the transition,
/// so the curve is continuous there.
pub fn hybrid(level: f64, base: f64, early_coef: f64, late_coef: f64, transition_level: f64) -> f64 {
    if level < transition_level {
        base * level * early_coef
    } else {
        let early_value = base * transition_level * early_coef;
        early_value + base * (level - transition_level) * late_coef
    }
}

impl CurveSpec {
    pub fn evaluate(&self, level: f64, base: f64) -> f64 {
        match *self {
            CurveSpec::Linear { coefficient } => linear(level, base, coefficient),
            CurveSpec::Exponential { exponent } => exponential(level, base, exponent),
            CurveSpec::Logarithmic { log_base } => logarithmic(level, base, log_base),
            CurveSpec::Power { exponent, scaling } => power(level, base, exponent, scaling),
            CurveSpec::Sigmoid {
                midpoint,
                steepness,
            } => sigmoid(level, base, midpoint, steepness),
            CurveSpec::Hybrid {
                early_coef,
                late_coef,
                transition_level,
            } => hybrid(level, base, early_coef, late_coef, transition_level),
        }
    }
}
