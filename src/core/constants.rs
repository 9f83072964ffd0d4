// Growth curves
pub const BASE_MAGNITUDE: f64 = 10.0;
pub const DEFAULT_COEFFICIENT: f64 = 1.0;
pub const PERCENT_STAT_CAP: f64 = 100.0;
pub const DEFAULT_CURVE_TYPE: &str = "linear";

// Curve parameter defaults
pub const LINEAR_COEFFICIENT: f64 = 1.0;
pub const EXPONENTIAL_EXPONENT: f64 = 1.2;
pub const POWER_EXPONENT: f64 = 1.5;
pub const POWER_SCALING: f64 = 1.0;
pub const SIGMOID_MIDPOINT: f64 = 50.0;
pub const SIGMOID_STEEPNESS: f64 = 0.1;
pub const HYBRID_EARLY_COEF: f64 = 1.5;
pub const HYBRID_LATE_COEF: f64 = 1.0;
pub const HYBRID_TRANSITION_LEVEL: f64 = 30.0;

// Per-attribute coefficients applied after curve evaluation
pub const ATTRIBUTE_COEFFICIENTS: [(&str, f64); 8] = [
    ("attack", 1.2),
    ("defense", 0.8),
    ("health", 5.0),
    ("crit", 0.3),
    ("crit_resist", 0.2),
    ("damage_boost", 0.5),
    ("damage_reduction", 0.5),
    ("agility", 1.0),
];

// Hit and crit
pub const RATE_DIVISOR: f64 = 100.0;
pub const MIN_HIT_RATE: f64 = 0.05;
pub const MAX_HIT_RATE: f64 = 0.95;
pub const DEFAULT_CRIT_MULTIPLIER: f64 = 2.0;

// Damage formula
pub const MIN_DAMAGE: f64 = 1.0;
pub const DEFENSE_WEIGHT: f64 = 0.5;
pub const LEVEL_DIFF_FACTOR: f64 = 0.05;
pub const MAX_LEVEL_ADJUSTMENT: f64 = 0.5;
pub const MIN_REDUCTION_FACTOR: f64 = 0.1; // damage reduction caps at 90%

// Fight to the death
pub const DEFAULT_HEALTH: f64 = 100.0;
pub const DEFAULT_MAX_ROUNDS: u32 = 1000;
pub const DEFAULT_EXCHANGE_SAMPLES: u32 = 1000;
pub const DEFAULT_SERIES_RUNS: u32 = 100;

// Random generation
pub const GENERATION_VARIANCE: f64 = 0.3;
pub const MIN_GENERATED_HEALTH: f64 = 10.0;
pub const MIN_GENERATED_STAT: f64 = 1.0;

// Roster
pub const MAX_NAME_CHARS: usize = 32;
pub const CHARACTER_FILE_PREFIX: &str = "character_";
