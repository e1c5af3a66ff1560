pub const DEFAULT_K_FOLDS: usize = 4;
pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_MAX_DEPTH: usize = 5;
pub const DEFAULT_MIN_OBS: usize = 1;
/// Gains at or below this value are treated as no improvement.
pub const GAIN_EPSILON: f64 = 1e-12;
