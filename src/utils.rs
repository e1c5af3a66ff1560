use crate::errors::TreeError;
use serde::{Deserialize, Deserializer};

/// Create a string of all available items.
pub fn items_to_strings(items: Vec<&str>) -> String {
    let mut s = String::new();
    for i in items {
        s.push_str(i);
        s.push_str(&String::from(", "));
    }
    s
}

pub fn fmt_vec_output(v: &[f64]) -> String {
    let mut res = String::new();
    if let Some(last) = v.len().checked_sub(1) {
        if last == 0 {
            return format!("{:.4}", v[0]);
        }
        for n in &v[..last] {
            res.push_str(format!("{:.4}", n).as_str());
            res.push_str(", ");
        }
        res.push_str(format!("{:.4}", &v[last]).as_str());
    }
    res
}

// Validation
pub fn validate_float_parameter(value: f64, min: f64, max: f64, parameter: &str) -> Result<(), TreeError> {
    if value.is_nan() || value < min || max < value {
        Err(TreeError::InvalidConfig(format!(
            "{} must be a real value within range {} and {}, but {} provided.",
            parameter, min, max, value
        )))
    } else {
        Ok(())
    }
}

/// A bounded limit of zero makes no sense for any of the tree limits.
pub fn validate_limit(value: Option<usize>, parameter: &str) -> Result<(), TreeError> {
    match value {
        Some(0) => Err(TreeError::InvalidConfig(format!(
            "{} must be positive or unlimited, but 0 provided.",
            parameter
        ))),
        _ => Ok(()),
    }
}

/// Deserialize an integer limit where any negative value means unlimited.
pub(crate) fn parse_limit<'de, D>(d: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    Deserialize::deserialize(d).map(|x: Option<i64>| x.and_then(|v| usize::try_from(v).ok()))
}

/// Mean and population standard deviation (divide by `n`) of some scores.
/// An empty slice yields `(0.0, 0.0)`.
pub fn mean_std(scores: &[f64]) -> (f64, f64) {
    if scores.is_empty() {
        return (0.0, 0.0);
    }
    let n = scores.len() as f64;
    let mean = scores.iter().sum::<f64>() / n;
    let variance = scores.iter().map(|s| (s - mean) * (s - mean)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

pub fn precision_round(n: f64, precision: i32) -> f64 {
    let p = (10.0_f64).powi(precision);
    (n * p).round() / p
}
