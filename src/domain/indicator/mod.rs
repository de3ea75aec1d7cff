//! Technical indicator identities and series calculators.
//!
//! - `IndicatorParam`: a numeric indicator parameter with stable text form
//! - `IndicatorSpec`: indicator id plus parameters; derives the output column name
//! - `IndicatorKind`: the indicators the built-in provider knows how to compute
//!
//! Calculators work on a plain close-price slice and return one value per
//! input row, with `f64::NAN` for warmup rows.

pub mod bollinger;
pub mod ema;
pub mod roc;
pub mod rsi;
pub mod sma;
pub mod stddev;

use std::fmt;

/// Numeric indicator parameter.
///
/// Whole numbers render without a decimal point (`12`, not `12.0`) so that
/// `IndicatorSpec::column_name` matches the provider's column naming.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorParam(pub f64);

impl IndicatorParam {
    /// The parameter as a window length, if it is a positive whole number.
    pub fn as_period(&self) -> Option<usize> {
        let v = self.0;
        if v.is_finite() && v >= 1.0 && v.fract() == 0.0 {
            Some(v as usize)
        } else {
            None
        }
    }
}

impl From<f64> for IndicatorParam {
    fn from(v: f64) -> Self {
        IndicatorParam(v)
    }
}

impl From<i64> for IndicatorParam {
    fn from(v: i64) -> Self {
        IndicatorParam(v as f64)
    }
}

impl fmt::Display for IndicatorParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = self.0;
        if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
            write!(f, "{}", v as i64)
        } else {
            write!(f, "{}", v)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSpec {
    pub id: String,
    pub params: Vec<IndicatorParam>,
}

impl IndicatorSpec {
    pub fn new(id: impl Into<String>, params: Vec<IndicatorParam>) -> Self {
        IndicatorSpec {
            id: id.into(),
            params,
        }
    }

    /// Column the provider writes for this indicator: the id, then the first
    /// parameter with no separator, then every further parameter after `_`.
    pub fn column_name(&self) -> String {
        let mut name = self.id.clone();
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                name.push('_');
            }
            name.push_str(&p.to_string());
        }
        name
    }
}

impl fmt::Display for IndicatorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self.params.iter().map(|p| p.to_string()).collect();
        write!(f, "{}({})", self.id.to_uppercase(), params.join(","))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorKind {
    Rsi,
    Roc,
    Sma,
    Ema,
    Bollinger,
}

impl IndicatorKind {
    pub fn from_id(id: &str) -> Option<Self> {
        match id.to_ascii_lowercase().as_str() {
            "rsi" => Some(IndicatorKind::Rsi),
            "roc" => Some(IndicatorKind::Roc),
            "sma" => Some(IndicatorKind::Sma),
            "ema" => Some(IndicatorKind::Ema),
            "bb" | "bollinger" => Some(IndicatorKind::Bollinger),
            _ => None,
        }
    }

    /// Number of parameters the indicator takes.
    pub fn arity(&self) -> usize {
        match self {
            IndicatorKind::Bollinger => 2,
            _ => 1,
        }
    }
}
