//! Complex number literals in `a+bi` notation.
//!
//! Accepted forms (case-insensitive, whitespace ignored):
//! - `7`, `-2.5`, `.5` - pure real
//! - `i`, `-i`, `3i`, `+0.5i` - pure imaginary, bare sign means magnitude 1
//! - `3+4i`, `2-5i`, `-1.5+0.25i`, `4-i` - combined

use regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;

static REAL_PATTERN: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^[+-]?[0-9]*\.?[0-9]+$").expect("real pattern is valid"));

static IMAGINARY_PATTERN: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^[+-]?[0-9]*\.?[0-9]*i$").expect("imaginary pattern is valid"));

static COMBINED_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^([+-]?[0-9]*\.?[0-9]+)([+-][0-9]*\.?[0-9]*)i$").expect("combined pattern is valid")
});

/// Parsed complex value. Only lives for the duration of one comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComplexLiteral {
  pub real: f64,
  pub imag: f64,
}

impl ComplexLiteral {
  pub fn new(real: f64, imag: f64) -> Self {
    Self { real, imag }
  }

  /// Parse a literal, returning `None` for anything outside the grammar.
  pub fn parse(input: &str) -> Option<Self> {
    let cleaned: String = input
      .chars()
      .filter(|c| !c.is_whitespace())
      .collect::<String>()
      .to_lowercase();

    if cleaned.is_empty() {
      return None;
    }

    if REAL_PATTERN.is_match(&cleaned) {
      let real = cleaned.parse::<f64>().ok()?;
      return Some(Self::new(real, 0.0));
    }

    if IMAGINARY_PATTERN.is_match(&cleaned) {
      let coefficient = cleaned.strip_suffix('i')?;
      return Some(Self::new(0.0, parse_coefficient(coefficient)?));
    }

    let caps = COMBINED_PATTERN.captures(&cleaned)?;
    let real = caps.get(1)?.as_str().parse::<f64>().ok()?;
    let imag = parse_coefficient(caps.get(2)?.as_str())?;
    Some(Self::new(real, imag))
  }

  /// Component-wise comparison: both parts must differ by less than `tolerance`.
  pub fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
    within(self.real, other.real, tolerance) && within(self.imag, other.imag, tolerance)
  }
}

/// Imaginary coefficient; empty or bare sign is a unit magnitude.
fn parse_coefficient(s: &str) -> Option<f64> {
  match s {
    "" | "+" => Some(1.0),
    "-" => Some(-1.0),
    _ => s.parse::<f64>().ok(),
  }
}

/// `|a - b| < tolerance`, allowing for the rounding already present in `a` and `b`
/// (decimal input like `3.0000000001` is not exactly representable).
/// The slack is about one ULP of the larger operand.
fn within(a: f64, b: f64, tolerance: f64) -> bool {
  let slack = f64::EPSILON * a.abs().max(b.abs());
  (a - b).abs() < tolerance + slack
}

impl std::fmt::Display for ComplexLiteral {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let (re, im) = (self.real, self.imag);
    if im == 0.0 {
      return write!(f, "{}", re);
    }
    let imag_part = if im == 1.0 {
      "+i".to_string()
    } else if im == -1.0 {
      "-i".to_string()
    } else if im > 0.0 {
      format!("+{}i", im)
    } else {
      format!("{}i", im)
    };
    if re == 0.0 {
      // Drop the leading plus of a lone imaginary part
      return write!(f, "{}", imag_part.trim_start_matches('+'));
    }
    write!(f, "{}{}", re, imag_part)
  }
}

/// Error for `str::parse::<ComplexLiteral>()`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseComplexError(pub String);

impl std::fmt::Display for ParseComplexError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "Not a complex number: {:?}", self.0)
  }
}

impl std::error::Error for ParseComplexError {}

impl FromStr for ComplexLiteral {
  type Err = ParseComplexError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::parse(s).ok_or_else(|| ParseComplexError(s.to_string()))
  }
}
