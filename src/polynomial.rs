//! # Polynomial — Exact Integer Evaluation
//!
//! Coefficient vectors are ordered highest degree first, the last entry being
//! the constant term. Evaluation uses Horner's rule over `rug::Integer`, so a
//! candidate is a root only when the value is exactly zero. No floating point
//! is involved at any step.
//!
//! ## Presets
//!
//! | Name | Polynomial | Integer roots | Terminates at target = degree |
//! |------|------------|---------------|-------------------------------|
//! | `p1` | x^3 - 6000x^2 + 11000000x - 6000000000 | 1000, 2000, 3000 | yes |
//! | `p2` | x^4 - 5x^3 + 7x^2 - 3x - 6 | none | no |
//! | `p3` | x^2 + 1 | none | no |
//! | `p4` | x^2 - 15000000x + 50000000000000 | 5000000, 10000000 | yes (slow) |

use anyhow::{bail, Context, Result};
use rug::Integer;
use std::fmt;
use std::str::FromStr;

/// A polynomial with integer coefficients, highest degree first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Polynomial {
    coeffs: Vec<Integer>,
}

impl Polynomial {
    /// Build from coefficients. At least two are required (degree >= 1).
    pub fn new(coeffs: Vec<Integer>) -> Result<Self> {
        if coeffs.len() < 2 {
            bail!(
                "at least 2 coefficients are required (got {})",
                coeffs.len()
            );
        }
        Ok(Polynomial { coeffs })
    }

    pub fn from_i64(coeffs: &[i64]) -> Result<Self> {
        Self::new(coeffs.iter().map(|&c| Integer::from(c)).collect())
    }

    /// Parse a comma-separated coefficient list such as `1,-6,11,-6`.
    /// Coefficients may be arbitrarily large; blank fields are skipped.
    pub fn parse(csv: &str) -> Result<Self> {
        let mut coeffs = Vec::new();
        for field in csv.split(',') {
            let field = field.trim();
            if field.is_empty() {
                continue;
            }
            let value = Integer::from_str(field)
                .with_context(|| format!("invalid coefficient {:?}", field))?;
            coeffs.push(value);
        }
        Self::new(coeffs)
    }

    pub fn coefficients(&self) -> &[Integer] {
        &self.coeffs
    }

    pub fn degree(&self) -> usize {
        self.coeffs.len() - 1
    }

    pub fn leading(&self) -> &Integer {
        &self.coeffs[0]
    }

    pub fn constant_term(&self) -> &Integer {
        &self.coeffs[self.coeffs.len() - 1]
    }

    pub fn is_monic(&self) -> bool {
        *self.leading() == 1
    }

    /// Value of the polynomial at `x`, computed exactly with Horner's rule.
    pub fn evaluate(&self, x: &Integer) -> Integer {
        let mut acc = Integer::new();
        for c in &self.coeffs {
            acc *= x;
            acc += c;
        }
        acc
    }

    pub fn is_root(&self, x: &Integer) -> bool {
        self.evaluate(x) == 0
    }
}

impl FromStr for Polynomial {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Polynomial::parse(s)
    }
}

impl fmt::Display for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let degree = self.degree();
        let mut wrote_any = false;
        for (i, c) in self.coeffs.iter().enumerate() {
            if *c == 0 {
                continue;
            }
            let exp = degree - i;
            let magnitude = Integer::from(c.abs_ref());
            if wrote_any {
                write!(f, " {} ", if *c < 0 { '-' } else { '+' })?;
            } else if *c < 0 {
                write!(f, "-")?;
            }
            if magnitude != 1 || exp == 0 {
                write!(f, "{}", magnitude)?;
            }
            match exp {
                0 => {}
                1 => write!(f, "x")?,
                _ => write!(f, "x^{}", exp)?,
            }
            wrote_any = true;
        }
        if !wrote_any {
            write!(f, "0")?;
        }
        Ok(())
    }
}

/// Named polynomials shipped with the command-line tool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Preset {
    P1,
    P2,
    P3,
    P4,
}

impl Preset {
    pub const ALL: [Preset; 4] = [Preset::P1, Preset::P2, Preset::P3, Preset::P4];

    pub fn name(self) -> &'static str {
        match self {
            Preset::P1 => "p1",
            Preset::P2 => "p2",
            Preset::P3 => "p3",
            Preset::P4 => "p4",
        }
    }

    pub fn coefficients(self) -> &'static [i64] {
        match self {
            Preset::P1 => &[1, -6000, 11_000_000, -6_000_000_000],
            Preset::P2 => &[1, -5, 7, -3, -6],
            Preset::P3 => &[1, 0, 1],
            Preset::P4 => &[1, -15_000_000, 50_000_000_000_000],
        }
    }

    /// Whether a search with target = degree finishes for this preset.
    pub fn terminates(self) -> bool {
        matches!(self, Preset::P1 | Preset::P4)
    }

    pub fn polynomial(self) -> Polynomial {
        Polynomial {
            coeffs: self
                .coefficients()
                .iter()
                .map(|&c| Integer::from(c))
                .collect(),
        }
    }
}

impl FromStr for Preset {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Preset::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s.trim()))
            .with_context(|| format!("unknown preset {:?} (expected p1|p2|p3|p4)", s))
    }
}
