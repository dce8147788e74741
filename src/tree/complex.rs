//! Complex number literals (`37-880j`)

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed complex literal '{0}'")]
pub struct ParseComplexError(String);

impl Complex {
    pub fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }
}

impl fmt::Display for Complex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:+}j", self.re, self.im)
    }
}

/// Accepts `<real>±<imag>j`, a bare real (`5`), a bare imaginary part (`3j`,
/// `-j`), optionally wrapped in parentheses. Exponents like `1e-3` are not
/// mistaken for the sign between the two parts.
impl FromStr for Complex {
    type Err = ParseComplexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseComplexError(s.to_string());
        let trimmed = s.trim();
        let body = trimmed
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .unwrap_or(trimmed)
            .trim();
        if body.is_empty() {
            return Err(err());
        }

        let Some(body) = body.strip_suffix(['j', 'J']) else {
            let re = body.parse::<f64>().map_err(|_| err())?;
            return Ok(Complex::new(re, 0.0));
        };

        let split = body
            .char_indices()
            .rev()
            .find(|&(i, c)| {
                i > 0 && (c == '+' || c == '-') && !body[..i].ends_with(['e', 'E'])
            })
            .map(|(i, _)| i);

        match split {
            Some(i) => {
                let re = body[..i].parse::<f64>().map_err(|_| err())?;
                let im = parse_imaginary(&body[i..]).ok_or_else(err)?;
                Ok(Complex::new(re, im))
            }
            None => {
                let im = parse_imaginary(body).ok_or_else(err)?;
                Ok(Complex::new(0.0, im))
            }
        }
    }
}

fn parse_imaginary(text: &str) -> Option<f64> {
    match text {
        "" | "+" => Some(1.0),
        "-" => Some(-1.0),
        other => other.parse::<f64>().ok(),
    }
}
