//! Directives of the prior mini-language.
//!
//! Purpose
//! -------
//! Parse one directive line (`"increasing 0 20"`, `"smooth 100"`,
//! `"at_most .3"`) into a typed [`Directive`] and print it back in the same
//! grammar, so a parsed specification can be re-serialized and re-parsed
//! without change.
//!
//! Grammar
//! -------
//! ```text
//! smooth       <tau> [<age_start> <age_end>]
//! zero         <age_start> <age_end>
//! level_value  <value> [<age_start> <age_end>]
//! confidence   <mean> <tau>
//! increasing | decreasing | convex_up | convex_down | unimodal
//!              <age_start> <age_end>
//! max_at_least | at_most | at_least
//!              <value>
//! ```
//! Ages parse as integers, everything else as `f64`. Fields are separated by
//! any whitespace.
use std::{fmt, str::FromStr};

use crate::priors::{
    core::age_mesh::AgeRange,
    errors::{PriorError, PriorResult},
};

/// Sign constraint on a first or second difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeConstraint {
    /// First difference ≥ 0.
    Increasing,
    /// First difference ≤ 0.
    Decreasing,
    /// Second difference ≥ 0.
    ConvexUp,
    /// Second difference ≤ 0.
    ConvexDown,
}

impl ShapeConstraint {
    /// Order of the difference the constraint acts on.
    pub fn order(&self) -> usize {
        match self {
            ShapeConstraint::Increasing | ShapeConstraint::Decreasing => 1,
            ShapeConstraint::ConvexUp | ShapeConstraint::ConvexDown => 2,
        }
    }

    /// `+1` when the difference must be non-negative, `-1` otherwise.
    pub fn sign(&self) -> f64 {
        match self {
            ShapeConstraint::Increasing | ShapeConstraint::ConvexUp => 1.0,
            ShapeConstraint::Decreasing | ShapeConstraint::ConvexDown => -1.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeConstraint::Increasing => "increasing",
            ShapeConstraint::Decreasing => "decreasing",
            ShapeConstraint::ConvexUp => "convex_up",
            ShapeConstraint::ConvexDown => "convex_down",
        }
    }
}

/// Kind of bound placed on a curve extremum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtremumBound {
    /// The curve maximum must reach the bound.
    MaxAtLeast,
    /// The curve maximum must not exceed the bound.
    AtMost,
    /// The curve minimum must not fall below the bound.
    AtLeast,
}

impl ExtremumBound {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtremumBound::MaxAtLeast => "max_at_least",
            ExtremumBound::AtMost => "at_most",
            ExtremumBound::AtLeast => "at_least",
        }
    }
}

/// One parsed directive of a prior specification.
///
/// Optional ranges (`smooth`, `level_value`) are `None` when omitted; they
/// default to [`AgeRange::full`] at compile time and stay omitted when the
/// directive is printed.
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    Smooth { tau: f64, ages: Option<AgeRange> },
    Zero { ages: AgeRange },
    LevelValue { value: f64, ages: Option<AgeRange> },
    /// Consumed by the dispersion model, not by the rate-function compiler.
    Confidence { mean: f64, tau: f64 },
    Shape { constraint: ShapeConstraint, ages: AgeRange },
    Unimodal { ages: AgeRange },
    Extremum { bound: ExtremumBound, value: f64 },
}

impl Directive {
    /// Directive keyword as written in the prior language.
    pub fn name(&self) -> &'static str {
        match self {
            Directive::Smooth { .. } => "smooth",
            Directive::Zero { .. } => "zero",
            Directive::LevelValue { .. } => "level_value",
            Directive::Confidence { .. } => "confidence",
            Directive::Shape { constraint, .. } => constraint.as_str(),
            Directive::Unimodal { .. } => "unimodal",
            Directive::Extremum { bound, .. } => bound.as_str(),
        }
    }

    /// Parse a single directive line; `Ok(None)` for a blank line.
    ///
    /// Errors carry the line itself as the specification; callers parsing a
    /// whole specification re-attach the full string.
    pub fn parse_line(line: &str) -> PriorResult<Option<Directive>> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let Some((&name, args)) = fields.split_first() else {
            return Ok(None);
        };
        let args = Args { directive: name, args, line };

        let directive = match name {
            "smooth" => {
                args.arity(&[1, 3], "1 or 3")?;
                let ages = if args.len() == 3 { Some(args.range(1)?) } else { None };
                Directive::Smooth { tau: args.float(0)?, ages }
            }
            "zero" => {
                args.arity(&[2], "2")?;
                Directive::Zero { ages: args.range(0)? }
            }
            "level_value" => {
                args.arity(&[1, 3], "1 or 3")?;
                let ages = if args.len() == 3 { Some(args.range(1)?) } else { None };
                Directive::LevelValue { value: args.float(0)?, ages }
            }
            "confidence" => {
                args.arity(&[2], "2")?;
                Directive::Confidence { mean: args.float(0)?, tau: args.float(1)? }
            }
            "increasing" | "decreasing" | "convex_up" | "convex_down" => {
                args.arity(&[2], "2")?;
                let constraint = match name {
                    "increasing" => ShapeConstraint::Increasing,
                    "decreasing" => ShapeConstraint::Decreasing,
                    "convex_up" => ShapeConstraint::ConvexUp,
                    _ => ShapeConstraint::ConvexDown,
                };
                Directive::Shape { constraint, ages: args.range(0)? }
            }
            "unimodal" => {
                args.arity(&[2], "2")?;
                Directive::Unimodal { ages: args.range(0)? }
            }
            "max_at_least" | "at_most" | "at_least" => {
                args.arity(&[1], "1")?;
                let bound = match name {
                    "max_at_least" => ExtremumBound::MaxAtLeast,
                    "at_most" => ExtremumBound::AtMost,
                    _ => ExtremumBound::AtLeast,
                };
                let value = args.float(0)?;
                if !value.is_finite() || value <= 0.0 {
                    return Err(PriorError::NonPositiveBound { directive: name.to_string(), value });
                }
                Directive::Extremum { bound, value }
            }
            other => {
                return Err(PriorError::UnrecognizedDirective {
                    name: other.to_string(),
                    spec: line.to_string(),
                });
            }
        };
        Ok(Some(directive))
    }
}

impl FromStr for Directive {
    type Err = PriorError;

    /// Parse a single non-blank directive line.
    ///
    /// A blank line is reported as an unrecognized (empty) directive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Directive::parse_line(s)?.ok_or_else(|| PriorError::UnrecognizedDirective {
            name: String::new(),
            spec: s.to_string(),
        })
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directive::Smooth { tau, ages } => {
                write!(f, "smooth {tau}")?;
                write_optional_range(f, ages)
            }
            Directive::Zero { ages } => write!(f, "zero {} {}", ages.start, ages.end),
            Directive::LevelValue { value, ages } => {
                write!(f, "level_value {value}")?;
                write_optional_range(f, ages)
            }
            Directive::Confidence { mean, tau } => write!(f, "confidence {mean} {tau}"),
            Directive::Shape { constraint, ages } => {
                write!(f, "{} {} {}", constraint.as_str(), ages.start, ages.end)
            }
            Directive::Unimodal { ages } => write!(f, "unimodal {} {}", ages.start, ages.end),
            Directive::Extremum { bound, value } => write!(f, "{} {value}", bound.as_str()),
        }
    }
}

fn write_optional_range(f: &mut fmt::Formatter<'_>, ages: &Option<AgeRange>) -> fmt::Result {
    match ages {
        Some(r) => write!(f, " {} {}", r.start, r.end),
        None => Ok(()),
    }
}

/// Positional arguments of one directive, with typed accessors that report
/// errors against the directive line.
struct Args<'a> {
    directive: &'a str,
    args: &'a [&'a str],
    line: &'a str,
}

impl Args<'_> {
    fn len(&self) -> usize {
        self.args.len()
    }

    fn arity(&self, allowed: &[usize], expected: &'static str) -> PriorResult<()> {
        let actual = self.args.len();
        if allowed.contains(&actual) {
            return Ok(());
        }
        let directive = self.directive.to_string();
        let spec = self.line.to_string();
        if actual < allowed.iter().copied().max().unwrap_or(0) {
            Err(PriorError::MissingArgument { directive, expected, actual, spec })
        } else {
            Err(PriorError::UnexpectedArgument { directive, expected, actual, spec })
        }
    }

    fn float(&self, i: usize) -> PriorResult<f64> {
        self.args[i].parse::<f64>().map_err(|_| self.malformed("numeric", i))
    }

    fn age(&self, i: usize) -> PriorResult<i64> {
        self.args[i].parse::<i64>().map_err(|_| self.malformed("age", i))
    }

    fn range(&self, first: usize) -> PriorResult<AgeRange> {
        Ok(AgeRange::new(self.age(first)?, self.age(first + 1)?))
    }

    fn malformed(&self, kind: &'static str, i: usize) -> PriorError {
        PriorError::MalformedNumber {
            directive: self.directive.to_string(),
            kind,
            field: self.args[i].to_string(),
            spec: self.line.to_string(),
        }
    }
}
