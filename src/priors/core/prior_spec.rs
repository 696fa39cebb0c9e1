//! Prior specifications: ordered directive lists.
//!
//! A [`PriorSpec`] is the canonical form of a prior, whether it arrived as a
//! `,`-separated string or as structured [`PriorParameters`]. Parsing is
//! all-or-nothing: one bad directive fails the whole specification.
use std::{fmt, str::FromStr};

use crate::priors::{
    core::{constants::PRIOR_SEP, directive::Directive, parameters::PriorParameters},
    errors::{PriorError, PriorResult},
};

/// Ordered list of parsed directives.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PriorSpec {
    directives: Vec<Directive>,
}

impl PriorSpec {
    pub fn new(directives: Vec<Directive>) -> Self {
        PriorSpec { directives }
    }

    /// Translate structured parameters through the fixed rule table, then
    /// parse the resulting string.
    pub fn from_parameters(params: &PriorParameters) -> PriorResult<Self> {
        params.to_prior_string().parse()
    }

    pub fn directives(&self) -> &[Directive] {
        &self.directives
    }

    pub fn len(&self) -> usize {
        self.directives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    /// `(mean, tau)` of the last `confidence` directive, for the dispersion
    /// model that consumes it.
    pub fn confidence(&self) -> Option<(f64, f64)> {
        self.directives.iter().rev().find_map(|d| match d {
            Directive::Confidence { mean, tau } => Some((*mean, *tau)),
            _ => None,
        })
    }
}

impl FromStr for PriorSpec {
    type Err = PriorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut directives = Vec::new();
        for line in s.split(PRIOR_SEP) {
            if let Some(d) = Directive::parse_line(line).map_err(|e| e.with_spec(s))? {
                directives.push(d);
            }
        }
        Ok(PriorSpec { directives })
    }
}

impl fmt::Display for PriorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, d) in self.directives.iter().enumerate() {
            if i > 0 {
                write!(f, "{PRIOR_SEP}")?;
            }
            write!(f, "{d}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::priors::core::age_mesh::AgeRange;

    #[test]
    // Purpose
    // -------
    // Directives are split on `,`, blank entries (including a trailing
    // separator) are skipped, and order is preserved.
    fn parses_directive_list_in_order() {
        let spec: PriorSpec = "smooth 100, ,zero 95 100,increasing 0 10,".parse().unwrap();

        assert_eq!(spec.len(), 3);
        assert_eq!(spec.directives()[0].name(), "smooth");
        assert_eq!(spec.directives()[1], Directive::Zero { ages: AgeRange::new(95, 100) });
        assert_eq!(spec.directives()[2].name(), "increasing");
    }

    #[test]
    // Purpose
    // -------
    // A single bad directive fails the whole parse and the error carries the
    // full specification string.
    fn bad_directive_fails_whole_parse() {
        let s = "smooth 100,bumpy 3";

        let err = s.parse::<PriorSpec>().unwrap_err();

        assert_eq!(
            err,
            PriorError::UnrecognizedDirective { name: "bumpy".to_string(), spec: s.to_string() }
        );
    }

    #[test]
    // Purpose
    // -------
    // Re-serializing a parsed specification and parsing it again gives the
    // same directive list.
    fn display_round_trips() {
        let spec: PriorSpec =
            "smooth 25,confidence 1 .1,level_value 0.000000 0 4,at_most 0.3,unimodal 5 60"
                .parse()
                .unwrap();

        let again: PriorSpec = spec.to_string().parse().unwrap();

        assert_eq!(again, spec);
        assert_eq!(spec.confidence(), Some((1.0, 0.1)));
    }

    #[test]
    // Purpose
    // -------
    // An empty string is a valid, empty specification.
    fn empty_string_is_empty_spec() {
        let spec: PriorSpec = "".parse().unwrap();
        assert!(spec.is_empty());
        assert_eq!(spec.confidence(), None);
    }
}
