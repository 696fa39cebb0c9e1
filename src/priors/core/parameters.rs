//! Structured prior parameters and their translation to the prior language.
//!
//! Purpose
//! -------
//! Represent the per-rate expert settings that front ends store as a
//! mapping (smoothness, confidence, level value/bounds, monotone and
//! unimodal windows), load them from JSON, and translate them into a prior
//! string through a fixed rule table.
//!
//! Key behaviors
//! -------------
//! - [`PriorParameters`] deserializes with every key optional; absent keys
//!   translate to nothing (or to the table default for smoothness and
//!   confidence).
//! - [`PriorParameters::to_prior_string`] emits directives in the fixed
//!   order smoothness, confidence, level values, bounds, increasing,
//!   decreasing, unimodal. Each directive is terminated by `,`.
//! - The expert-prior builders read the same struct directly.
//!
//! Conventions
//! -----------
//! - Level values and bounds print in Rust's shortest round-trip form, so
//!   tiny positive bounds stay positive after re-parsing.
//! - Level-value windows are emitted only while they stay inside
//!   `[0, MESH_MAX_AGE]`; monotone/unimodal windows only when
//!   `age_start < age_end`; bounds only when strictly positive.
use std::{fmt::Write as _, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::priors::{
    core::constants::MESH_MAX_AGE,
    errors::{PriorError, PriorResult},
};

/// Smoothness level of the rate curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Smoothness {
    #[default]
    #[serde(rename = "No Prior")]
    NoPrior,
    Slightly,
    Moderately,
    Very,
}

impl Smoothness {
    /// Directive text contributed by this level.
    pub fn directive(&self) -> &'static str {
        match self {
            Smoothness::NoPrior => "",
            Smoothness::Slightly => "smooth 25,",
            Smoothness::Moderately => "smooth 100,",
            Smoothness::Very => "smooth 250,",
        }
    }
}

impl FromStr for Smoothness {
    type Err = PriorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "No Prior" => Ok(Smoothness::NoPrior),
            "Slightly" => Ok(Smoothness::Slightly),
            "Moderately" => Ok(Smoothness::Moderately),
            "Very" => Ok(Smoothness::Very),
            other => Err(PriorError::UnknownSmoothness { label: other.to_string() }),
        }
    }
}

/// Confidence in the data, consumed by the dispersion model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Confidence {
    /// Written as `"None"` in stored parameters.
    #[serde(rename = "None")]
    Zero,
    Slightly,
    Moderately,
    #[default]
    Very,
}

impl Confidence {
    pub fn directive(&self) -> &'static str {
        match self {
            Confidence::Zero => "confidence 0 0,",
            Confidence::Slightly => "confidence 1 .1,",
            Confidence::Moderately => "confidence 10 1,",
            Confidence::Very => "confidence 100 2,",
        }
    }
}

impl FromStr for Confidence {
    type Err = PriorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "None" => Ok(Confidence::Zero),
            "Slightly" => Ok(Confidence::Slightly),
            "Moderately" => Ok(Confidence::Moderately),
            "Very" => Ok(Confidence::Very),
            other => Err(PriorError::UnknownConfidence { label: other.to_string() }),
        }
    }
}

/// Constant level the rate takes before `age_before` and after `age_after`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelValue {
    pub value: f64,
    pub age_before: i64,
    pub age_after: i64,
}

impl Default for LevelValue {
    fn default() -> Self {
        LevelValue { value: 0.0, age_before: 0, age_after: MESH_MAX_AGE }
    }
}

/// Lower/upper bounds on the rate level. Zero means "not set".
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelBounds {
    pub lower: f64,
    pub upper: f64,
}

/// Inclusive age window of a shape constraint. Empty unless `age_start < age_end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgeWindow {
    pub age_start: i64,
    pub age_end: i64,
}

impl AgeWindow {
    pub fn new(age_start: i64, age_end: i64) -> Self {
        AgeWindow { age_start, age_end }
    }

    pub fn is_empty(&self) -> bool {
        self.age_start >= self.age_end
    }
}

/// Structured prior parameters for one rate type.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorParameters {
    pub smoothness: Smoothness,
    pub confidence: Confidence,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level_value: Option<LevelValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level_bounds: Option<LevelBounds>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub increasing: Option<AgeWindow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decreasing: Option<AgeWindow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unimodal: Option<AgeWindow>,
}

impl PriorParameters {
    /// Load parameters from a JSON object.
    ///
    /// # Errors
    /// - [`PriorError::InvalidParameters`] on malformed JSON, unknown
    ///   smoothness/confidence labels, or mistyped fields.
    pub fn from_json_str(json: &str) -> PriorResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Translate into a prior string using the fixed rule table.
    ///
    /// Example: `{smoothness: Moderately, confidence: Slightly,
    /// increasing: {0, 20}}` → `"smooth 100,confidence 1 .1,increasing 0 20,"`.
    pub fn to_prior_string(&self) -> String {
        let mut s = String::new();
        s.push_str(self.smoothness.directive());
        s.push_str(self.confidence.directive());

        let lv = self.level_value.unwrap_or_default();
        let before = lv.age_before - 1;
        if before >= 0 {
            let _ = write!(s, "level_value {} 0 {},", lv.value, before);
        }
        let after = lv.age_after + 1;
        if after <= MESH_MAX_AGE {
            let _ = write!(s, "level_value {} {} {},", lv.value, after, MESH_MAX_AGE);
        }

        let bounds = self.level_bounds.unwrap_or_default();
        if bounds.upper > 0.0 {
            let _ = write!(s, "at_most {},", bounds.upper);
        }
        if bounds.lower > 0.0 {
            let _ = write!(s, "at_least {},", bounds.lower);
        }

        for (name, window) in
            [("increasing", self.increasing), ("decreasing", self.decreasing), ("unimodal", self.unimodal)]
        {
            let w = window.unwrap_or_default();
            if !w.is_empty() {
                let _ = write!(s, "{} {} {},", name, w.age_start, w.age_end);
            }
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::priors::core::{
        directive::{Directive, ExtremumBound},
        prior_spec::PriorSpec,
    };

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover the structured-to-string rule table (defaults,
    // clipping of level windows, positivity of bounds, empty windows) and
    // JSON loading.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Empty parameters translate to the default confidence only.
    fn defaults_emit_only_confidence() {
        assert_eq!(PriorParameters::default().to_prior_string(), "confidence 100 2,");
    }

    #[test]
    // Purpose
    // -------
    // Level windows are emitted only while they stay inside `[0, 100]`.
    //
    // Given
    // -----
    // - `level_value {value: .1, age_before: 15, age_after: 100}`.
    //
    // Expect
    // ------
    // - `level_value 0.1 0 14,` and no trailing window (101 > 100).
    fn level_value_windows_are_clipped() {
        let params = PriorParameters {
            smoothness: Smoothness::Slightly,
            level_value: Some(LevelValue { value: 0.1, age_before: 15, age_after: 100 }),
            ..Default::default()
        };

        assert_eq!(
            params.to_prior_string(),
            "smooth 25,confidence 100 2,level_value 0.1 0 14,"
        );
    }

    #[test]
    // Purpose
    // -------
    // Bounds are emitted only when positive; windows only when non-empty.
    fn bounds_and_windows_follow_rule_table() {
        let params = PriorParameters {
            confidence: Confidence::Zero,
            level_value: Some(LevelValue { value: 0.0, age_before: 0, age_after: 80 }),
            level_bounds: Some(LevelBounds { lower: 0.0, upper: 0.5 }),
            increasing: Some(AgeWindow::new(0, 20)),
            decreasing: Some(AgeWindow::new(30, 30)),
            unimodal: Some(AgeWindow::new(10, 90)),
            ..Default::default()
        };

        assert_eq!(
            params.to_prior_string(),
            "confidence 0 0,level_value 0 81 100,at_most 0.5,\
             increasing 0 20,unimodal 10 90,"
        );
    }

    #[test]
    // Purpose
    // -------
    // Bounds far below one millionth survive the trip through the prior
    // string instead of collapsing to zero.
    //
    // Given
    // -----
    // - `level_bounds {lower: 2.5e-8, upper: 1e-7}`.
    //
    // Expect
    // ------
    // - The string carries `at_most 0.0000001` and `at_least 0.000000025`.
    // - The parsed specification holds the exact bound values.
    fn tiny_bounds_round_trip() {
        let params = PriorParameters {
            level_bounds: Some(LevelBounds { lower: 2.5e-8, upper: 1e-7 }),
            ..Default::default()
        };

        let s = params.to_prior_string();
        let spec = PriorSpec::from_parameters(&params).unwrap();

        assert_eq!(s, "confidence 100 2,at_most 0.0000001,at_least 0.000000025,");
        assert!(spec.directives().contains(&Directive::Extremum { bound: ExtremumBound::AtMost, value: 1e-7 }));
        assert!(
            spec.directives().contains(&Directive::Extremum { bound: ExtremumBound::AtLeast, value: 2.5e-8 })
        );
    }

    #[test]
    // Purpose
    // -------
    // JSON with the stored labels loads, missing nested fields take their
    // defaults, and unknown labels are rejected.
    fn loads_from_json() {
        let params = PriorParameters::from_json_str(
            r#"{"smoothness": "Very", "confidence": "None",
                "level_value": {"value": 0.0, "age_before": 1},
                "level_bounds": {"upper": 0.1},
                "increasing": {"age_start": 0, "age_end": 5}}"#,
        )
        .unwrap();

        assert_eq!(params.smoothness, Smoothness::Very);
        assert_eq!(params.confidence, Confidence::Zero);
        assert_eq!(params.level_value.unwrap().age_after, 100);
        assert_eq!(params.level_bounds.unwrap().lower, 0.0);
        assert!(params.decreasing.is_none());

        let err = PriorParameters::from_json_str(r#"{"smoothness": "Wobbly"}"#).unwrap_err();
        assert!(matches!(err, PriorError::InvalidParameters { .. }));
    }

    #[test]
    // Purpose
    // -------
    // Table labels parse through `FromStr` as stored by front ends.
    fn labels_parse() {
        assert_eq!("No Prior".parse::<Smoothness>().unwrap(), Smoothness::NoPrior);
        assert_eq!("Moderately".parse::<Confidence>().unwrap(), Confidence::Moderately);
        assert!(matches!(
            "Extremely".parse::<Confidence>().unwrap_err(),
            PriorError::UnknownConfidence { .. }
        ));
    }
}
