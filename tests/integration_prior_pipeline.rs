//! Integration tests for prior compilation and rate-model likelihoods.
//!
//! Purpose
//! -------
//! - Validate the end-to-end path a caller takes: from a prior string or
//!   structured parameters, through compiled potentials and expert priors,
//!   to a joint log-density that also includes observation likelihoods.
//!
//! Coverage
//! --------
//! - `priors`: string and JSON entry points, potential evaluation on a
//!   realistic prevalence curve, expert level/derivative constraints,
//!   configuration errors.
//! - `likelihood`: rate models fed with mesh-matched expected rates,
//!   predictive draws with a seeded RNG, validation errors.
//!
//! Exclusions
//! ----------
//! - Per-kind numeric edge cases of potentials and kernels; those are
//!   covered by unit tests next to the code.
use age_rate_terms::prelude::*;
use age_rate_terms::priors::PotentialKind;
use ndarray::{Array1, array};
use rand::{SeedableRng, rngs::StdRng};

/// Purpose
/// -------
/// A prevalence-like curve on ages `0..=100`: rising linearly to age 60,
/// flat to 94, and exactly zero from 95 on.
fn prevalence_curve() -> Array1<f64> {
    Array1::from_iter((0..=100).map(|a| match a {
        0..=60 => 0.001 + 0.0005 * a as f64,
        61..=94 => 0.001 + 0.0005 * 60.0,
        _ => 0.0,
    }))
}

#[test]
// Purpose
// -------
// The reference prior string compiles to three terms whose one-sided
// constraints vanish on a compliant curve.
//
// Given
// -----
// - `"smooth 100,zero 95 100,increasing 0 10"` on the standard mesh.
// - A curve that is increasing on 0..=10 and zero on 95..=100.
//
// Expect
// ------
// - `zero` and `increasing` contribute exactly 0.
// - `smooth` is strictly negative (the drop to zero is not smooth).
// - The joint density equals the smooth term.
fn reference_prior_on_compliant_curve() {
    let mesh = AgeMesh::standard();
    let potentials = generate_prior_potentials("smooth 100,zero 95 100,increasing 0 10", &mesh, "p")
        .expect("reference prior should compile");
    let curve = prevalence_curve();

    assert_eq!(potentials.len(), 3);
    let by_name = |name: &str| {
        potentials.iter().find(|p| p.name() == name).unwrap_or_else(|| panic!("missing {name}"))
    };
    let smooth = by_name("smooth_{0,101}^p").log_density(curve.view()).unwrap();
    assert!(smooth < 0.0);
    assert_eq!(by_name("zero_{95,100}^p").log_density(curve.view()).unwrap(), 0.0);
    assert_eq!(by_name("increasing_{0,10}^p").log_density(curve.view()).unwrap(), 0.0);
    assert_eq!(joint_log_density(&potentials, curve.view()).unwrap(), smooth);
}

#[test]
// Purpose
// -------
// Breaking a constraint makes its potential dominate the joint density.
//
// Given
// -----
// - The reference prior and the prevalence curve with age 5 lowered below
//   age 4, and age 97 set to 0.01.
//
// Expect
// ------
// - Both the `increasing` and the `zero` terms become strongly negative.
fn violations_are_penalized() {
    let mesh = AgeMesh::standard();
    let potentials =
        generate_prior_potentials("smooth 100,zero 95 100,increasing 0 10", &mesh, "p").unwrap();
    let mut curve = prevalence_curve();
    curve[5] = 0.0001;
    curve[97] = 0.01;

    for p in &potentials {
        match p.kind() {
            PotentialKind::Smooth { .. } => {}
            _ => assert!(p.log_density(curve.view()).unwrap() < -1e6, "{} should penalize", p.name()),
        }
    }
}

#[test]
// Purpose
// -------
// Structured parameters go through the same grammar as prior strings.
//
// Given
// -----
// - JSON with `Moderately` smoothness, `Slightly` confidence, an increasing
//   window 0..20 and an upper level bound.
//
// Expect
// ------
// - The canonical spec carries the confidence pair `(1, 0.1)`.
// - Compiled potentials are smooth, at_most and increasing, in that order.
fn structured_parameters_compile_like_strings() {
    let params = PriorParameters::from_json_str(
        r#"{
            "smoothness": "Moderately",
            "confidence": "Slightly",
            "level_bounds": {"lower": 0.0, "upper": 0.5},
            "increasing": {"age_start": 0, "age_end": 20}
        }"#,
    )
    .unwrap();

    let spec = PriorSpec::from_parameters(&params).unwrap();
    let from_string = generate_prior_potentials(&params.to_prior_string(), &AgeMesh::standard(), "i").unwrap();

    assert_eq!(spec.confidence(), Some((1.0, 0.1)));
    let names: Vec<&str> = from_string.iter().map(|p| p.name()).collect();
    assert_eq!(names, vec!["smooth_{0,101}^i", "at_most{0.5}^i", "increasing_{0,20}^i"]);

    let reparsed: PriorSpec = spec.to_string().parse().unwrap();
    assert_eq!(reparsed, spec);
}

#[test]
// Purpose
// -------
// A malformed prior string is a configuration error that names the full
// specification and compiles nothing.
fn malformed_prior_is_configuration_error() {
    let bad = "smooth 100,wiggly 3 4";

    let err = generate_prior_potentials(bad, &AgeMesh::standard(), "p").unwrap_err();

    assert!(err.is_configuration());
    assert!(err.to_string().contains(bad));
    assert!(matches!(err, PriorError::UnrecognizedDirective { .. }));
}

#[test]
// Purpose
// -------
// Expert priors built from the same parameters act on the mean curve.
//
// Given
// -----
// - Level value 0 outside ages 10..=90, bounds `[0.001, 0.05]`.
// - Increasing on 0..60, decreasing on 60..100.
//
// Expect
// ------
// - The constrained curve is pinned to the clipped level outside the window.
// - The derivative constraint is 0 on the prevalence curve (which is flat
//   after 60) and negative once the tail rises.
fn expert_priors_on_mean_curve() {
    let mesh = AgeMesh::standard();
    let params = PriorParameters::from_json_str(
        r#"{
            "level_value": {"value": 0.0, "age_before": 10, "age_after": 90},
            "level_bounds": {"lower": 0.001, "upper": 0.05},
            "increasing": {"age_start": 0, "age_end": 60},
            "decreasing": {"age_start": 60, "age_end": 100}
        }"#,
    )
    .unwrap();
    let curve = prevalence_curve();

    let level = level_constraints("p", &params, &mesh).expect("level constraint expected");
    let mu = level.mu_age(curve.view());
    assert_eq!(mu[0], 0.001);
    assert_eq!(mu[100], 0.001);
    assert_eq!(mu[50], curve[50]);
    assert!(level.log_density(curve.view()).unwrap() < 0.0);

    let slope = derivative_constraints("p", &params, &mesh).expect("derivative constraint expected");
    assert_eq!(slope.log_density(curve.view()), 0.0);
    let mut rising_tail = curve.clone();
    rising_tail[80] = 0.04;
    assert!(slope.log_density(rising_tail.view()) < 0.0);
}

#[test]
// Purpose
// -------
// Prior potentials and observation likelihoods combine into one joint
// log-density over the same rate curve.
//
// Given
// -----
// - Three prevalence observations at ages 20, 40, 60 with sample sizes.
// - `pi` read off the curve at those ages.
//
// Expect
// ------
// - Binomial and beta-binomial observation terms are finite and negative.
// - Moving `pi` away from the data lowers the binomial log-likelihood.
fn priors_and_likelihood_share_the_curve() {
    let mesh = AgeMesh::standard();
    let potentials = generate_prior_potentials("smooth 25,increasing 0 60", &mesh, "p").unwrap();
    let curve = prevalence_curve();
    let ages = [20usize, 40, 60];
    let pi: Array1<f64> = ages.iter().map(|&a| curve[a]).collect();
    let p = array![0.012, 0.02, 0.03];
    let n = array![500.0, 800.0, 1000.0];

    let model = RateModel::binom("p", pi.view(), p.view(), n.view()).unwrap();
    let ll = model.log_density(pi.view(), &FamilyParams::Plain).unwrap();
    let prior = joint_log_density(&potentials, curve.view()).unwrap();
    let joint = ll + prior;

    assert!(ll.is_finite() && ll < 0.0);
    assert!(joint <= ll);

    let far = pi.mapv(|v| v * 3.0);
    assert!(model.log_density(far.view(), &FamilyParams::Plain).unwrap() < ll);

    let bb = RateModel::beta_binom("p", pi.view(), p.view(), n.view()).unwrap();
    let latent = bb.latent().unwrap().pi_latent_init().to_owned();
    let params = FamilyParams::Latent { p_alpha: 50.0, pi_latent: latent.view() };
    let bb_ll = bb.log_density(pi.view(), &params).unwrap();
    assert!(bb_ll.is_finite());
}

#[test]
// Purpose
// -------
// Every family with a predictive term can be constructed from the same
// data and drawn from with one seeded RNG.
//
// Expect
// ------
// - One draw per row, all finite and non-negative.
// - The lower-bound model has no draw.
fn every_family_draws_predictions() {
    let pi = array![0.02, 0.05];
    let p = array![0.018, 0.06];
    let n = array![1000.0, 0.0];
    let s = array![0.004, f64::INFINITY];
    let mut rng = StdRng::seed_from_u64(7);

    let count_models = [
        (RateModel::binom("a", pi.view(), p.view(), n.view()).unwrap(), FamilyParams::Plain),
        (RateModel::poisson("a", pi.view(), p.view(), n.view()).unwrap(), FamilyParams::Plain),
        (
            RateModel::neg_binom("a", pi.view(), p.view(), n.view()).unwrap(),
            FamilyParams::Dispersion { delta: 50.0 },
        ),
        (
            RateModel::normal("a", pi.view(), p.view(), s.view()).unwrap(),
            FamilyParams::Spread { sigma: 0.001 },
        ),
        (
            RateModel::log_normal("a", pi.view(), p.view(), s.view()).unwrap(),
            FamilyParams::Spread { sigma: 0.1 },
        ),
        (
            RateModel::offset_log_normal("a", pi.view(), p.view(), s.view()).unwrap(),
            FamilyParams::OffsetSpread { sigma: 0.1, zeta: 1e-6 },
        ),
    ];

    for (model, params) in &count_models {
        let draw = model
            .sample_predictive(pi.view(), params, &mut rng)
            .unwrap()
            .unwrap_or_else(|| panic!("{} should have a predictive term", model.family()));
        assert_eq!(draw.len(), 2);
        assert!(model.log_density(pi.view(), params).unwrap().is_finite());
        if model.family() != RateFamily::Normal {
            assert!(draw.iter().all(|v| v.is_finite() && *v >= 0.0), "{}", model.family());
        }
    }

    let lower = RateModel::neg_binom_lower_bound("a", pi.view(), p.view(), array![10.0, 20.0].view()).unwrap();
    let none = lower.sample_predictive(pi.view(), &FamilyParams::Dispersion { delta: 5.0 }, &mut rng).unwrap();
    assert!(none.is_none());
}

#[test]
// Purpose
// -------
// Families are selectable by name and reject bad data up front.
fn family_by_name_validates_data() {
    let family: RateFamily = "log_normal".parse().unwrap();
    let pi = array![0.1];

    let err = RateModel::new(family, "x", pi.view(), array![0.0].view(), array![0.1].view()).unwrap_err();

    assert!(err.is_validation());
    assert!(matches!(err, LikelihoodError::NonPositiveValue { index: 0, .. }));
}
