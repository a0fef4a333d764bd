//! # Bounded Nelder–Mead minimizer
//!
//! Derivative-free simplex minimization of `f: R^n → R` on a box `lower <= x <= upper`.
//! Every trial point is projected back into the box, so the objective is never evaluated
//! outside its domain.
//!
//! The iteration follows the standard reflection / expansion / contraction / shrink
//! sequence with coefficients `(1, 2, 0.5, 0.5)`. It stops when both the spread of the
//! simplex (`max |x_i - x_best|`) and of its values (`max |f_i - f_best|`) fall below the
//! configured tolerances, or after `max_iter` iterations.
//!
//! ```rust
//! use nalgebra::DVector;
//! use clustercen::offsets::minimizer::{minimize_bounded, NelderMeadParams};
//!
//! let f = |x: &DVector<f64>| (x[0] - 1.0).powi(2) + (x[1] + 0.5).powi(2);
//! let lower = DVector::from_vec(vec![-2.0, 0.0]);
//! let upper = DVector::from_vec(vec![2.0, 2.0]);
//! let x0 = DVector::from_vec(vec![0.0, 1.0]);
//!
//! let min = minimize_bounded(f, &x0, &lower, &upper, &NelderMeadParams::default()).unwrap();
//! assert!((min.x[0] - 1.0).abs() < 1e-3);
//! assert!(min.x[1].abs() < 1e-3); // pinned on the lower bound
//! ```
use std::cmp::Ordering::Greater;

use log::debug;
use nalgebra::DVector;

use crate::clustercen_errors::ClusterCenError;

const REFLECTION: f64 = 1.0;
const EXPANSION: f64 = 2.0;
const CONTRACTION: f64 = 0.5;
const SHRINK: f64 = 0.5;

/// Configuration of [`minimize_bounded`].
#[derive(Debug, Clone, PartialEq)]
pub struct NelderMeadParams {
    /// Maximum number of simplex iterations.
    pub max_iter: usize,
    /// Absolute tolerance on the simplex spread in parameter space.
    pub x_tol: f64,
    /// Absolute tolerance on the spread of objective values.
    pub f_tol: f64,
    /// Initial simplex edge, as a fraction of each box width.
    pub initial_step: f64,
}

impl Default for NelderMeadParams {
    fn default() -> Self {
        NelderMeadParams {
            max_iter: 5000,
            x_tol: 1e-7,
            f_tol: 1e-7,
            initial_step: 0.05,
        }
    }
}

impl NelderMeadParams {
    pub fn builder() -> NelderMeadParamsBuilder {
        NelderMeadParamsBuilder::new()
    }

    /// Return true iff x > 0.0 and comparable (i.e., not NaN).
    #[inline]
    fn gt0(x: f64) -> bool {
        x.partial_cmp(&0.0) == Some(Greater)
    }

    /// Check the configuration.
    ///
    /// Validation rules
    /// -----------------
    /// * `max_iter >= 1`
    /// * `x_tol > 0`, `f_tol > 0`
    /// * `0 < initial_step <= 1`
    pub fn validate(&self) -> Result<(), ClusterCenError> {
        if self.max_iter == 0 {
            return Err(ClusterCenError::InvalidFitParameter(
                "max_iter must be >= 1".into(),
            ));
        }
        if !Self::gt0(self.x_tol) || !Self::gt0(self.f_tol) {
            return Err(ClusterCenError::InvalidFitParameter(
                "x_tol and f_tol must be > 0".into(),
            ));
        }
        if !Self::gt0(self.initial_step) || self.initial_step > 1.0 {
            return Err(ClusterCenError::InvalidFitParameter(
                "initial_step must be in (0, 1]".into(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`NelderMeadParams`], with validation.
#[derive(Debug, Clone)]
pub struct NelderMeadParamsBuilder {
    params: NelderMeadParams,
}

impl Default for NelderMeadParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NelderMeadParamsBuilder {
    pub fn new() -> Self {
        Self {
            params: NelderMeadParams::default(),
        }
    }

    pub fn max_iter(mut self, v: usize) -> Self {
        self.params.max_iter = v;
        self
    }
    pub fn x_tol(mut self, v: f64) -> Self {
        self.params.x_tol = v;
        self
    }
    pub fn f_tol(mut self, v: f64) -> Self {
        self.params.f_tol = v;
        self
    }
    pub fn initial_step(mut self, v: f64) -> Self {
        self.params.initial_step = v;
        self
    }

    /// Finalize the builder; see [`NelderMeadParams::validate`] for the rules.
    pub fn build(self) -> Result<NelderMeadParams, ClusterCenError> {
        self.params.validate()?;
        Ok(self.params)
    }
}

/// Outcome of a minimization.
#[derive(Debug, Clone, PartialEq)]
pub struct Minimum {
    pub x: DVector<f64>,
    pub f: f64,
    pub iterations: usize,
    pub converged: bool,
}

struct Bounds<'a> {
    lower: &'a DVector<f64>,
    upper: &'a DVector<f64>,
}

impl Bounds<'_> {
    fn project(&self, x: DVector<f64>) -> DVector<f64> {
        x.zip_zip_map(self.lower, self.upper, |v, lo, hi| v.clamp(lo, hi))
    }
}

/// Minimize `f` on the box `[lower, upper]` starting from `x0`.
///
/// Arguments
/// -----------------
/// * `f`: objective; `NaN` values are treated as `+∞`.
/// * `x0`: starting point, projected into the box.
/// * `lower`, `upper`: box bounds, same length as `x0`, `lower <= upper`.
/// * `params`: iteration and tolerance settings.
///
/// Return
/// ----------
/// * The best vertex found, or [`ClusterCenError::InvalidFitParameter`] on inconsistent bounds.
pub fn minimize_bounded<F>(
    f: F,
    x0: &DVector<f64>,
    lower: &DVector<f64>,
    upper: &DVector<f64>,
    params: &NelderMeadParams,
) -> Result<Minimum, ClusterCenError>
where
    F: Fn(&DVector<f64>) -> f64,
{
    params.validate()?;
    let n = x0.len();
    if n == 0 || lower.len() != n || upper.len() != n {
        return Err(ClusterCenError::InvalidFitParameter(format!(
            "dimension mismatch: x0 {n}, lower {}, upper {}",
            lower.len(),
            upper.len()
        )));
    }
    if lower
        .iter()
        .zip(upper.iter())
        .any(|(lo, hi)| !lo.is_finite() || !hi.is_finite() || lo > hi)
    {
        return Err(ClusterCenError::InvalidFitParameter(
            "bounds must be finite with lower <= upper".into(),
        ));
    }

    let bounds = Bounds { lower, upper };
    let eval = |x: &DVector<f64>| {
        let v = f(x);
        if v.is_nan() {
            f64::INFINITY
        } else {
            v
        }
    };

    // initial simplex: x0 plus one step along each axis, towards the side with more room
    let start = bounds.project(x0.clone());
    let mut simplex: Vec<(DVector<f64>, f64)> = Vec::with_capacity(n + 1);
    simplex.push((start.clone(), eval(&start)));
    for i in 0..n {
        let mut vertex = start.clone();
        let step = params.initial_step * (upper[i] - lower[i]);
        vertex[i] += if upper[i] - vertex[i] >= vertex[i] - lower[i] {
            step
        } else {
            -step
        };
        let vertex = bounds.project(vertex);
        let fv = eval(&vertex);
        simplex.push((vertex, fv));
    }

    for iteration in 0..params.max_iter {
        simplex.sort_by(|a, b| a.1.total_cmp(&b.1));

        let best = &simplex[0];
        let x_spread = simplex[1..]
            .iter()
            .map(|(x, _)| (x - &best.0).amax())
            .fold(0.0, f64::max);
        let f_spread = simplex[1..]
            .iter()
            .map(|(_, fx)| (fx - best.1).abs())
            .fold(0.0, f64::max);
        if x_spread <= params.x_tol && f_spread <= params.f_tol {
            debug!("Nelder-Mead converged after {iteration} iterations, f = {}", best.1);
            return Ok(Minimum {
                x: best.0.clone(),
                f: best.1,
                iterations: iteration,
                converged: true,
            });
        }

        let centroid = simplex[..n]
            .iter()
            .fold(DVector::<f64>::zeros(n), |acc, (x, _)| acc + x)
            / n as f64;
        let (worst_x, worst_f) = simplex[n].clone();
        let second_worst_f = simplex[n - 1].1;
        let best_f = simplex[0].1;

        let xr = bounds.project(&centroid + (&centroid - &worst_x) * REFLECTION);
        let fr = eval(&xr);

        if fr < best_f {
            let xe = bounds.project(&centroid + (&xr - &centroid) * EXPANSION);
            let fe = eval(&xe);
            simplex[n] = if fe < fr { (xe, fe) } else { (xr, fr) };
            continue;
        }
        if fr < second_worst_f {
            simplex[n] = (xr, fr);
            continue;
        }

        let (xc, fc) = if fr < worst_f {
            let xc = bounds.project(&centroid + (&xr - &centroid) * CONTRACTION);
            let fc = eval(&xc);
            (xc, fc)
        } else {
            let xc = bounds.project(&centroid + (&worst_x - &centroid) * CONTRACTION);
            let fc = eval(&xc);
            (xc, fc)
        };
        if fc < fr.min(worst_f) {
            simplex[n] = (xc, fc);
            continue;
        }

        let best_x = simplex[0].0.clone();
        for vertex in simplex.iter_mut().skip(1) {
            let x = bounds.project(&best_x + (&vertex.0 - &best_x) * SHRINK);
            let fx = eval(&x);
            *vertex = (x, fx);
        }
    }

    simplex.sort_by(|a, b| a.1.total_cmp(&b.1));
    let (x, fx) = simplex.swap_remove(0);
    debug!(
        "Nelder-Mead stopped after {} iterations without converging, f = {fx}",
        params.max_iter
    );
    Ok(Minimum {
        x,
        f: fx,
        iterations: params.max_iter,
        converged: false,
    })
}
