//! # Maximum-likelihood fit of the offset distribution
//!
//! Fits a [`MixtureModel`] to a sample of centering offsets by minimizing the negative
//! log-likelihood with the bounded Nelder–Mead minimizer.
//!
//! ## Parametrization
//! -----------------
//! The free parameter vector is
//!
//! ```text
//! [σ_1 .. σ_n, f_1 .. f_(K-1)]      K = n + (linear ? 1 : 0)
//! ```
//!
//! with `σ_k ∈ [sigma_min, sigma_max]` and stick-breaking fractions `f_j ∈ [0, 1]`, so the
//! weights always sum to one without a redundant direction. The fitted Rayleigh components
//! are sorted by increasing σ: component 0 is the well-centered population.
//!
//! ## Classification
//! -----------------
//! [`OffsetFit::cutoff_radius`] returns the radius enclosing a given fraction of the
//! narrowest component, `σ_1 · sqrt(-2 ln(1 - q))`. Offsets at or below it are
//! [`Centering::WellCentered`](super::Centering::WellCentered).
use std::cmp::Ordering::Greater;
use std::fmt;
use std::iter::repeat;

use log::{info, warn};
use nalgebra::DVector;

use super::{
    minimizer::{minimize_bounded, NelderMeadParams},
    mixture::{rayleigh_pdf, MixtureModel, MixtureParams},
    Centering,
};
use crate::{clustercen_errors::ClusterCenError, constants::Mpc};

/// Configuration of [`fit_offsets`].
#[derive(Debug, Clone, PartialEq)]
pub struct FitParams {
    /// Lower bound on every σ, in Mpc.
    pub sigma_min: Mpc,
    /// Upper bound on every σ, in Mpc.
    pub sigma_max: Mpc,
    /// Support of the linear term; defaults to the largest offset of the sample.
    pub r_max: Option<Mpc>,
    /// Starting σ per component; derived from the sample RMS when absent.
    pub initial_sigmas: Option<Vec<Mpc>>,
    pub minimizer: NelderMeadParams,
}

impl Default for FitParams {
    fn default() -> Self {
        FitParams {
            sigma_min: 1e-4,
            sigma_max: 5.0,
            r_max: None,
            initial_sigmas: None,
            minimizer: NelderMeadParams::default(),
        }
    }
}

impl FitParams {
    pub fn builder() -> FitParamsBuilder {
        FitParamsBuilder::new()
    }

    #[inline]
    fn gt0(x: f64) -> bool {
        x.partial_cmp(&0.0) == Some(Greater)
    }

    /// Check the configuration.
    ///
    /// Validation rules
    /// -----------------
    /// * `0 < sigma_min < sigma_max`, both finite.
    /// * `r_max > 0` and finite when set.
    /// * every initial σ inside `[sigma_min, sigma_max]` when set.
    /// * the minimizer settings pass [`NelderMeadParams::validate`].
    pub fn validate(&self) -> Result<(), ClusterCenError> {
        if !Self::gt0(self.sigma_min)
            || !self.sigma_max.is_finite()
            || self.sigma_min >= self.sigma_max
        {
            return Err(ClusterCenError::InvalidFitParameter(
                "require 0 < sigma_min < sigma_max".into(),
            ));
        }
        if let Some(r_max) = self.r_max {
            if !Self::gt0(r_max) || !r_max.is_finite() {
                return Err(ClusterCenError::InvalidFitParameter(
                    "r_max must be a finite positive number".into(),
                ));
            }
        }
        if let Some(sigmas) = &self.initial_sigmas {
            if sigmas
                .iter()
                .any(|s| !(self.sigma_min..=self.sigma_max).contains(s))
            {
                return Err(ClusterCenError::InvalidFitParameter(
                    "initial sigmas must lie in [sigma_min, sigma_max]".into(),
                ));
            }
        }
        self.minimizer.validate()
    }
}

/// Builder for [`FitParams`], with validation.
#[derive(Debug, Clone)]
pub struct FitParamsBuilder {
    params: FitParams,
}

impl Default for FitParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FitParamsBuilder {
    pub fn new() -> Self {
        Self {
            params: FitParams::default(),
        }
    }

    pub fn sigma_min(mut self, v: Mpc) -> Self {
        self.params.sigma_min = v;
        self
    }
    pub fn sigma_max(mut self, v: Mpc) -> Self {
        self.params.sigma_max = v;
        self
    }
    pub fn r_max(mut self, v: Mpc) -> Self {
        self.params.r_max = Some(v);
        self
    }
    pub fn initial_sigmas(mut self, v: Vec<Mpc>) -> Self {
        self.params.initial_sigmas = Some(v);
        self
    }
    pub fn minimizer(mut self, v: NelderMeadParams) -> Self {
        self.params.minimizer = v;
        self
    }

    /// Finalize the builder; see [`FitParams::validate`] for the rules.
    pub fn build(self) -> Result<FitParams, ClusterCenError> {
        self.params.validate()?;
        Ok(self.params)
    }
}

/// Result of [`fit_offsets`].
#[derive(Debug, Clone, PartialEq)]
pub struct OffsetFit {
    pub model: MixtureModel,
    pub params: MixtureParams,
    /// Negative log-likelihood at the optimum.
    pub nll: f64,
    pub n_samples: usize,
    pub iterations: usize,
    pub converged: bool,
}

impl OffsetFit {
    /// σ of the well-centered (narrowest) component.
    pub fn well_centered_sigma(&self) -> Mpc {
        self.params.sigmas[0]
    }

    /// Radius enclosing `percentile` of the narrowest Rayleigh component.
    ///
    /// Return
    /// ----------
    /// * `σ_1 · sqrt(-2 ln(1 - percentile))`, or an error unless `0 < percentile < 1`.
    pub fn cutoff_radius(&self, percentile: f64) -> Result<Mpc, ClusterCenError> {
        if !(percentile > 0.0 && percentile < 1.0) {
            return Err(ClusterCenError::InvalidFitParameter(format!(
                "percentile must be in (0, 1), got {percentile}"
            )));
        }
        Ok(self.well_centered_sigma() * (-2.0 * (-percentile).ln_1p()).sqrt())
    }

    /// Posterior probability that an offset `r` belongs to the well-centered component.
    pub fn well_centered_probability(&self, r: Mpc) -> f64 {
        let total = self.params.pdf(r);
        if total <= 0.0 {
            return 0.0;
        }
        self.params.weights[0] * rayleigh_pdf(r, self.params.sigmas[0]) / total
    }

    /// Classify an offset against the `percentile` cutoff of the fit.
    pub fn classify(&self, r: Mpc, percentile: f64) -> Result<Centering, ClusterCenError> {
        Ok(super::classify(r, self.cutoff_radius(percentile)?))
    }
}

impl fmt::Display for OffsetFit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Offset fit: {} Rayleigh component(s){}, {} samples",
            self.model.n_rayleigh(),
            if self.model.has_linear() {
                " + linear term"
            } else {
                ""
            },
            self.n_samples
        )?;
        write!(f, "{}", self.params)?;
        write!(
            f,
            "  -lnL = {:.4}  ({} iterations, converged: {})",
            self.nll, self.iterations, self.converged
        )
    }
}

/// Starting σ for each component, spread around the single-Rayleigh estimate.
fn default_initial_sigmas(offsets: &[Mpc], n_rayleigh: usize) -> Vec<Mpc> {
    let mean_sq = offsets.iter().map(|r| r * r).sum::<f64>() / offsets.len() as f64;
    let sigma_rms = (mean_sq / 2.0).sqrt();
    let factors: &[f64] = match n_rayleigh {
        1 => &[1.0],
        2 => &[0.5, 2.0],
        _ => &[0.3, 1.0, 3.0],
    };
    factors.iter().map(|k| k * sigma_rms).collect()
}

/// Fit a Rayleigh mixture to centering offsets.
///
/// Arguments
/// -----------------
/// * `offsets`: sample of projected offsets, in Mpc (finite, non-negative, at least 2).
/// * `model`: number of Rayleigh components and presence of the linear term.
/// * `params`: bounds, starting point and minimizer settings.
///
/// Return
/// ----------
/// * The [`OffsetFit`] with components sorted by σ, or
///   [`ClusterCenError::InvalidOffsetSample`] / [`ClusterCenError::InvalidFitParameter`].
pub fn fit_offsets(
    offsets: &[Mpc],
    model: &MixtureModel,
    params: &FitParams,
) -> Result<OffsetFit, ClusterCenError> {
    // the fields are public, so a struct literal may bypass the builder
    params.validate()?;
    if offsets.len() < 2 {
        return Err(ClusterCenError::InvalidOffsetSample(format!(
            "at least 2 offsets are required, got {}",
            offsets.len()
        )));
    }
    if let Some(bad) = offsets.iter().find(|r| !r.is_finite() || **r < 0.0) {
        return Err(ClusterCenError::InvalidOffsetSample(format!(
            "offsets must be finite and non-negative, got {bad}"
        )));
    }

    let r_max = params
        .r_max
        .unwrap_or_else(|| offsets.iter().copied().fold(0.0, f64::max));
    if model.has_linear() && r_max <= 0.0 {
        return Err(ClusterCenError::InvalidOffsetSample(
            "linear term needs a positive r_max, all offsets are zero".into(),
        ));
    }

    let n = model.n_rayleigh();
    let n_terms = model.n_terms();
    let sigmas = match &params.initial_sigmas {
        Some(s) if s.len() == n => s.clone(),
        Some(s) => {
            return Err(ClusterCenError::InvalidFitParameter(format!(
                "{} initial sigmas given for {n} components",
                s.len()
            )))
        }
        None => default_initial_sigmas(offsets, n),
    };

    // equal starting weights
    let fractions = (0..n_terms - 1).map(|j| 1.0 / (n_terms - j) as f64);
    let x0 = DVector::from_iterator(
        model.n_free_params(),
        sigmas
            .iter()
            .map(|s| s.clamp(params.sigma_min, params.sigma_max))
            .chain(fractions),
    );
    let lower = DVector::from_iterator(
        model.n_free_params(),
        repeat(params.sigma_min).take(n).chain(repeat(0.0).take(n_terms - 1)),
    );
    let upper = DVector::from_iterator(
        model.n_free_params(),
        repeat(params.sigma_max).take(n).chain(repeat(1.0).take(n_terms - 1)),
    );

    let objective = |x: &DVector<f64>| {
        MixtureParams::from_free_params(model, x.as_slice(), r_max).negative_log_likelihood(offsets)
    };
    let minimum = minimize_bounded(objective, &x0, &lower, &upper, &params.minimizer)?;

    if !minimum.converged {
        warn!(
            "Offset fit did not converge after {} iterations",
            minimum.iterations
        );
    }

    let mut fitted = MixtureParams::from_free_params(model, minimum.x.as_slice(), r_max);
    fitted.sort_components();

    let fit = OffsetFit {
        model: *model,
        params: fitted,
        nll: minimum.f,
        n_samples: offsets.len(),
        iterations: minimum.iterations,
        converged: minimum.converged,
    };
    info!("{fit}");
    Ok(fit)
}
