//! # Rayleigh mixture model
//!
//! Density of the centering offset `r >= 0`:
//!
//! ```text
//! p(r) = Σ_k w_k · r/σ_k² · exp(-r² / 2σ_k²)  +  w_lin · 2r / r_max²   (r <= r_max)
//! ```
//!
//! The Rayleigh terms describe well-centered and miscentered populations; the optional linear
//! term is the offset density of positions drawn uniformly inside a disc of radius `r_max`
//! (unrelated center estimates). Weights sum to one.
use std::fmt;

use crate::{clustercen_errors::ClusterCenError, constants::Mpc};

/// Largest number of Rayleigh components supported by the fit.
pub const MAX_RAYLEIGH_COMPONENTS: usize = 3;

pub fn rayleigh_pdf(r: Mpc, sigma: Mpc) -> f64 {
    if r < 0.0 {
        return 0.0;
    }
    let s2 = sigma * sigma;
    r / s2 * (-r * r / (2.0 * s2)).exp()
}

pub fn rayleigh_cdf(r: Mpc, sigma: Mpc) -> f64 {
    if r <= 0.0 {
        return 0.0;
    }
    -(-r * r / (2.0 * sigma * sigma)).exp_m1()
}

pub fn linear_pdf(r: Mpc, r_max: Mpc) -> f64 {
    if !(0.0..=r_max).contains(&r) {
        return 0.0;
    }
    2.0 * r / (r_max * r_max)
}

pub fn linear_cdf(r: Mpc, r_max: Mpc) -> f64 {
    if r <= 0.0 {
        return 0.0;
    }
    (r / r_max).min(1.0).powi(2)
}

/// Shape of the mixture: number of Rayleigh components and presence of the linear term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MixtureModel {
    n_rayleigh: usize,
    linear: bool,
}

impl MixtureModel {
    pub fn new(n_rayleigh: usize, linear: bool) -> Result<Self, ClusterCenError> {
        if !(1..=MAX_RAYLEIGH_COMPONENTS).contains(&n_rayleigh) {
            return Err(ClusterCenError::InvalidFitParameter(format!(
                "n_rayleigh must be in 1..={MAX_RAYLEIGH_COMPONENTS}, got {n_rayleigh}"
            )));
        }
        Ok(MixtureModel { n_rayleigh, linear })
    }

    pub fn n_rayleigh(&self) -> usize {
        self.n_rayleigh
    }

    pub fn has_linear(&self) -> bool {
        self.linear
    }

    /// Number of mixture terms (Rayleigh components plus the linear term).
    pub fn n_terms(&self) -> usize {
        self.n_rayleigh + usize::from(self.linear)
    }

    /// Number of free parameters: one σ per component, `n_terms - 1` weight fractions.
    pub fn n_free_params(&self) -> usize {
        self.n_rayleigh + self.n_terms() - 1
    }
}

/// Parameters of a [`MixtureModel`].
#[derive(Debug, Clone, PartialEq)]
pub struct MixtureParams {
    /// Rayleigh scale of each component, in Mpc.
    pub sigmas: Vec<Mpc>,
    /// Weight of each Rayleigh component.
    pub weights: Vec<f64>,
    /// Weight of the linear term (0 without it).
    pub linear_weight: f64,
    /// Support radius of the linear term, in Mpc.
    pub r_max: Mpc,
}

/// Stick-breaking map from `[0,1]^(k-1)` fractions to `k` weights summing to one.
pub(crate) fn weights_from_fractions(fractions: &[f64]) -> Vec<f64> {
    let mut remaining = 1.0;
    let mut weights = Vec::with_capacity(fractions.len() + 1);
    for &f in fractions {
        let w = remaining * f.clamp(0.0, 1.0);
        weights.push(w);
        remaining -= w;
    }
    weights.push(remaining.max(0.0));
    weights
}

impl MixtureParams {
    /// Decode a parameter vector `[σ_1..σ_n, fraction_1..fraction_(terms-1)]`.
    pub(crate) fn from_free_params(model: &MixtureModel, x: &[f64], r_max: Mpc) -> Self {
        let n = model.n_rayleigh();
        let sigmas = x[..n].to_vec();
        let mut weights = weights_from_fractions(&x[n..model.n_free_params()]);
        let linear_weight = if model.has_linear() {
            weights.pop().unwrap_or(0.0)
        } else {
            0.0
        };
        MixtureParams {
            sigmas,
            weights,
            linear_weight,
            r_max,
        }
    }

    /// Reorder the Rayleigh components by increasing σ.
    pub(crate) fn sort_components(&mut self) {
        let mut pairs: Vec<(Mpc, f64)> = self
            .sigmas
            .iter()
            .copied()
            .zip(self.weights.iter().copied())
            .collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
        (self.sigmas, self.weights) = pairs.into_iter().unzip();
    }

    /// Weighted density of the Rayleigh component `k` at `r`.
    pub fn component_pdf(&self, k: usize, r: Mpc) -> f64 {
        self.weights[k] * rayleigh_pdf(r, self.sigmas[k])
    }

    /// Weighted density of the linear term at `r`.
    pub fn linear_component_pdf(&self, r: Mpc) -> f64 {
        if self.linear_weight == 0.0 {
            return 0.0;
        }
        self.linear_weight * linear_pdf(r, self.r_max)
    }

    pub fn pdf(&self, r: Mpc) -> f64 {
        (0..self.sigmas.len())
            .map(|k| self.component_pdf(k, r))
            .sum::<f64>()
            + self.linear_component_pdf(r)
    }

    pub fn cdf(&self, r: Mpc) -> f64 {
        let rayleigh: f64 = self
            .sigmas
            .iter()
            .zip(&self.weights)
            .map(|(&s, &w)| w * rayleigh_cdf(r, s))
            .sum();
        let linear = if self.linear_weight == 0.0 {
            0.0
        } else {
            self.linear_weight * linear_cdf(r, self.r_max)
        };
        rayleigh + linear
    }

    /// `-Σ ln p(r_i)`.
    ///
    /// Densities are floored at `f64::MIN_POSITIVE`: an offset of exactly zero has zero
    /// density under every term and would otherwise make the objective infinite for all
    /// parameters.
    pub fn negative_log_likelihood(&self, offsets: &[Mpc]) -> f64 {
        offsets
            .iter()
            .map(|&r| -self.pdf(r).max(f64::MIN_POSITIVE).ln())
            .sum()
    }
}

impl fmt::Display for MixtureParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (k, (sigma, weight)) in self.sigmas.iter().zip(&self.weights).enumerate() {
            writeln!(
                f,
                "  rayleigh[{k}]  sigma = {sigma:.4} Mpc  weight = {weight:.4}"
            )?;
        }
        if self.linear_weight > 0.0 {
            writeln!(
                f,
                "  linear       r_max = {:.4} Mpc  weight = {:.4}",
                self.r_max, self.linear_weight
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod mixture_test {
    use super::*;
    use approx::assert_relative_eq;

    fn trapezoid<F: Fn(f64) -> f64>(f: F, a: f64, b: f64, n: usize) -> f64 {
        let h = (b - a) / n as f64;
        let inner: f64 = (1..n).map(|i| f(a + i as f64 * h)).sum();
        h * (0.5 * f(a) + inner + 0.5 * f(b))
    }

    #[test]
    fn test_rayleigh_functions() {
        assert_eq!(rayleigh_pdf(-1.0, 1.0), 0.0);
        assert_eq!(rayleigh_pdf(0.0, 1.0), 0.0);
        assert_relative_eq!(rayleigh_pdf(1.0, 1.0), (-0.5f64).exp());
        assert_relative_eq!(rayleigh_cdf(2.0, 1.0), 1.0 - (-2.0f64).exp());
        assert_relative_eq!(
            trapezoid(|r| rayleigh_pdf(r, 0.3), 0.0, 5.0, 20_000),
            1.0,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_linear_functions() {
        assert_eq!(linear_pdf(2.0, 1.0), 0.0);
        assert_relative_eq!(linear_pdf(0.5, 1.0), 1.0);
        assert_relative_eq!(linear_cdf(0.5, 1.0), 0.25);
        assert_eq!(linear_cdf(3.0, 1.0), 1.0);
    }

    #[test]
    fn test_model_validation() {
        assert!(MixtureModel::new(0, true).is_err());
        assert!(MixtureModel::new(4, false).is_err());

        let model = MixtureModel::new(2, true).unwrap();
        assert_eq!(model.n_terms(), 3);
        assert_eq!(model.n_free_params(), 4);
        assert_eq!(MixtureModel::new(1, false).unwrap().n_free_params(), 1);
    }

    #[test]
    fn test_weights_from_fractions() {
        assert_eq!(weights_from_fractions(&[]), vec![1.0]);
        assert_eq!(weights_from_fractions(&[0.25]), vec![0.25, 0.75]);
        let w = weights_from_fractions(&[0.5, 0.5]);
        assert_eq!(w, vec![0.5, 0.25, 0.25]);
    }

    #[test]
    fn test_mixture_normalization() {
        let model = MixtureModel::new(2, true).unwrap();
        let params = MixtureParams::from_free_params(&model, &[0.05, 0.4, 0.6, 0.5], 1.5);

        assert_eq!(params.weights.len(), 2);
        assert_relative_eq!(params.weights[0], 0.6);
        assert_relative_eq!(params.weights[1], 0.2);
        assert_relative_eq!(params.linear_weight, 0.2);

        let total = trapezoid(|r| params.pdf(r), 0.0, 1.5, 60_000)
            + trapezoid(|r| params.pdf(r), 1.5, 6.0, 60_000);
        assert_relative_eq!(total, 1.0, epsilon = 1e-4);
        assert_relative_eq!(params.cdf(10.0), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_sort_components() {
        let mut params = MixtureParams {
            sigmas: vec![0.5, 0.1],
            weights: vec![0.3, 0.7],
            linear_weight: 0.0,
            r_max: 1.0,
        };
        params.sort_components();
        assert_eq!(params.sigmas, vec![0.1, 0.5]);
        assert_eq!(params.weights, vec![0.7, 0.3]);
    }

    #[test]
    fn test_negative_log_likelihood_zero_offset() {
        let model = MixtureModel::new(1, false).unwrap();
        let params = MixtureParams::from_free_params(&model, &[0.1], 1.0);
        assert!(params.negative_log_likelihood(&[0.0, 0.1]).is_finite());
    }
}
