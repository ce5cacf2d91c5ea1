//! Summary statistics used by the QC figures
//!
//! Percentiles for intensity windows, medians, equal-width histograms and
//! a Gaussian kernel density estimate for reference distributions.

use crate::error::{QcError, QcResult};

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_unstable_by(|a, b| a.total_cmp(b));
    sorted
}

fn percentile_of_sorted(sorted: &[f64], q: f64) -> f64 {
    let pos = q / 100.0 * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = (lo + 1).min(sorted.len() - 1);
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Percentile `q` (0-100) with linear interpolation between closest ranks
pub fn percentile(values: &[f64], q: f64) -> QcResult<f64> {
    let mut out = percentiles(values, &[q])?;
    Ok(out.remove(0))
}

/// Several percentiles computed from a single sort
pub fn percentiles(values: &[f64], qs: &[f64]) -> QcResult<Vec<f64>> {
    if values.is_empty() {
        return Err(QcError::EmptySelection("percentile of an empty set".to_string()));
    }
    let sorted = sorted(values);
    Ok(qs
        .iter()
        .map(|&q| percentile_of_sorted(&sorted, q.clamp(0.0, 100.0)))
        .collect())
}

/// Median, averaging the two middle values for even counts
pub fn median(values: &[f64]) -> QcResult<f64> {
    if values.is_empty() {
        return Err(QcError::EmptySelection("median of an empty set".to_string()));
    }
    let sorted = sorted(values);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Ok((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Ok(sorted[mid])
    }
}

/// Equal-width histogram over the data range
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// `bins + 1` bin edges, ascending
    pub edges: Vec<f64>,
    /// Count per bin; the last bin includes its right edge
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Bin `values` into `bins` equal-width bins spanning [min, max]
    ///
    /// A constant input is widened to [v - 0.5, v + 0.5]. Infinite or NaN
    /// values leave the range undefined and fail with `InvalidVolume`.
    pub fn new(values: &[f64], bins: usize) -> QcResult<Self> {
        if bins == 0 {
            return Err(QcError::Config("histogram needs at least one bin".to_string()));
        }
        if values.is_empty() {
            return Err(QcError::EmptySelection("histogram of an empty set".to_string()));
        }
        if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(QcError::InvalidVolume(format!(
                "histogram range is not finite (found {})", bad
            )));
        }

        let mut min_val = values.iter().fold(f64::INFINITY, |a, &b| a.min(b));
        let mut max_val = values.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));
        if min_val == max_val {
            min_val -= 0.5;
            max_val += 0.5;
        }

        let bin_width = (max_val - min_val) / bins as f64;
        let edges: Vec<f64> = (0..=bins).map(|i| min_val + i as f64 * bin_width).collect();

        let mut counts = vec![0usize; bins];
        for &v in values {
            let bin = ((v - min_val) / bin_width).floor() as usize;
            counts[bin.min(bins - 1)] += 1;
        }

        Ok(Histogram { edges, counts })
    }

    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Points at which a density curve is evaluated
pub const KDE_GRID_SIZE: usize = 100;
/// Bandwidths the evaluation grid extends past the data on each side
pub const KDE_CUT: f64 = 3.0;

/// Gaussian kernel density estimate with Scott's bandwidth
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianKde {
    pub bandwidth: f64,
    /// Evaluation grid, ascending
    pub support: Vec<f64>,
    /// Density at each support point
    pub density: Vec<f64>,
}

impl GaussianKde {
    /// Fit to `values` and evaluate on a grid spanning the data +/- 3 bandwidths
    ///
    /// Needs at least two values with non-zero spread.
    pub fn fit(values: &[f64]) -> QcResult<Self> {
        let n = values.len();
        if n < 2 {
            return Err(QcError::UndefinedReference(format!(
                "density estimate needs at least 2 values, got {}", n
            )));
        }

        let mean = values.iter().sum::<f64>() / n as f64;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        let std = var.sqrt();
        if !(std.is_finite() && std > 0.0) {
            return Err(QcError::UndefinedReference(
                "density estimate needs values with non-zero spread".to_string(),
            ));
        }

        let bandwidth = std * (n as f64).powf(-0.2);
        let lo = values.iter().fold(f64::INFINITY, |a, &b| a.min(b)) - KDE_CUT * bandwidth;
        let hi = values.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b)) + KDE_CUT * bandwidth;
        let step = (hi - lo) / (KDE_GRID_SIZE - 1) as f64;

        let norm = 1.0 / (n as f64 * bandwidth * (2.0 * std::f64::consts::PI).sqrt());
        let support: Vec<f64> = (0..KDE_GRID_SIZE).map(|i| lo + i as f64 * step).collect();
        let density = support
            .iter()
            .map(|&x| {
                norm * values
                    .iter()
                    .map(|&xi| (-0.5 * ((x - xi) / bandwidth).powi(2)).exp())
                    .sum::<f64>()
            })
            .collect();

        Ok(GaussianKde { bandwidth, support, density })
    }
}

/// Format like C's `%g`: six significant digits, trailing zeros dropped,
/// scientific notation for exponents below -4 or from 6 up.
pub fn format_general(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let sci = format!("{:.5e}", value);
    let (mantissa, exponent) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };

    if !(-4..6).contains(&exponent) {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", strip_zeros(mantissa), sign, exponent.abs())
    } else {
        let decimals = (5 - exponent) as usize;
        strip_zeros(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn strip_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}
