//! Statistics the chart routines lay themselves out with.
//!
//! Correlation, regression and histogram binning come from `u-analytics`;
//! summary statistics from `u-numflow`. What is left here is the glue between
//! their results and chart geometry: Tukey whiskers, shared bin edges and the
//! density outline violins are drawn from.

use std::f64::consts::PI;

use u_analytics::{
    correlation,
    distribution::{self, BinMethod},
    regression,
};
use u_numflow::stats as summary;

const MAX_BINS: usize = 1000;

/// Whether `values` has a non-zero sample variance
pub fn has_spread(values: &[f64]) -> bool {
    summary::variance(values).is_some_and(|variance| variance > 0.0)
}

pub fn mean(values: &[f64]) -> Option<f64> {
    summary::mean(values)
}

/// Smallest and largest value
pub fn extent(values: &[f64]) -> Option<(f64, f64)> {
    Some((summary::min(values)?, summary::max(values)?))
}

/// Tukey box statistics with whiskers at the furthest points within 1.5 IQR.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

impl BoxStats {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let q1 = summary::quantile(values, 0.25)?;
        let median = summary::median(values)?;
        let q3 = summary::quantile(values, 0.75)?;
        let fence = 1.5 * (q3 - q1);
        let (low_fence, high_fence) = (q1 - fence, q3 + fence);

        let within = |v: &f64| (low_fence..=high_fence).contains(v);
        let inside: Vec<f64> = values.iter().copied().filter(within).collect();
        let (lower_whisker, upper_whisker) = extent(&inside).unwrap_or((q1, q3));

        let mut outliers: Vec<f64> = values.iter().copied().filter(|v| !within(v)).collect();
        outliers.sort_by(f64::total_cmp);

        Some(Self {
            lower_whisker,
            q1,
            median,
            q3,
            upper_whisker,
            outliers,
        })
    }

    /// `[low, q1, median, q3, high]`, the layout box series expect
    pub fn to_vec(&self) -> Vec<f64> {
        vec![
            self.lower_whisker,
            self.q1,
            self.median,
            self.q3,
            self.upper_whisker,
        ]
    }
}

/// Histogram bin edges shared by one or more samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Bins {
    /// Ascending, one more than the number of bins
    edges: Vec<f64>,
}

impl Bins {
    /// Freedman-Diaconis bins over the pooled samples, Sturges when the
    /// interquartile range is degenerate. A constant sample gets a single
    /// unit-wide bin around its value.
    pub fn shared(samples: &[&[f64]]) -> Option<Self> {
        let pooled: Vec<f64> = samples.iter().flat_map(|s| s.iter().copied()).collect();
        let (min, max) = extent(&pooled)?;

        let count = distribution::histogram_bins(&pooled, BinMethod::FreedmanDiaconis)
            .map(|bins| bins.n_bins)
            .filter(|&n| n > 0)
            .or_else(|| {
                distribution::histogram_bins(&pooled, BinMethod::Sturges).map(|bins| bins.n_bins)
            })
            .filter(|&n| n > 0 && max > min);

        let edges = match count {
            Some(count) => {
                let count = count.min(MAX_BINS);
                let width = (max - min) / count as f64;
                (0..=count)
                    .map(|i| if i == count { max } else { min + width * i as f64 })
                    .collect()
            }
            None => vec![min - 0.5, max + 0.5],
        };
        Some(Self { edges })
    }

    pub fn len(&self) -> usize {
        self.edges.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(low, high)` of every bin in order
    pub fn ranges(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.edges.windows(2).map(|pair| (pair[0], pair[1]))
    }

    /// Count of values per bin; the last bin includes its upper edge
    pub fn counts(&self, values: &[f64]) -> Vec<usize> {
        let mut counts = vec![0; self.len()];
        let (Some(&first), Some(&last)) = (self.edges.first(), self.edges.last()) else {
            return counts;
        };

        for &value in values {
            if value < first || value > last {
                continue;
            }
            let index = self.edges.partition_point(|&edge| edge <= value);
            let bin = index.saturating_sub(1).min(counts.len() - 1);
            counts[bin] += 1;
        }
        counts
    }
}

/// Gaussian kernel density estimate with Scott's bandwidth, evaluated on
/// `points` evenly spaced values spanning the sample extended by three
/// bandwidths on each side. Returns `(value, density)` pairs.
pub fn kde(values: &[f64], points: usize) -> Vec<(f64, f64)> {
    let Some((min, max)) = extent(values) else {
        return Vec::new();
    };

    let n = values.len() as f64;
    let spread = summary::std_dev(values).unwrap_or(0.0);
    let bandwidth = if spread > 0.0 {
        spread * n.powf(-0.2)
    } else {
        1.0
    };

    let points = points.max(2);
    let low = min - 3.0 * bandwidth;
    let high = max + 3.0 * bandwidth;
    let step = (high - low) / (points - 1) as f64;
    let norm = 1.0 / (n * bandwidth * (2.0 * PI).sqrt());

    (0..points)
        .map(|i| {
            let x = low + step * i as f64;
            let density = values
                .iter()
                .map(|v| (-0.5 * ((x - v) / bandwidth).powi(2)).exp())
                .sum::<f64>()
                * norm;
            (x, density)
        })
        .collect()
}

/// Pearson correlation of paired samples; `None` when either side has no variance
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if !has_spread(x) || !has_spread(y) {
        return None;
    }
    let columns: [&[f64]; 2] = [x, y];
    let matrix = correlation::correlation_matrix(&columns)?;
    let r = matrix.get(0, 1);
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}

/// A fitted line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

impl LinearFit {
    /// Ordinary least squares; `None` when x has no variance or there are
    /// too few points
    pub fn fit(x: &[f64], y: &[f64]) -> Option<Self> {
        if !has_spread(x) {
            return None;
        }
        let result = regression::simple_linear_regression(x, y)?;
        let fit = Self {
            slope: result.slope,
            intercept: result.intercept,
            r_squared: result.r_squared,
        };
        (fit.slope.is_finite() && fit.intercept.is_finite()).then_some(fit)
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}
