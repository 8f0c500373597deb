//! Closed-form statistics for the sampling distribution of the difference
//! between two sample proportions.
//!
//! Pure computation, no I/O. The normal CDF and quantile come from `statrs`;
//! everything else is the textbook algebra for the independent-samples
//! approximation.

use statrs::distribution::{ContinuousCDF, Normal};

fn standard_normal() -> Normal {
    // mean 0, sd 1 always passes parameter validation
    Normal::new(0.0, 1.0).expect("standard normal is a valid distribution")
}

/// One observed sample: `n` trials, `successes` of them positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub n: u64,
    pub successes: u64,
    pub p_hat: f64,
}

impl Sample {
    /// Build from a sample size and an observed proportion.
    ///
    /// The implied success count is `round(p_hat * n)`, rounded (not
    /// truncated) for both samples.
    pub fn from_proportion(n: u64, p_hat: f64) -> Self {
        let successes = (p_hat * n as f64).round() as u64;
        Self { n, successes, p_hat }
    }

    /// Build from a sample size and a raw success count; `p_hat = x/n`.
    pub fn from_successes(n: u64, successes: u64) -> Self {
        Self {
            n,
            successes,
            p_hat: successes as f64 / n as f64,
        }
    }
}

/// The sampling distribution of `d-hat = p1 - p2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Difference {
    /// d-hat, the point estimate of the true difference.
    pub point_estimate: f64,
    /// SEd, standard deviation of the sampling distribution of d-hat.
    pub std_error: f64,
}

impl Difference {
    /// Independent-samples approximation:
    /// `SEd = sqrt(p1(1-p1)/n1 + p2(1-p2)/n2)`.
    pub fn between(first: Sample, second: Sample) -> Self {
        let var1 = first.p_hat * (1.0 - first.p_hat) / first.n as f64;
        let var2 = second.p_hat * (1.0 - second.p_hat) / second.n as f64;
        Self {
            point_estimate: first.p_hat - second.p_hat,
            std_error: (var1 + var2).sqrt(),
        }
    }

    /// Invert the standardization: the d-hat value sitting `z` standard
    /// errors from the point estimate.
    pub fn d_hat_for_z(&self, z: f64) -> f64 {
        z * self.std_error + self.point_estimate
    }
}

/// Both samples plus their derived difference, set once per session via
/// command 3 or 4.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StudyParams {
    pub first: Sample,
    pub second: Sample,
    pub diff: Difference,
}

impl StudyParams {
    pub fn new(first: Sample, second: Sample) -> Self {
        Self {
            first,
            second,
            diff: Difference::between(first, second),
        }
    }
}

/// Which tail of the normal curve a one-sided test looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tail {
    Left,
    Right,
}

/// Standardize an observed ratio against a mean proportion and standard error.
pub fn z_score(ratio: f64, p: f64, std_error: f64) -> f64 {
    (ratio - p) / std_error
}

/// Probability of landing at least as far out as `z` in the given tail.
pub fn tail_chance(z: f64, tail: Tail) -> f64 {
    let cdf = standard_normal().cdf(z);
    match tail {
        Tail::Right => 1.0 - cdf,
        Tail::Left => cdf,
    }
}

/// Critical z* for a two-sided confidence level, e.g. 0.95 -> 1.95996.
///
/// `(1 - confidence) / 2` sits in each tail; the quantile of the left tail is
/// negative, so take the absolute value.
pub fn critical_z(confidence: f64) -> f64 {
    let tail = (1.0 - confidence) / 2.0;
    standard_normal().inverse_cdf(tail).abs()
}

/// A confidence interval given by its bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub lower: f64,
    pub upper: f64,
}

impl Interval {
    /// Interval centered on `center` reaching `margin` either way.
    pub fn around(center: f64, margin: f64) -> Self {
        Self {
            lower: center - margin,
            upper: center + margin,
        }
    }

    /// The point estimate is the midpoint of the interval.
    pub fn midpoint(&self) -> f64 {
        (self.lower + self.upper) / 2.0
    }

    /// Distance from the midpoint to either bound.
    pub fn margin_of_error(&self) -> f64 {
        self.upper - self.midpoint()
    }
}
