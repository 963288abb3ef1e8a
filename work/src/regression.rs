//! Reference oracle: synthetic linear regression.
//!
//! A task is a small dataset generated from hidden coefficients plus bounded
//! noise. Solving it means fitting ordinary least squares; verifying means
//! refitting from the task data and comparing the submitted coefficients
//! under the configured [`TolerancePolicy`].
//!
//! Payloads are JSON-encoded structs, so field order is fixed by the struct
//! definitions and the same task always encodes to the same bytes.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use poaw_types::WorkPayload;

use crate::linalg::least_squares;
use crate::{TolerancePolicy, WorkError, WorkOracle};

/// Range the hidden coefficients are drawn from.
const COEFFICIENT_RANGE: f64 = 2.0;
/// Range the feature values are drawn from.
const FEATURE_RANGE: f64 = 10.0;
/// Upper bound on dataset size accepted in a task payload.
const MAX_SAMPLES: usize = 10_000;
/// Upper bound on feature count accepted in a task payload.
const MAX_FEATURES: usize = 64;

/// Shape of generated tasks.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegressionParams {
    #[serde(default = "default_samples")]
    pub samples: usize,
    #[serde(default = "default_features")]
    pub features: usize,
    /// Half-width of the uniform noise added to each target.
    #[serde(default = "default_noise")]
    pub noise: f64,
}

fn default_samples() -> usize {
    64
}

fn default_features() -> usize {
    2
}

fn default_noise() -> f64 {
    0.01
}

impl Default for RegressionParams {
    fn default() -> Self {
        Self {
            samples: default_samples(),
            features: default_features(),
            noise: default_noise(),
        }
    }
}

impl RegressionParams {
    /// Clamp into a shape that always yields a determined system.
    fn normalised(self) -> Self {
        let features = self.features.clamp(1, MAX_FEATURES);
        let samples = self.samples.clamp(features + 1, MAX_SAMPLES);
        let noise = if self.noise.is_finite() {
            self.noise.abs()
        } else {
            0.0
        };
        Self {
            samples,
            features,
            noise,
        }
    }
}

/// A posted regression task.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegressionTask {
    pub seed: u64,
    pub features: Vec<Vec<f64>>,
    pub targets: Vec<f64>,
}

/// A submitted solution.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegressionSolution {
    pub coefficients: Vec<f64>,
}

/// The reference [`WorkOracle`].
#[derive(Clone, Debug)]
pub struct RegressionOracle {
    params: RegressionParams,
    tolerance: TolerancePolicy,
}

impl RegressionOracle {
    pub fn new(params: RegressionParams, tolerance: TolerancePolicy) -> Self {
        Self {
            params: params.normalised(),
            tolerance,
        }
    }

    pub fn params(&self) -> &RegressionParams {
        &self.params
    }

    pub fn tolerance(&self) -> &TolerancePolicy {
        &self.tolerance
    }

    /// Build the dataset for `seed`. Deterministic: equal seeds give equal tasks.
    pub fn generate_task(&self, seed: u64) -> RegressionTask {
        let mut rng = StdRng::seed_from_u64(seed);
        let hidden: Vec<f64> = (0..self.params.features)
            .map(|_| rng.gen_range(-COEFFICIENT_RANGE..=COEFFICIENT_RANGE))
            .collect();

        let mut features = Vec::with_capacity(self.params.samples);
        let mut targets = Vec::with_capacity(self.params.samples);
        for _ in 0..self.params.samples {
            let row: Vec<f64> = (0..self.params.features)
                .map(|_| rng.gen_range(-FEATURE_RANGE..=FEATURE_RANGE))
                .collect();
            let clean: f64 = row.iter().zip(&hidden).map(|(x, w)| x * w).sum();
            let noise = if self.params.noise > 0.0 {
                rng.gen_range(-self.params.noise..=self.params.noise)
            } else {
                0.0
            };
            features.push(row);
            targets.push(clean + noise);
        }

        RegressionTask {
            seed,
            features,
            targets,
        }
    }

    /// Fit the least-squares coefficients for a task.
    pub fn fit(task: &RegressionTask) -> Result<Vec<f64>, WorkError> {
        least_squares(&task.features, &task.targets)
    }

    pub fn encode_task(task: &RegressionTask) -> Result<WorkPayload, WorkError> {
        serde_json::to_vec(task)
            .map(WorkPayload::new)
            .map_err(|e| WorkError::MalformedPayload(e.to_string()))
    }

    pub fn decode_task(payload: &WorkPayload) -> Result<RegressionTask, WorkError> {
        let task: RegressionTask = serde_json::from_slice(payload.as_bytes())
            .map_err(|e| WorkError::MalformedPayload(format!("task: {e}")))?;
        if task.features.len() > MAX_SAMPLES {
            return Err(WorkError::MalformedPayload(format!(
                "task has {} samples, limit is {MAX_SAMPLES}",
                task.features.len()
            )));
        }
        if task.features.first().map_or(0, Vec::len) > MAX_FEATURES {
            return Err(WorkError::MalformedPayload(format!(
                "task exceeds {MAX_FEATURES} features"
            )));
        }
        Ok(task)
    }

    pub fn encode_solution(solution: &RegressionSolution) -> Result<WorkPayload, WorkError> {
        serde_json::to_vec(solution)
            .map(WorkPayload::new)
            .map_err(|e| WorkError::MalformedPayload(e.to_string()))
    }

    pub fn decode_solution(payload: &WorkPayload) -> Result<RegressionSolution, WorkError> {
        serde_json::from_slice(payload.as_bytes())
            .map_err(|e| WorkError::MalformedPayload(format!("solution: {e}")))
    }
}

impl Default for RegressionOracle {
    fn default() -> Self {
        Self::new(RegressionParams::default(), TolerancePolicy::default())
    }
}

impl WorkOracle for RegressionOracle {
    fn name(&self) -> &str {
        "regression"
    }

    fn propose_task(&self) -> Result<WorkPayload, WorkError> {
        let seed: u64 = rand::thread_rng().gen();
        Self::encode_task(&self.generate_task(seed))
    }

    fn solve(&self, task: &WorkPayload) -> Result<WorkPayload, WorkError> {
        let task = Self::decode_task(task)?;
        let coefficients = Self::fit(&task)?;
        Self::encode_solution(&RegressionSolution { coefficients })
    }

    fn verify(&self, task: &WorkPayload, solution: &WorkPayload) -> Result<bool, WorkError> {
        let task = Self::decode_task(task)?;
        let solution = Self::decode_solution(solution)?;
        let reference = match Self::fit(&task) {
            Ok(reference) => reference,
            // A task nobody can solve admits no solution.
            Err(WorkError::Degenerate(_)) => return Ok(false),
            Err(e) => return Err(e),
        };
        Ok(self.tolerance.all_match(&solution.coefficients, &reference))
    }
}
