use serde::Serialize;
use tracing::debug;

use super::error::PlanError;
use super::types::{PlanParameters, SolvedRate};

pub const DEFAULT_SEARCH_MIN: f64 = 1e-6;
pub const DEFAULT_SEARCH_MAX: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    pub search_min: f64,
    pub search_max: f64,
    /// Bracket width at which the search stops.
    pub tolerance: f64,
    pub max_iterations: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            search_min: DEFAULT_SEARCH_MIN,
            search_max: DEFAULT_SEARCH_MAX,
            tolerance: 1e-12,
            max_iterations: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BisectionStep {
    pub iteration: u32,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub candidate_rate: f64,
    pub residual: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RateSolution {
    pub rate: SolvedRate,
    pub residual: f64,
    pub iterations: Vec<BisectionStep>,
    pub converged: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct RateSolver {
    config: SolverConfig,
}

impl Default for RateSolver {
    fn default() -> Self {
        Self {
            config: SolverConfig::default(),
        }
    }
}

impl RateSolver {
    pub fn new(config: SolverConfig) -> Result<Self, PlanError> {
        validate_config(config)?;
        Ok(Self { config })
    }

    pub fn solve(&self, params: &PlanParameters) -> Result<SolvedRate, PlanError> {
        self.solve_detailed(params).map(|solution| solution.rate)
    }

    /// Bisects the rate bracket until its width drops below the configured tolerance.
    ///
    /// The objective is increasing in the rate, so a negative residual moves the
    /// lower bound up and a positive one moves the upper bound down. A target
    /// between the no-interest total and the value at the bracket floor has its
    /// root in `[0, search_min]`, which is bisected the same way.
    pub fn solve_detailed(&self, params: &PlanParameters) -> Result<RateSolution, PlanError> {
        let config = self.config;
        let objective = |rate: f64| future_value(params, rate) - params.target_future_value;

        let lo = config.search_min;
        let hi = config.search_max;
        let low_residual = objective(lo);
        let high_residual = objective(hi);
        let not_bracketed = PlanError::RootNotBracketed {
            lower: config.search_min,
            upper: config.search_max,
        };

        if low_residual.is_nan() || high_residual.is_nan() {
            return Err(not_bracketed);
        }
        if low_residual == 0.0 {
            return Ok(edge_solution(lo, low_residual));
        }
        if high_residual == 0.0 {
            return Ok(edge_solution(hi, high_residual));
        }
        if low_residual > 0.0 {
            let zero_residual = objective(0.0);
            if zero_residual > 0.0 {
                return Err(not_bracketed);
            }
            if zero_residual == 0.0 {
                debug!("target matches no-interest growth");
                return Ok(edge_solution(0.0, zero_residual));
            }
            debug!(floor = lo, "root lies below the bracket floor");
            return self.bisect(&objective, 0.0, lo, not_bracketed);
        }
        if high_residual < 0.0 {
            return Err(not_bracketed);
        }

        self.bisect(&objective, lo, hi, not_bracketed)
    }

    /// Requires `objective(lo) < 0 < objective(hi)`.
    fn bisect<F>(
        &self,
        objective: &F,
        mut lo: f64,
        mut hi: f64,
        not_bracketed: PlanError,
    ) -> Result<RateSolution, PlanError>
    where
        F: Fn(f64) -> f64,
    {
        let config = self.config;
        let mut iterations = Vec::with_capacity(config.max_iterations as usize);
        let mut exact = None;
        let mut converged = false;
        let mut it = 0;
        while it < config.max_iterations {
            it += 1;
            let mid = lo + (hi - lo) * 0.5;
            let residual = objective(mid);
            iterations.push(BisectionStep {
                iteration: it,
                lower_bound: lo,
                upper_bound: hi,
                candidate_rate: mid,
                residual,
            });

            if residual == 0.0 {
                exact = Some(mid);
                converged = true;
                break;
            }
            if residual < 0.0 {
                lo = mid;
            } else {
                hi = mid;
            }

            if hi - lo <= config.tolerance {
                converged = true;
                break;
            }
        }

        let rate = exact.unwrap_or(lo + (hi - lo) * 0.5);
        let residual = objective(rate);
        if !residual.is_finite() {
            return Err(not_bracketed);
        }
        debug!(
            rate,
            residual,
            iterations = iterations.len(),
            converged,
            "rate bisection finished"
        );

        Ok(RateSolution {
            rate: SolvedRate::new(rate),
            residual,
            iterations,
            converged,
        })
    }
}

/// Solves for the periodic rate with the default bracket and tolerance.
pub fn solve_rate(
    initial_deposit: f64,
    periodic_contribution: f64,
    num_periods: u32,
    target_future_value: f64,
) -> Result<SolvedRate, PlanError> {
    let params = PlanParameters::new(
        initial_deposit,
        periodic_contribution,
        num_periods,
        target_future_value,
    )?;
    RateSolver::default().solve(&params)
}

/// Closed-form balance after `num_periods` at `rate`.
///
/// Contributions are annuity-due but start in period 2, so `n - 1` of them
/// compound, matching the period-by-period replay of the schedule.
pub fn future_value(params: &PlanParameters, rate: f64) -> f64 {
    if rate == 0.0 {
        return params.no_interest_total();
    }
    let growth = 1.0 + rate;
    let periods = f64::from(params.num_periods);
    let contributions = f64::from(params.num_periods.saturating_sub(1));

    let deposit_part = params.initial_deposit * growth.powf(periods);
    let contribution_part =
        params.periodic_contribution * ((growth.powf(contributions) - 1.0) / rate) * growth;
    deposit_part + contribution_part
}

fn edge_solution(rate: f64, residual: f64) -> RateSolution {
    RateSolution {
        rate: SolvedRate::new(rate),
        residual,
        iterations: Vec::new(),
        converged: true,
    }
}

fn validate_config(config: SolverConfig) -> Result<(), PlanError> {
    if !config.search_min.is_finite() || !config.search_max.is_finite() {
        return Err(PlanError::invalid("search bounds must be finite"));
    }
    if config.search_min <= 0.0 {
        return Err(PlanError::invalid("search_min must be > 0"));
    }
    if config.search_max <= config.search_min {
        return Err(PlanError::invalid("search_max must be greater than search_min"));
    }
    if !config.tolerance.is_finite() || config.tolerance <= 0.0 {
        return Err(PlanError::invalid("tolerance must be > 0"));
    }
    if config.max_iterations == 0 {
        return Err(PlanError::invalid("max_iterations must be > 0"));
    }
    Ok(())
}
