use tracing::{info, warn};

use super::error::PlanError;
use super::schedule::{chart_series, generate_schedule_with};
use super::solver::{RateSolver, SolverConfig};
use super::types::{ChartSeries, InterestRounding, PlanParameters, Schedule, SolvedRate};

#[derive(Debug, Clone)]
pub struct PlanCalculation {
    pub params: PlanParameters,
    pub rate: SolvedRate,
    pub iterations: u32,
    pub residual: f64,
    pub schedule: Schedule,
    pub chart: ChartSeries,
}

/// Stateless calculation service, built once and shared by every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanCalculator {
    solver: RateSolver,
    rounding: InterestRounding,
}

impl PlanCalculator {
    pub fn new(config: SolverConfig, rounding: InterestRounding) -> Result<Self, PlanError> {
        Ok(Self {
            solver: RateSolver::new(config)?,
            rounding,
        })
    }

    pub fn calculate(&self, params: &PlanParameters) -> Result<PlanCalculation, PlanError> {
        let solution = match self.solver.solve_detailed(params) {
            Ok(solution) => solution,
            Err(err) => {
                warn!(
                    initial_deposit = params.initial_deposit,
                    periodic_contribution = params.periodic_contribution,
                    num_periods = params.num_periods,
                    target_future_value = params.target_future_value,
                    error = %err,
                    "rate solve failed"
                );
                return Err(err);
            }
        };

        let schedule = generate_schedule_with(
            params.initial_deposit,
            params.periodic_contribution,
            params.num_periods,
            solution.rate.value(),
            self.rounding,
        )?;
        let chart = chart_series(
            &schedule,
            params.initial_deposit,
            params.periodic_contribution,
        );

        info!(
            rate = solution.rate.value(),
            num_periods = params.num_periods,
            final_balance = schedule.final_balance(),
            "plan calculated"
        );

        Ok(PlanCalculation {
            params: *params,
            rate: solution.rate,
            iterations: solution.iterations.len() as u32,
            residual: solution.residual,
            schedule,
            chart,
        })
    }
}
