mod calculator;
mod error;
mod schedule;
mod solver;
mod types;

pub use calculator::{PlanCalculation, PlanCalculator};
pub use error::PlanError;
pub use schedule::{chart_series, generate_schedule, generate_schedule_with, no_interest_balance};
pub use solver::{
    BisectionStep, DEFAULT_SEARCH_MAX, DEFAULT_SEARCH_MIN, RateSolution, RateSolver, SolverConfig,
    future_value, solve_rate,
};
pub use types::{
    ChartPoint, ChartSeries, InterestRounding, MAX_NUM_PERIODS, MIN_INITIAL_DEPOSIT,
    MIN_PERIODIC_CONTRIBUTION, PeriodRecord, PlanParameters, Schedule, SolvedRate,
};
