use serde::Serialize;

use super::error::PlanError;

pub const MIN_INITIAL_DEPOSIT: f64 = 50.0;
pub const MIN_PERIODIC_CONTRIBUTION: f64 = 5.0;
pub const MAX_NUM_PERIODS: u32 = 6_000;

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanParameters {
    pub initial_deposit: f64,
    pub periodic_contribution: f64,
    pub num_periods: u32,
    pub target_future_value: f64,
}

impl PlanParameters {
    /// Builds a plan, rejecting anything the solver must never see.
    pub fn new(
        initial_deposit: f64,
        periodic_contribution: f64,
        num_periods: u32,
        target_future_value: f64,
    ) -> Result<Self, PlanError> {
        if !initial_deposit.is_finite() {
            return Err(PlanError::invalid("initial deposit must be a finite number"));
        }
        if !periodic_contribution.is_finite() {
            return Err(PlanError::invalid(
                "periodic contribution must be a finite number",
            ));
        }
        if !target_future_value.is_finite() {
            return Err(PlanError::invalid(
                "target future value must be a finite number",
            ));
        }
        if initial_deposit < MIN_INITIAL_DEPOSIT {
            return Err(PlanError::invalid(format!(
                "initial deposit must be at least ${MIN_INITIAL_DEPOSIT}"
            )));
        }
        if periodic_contribution < MIN_PERIODIC_CONTRIBUTION {
            return Err(PlanError::invalid(format!(
                "periodic contribution must be at least ${MIN_PERIODIC_CONTRIBUTION}"
            )));
        }
        if num_periods < 1 {
            return Err(PlanError::invalid("number of periods must be >= 1"));
        }
        if num_periods > MAX_NUM_PERIODS {
            return Err(PlanError::invalid(format!(
                "number of periods must be <= {MAX_NUM_PERIODS}"
            )));
        }

        Ok(Self {
            initial_deposit,
            periodic_contribution,
            num_periods,
            target_future_value,
        })
    }

    /// Balance reached with contributions only: the first period carries no contribution.
    pub fn no_interest_total(&self) -> f64 {
        self.initial_deposit
            + self.periodic_contribution * f64::from(self.num_periods.saturating_sub(1))
    }
}

/// Periodic rate produced by the solver.
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct SolvedRate(f64);

impl SolvedRate {
    pub(crate) fn new(rate: f64) -> Self {
        Self(rate)
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Rate in percent, rounded to four decimals for display.
    pub fn as_percent(self) -> f64 {
        (self.0 * 100.0 * 10_000.0).round() / 10_000.0
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum InterestRounding {
    #[default]
    Cents,
    Exact,
}

impl InterestRounding {
    pub fn apply(self, amount: f64) -> f64 {
        match self {
            InterestRounding::Cents => (amount * 100.0).round() / 100.0,
            InterestRounding::Exact => amount,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodRecord {
    pub period: u32,
    pub opening_balance: f64,
    pub contribution: f64,
    pub interest: f64,
    pub closing_balance: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Schedule {
    records: Vec<PeriodRecord>,
}

impl Schedule {
    pub(crate) fn from_records(records: Vec<PeriodRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[PeriodRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn final_balance(&self) -> f64 {
        self.records.last().map_or(0.0, |r| r.closing_balance)
    }

    pub fn total_contributed(&self) -> f64 {
        self.records
            .first()
            .map_or(0.0, |first| first.opening_balance)
            + self.records.iter().map(|r| r.contribution).sum::<f64>()
    }

    pub fn total_interest(&self) -> f64 {
        self.records.iter().map(|r| r.interest).sum()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub period: u32,
    pub balance: f64,
}

/// Series for the growth comparison chart.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    pub title: String,
    pub compound: Vec<ChartPoint>,
    pub no_interest: Vec<ChartPoint>,
}
