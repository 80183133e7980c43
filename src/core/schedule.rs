use super::error::PlanError;
use super::types::{
    ChartPoint, ChartSeries, InterestRounding, MAX_NUM_PERIODS, PeriodRecord, Schedule,
};

/// Replays the account period by period at `rate`, rounding interest to cents.
pub fn generate_schedule(
    initial_deposit: f64,
    periodic_contribution: f64,
    num_periods: u32,
    rate: f64,
) -> Result<Schedule, PlanError> {
    generate_schedule_with(
        initial_deposit,
        periodic_contribution,
        num_periods,
        rate,
        InterestRounding::Cents,
    )
}

/// Period 1 earns interest on the deposit alone. From period 2 on, the
/// contribution lands before interest is computed, so it earns a full period.
pub fn generate_schedule_with(
    initial_deposit: f64,
    periodic_contribution: f64,
    num_periods: u32,
    rate: f64,
    rounding: InterestRounding,
) -> Result<Schedule, PlanError> {
    validate_schedule_inputs(initial_deposit, periodic_contribution, num_periods, rate)?;

    let mut records = Vec::with_capacity(num_periods as usize);
    let mut balance = initial_deposit;
    for period in 1..=num_periods {
        let contribution = if period == 1 {
            0.0
        } else {
            periodic_contribution
        };
        let base = balance + contribution;
        let interest = rounding.apply(base * rate);
        let closing_balance = base + interest;

        records.push(PeriodRecord {
            period,
            opening_balance: balance,
            contribution,
            interest,
            closing_balance,
        });
        balance = closing_balance;
    }

    Ok(Schedule::from_records(records))
}

/// Contributions-only balance at the end of `period`.
pub fn no_interest_balance(initial_deposit: f64, periodic_contribution: f64, period: u32) -> f64 {
    initial_deposit + periodic_contribution * f64::from(period.saturating_sub(1))
}

pub fn chart_series(
    schedule: &Schedule,
    initial_deposit: f64,
    periodic_contribution: f64,
) -> ChartSeries {
    let compound = schedule
        .records()
        .iter()
        .map(|r| ChartPoint {
            period: r.period,
            balance: r.closing_balance,
        })
        .collect();
    let no_interest = schedule
        .records()
        .iter()
        .map(|r| ChartPoint {
            period: r.period,
            balance: no_interest_balance(initial_deposit, periodic_contribution, r.period),
        })
        .collect();

    ChartSeries {
        title: format!("Projection over {} periods", schedule.len()),
        compound,
        no_interest,
    }
}

fn validate_schedule_inputs(
    initial_deposit: f64,
    periodic_contribution: f64,
    num_periods: u32,
    rate: f64,
) -> Result<(), PlanError> {
    if num_periods < 1 {
        return Err(PlanError::invalid("number of periods must be >= 1"));
    }
    if num_periods > MAX_NUM_PERIODS {
        return Err(PlanError::invalid(format!(
            "number of periods must be <= {MAX_NUM_PERIODS}"
        )));
    }
    if !initial_deposit.is_finite() || !periodic_contribution.is_finite() {
        return Err(PlanError::invalid("deposit and contribution must be finite"));
    }
    if !rate.is_finite() || rate < 0.0 {
        return Err(PlanError::invalid("rate must be a finite, non-negative number"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::solver::{RateSolver, future_value};
    use crate::core::types::PlanParameters;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    #[test]
    fn reference_scenario_replays_to_target() {
        let params = PlanParameters::new(1_000.0, 100.0, 12, 2_500.0).expect("valid params");
        let rate = RateSolver::default().solve(&params).expect("must solve");
        let schedule = generate_schedule(1_000.0, 100.0, 12, rate.value()).expect("schedule");

        assert_eq!(schedule.len(), 12);
        let first = schedule.records()[0];
        assert_eq!(first.period, 1);
        assert_close(first.opening_balance, 1_000.0, 1e-12);
        assert_close(first.contribution, 0.0, 1e-12);
        assert_close(first.interest, 19.58, 1e-9);
        assert_close(first.closing_balance, 1_019.58, 1e-9);

        let second = schedule.records()[1];
        assert_close(second.contribution, 100.0, 1e-12);
        assert_close(second.interest, 21.92, 1e-9);

        assert_close(schedule.final_balance(), 2_500.0, 0.05);
    }

    #[test]
    fn records_chain_and_add_up() {
        let schedule = generate_schedule(500.0, 25.0, 24, 0.013).expect("schedule");
        let records = schedule.records();
        assert_close(records[0].opening_balance, 500.0, 1e-12);
        for pair in records.windows(2) {
            assert_eq!(pair[0].closing_balance, pair[1].opening_balance);
            assert_eq!(pair[0].period + 1, pair[1].period);
        }
        for r in records {
            assert_close(
                r.closing_balance,
                r.opening_balance + r.contribution + r.interest,
                1e-9,
            );
            assert_close(r.interest * 100.0, (r.interest * 100.0).round(), 1e-6);
        }
        assert_close(
            schedule.final_balance(),
            schedule.total_contributed() + schedule.total_interest(),
            1e-6,
        );
        assert_close(schedule.total_contributed(), 500.0 + 25.0 * 23.0, 1e-9);
    }

    #[test]
    fn exact_rounding_matches_closed_form() {
        let params = PlanParameters::new(2_000.0, 150.0, 36, 0.0).expect("valid params");
        let schedule =
            generate_schedule_with(2_000.0, 150.0, 36, 0.007, InterestRounding::Exact)
                .expect("schedule");
        let expected = future_value(&params, 0.007);
        assert_close(schedule.final_balance(), expected, 1e-6 * expected);
    }

    #[test]
    fn zero_rate_schedule_is_contributions_only() {
        let schedule = generate_schedule(1_000.0, 100.0, 12, 0.0).expect("schedule");
        assert_close(schedule.final_balance(), 2_100.0, 1e-9);
        assert_close(schedule.total_interest(), 0.0, 1e-12);
    }

    #[test]
    fn zero_periods_is_invalid() {
        let err = generate_schedule(1_000.0, 100.0, 0, 0.01).expect_err("must fail");
        assert!(matches!(err, PlanError::InvalidParameter(_)));
    }

    #[test]
    fn period_count_above_maximum_is_invalid() {
        let err = generate_schedule(1_000.0, 100.0, MAX_NUM_PERIODS + 1, 0.01)
            .expect_err("must fail");
        assert!(matches!(err, PlanError::InvalidParameter(_)));

        let longest = generate_schedule(1_000.0, 100.0, MAX_NUM_PERIODS, 0.0).expect("schedule");
        assert_eq!(longest.len(), MAX_NUM_PERIODS as usize);
    }

    #[test]
    fn non_finite_or_negative_rate_is_invalid() {
        assert!(matches!(
            generate_schedule(1_000.0, 100.0, 12, f64::NAN),
            Err(PlanError::InvalidParameter(_))
        ));
        assert!(matches!(
            generate_schedule(1_000.0, 100.0, 12, -0.01),
            Err(PlanError::InvalidParameter(_))
        ));
        assert!(matches!(
            generate_schedule(f64::INFINITY, 100.0, 12, 0.01),
            Err(PlanError::InvalidParameter(_))
        ));
    }

    #[test]
    fn regenerating_is_deterministic() {
        let first = generate_schedule(1_000.0, 100.0, 60, 0.0123).expect("schedule");
        let second = generate_schedule(1_000.0, 100.0, 60, 0.0123).expect("schedule");
        assert_eq!(first, second);
    }

    #[test]
    fn chart_series_pairs_compound_and_reference() {
        let schedule = generate_schedule(1_000.0, 100.0, 4, 0.02).expect("schedule");
        let chart = chart_series(&schedule, 1_000.0, 100.0);

        assert_eq!(chart.title, "Projection over 4 periods");
        assert_eq!(chart.compound.len(), 4);
        assert_eq!(chart.no_interest.len(), 4);
        let reference: Vec<f64> = chart.no_interest.iter().map(|p| p.balance).collect();
        assert_eq!(reference, vec![1_000.0, 1_100.0, 1_200.0, 1_300.0]);
        for (point, record) in chart.compound.iter().zip(schedule.records()) {
            assert_eq!(point.period, record.period);
            assert_eq!(point.balance, record.closing_balance);
        }
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_solved_rate_round_trips_through_schedule(
            deposit in 50u32..50_000,
            contribution in 5u32..5_000,
            periods in 1u32..60,
            rate_bp in 5u32..2_000
        ) {
            let deposit = deposit as f64;
            let contribution = contribution as f64;
            let mut params = PlanParameters::new(deposit, contribution, periods, 0.0)
                .expect("valid params");
            params.target_future_value = future_value(&params, rate_bp as f64 / 10_000.0);
            let target = params.target_future_value;

            let rate = RateSolver::default().solve(&params).expect("must solve").value();

            let exact = generate_schedule_with(
                deposit,
                contribution,
                periods,
                rate,
                InterestRounding::Exact,
            )
            .expect("schedule");
            prop_assert!((exact.final_balance() - target).abs() <= 1e-6 * target);

            let cents = generate_schedule(deposit, contribution, periods, rate).expect("schedule");
            let drift_bound = 0.005 * f64::from(periods) * (1.0 + rate).powf(f64::from(periods));
            prop_assert!((cents.final_balance() - target).abs() <= drift_bound + 1e-6 * target);
        }
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(48))]

        #[test]
        fn prop_schedule_has_one_record_per_period(
            periods in 1u32..600,
            rate_bp in 0u32..1_000
        ) {
            let schedule = generate_schedule(1_000.0, 50.0, periods, rate_bp as f64 / 10_000.0)
                .expect("schedule");
            prop_assert_eq!(schedule.len(), periods as usize);
            for (idx, record) in schedule.records().iter().enumerate() {
                prop_assert_eq!(record.period, idx as u32 + 1);
            }
        }
    }
}
