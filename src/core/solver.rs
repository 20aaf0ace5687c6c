use super::engine::years_to_fire;
use super::types::{ContributionPlan, SimulationInput};

#[derive(Debug, Clone, Copy)]
pub struct ContributionSolveConfig {
    /// Monthly contribution bounds in 万円.
    pub search_min: f64,
    pub search_max: f64,
    pub tolerance: f64,
    pub max_iterations: u32,
}

impl Default for ContributionSolveConfig {
    fn default() -> Self {
        Self {
            search_min: 0.0,
            search_max: 500.0,
            tolerance: 0.05,
            max_iterations: 40,
        }
    }
}

pub fn solve_required_contribution(
    input: &SimulationInput,
    base_monthly_expense: f64,
    post_fire_monthly_cost: f64,
    target_age: u32,
) -> ContributionPlan {
    solve_required_contribution_with(
        input,
        base_monthly_expense,
        post_fire_monthly_cost,
        target_age,
        ContributionSolveConfig::default(),
    )
}

/// Smallest monthly contribution that reaches the neutral-case target by
/// `target_age`, by bisection. Relies on achievement years being
/// non-increasing in the contribution.
pub fn solve_required_contribution_with(
    input: &SimulationInput,
    base_monthly_expense: f64,
    post_fire_monthly_cost: f64,
    target_age: u32,
    config: ContributionSolveConfig,
) -> ContributionPlan {
    let infeasible = |iterations: u32, message: &str| ContributionPlan {
        target_age,
        required_monthly_contribution: None,
        feasible: false,
        converged: false,
        iterations,
        message: message.to_string(),
    };

    if target_age <= input.current_age {
        return infeasible(0, "Target age must be later than the current age.");
    }
    let target_years = target_age - input.current_age;

    let meets_target = |monthly: f64| {
        let candidate = SimulationInput {
            monthly_contribution: monthly,
            ..input.clone()
        };
        years_to_fire(
            &candidate,
            input.strategy,
            base_monthly_expense,
            post_fire_monthly_cost,
        )
        .is_some_and(|years| years <= target_years)
    };

    if meets_target(config.search_min) {
        return ContributionPlan {
            target_age,
            required_monthly_contribution: Some(config.search_min),
            feasible: true,
            converged: true,
            iterations: 0,
            message: "Already on track without further contributions.".to_string(),
        };
    }
    if !meets_target(config.search_max) {
        return infeasible(
            0,
            "No feasible contribution found within the search bounds.",
        );
    }

    let mut lo = config.search_min;
    let mut hi = config.search_max;
    let mut iterations = 0;
    let mut converged = false;
    while iterations < config.max_iterations {
        iterations += 1;
        let mid = (lo + hi) * 0.5;
        if meets_target(mid) {
            hi = mid;
        } else {
            lo = mid;
        }
        if (hi - lo).abs() <= config.tolerance {
            converged = true;
            break;
        }
    }

    // `hi` is always feasible; rounding up keeps it so.
    let required = ((hi * 10.0).ceil() / 10.0).min(config.search_max);
    ContributionPlan {
        target_age,
        required_monthly_contribution: Some(required),
        feasible: true,
        converged,
        iterations,
        message: if converged {
            "Solved required monthly contribution.".to_string()
        } else {
            "Reached max iterations before tolerance was met; returning best estimate."
                .to_string()
        },
    }
}
