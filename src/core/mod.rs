mod cost;
mod defaults;
mod engine;
mod regions;
mod solver;
mod tax;
mod types;

pub use cost::{
    BASE_MONTHLY_EXPENSE, PENSION_PER_CAPITA_MONTHLY, estimate_monthly_expense,
    estimate_post_fire_monthly_cost,
};
pub use defaults::SimulationDefaults;
pub use engine::{
    DEFAULT_MAX_YEARS, calc_achievement_years, calc_effective_yield_rate, calc_fire_number,
    calc_fire_number_for_strategy, calc_scenario, calc_sensitivity, resolve_monthly_expense,
    resolve_post_fire_cost, run_simulation,
};
pub use regions::{NATIONAL_AVERAGE_NAME, REGIONS, Region, cost_index, find_region, region_name};
pub use solver::{
    ContributionSolveConfig, solve_required_contribution, solve_required_contribution_with,
};
pub use tax::{
    SUPPORTED_INCOME_LEVELS, calc_take_home, employment_income_deduction, income_tax,
    resident_tax, social_insurance, take_home_table,
};
pub use types::{
    Achievement, ContributionPlan, FamilyPattern, FamilyType, FireStrategy, HousingType,
    IncomeType, ScenarioKind, ScenarioResult, SensitivityItem, SimulationInput, SimulationResult,
    SocialInsurance, TakeHomeResult, YearProjection,
};
