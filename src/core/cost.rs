use super::types::{FamilyType, HousingType};

/// National baseline monthly living cost for a single renter, in 万円.
pub const BASE_MONTHLY_EXPENSE: f64 = 15.0;

/// Flat national pension premium per head, 万円/month.
pub const PENSION_PER_CAPITA_MONTHLY: f64 = 1.7;

/// Estimated national health insurance once outside employer cover, 万円/month.
fn health_insurance_monthly(family: FamilyType) -> f64 {
    match family {
        FamilyType::Single => 2.5,
        FamilyType::Couple => 3.5,
        FamilyType::CoupleOneChild => 4.0,
        FamilyType::CoupleTwoChildren => 4.5,
    }
}

/// Monthly living cost in 万円. Unrounded; callers round for display.
pub fn estimate_monthly_expense(cost_index: f64, family: FamilyType, housing: HousingType) -> f64 {
    BASE_MONTHLY_EXPENSE * cost_index * family.cost_coefficient() * housing.cost_coefficient()
}

/// Health insurance plus national pension after leaving employment, 万円/month
/// rounded to one decimal.
pub fn estimate_post_fire_monthly_cost(family: FamilyType) -> f64 {
    let pension = PENSION_PER_CAPITA_MONTHLY * f64::from(family.pension_headcount());
    round1(health_insurance_monthly(family) + pension)
}

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
