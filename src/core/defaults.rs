use super::types::{FamilyType, FireStrategy, HousingType, IncomeType, SimulationInput};

/// Fallback values used wherever an input field is missing or unparseable.
///
/// Built once (normally via [`SimulationDefaults::standard`]) and handed to the
/// query decoder, the JSON payload merge and the HTTP router state.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationDefaults {
    /// Prefecture id, see [`crate::core::REGIONS`].
    pub region: &'static str,
    /// Annual income in 万円.
    pub annual_income: f64,
    pub income_type: IncomeType,
    /// Liquid assets in 万円.
    pub current_assets: f64,
    /// Monthly contribution in 万円.
    pub monthly_contribution: f64,
    pub family: FamilyType,
    pub housing: HousingType,
    pub current_age: u32,
    pub annual_return_rate: f64,
    pub safe_withdrawal_rate: f64,
    pub inflation_rate: f64,
    pub strategy: FireStrategy,
    pub gross_yield_rate: f64,
    /// Japanese dividend withholding (income + resident + reconstruction surtax).
    pub dividend_tax_rate: f64,
}

impl SimulationDefaults {
    pub const fn standard() -> Self {
        Self {
            region: "tokyo",
            annual_income: 500.0,
            income_type: IncomeType::Gross,
            current_assets: 300.0,
            monthly_contribution: 5.0,
            family: FamilyType::Single,
            housing: HousingType::Rent,
            current_age: 30,
            annual_return_rate: 0.05,
            safe_withdrawal_rate: 0.04,
            inflation_rate: 0.02,
            strategy: FireStrategy::Withdrawal,
            gross_yield_rate: 0.03,
            dividend_tax_rate: 0.20315,
        }
    }

    pub fn input(&self) -> SimulationInput {
        SimulationInput {
            region: self.region.to_string(),
            annual_income: self.annual_income,
            income_type: self.income_type,
            current_assets: self.current_assets,
            monthly_contribution: self.monthly_contribution,
            family: self.family,
            housing: self.housing,
            current_age: self.current_age,
            target_age: None,
            annual_return_rate: self.annual_return_rate,
            safe_withdrawal_rate: self.safe_withdrawal_rate,
            inflation_rate: self.inflation_rate,
            strategy: self.strategy,
            gross_yield_rate: self.gross_yield_rate,
            monthly_expense_override: None,
            dividend_tax_rate: self.dividend_tax_rate,
            post_fire_cost_override: None,
        }
    }
}

impl Default for SimulationDefaults {
    fn default() -> Self {
        Self::standard()
    }
}
