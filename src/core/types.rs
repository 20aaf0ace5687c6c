use serde::Serialize;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FamilyType {
    Single,
    Couple,
    CoupleOneChild,
    CoupleTwoChildren,
}

impl FamilyType {
    pub const ALL: [FamilyType; 4] = [
        FamilyType::Single,
        FamilyType::Couple,
        FamilyType::CoupleOneChild,
        FamilyType::CoupleTwoChildren,
    ];

    /// Resolves a query/payload key. Unknown keys fall back to `Single`.
    pub fn from_key(key: &str) -> Self {
        match key {
            "couple" => FamilyType::Couple,
            "couple_one_child" | "couple_child1" => FamilyType::CoupleOneChild,
            "couple_two_children" | "couple_child2" => FamilyType::CoupleTwoChildren,
            _ => FamilyType::Single,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            FamilyType::Single => "single",
            FamilyType::Couple => "couple",
            FamilyType::CoupleOneChild => "couple_one_child",
            FamilyType::CoupleTwoChildren => "couple_two_children",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FamilyType::Single => "単身",
            FamilyType::Couple => "夫婦",
            FamilyType::CoupleOneChild => "夫婦+子1人",
            FamilyType::CoupleTwoChildren => "夫婦+子2人",
        }
    }

    /// Living-cost multiplier relative to a single adult.
    pub fn cost_coefficient(self) -> f64 {
        match self {
            FamilyType::Single => 1.0,
            FamilyType::Couple => 1.5,
            FamilyType::CoupleOneChild => 1.85,
            FamilyType::CoupleTwoChildren => 2.2,
        }
    }

    /// Heads paying the flat national pension after leaving employment.
    /// Only single vs. not-single is distinguished.
    pub fn pension_headcount(self) -> u32 {
        match self {
            FamilyType::Single => 1,
            _ => 2,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HousingType {
    Rent,
    OwnedWithLoan,
    OwnedOutright,
}

impl HousingType {
    /// Unknown keys fall back to `Rent`, whose coefficient is 1.0.
    pub fn from_key(key: &str) -> Self {
        match key {
            "owned_with_loan" | "own_loan" => HousingType::OwnedWithLoan,
            "owned_outright" | "own_paid" => HousingType::OwnedOutright,
            _ => HousingType::Rent,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            HousingType::Rent => "rent",
            HousingType::OwnedWithLoan => "owned_with_loan",
            HousingType::OwnedOutright => "owned_outright",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            HousingType::Rent => "賃貸",
            HousingType::OwnedWithLoan => "持ち家(ローンあり)",
            HousingType::OwnedOutright => "持ち家(ローンなし)",
        }
    }

    pub fn cost_coefficient(self) -> f64 {
        match self {
            HousingType::Rent => 1.0,
            HousingType::OwnedWithLoan => 1.1,
            HousingType::OwnedOutright => 0.75,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FireStrategy {
    /// Draw down principal at the safe withdrawal rate.
    Withdrawal,
    /// Live off after-tax dividends/interest, principal untouched.
    Yield,
}

impl FireStrategy {
    pub fn from_key(key: &str) -> Self {
        match key {
            "yield" | "dividend" => FireStrategy::Yield,
            _ => FireStrategy::Withdrawal,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            FireStrategy::Withdrawal => "withdrawal",
            FireStrategy::Yield => "yield",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FireStrategy::Withdrawal => "取り崩し",
            FireStrategy::Yield => "配当生活",
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            FireStrategy::Withdrawal => FireStrategy::Yield,
            FireStrategy::Yield => FireStrategy::Withdrawal,
        }
    }
}

/// Whether `annual_income` was entered before or after tax. Informational only.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeType {
    Gross,
    Net,
}

impl IncomeType {
    pub fn from_key(key: &str) -> Self {
        match key {
            "net" => IncomeType::Net,
            _ => IncomeType::Gross,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            IncomeType::Gross => "gross",
            IncomeType::Net => "net",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    Optimistic,
    Neutral,
    Pessimistic,
}

impl ScenarioKind {
    pub const ALL: [ScenarioKind; 3] = [
        ScenarioKind::Optimistic,
        ScenarioKind::Neutral,
        ScenarioKind::Pessimistic,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ScenarioKind::Optimistic => "楽観",
            ScenarioKind::Neutral => "標準",
            ScenarioKind::Pessimistic => "悲観",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            ScenarioKind::Optimistic => "#16a34a",
            ScenarioKind::Neutral => "#2563eb",
            ScenarioKind::Pessimistic => "#dc2626",
        }
    }

    /// Added to the annual return rate.
    pub fn return_adjustment(self) -> f64 {
        match self {
            ScenarioKind::Optimistic => 0.02,
            ScenarioKind::Neutral => 0.0,
            ScenarioKind::Pessimistic => -0.02,
        }
    }

    /// Multiplies the living portion of the monthly expense.
    pub fn expense_factor(self) -> f64 {
        match self {
            ScenarioKind::Optimistic => 0.95,
            ScenarioKind::Neutral => 1.0,
            ScenarioKind::Pessimistic => 1.10,
        }
    }
}

/// Currency fields are 万円; rates are fractions (0.04 = 4%).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationInput {
    pub region: String,
    pub annual_income: f64,
    pub income_type: IncomeType,
    pub current_assets: f64,
    pub monthly_contribution: f64,
    pub family: FamilyType,
    pub housing: HousingType,
    pub current_age: u32,
    pub target_age: Option<u32>,
    pub annual_return_rate: f64,
    pub safe_withdrawal_rate: f64,
    pub inflation_rate: f64,
    pub strategy: FireStrategy,
    pub gross_yield_rate: f64,
    pub monthly_expense_override: Option<f64>,
    pub dividend_tax_rate: f64,
    pub post_fire_cost_override: Option<f64>,
}

impl SimulationInput {
    pub fn annual_contribution(&self) -> f64 {
        self.monthly_contribution * 12.0
    }
}

/// State at the start of an elapsed year, before growth and contribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearProjection {
    pub age: u32,
    pub year: u32,
    pub assets: f64,
    pub target: f64,
    pub annual_contribution: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Achievement {
    /// `None` when the target was not reached within the horizon.
    pub years: Option<u32>,
    pub projection: Vec<YearProjection>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioResult {
    pub kind: ScenarioKind,
    pub label: &'static str,
    pub color: &'static str,
    /// Whole 万円; infinite (serialized as null) when unreachable.
    pub fire_number: f64,
    pub monthly_expense: f64,
    pub annual_expense: f64,
    pub achievement_age: Option<u32>,
    pub achievement_years: Option<u32>,
    pub projection: Vec<YearProjection>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensitivityItem {
    pub label: &'static str,
    pub description: String,
    pub base_years: Option<u32>,
    pub new_years: Option<u32>,
    /// `new_years - base_years`; negative is an improvement.
    pub diff: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionPlan {
    pub target_age: u32,
    pub required_monthly_contribution: Option<f64>,
    pub feasible: bool,
    pub converged: bool,
    pub iterations: u32,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub input: SimulationInput,
    pub region_name: &'static str,
    pub family_label: &'static str,
    pub housing_label: &'static str,
    pub strategy_label: &'static str,
    pub monthly_living_cost: f64,
    pub post_fire_monthly_cost: f64,
    pub effective_yield_rate: Option<f64>,
    pub scenarios: Vec<ScenarioResult>,
    pub sensitivity: Vec<SensitivityItem>,
    pub contribution_plan: Option<ContributionPlan>,
}

impl SimulationResult {
    pub fn scenario(&self, kind: ScenarioKind) -> Option<&ScenarioResult> {
        self.scenarios.iter().find(|s| s.kind == kind)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FamilyPattern {
    Single,
    /// Spouse with no income of their own.
    Couple,
    /// Spouse plus one dependent child.
    CoupleChild,
}

impl FamilyPattern {
    pub const ALL: [FamilyPattern; 3] = [
        FamilyPattern::Single,
        FamilyPattern::Couple,
        FamilyPattern::CoupleChild,
    ];

    pub fn from_key(key: &str) -> Self {
        match key {
            "couple" => FamilyPattern::Couple,
            "couple_child" | "family" => FamilyPattern::CoupleChild,
            _ => FamilyPattern::Single,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            FamilyPattern::Single => "single",
            FamilyPattern::Couple => "couple",
            FamilyPattern::CoupleChild => "couple_child",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FamilyPattern::Single => "独身",
            FamilyPattern::Couple => "夫婦(配偶者控除あり)",
            FamilyPattern::CoupleChild => "夫婦+子1人(扶養控除あり)",
        }
    }

    pub fn has_spouse(self) -> bool {
        !matches!(self, FamilyPattern::Single)
    }

    pub fn dependents(self) -> u64 {
        match self {
            FamilyPattern::CoupleChild => 1,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialInsurance {
    pub health: u64,
    pub pension: u64,
    pub employment: u64,
    pub total: u64,
}

/// All amounts in whole yen.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TakeHomeResult {
    pub family: FamilyPattern,
    pub gross_annual: u64,
    pub employment_deduction: u64,
    pub total_income: u64,
    pub social_insurance: SocialInsurance,
    pub income_tax: u64,
    pub resident_tax: u64,
    pub total_deductions: u64,
    pub take_home_annual: u64,
    pub take_home_monthly: u64,
    /// Percentage with one decimal.
    pub take_home_rate: f64,
}
