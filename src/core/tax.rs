//! Employee take-home pay for a single fixed tax year.
//!
//! All amounts are whole yen. Every stage floors to the yen and clamps at
//! zero, so no component is ever negative. Band upper bounds are inclusive.

use super::types::{FamilyPattern, SocialInsurance, TakeHomeResult};

/// Gross annual salaries offered by the income-reference feature.
pub const SUPPORTED_INCOME_LEVELS: [u64; 14] = [
    3_000_000, 4_000_000, 5_000_000, 6_000_000, 7_000_000, 8_000_000, 9_000_000, 10_000_000,
    11_000_000, 12_000_000, 13_000_000, 14_000_000, 15_000_000, 20_000_000,
];

/// Rates in basis points (1/10_000).
const HEALTH_INSURANCE_BP: u64 = 500;
const PENSION_BP: u64 = 915;
const EMPLOYMENT_INSURANCE_BP: u64 = 60;
/// 9.15% of the top standard monthly remuneration (650,000) over 12 months.
const PENSION_ANNUAL_CAP: u64 = 713_700;

const DEPENDENT_DEDUCTION_INCOME_TAX: u64 = 380_000;
const DEPENDENT_DEDUCTION_RESIDENT_TAX: u64 = 330_000;

/// (total income upper bound, income-tax amount, resident-tax amount)
const SPOUSE_DEDUCTION_BANDS: [(u64, u64, u64); 3] = [
    (9_000_000, 380_000, 330_000),
    (9_500_000, 260_000, 220_000),
    (10_000_000, 130_000, 110_000),
];

const BASIC_DEDUCTION_BANDS: [(u64, u64, u64); 3] = [
    (24_000_000, 480_000, 430_000),
    (24_500_000, 320_000, 290_000),
    (25_000_000, 160_000, 150_000),
];

/// (taxable income upper bound, rate %, subtraction)
const INCOME_TAX_BRACKETS: [(u64, u64, u64); 7] = [
    (1_949_000, 5, 0),
    (3_299_000, 10, 97_500),
    (6_949_000, 20, 427_500),
    (8_999_000, 23, 636_000),
    (17_999_000, 33, 1_536_000),
    (39_999_000, 40, 2_796_000),
    (u64::MAX, 45, 4_796_000),
];

/// Reconstruction surtax as a multiplier in thousandths (×1.021).
const SURTAX_PER_MILLE: u64 = 1_021;

const RESIDENT_TAX_RATE_PERCENT: u64 = 10;
const RESIDENT_PER_CAPITA_LEVY: u64 = 5_000;

/// Salaries from 1,625,001 to 6,600,000 are rounded down to this step
/// before the band formula applies.
const SALARY_STEP: u64 = 4_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TaxTrack {
    Income,
    Resident,
}

pub fn calc_take_home(gross_annual: u64, family: FamilyPattern) -> TakeHomeResult {
    let employment_deduction = employment_income_deduction(gross_annual);
    let total_income = gross_annual.saturating_sub(employment_deduction);
    let social_insurance = social_insurance(gross_annual);

    let taxable = |track: TaxTrack| {
        total_income
            .saturating_sub(basic_deduction(total_income, track))
            .saturating_sub(social_insurance.total)
            .saturating_sub(family_deduction(total_income, family, track))
    };
    let income_tax = income_tax(taxable(TaxTrack::Income));
    let resident_tax = resident_tax(taxable(TaxTrack::Resident));

    let total_deductions = social_insurance.total + income_tax + resident_tax;
    let take_home_annual = gross_annual.saturating_sub(total_deductions);
    let take_home_rate = if gross_annual == 0 {
        0.0
    } else {
        (take_home_annual as f64 / gross_annual as f64 * 1_000.0).round() / 10.0
    };

    TakeHomeResult {
        family,
        gross_annual,
        employment_deduction,
        total_income,
        social_insurance,
        income_tax,
        resident_tax,
        total_deductions,
        take_home_annual,
        take_home_monthly: (take_home_annual as f64 / 12.0).round() as u64,
        take_home_rate,
    }
}

pub fn take_home_table(family: FamilyPattern) -> Vec<TakeHomeResult> {
    SUPPORTED_INCOME_LEVELS
        .iter()
        .map(|&gross| calc_take_home(gross, family))
        .collect()
}

/// 給与所得控除: six bands, never more than the salary itself.
pub fn employment_income_deduction(gross: u64) -> u64 {
    let stepped = gross / SALARY_STEP * SALARY_STEP;
    let deduction = match gross {
        0..=1_625_000 => 550_000,
        1_625_001..=1_800_000 => (stepped * 40 / 100 - 100_000).max(550_000),
        1_800_001..=3_600_000 => stepped * 30 / 100 + 80_000,
        3_600_001..=6_600_000 => stepped * 20 / 100 + 440_000,
        6_600_001..=8_500_000 => gross * 10 / 100 + 1_100_000,
        _ => 1_950_000,
    };
    deduction.min(gross)
}

pub fn social_insurance(gross: u64) -> SocialInsurance {
    let health = scale(gross, HEALTH_INSURANCE_BP, 10_000);
    let pension = scale(gross, PENSION_BP, 10_000).min(PENSION_ANNUAL_CAP);
    let employment = scale(gross, EMPLOYMENT_INSURANCE_BP, 10_000);
    SocialInsurance {
        health,
        pension,
        employment,
        total: health + pension + employment,
    }
}

fn basic_deduction(total_income: u64, track: TaxTrack) -> u64 {
    banded_amount(&BASIC_DEDUCTION_BANDS, total_income, track)
}

/// Spouse deduction is tested against the filer's total income; the
/// dependent deduction is flat.
fn family_deduction(total_income: u64, family: FamilyPattern, track: TaxTrack) -> u64 {
    let spouse = if family.has_spouse() {
        banded_amount(&SPOUSE_DEDUCTION_BANDS, total_income, track)
    } else {
        0
    };
    let per_dependent = match track {
        TaxTrack::Income => DEPENDENT_DEDUCTION_INCOME_TAX,
        TaxTrack::Resident => DEPENDENT_DEDUCTION_RESIDENT_TAX,
    };
    spouse + per_dependent * family.dependents()
}

fn banded_amount(bands: &[(u64, u64, u64)], income: u64, track: TaxTrack) -> u64 {
    bands
        .iter()
        .find(|(upper, _, _)| income <= *upper)
        .map(|&(_, income_tax, resident_tax)| match track {
            TaxTrack::Income => income_tax,
            TaxTrack::Resident => resident_tax,
        })
        .unwrap_or(0)
}

/// Progressive national income tax including the 2.1% surtax.
pub fn income_tax(taxable: u64) -> u64 {
    if taxable == 0 {
        return 0;
    }
    let (_, rate, subtraction) = INCOME_TAX_BRACKETS
        .iter()
        .copied()
        .find(|(upper, _, _)| taxable <= *upper)
        .unwrap_or(INCOME_TAX_BRACKETS[INCOME_TAX_BRACKETS.len() - 1]);
    let base = scale(taxable, rate, 100).saturating_sub(subtraction);
    scale(base, SURTAX_PER_MILLE, 1_000)
}

pub fn resident_tax(taxable: u64) -> u64 {
    if taxable == 0 {
        return 0;
    }
    scale(taxable, RESIDENT_TAX_RATE_PERCENT, 100).saturating_add(RESIDENT_PER_CAPITA_LEVY)
}

/// `amount * numerator / denominator`, floored, without overflowing `u64`.
fn scale(amount: u64, numerator: u64, denominator: u64) -> u64 {
    let scaled = u128::from(amount) * u128::from(numerator) / u128::from(denominator);
    u64::try_from(scaled).unwrap_or(u64::MAX)
}
