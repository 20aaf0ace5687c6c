//! Short-key query string codec for [`SimulationInput`], used by shareable
//! result URLs. Rates travel as percentages (`return=5` is 5%).

use crate::core::{
    FamilyType, FireStrategy, HousingType, IncomeType, SimulationDefaults, SimulationInput,
    find_region,
};

#[derive(Debug, Default)]
struct RawQuery {
    pref: Option<String>,
    income: Option<String>,
    income_type: Option<String>,
    assets: Option<String>,
    monthly: Option<String>,
    family: Option<String>,
    housing: Option<String>,
    age: Option<String>,
    target_age: Option<String>,
    return_rate: Option<String>,
    swr: Option<String>,
    inflation: Option<String>,
    strategy: Option<String>,
    yield_rate: Option<String>,
    expense: Option<String>,
    dividend_tax: Option<String>,
    post_fire: Option<String>,
}

impl RawQuery {
    /// Decodes `application/x-www-form-urlencoded` pairs one at a time, so
    /// a malformed value only ever costs its own field. The first occurrence
    /// of a repeated key wins and unknown keys are ignored.
    fn parse(query: &str) -> Self {
        let pairs: Vec<(String, String)> =
            serde_urlencoded::from_str(query.trim_start_matches('?')).unwrap_or_default();

        let mut raw = RawQuery::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "pref" => &mut raw.pref,
                "income" => &mut raw.income,
                "incomeType" => &mut raw.income_type,
                "assets" => &mut raw.assets,
                "monthly" => &mut raw.monthly,
                "family" => &mut raw.family,
                "housing" => &mut raw.housing,
                "age" => &mut raw.age,
                "targetAge" => &mut raw.target_age,
                "return" => &mut raw.return_rate,
                "swr" => &mut raw.swr,
                "inflation" => &mut raw.inflation,
                "strategy" => &mut raw.strategy,
                "yield" => &mut raw.yield_rate,
                "expense" => &mut raw.expense,
                "divTax" => &mut raw.dividend_tax,
                "postFire" => &mut raw.post_fire,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        raw
    }
}

/// Decodes a query string (with or without the leading `?`).
///
/// Never fails: each missing or unparseable number takes its own default
/// and unknown keys resolve through each enum's fallback. Other fields in
/// the same query are unaffected.
pub fn from_query(query: &str, defaults: &SimulationDefaults) -> SimulationInput {
    let raw = RawQuery::parse(query);
    let fallback = defaults.input();

    SimulationInput {
        region: raw
            .pref
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(fallback.region),
        annual_income: number(raw.income.as_deref()).unwrap_or(fallback.annual_income),
        income_type: raw
            .income_type
            .as_deref()
            .map(IncomeType::from_key)
            .unwrap_or(fallback.income_type),
        current_assets: number(raw.assets.as_deref()).unwrap_or(fallback.current_assets),
        monthly_contribution: number(raw.monthly.as_deref())
            .unwrap_or(fallback.monthly_contribution),
        family: raw
            .family
            .as_deref()
            .map(FamilyType::from_key)
            .unwrap_or(fallback.family),
        housing: raw
            .housing
            .as_deref()
            .map(HousingType::from_key)
            .unwrap_or(fallback.housing),
        current_age: whole(raw.age.as_deref()).unwrap_or(fallback.current_age),
        target_age: whole(raw.target_age.as_deref()),
        annual_return_rate: percent(raw.return_rate.as_deref())
            .unwrap_or(fallback.annual_return_rate),
        safe_withdrawal_rate: percent(raw.swr.as_deref()).unwrap_or(fallback.safe_withdrawal_rate),
        inflation_rate: percent(raw.inflation.as_deref()).unwrap_or(fallback.inflation_rate),
        strategy: raw
            .strategy
            .as_deref()
            .map(FireStrategy::from_key)
            .unwrap_or(fallback.strategy),
        gross_yield_rate: percent(raw.yield_rate.as_deref()).unwrap_or(fallback.gross_yield_rate),
        monthly_expense_override: number(raw.expense.as_deref()),
        dividend_tax_rate: percent(raw.dividend_tax.as_deref())
            .unwrap_or(fallback.dividend_tax_rate),
        post_fire_cost_override: number(raw.post_fire.as_deref()),
    }
}

/// Encodes every field under its short key. `pref` is left out when the
/// region id is not in the prefecture table.
pub fn to_query(input: &SimulationInput) -> String {
    let mut pairs: Vec<(&str, String)> = Vec::with_capacity(17);
    if let Some(region) = find_region(&input.region) {
        pairs.push(("pref", region.id.to_string()));
    }
    pairs.push(("income", format_number(input.annual_income)));
    pairs.push(("incomeType", input.income_type.key().to_string()));
    pairs.push(("assets", format_number(input.current_assets)));
    pairs.push(("monthly", format_number(input.monthly_contribution)));
    pairs.push(("family", input.family.key().to_string()));
    pairs.push(("housing", input.housing.key().to_string()));
    pairs.push(("age", input.current_age.to_string()));
    if let Some(target_age) = input.target_age {
        pairs.push(("targetAge", target_age.to_string()));
    }
    pairs.push(("return", format_number(input.annual_return_rate * 100.0)));
    pairs.push(("swr", format_number(input.safe_withdrawal_rate * 100.0)));
    pairs.push(("inflation", format_number(input.inflation_rate * 100.0)));
    pairs.push(("strategy", input.strategy.key().to_string()));
    pairs.push(("yield", format_number(input.gross_yield_rate * 100.0)));
    if let Some(expense) = input.monthly_expense_override {
        pairs.push(("expense", format_number(expense)));
    }
    pairs.push(("divTax", format_number(input.dividend_tax_rate * 100.0)));
    if let Some(post_fire) = input.post_fire_cost_override {
        pairs.push(("postFire", format_number(post_fire)));
    }

    pairs
        .into_iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}

fn number(value: Option<&str>) -> Option<f64> {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

fn percent(value: Option<&str>) -> Option<f64> {
    number(value).map(|v| v / 100.0)
}

fn whole(value: Option<&str>) -> Option<u32> {
    value.and_then(|v| v.trim().parse::<u32>().ok())
}

/// Trims float noise such as `7.000000000000001` from `0.07 * 100`.
fn format_number(value: f64) -> String {
    ((value * 1e6).round() / 1e6).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn empty_query_yields_defaults() {
        let defaults = SimulationDefaults::standard();
        assert_eq!(from_query("", &defaults), defaults.input());
        assert_eq!(from_query("?", &defaults), defaults.input());
    }

    #[test]
    fn parses_short_keys_and_percent_rates() {
        let defaults = SimulationDefaults::standard();
        let input = from_query(
            "?pref=osaka&income=650&assets=1200&monthly=12&family=couple&housing=owned_outright\
             &age=41&targetAge=55&return=6&swr=3.5&inflation=1.5&strategy=yield&yield=4\
             &expense=22&divTax=20&postFire=5",
            &defaults,
        );

        assert_eq!(input.region, "osaka");
        assert_approx(input.annual_income, 650.0);
        assert_approx(input.current_assets, 1_200.0);
        assert_approx(input.monthly_contribution, 12.0);
        assert_eq!(input.family, FamilyType::Couple);
        assert_eq!(input.housing, HousingType::OwnedOutright);
        assert_eq!(input.current_age, 41);
        assert_eq!(input.target_age, Some(55));
        assert_approx(input.annual_return_rate, 0.06);
        assert_approx(input.safe_withdrawal_rate, 0.035);
        assert_approx(input.inflation_rate, 0.015);
        assert_eq!(input.strategy, FireStrategy::Yield);
        assert_approx(input.gross_yield_rate, 0.04);
        assert_eq!(input.monthly_expense_override, Some(22.0));
        assert_approx(input.dividend_tax_rate, 0.20);
        assert_eq!(input.post_fire_cost_override, Some(5.0));
    }

    #[test]
    fn unparseable_values_fall_back_to_defaults() {
        let defaults = SimulationDefaults::standard();
        let input = from_query(
            "assets=lots&age=-3&return=NaN&family=commune&strategy=lottery&expense=",
            &defaults,
        );

        assert_approx(input.current_assets, defaults.current_assets);
        assert_eq!(input.current_age, defaults.current_age);
        assert_approx(input.annual_return_rate, defaults.annual_return_rate);
        assert_eq!(input.family, FamilyType::Single);
        assert_eq!(input.strategy, FireStrategy::Withdrawal);
        assert_eq!(input.monthly_expense_override, None);
    }

    #[test]
    fn percent_encoded_values_are_decoded() {
        let defaults = SimulationDefaults::standard();
        let input = from_query("assets=%31%30%30&pref=%20", &defaults);
        assert_approx(input.current_assets, 100.0);
        assert_eq!(input.region, defaults.region);
    }

    #[test]
    fn bad_value_only_costs_its_own_field() {
        let defaults = SimulationDefaults::standard();
        let input = from_query("assets=1200&monthly=12&family=couple child&age=4 0", &defaults);

        assert_approx(input.current_assets, 1_200.0);
        assert_approx(input.monthly_contribution, 12.0);
        assert_eq!(input.family, FamilyType::Single);
        assert_eq!(input.current_age, defaults.current_age);
    }

    #[test]
    fn repeated_key_keeps_first_value() {
        let defaults = SimulationDefaults::standard();
        let input = from_query("assets=1200&monthly=12&assets=900", &defaults);

        assert_approx(input.current_assets, 1_200.0);
        assert_approx(input.monthly_contribution, 12.0);
    }

    #[test]
    fn plus_decodes_to_space_and_unknown_keys_are_ignored() {
        let defaults = SimulationDefaults::standard();
        let input = from_query("utm_source=x&pref=+osaka+&strategy=yield&%zz=1", &defaults);

        assert_eq!(input.region, "osaka");
        assert_eq!(input.strategy, FireStrategy::Yield);
        assert_approx(input.current_assets, defaults.current_assets);
    }

    #[test]
    fn unknown_region_is_kept_but_not_reencoded() {
        let defaults = SimulationDefaults::standard();
        let input = from_query("pref=atlantis", &defaults);
        assert_eq!(input.region, "atlantis");
        assert!(!to_query(&input).contains("pref="));
    }

    #[test]
    fn encoded_query_decodes_to_same_input() {
        let defaults = SimulationDefaults::standard();
        let mut input = defaults.input();
        input.region = "hokkaido".to_string();
        input.target_age = Some(48);
        input.annual_return_rate = 0.07;
        input.monthly_expense_override = Some(18.5);

        let query = to_query(&input);
        assert!(query.contains("return=7&"));
        assert!(query.contains("divTax=20.315"));

        let decoded = from_query(&query, &defaults);
        assert_eq!(decoded.region, input.region);
        assert_eq!(decoded.target_age, input.target_age);
        assert_eq!(decoded.monthly_expense_override, input.monthly_expense_override);
        assert_approx(decoded.annual_return_rate, input.annual_return_rate);
        assert_approx(decoded.dividend_tax_rate, input.dividend_tax_rate);
        assert_eq!(decoded.post_fire_cost_override, None);
    }
}
