//! Settlement receipt: converts every place's cost to KRW and totals the trip.
//!
//! Grouping is by day in ascending order, matching the way places are laid out
//! on screen. Rates are a plain code -> multiplier table; KRW is always 1 and
//! any missing rate falls back to 1 so the total stays computable.

use std::collections::{BTreeMap, BTreeSet};

use trip_utils::Place;
use trip_utils::cost::{self, Currency};

use crate::ai;

/// Currency code -> rate into KRW.
pub type RateTable = BTreeMap<String, f64>;

#[derive(Clone, Debug, PartialEq, serde::Serialize, tsify::Tsify)]
#[tsify(into_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptLine {
    pub place_id: String,
    pub name: String,
    pub day: u32,
    pub amount: f64,
    pub currency: String,
    pub krw: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, tsify::Tsify)]
#[tsify(into_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub lines: Vec<ReceiptLine>,
    pub total_krw: f64,
}

/// The non-KRW currency codes present in the places' cost strings, each of
/// which needs a live rate before settling.
pub fn currencies_to_sync(places: &[Place]) -> Vec<String> {
    places
        .iter()
        .map(|place| cost::parse_cost(&place.cost).currency)
        .filter(|currency| *currency != Currency::Krw)
        .map(|currency| currency.code().to_string())
        .collect::<BTreeSet<String>>()
        .into_iter()
        .collect()
}

/// Fetches one rate per foreign currency present. Failed lookups substitute 1
/// inside [`ai::exchange_rate`], so the table is always complete.
pub async fn collect_rates(places: &[Place]) -> RateTable {
    let mut rates = RateTable::new();
    rates.insert(Currency::Krw.code().to_string(), 1.0);
    for code in currencies_to_sync(places) {
        let rate = ai::exchange_rate(&code, Currency::Krw.code()).await;
        rates.insert(code, rate);
    }
    rates
}

pub fn build_receipt(places: &[Place], rates: &RateTable) -> Receipt {
    let days: BTreeSet<u32> = places.iter().map(|place| place.day).collect();
    let mut lines = Vec::new();
    for day in days {
        for place in places.iter().filter(|place| place.day == day) {
            let parsed = cost::parse_cost(&place.cost);
            let rate = rates.get(parsed.currency.code()).copied().unwrap_or(1.0);
            lines.push(ReceiptLine {
                place_id: place.id.clone(),
                name: place.name.clone(),
                day,
                amount: parsed.amount,
                currency: parsed.currency.code().to_string(),
                krw: parsed.amount * rate,
            });
        }
    }
    let total_krw = lines.iter().map(|line| line.krw).sum();
    Receipt { lines, total_krw }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trip_utils::PlaceDraft;

    fn place(id: &str, day: u32, cost: &str) -> Place {
        let mut place = Place::from_draft(id.to_string(), day, PlaceDraft::named(id));
        place.cost = cost.to_string();
        place
    }

    #[test]
    fn test_currencies_to_sync_skips_home_currency() {
        let places = vec![
            place("a", 1, "15000"),
            place("b", 1, "1200 yen"),
            place("c", 2, "$10"),
            place("d", 2, "800 jpy"),
        ];
        assert_eq!(currencies_to_sync(&places), vec!["JPY", "USD"]);
    }

    #[test]
    fn test_receipt_groups_by_day_ascending() {
        let places = vec![
            place("late", 3, "100"),
            place("early", 1, "200"),
            place("mid", 2, "300"),
        ];
        let receipt = build_receipt(&places, &RateTable::new());
        let days: Vec<u32> = receipt.lines.iter().map(|line| line.day).collect();
        assert_eq!(days, vec![1, 2, 3]);
    }

    #[test]
    fn test_receipt_converts_with_rates() {
        let places = vec![place("a", 1, "1000 yen"), place("b", 1, "5000")];
        let mut rates = RateTable::new();
        rates.insert("KRW".to_string(), 1.0);
        rates.insert("JPY".to_string(), 9.0);
        let receipt = build_receipt(&places, &rates);
        assert_eq!(receipt.lines[0].krw, 9000.0);
        assert_eq!(receipt.lines[1].krw, 5000.0);
        assert_eq!(receipt.total_krw, 14000.0);
    }

    #[test]
    fn test_missing_rate_falls_back_to_one() {
        let places = vec![place("a", 1, "$25")];
        let receipt = build_receipt(&places, &RateTable::new());
        assert_eq!(receipt.lines[0].krw, 25.0);
        assert_eq!(receipt.total_krw, 25.0);
    }

    #[test]
    fn test_empty_trip_receipt() {
        let receipt = build_receipt(&[], &RateTable::new());
        assert!(receipt.lines.is_empty());
        assert_eq!(receipt.total_krw, 0.0);
    }
}
