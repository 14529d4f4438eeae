//! Cost-string parsing for the settlement receipt.
//!
//! Costs are free text ("1200 yen", "$15 entry", "무료"). The receipt view
//! needs a number and a currency out of that, with KRW as the home currency.

/// Currencies the receipt can settle. Anything unrecognized counts as KRW.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Currency {
    Krw,
    Jpy,
    Usd,
    Eur,
}

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Krw => "KRW",
            Currency::Jpy => "JPY",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// The parsed form of one place's cost string.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ParsedCost {
    pub amount: f64,
    pub currency: Currency,
}

/// Parses a free-text cost: the first decimal number is the amount (0 if there
/// is none), and the currency is detected from case-insensitive markers.
pub fn parse_cost(cost: &str) -> ParsedCost {
    let amount = first_number(cost).unwrap_or(0.0);
    let clean = cost.to_lowercase();
    let currency = if clean.contains("yen") || clean.contains('¥') || clean.contains("jpy") {
        Currency::Jpy
    } else if clean.contains("usd") || clean.contains('$') {
        Currency::Usd
    } else if clean.contains("eur") || clean.contains('€') {
        Currency::Eur
    } else {
        Currency::Krw
    };
    ParsedCost { amount, currency }
}

/// First `\d+(\.\d+)?` run in the text, if any.
fn first_number(text: &str) -> Option<f64> {
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        if chars[i].is_ascii_digit() {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            if i + 1 < chars.len() && chars[i] == '.' && chars[i + 1].is_ascii_digit() {
                i += 1;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
            }
            let number: String = chars[start..i].iter().collect();
            return number.parse().ok();
        }
        i += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_number_defaults_to_krw() {
        let parsed = parse_cost("15000");
        assert_eq!(parsed.amount, 15000.0);
        assert_eq!(parsed.currency, Currency::Krw);
    }

    #[test]
    fn test_parse_yen_marker() {
        let parsed = parse_cost("1200 yen");
        assert_eq!(parsed.amount, 1200.0);
        assert_eq!(parsed.currency, Currency::Jpy);
    }

    #[test]
    fn test_parse_yen_symbol() {
        let parsed = parse_cost("¥800");
        assert_eq!(parsed.amount, 800.0);
        assert_eq!(parsed.currency, Currency::Jpy);
    }

    #[test]
    fn test_parse_dollar_symbol() {
        let parsed = parse_cost("$15.50 entry");
        assert_eq!(parsed.amount, 15.5);
        assert_eq!(parsed.currency, Currency::Usd);
    }

    #[test]
    fn test_parse_eur_marker_case_insensitive() {
        let parsed = parse_cost("About 20 EUR");
        assert_eq!(parsed.amount, 20.0);
        assert_eq!(parsed.currency, Currency::Eur);
    }

    #[test]
    fn test_parse_no_number_is_zero() {
        let parsed = parse_cost("free entry");
        assert_eq!(parsed.amount, 0.0);
        assert_eq!(parsed.currency, Currency::Krw);
    }

    #[test]
    fn test_parse_empty_string() {
        let parsed = parse_cost("");
        assert_eq!(parsed.amount, 0.0);
        assert_eq!(parsed.currency, Currency::Krw);
    }

    #[test]
    fn test_trailing_dot_is_not_a_fraction() {
        let parsed = parse_cost("10. per person");
        assert_eq!(parsed.amount, 10.0);
    }

    #[test]
    fn test_first_number_wins() {
        let parsed = parse_cost("2 tickets, 3000 yen each");
        assert_eq!(parsed.amount, 2.0);
        assert_eq!(parsed.currency, Currency::Jpy);
    }
}
