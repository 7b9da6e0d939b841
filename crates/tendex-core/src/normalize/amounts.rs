//! French-formatted monetary amounts.

use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse a French-formatted euro amount.
///
/// Handles thousands separators ("1 234,56 €"), anglo grouping
/// ("1,234.56 €") and scale suffixes ("150 k€", "2,5 M€"). Returns `None`
/// when the input cannot be read as a number.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let mut cleaned = s.trim().to_string();
    for noise in ["€", "EUR", "euros", "euro", "HT", "TTC"] {
        cleaned = cleaned.replace(noise, "");
    }
    let cleaned = cleaned.trim();

    // Scale suffix: k = thousands, M = millions. Case matters for M, amounts
    // in the wild write "k€" and "M€" but never "m€".
    let (body, multiplier) = if let Some(rest) = cleaned.strip_suffix(['k', 'K']) {
        (rest.trim(), Decimal::from(1_000))
    } else if let Some(rest) = cleaned.strip_suffix('M') {
        (rest.trim(), Decimal::from(1_000_000))
    } else {
        (cleaned, Decimal::ONE)
    };

    let filtered: String = body
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();
    if filtered.is_empty() || !filtered.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    // Disambiguate separators: with both present the later one is the
    // decimal mark, and a separator repeated on its own can only be grouping.
    let commas = filtered.matches(',').count();
    let dots = filtered.matches('.').count();
    let normalized = if commas > 0 && dots > 0 {
        if filtered.rfind(',') > filtered.rfind('.') {
            filtered.replace('.', "").replace(',', ".")
        } else {
            filtered.replace(',', "")
        }
    } else if commas > 1 {
        filtered.replace(',', "")
    } else if commas == 1 {
        filtered.replace(',', ".")
    } else if dots > 1 {
        filtered.replace('.', "")
    } else {
        filtered
    };

    Decimal::from_str(&normalized)
        .ok()
        .map(|value| value * multiplier)
}

/// Format an amount in French style: space-grouped thousands, comma decimal
/// mark, trailing euro sign. Fractional part is shown only when non-zero.
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let raw = rounded.to_string();
    let (int_part, frac_part) = match raw.split_once('.') {
        Some((i, f)) => (i.to_string(), f.trim_end_matches('0').to_string()),
        None => (raw, String::new()),
    };

    let (sign, digits) = match int_part.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", int_part.as_str()),
    };

    let mut grouped = String::new();
    let len = digits.len();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(c);
    }

    if frac_part.is_empty() {
        format!("{sign}{grouped} €")
    } else {
        format!("{sign}{grouped},{frac_part} €")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_french_grouping() {
        assert_eq!(parse_amount("1 234,56 €"), Some(dec("1234.56")));
        assert_eq!(parse_amount("2 500 000 € HT"), Some(dec("2500000")));
    }

    #[test]
    fn test_parse_anglo_grouping() {
        assert_eq!(parse_amount("1,234.56 €"), Some(dec("1234.56")));
    }

    #[test]
    fn test_repeated_separator_is_grouping() {
        // no decimal part at all: every repeated separator groups thousands
        assert_eq!(parse_amount("1,234,567 €"), Some(dec("1234567")));
        assert_eq!(parse_amount("1.234.567 €"), Some(dec("1234567")));
    }

    #[test]
    fn test_parse_scale_suffixes() {
        assert_eq!(parse_amount("150 k€"), Some(dec("150000")));
        assert_eq!(parse_amount("2,5 M€"), Some(dec("2500000")));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_amount("montant non communiqué"), None);
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("€"), None);
    }

    #[test]
    fn test_format_french_style() {
        assert_eq!(format_amount(dec("2500000")), "2 500 000 €");
        assert_eq!(format_amount(dec("1234.56")), "1 234,56 €");
        assert_eq!(format_amount(dec("150000.00")), "150 000 €");
    }
}
