//! Normalization of raw text fragments into typed field values.
//!
//! Extraction hands over the raw matched string; this module coerces it into
//! the field's semantic type. Coercion fails closed: a value that cannot be
//! parsed yields `None` and the field stays null.

pub mod amounts;
pub mod dates;
pub mod text;

pub use amounts::{format_amount, parse_amount};
pub use dates::{format_date, parse_date};
pub use text::{clean_field_value, clean_title, repair_ocr_text};

use crate::models::record::FieldValue;
use crate::models::schema::FieldType;

/// Coerce a raw extracted string into a typed value for the given field type.
pub fn normalize_value(raw: &str, field_type: FieldType) -> Option<FieldValue> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match field_type {
        FieldType::Date => dates::parse_date(raw).map(FieldValue::Date),
        FieldType::Currency => amounts::parse_amount(raw).map(FieldValue::Amount),
        FieldType::Integer => {
            let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
            digits.parse::<i64>().ok().map(FieldValue::Integer)
        }
        FieldType::Boolean => parse_boolean(raw).map(FieldValue::Boolean),
        FieldType::Text | FieldType::Enum => {
            let cleaned = text::clean_field_value(raw);
            if cleaned.is_empty() {
                None
            } else {
                Some(FieldValue::Text(cleaned))
            }
        }
    }
}

fn parse_boolean(raw: &str) -> Option<bool> {
    match raw.to_lowercase().as_str() {
        "oui" | "yes" | "x" | "true" | "1" => Some(true),
        "non" | "no" | "false" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn test_normalize_by_type() {
        assert_eq!(
            normalize_value("15/03/2025", FieldType::Date),
            Some(FieldValue::Date(
                NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()
            ))
        );
        assert_eq!(
            normalize_value("1 234,56 €", FieldType::Currency),
            Some(FieldValue::Amount(Decimal::from_str("1234.56").unwrap()))
        );
        assert_eq!(
            normalize_value("48 mois", FieldType::Integer),
            Some(FieldValue::Integer(48))
        );
        assert_eq!(
            normalize_value("OUI", FieldType::Boolean),
            Some(FieldValue::Boolean(true))
        );
    }

    #[test]
    fn test_unparseable_values_fail_closed() {
        assert_eq!(normalize_value("bientôt", FieldType::Date), None);
        assert_eq!(normalize_value("gratuit", FieldType::Currency), None);
        assert_eq!(normalize_value("peut-être", FieldType::Boolean), None);
        assert_eq!(normalize_value("   ", FieldType::Text), None);
    }
}
