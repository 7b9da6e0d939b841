//! Table-driven lot detection.
//!
//! The most reliable source: a table with a lot-number column and, usually,
//! title and amount columns.

use crate::normalize::amounts::parse_amount;
use crate::normalize::text::clean_title;
use crate::pipeline::Table;
use crate::segment::{dedupe_seeds, LotSeed, SegmentationStrategy};

pub struct StructuredTableStrategy {
    max_lot_number: u32,
}

impl StructuredTableStrategy {
    pub fn new(max_lot_number: u32) -> Self {
        StructuredTableStrategy { max_lot_number }
    }
}

fn header_index(headers: &[String], needles: &[&str]) -> Option<usize> {
    headers.iter().position(|h| {
        let lowered = h.to_lowercase();
        needles.iter().any(|n| lowered.contains(n))
    })
}

/// Lot numbers in tables come as "1", "Lot 1" or "N°1".
fn parse_lot_number(cell: &str) -> Option<u32> {
    let digits: String = cell.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

impl SegmentationStrategy for StructuredTableStrategy {
    fn name(&self) -> &'static str {
        "structured_table"
    }

    fn run(&self, _text: &str, tables: &[Table]) -> Vec<LotSeed> {
        let mut seeds = Vec::new();

        for table in tables {
            let Some(lot_col) = header_index(&table.headers, &["lot"]) else {
                continue;
            };
            let title_col = header_index(
                &table.headers,
                &["intitul", "désignation", "designation", "objet", "libell"],
            );
            let estimated_col = header_index(&table.headers, &["estim"]);
            let maximum_col = header_index(&table.headers, &["maxi"]);

            for row in &table.rows {
                let Some(number) = row.get(lot_col).and_then(|c| parse_lot_number(c)) else {
                    continue;
                };
                if number == 0 || number > self.max_lot_number {
                    continue;
                }
                let title = title_col
                    .and_then(|i| row.get(i))
                    .map(|c| clean_title(c))
                    .filter(|t| !t.is_empty());
                let estimated = estimated_col
                    .and_then(|i| row.get(i))
                    .and_then(|c| parse_amount(c));
                let maximum = maximum_col
                    .and_then(|i| row.get(i))
                    .and_then(|c| parse_amount(c));

                seeds.push(LotSeed {
                    number,
                    title,
                    estimated,
                    maximum,
                });
            }
        }

        dedupe_seeds(seeds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn table() -> Table {
        Table {
            headers: vec![
                "Lot".to_string(),
                "Intitulé".to_string(),
                "Montant estimé (€ HT)".to_string(),
                "Montant maxi (€ HT)".to_string(),
            ],
            rows: vec![
                vec![
                    "1".to_string(),
                    "Scanners mobiles".to_string(),
                    "1 200 000 €".to_string(),
                    "1 500 000 €".to_string(),
                ],
                vec![
                    "Lot 2".to_string(),
                    "Maintenance".to_string(),
                    "150 k€".to_string(),
                    "".to_string(),
                ],
                vec!["Total".to_string(), "".to_string(), "".to_string(), "".to_string()],
            ],
        }
    }

    #[test]
    fn test_rows_become_seeds() {
        let strategy = StructuredTableStrategy::new(200);
        let seeds = strategy.run("", &[table()]);
        assert_eq!(seeds.len(), 2);
        assert_eq!(seeds[0].number, 1);
        assert_eq!(seeds[0].title.as_deref(), Some("Scanners mobiles"));
        assert_eq!(
            seeds[0].estimated,
            Some(Decimal::from_str("1200000").unwrap())
        );
        assert_eq!(seeds[1].number, 2);
        assert_eq!(seeds[1].estimated, Some(Decimal::from_str("150000").unwrap()));
        assert_eq!(seeds[1].maximum, None);
    }

    #[test]
    fn test_table_without_lot_column_is_ignored() {
        let t = Table {
            headers: vec!["Critère".to_string(), "Pondération".to_string()],
            rows: vec![vec!["Prix".to_string(), "40 %".to_string()]],
        };
        let strategy = StructuredTableStrategy::new(200);
        assert!(strategy.run("", &[t]).is_empty());
    }

    #[test]
    fn test_out_of_bounds_lot_numbers_dropped() {
        let t = Table {
            headers: vec!["Lot".to_string()],
            rows: vec![vec!["999".to_string()], vec!["0".to_string()]],
        };
        let strategy = StructuredTableStrategy::new(200);
        assert!(strategy.run("", &[t]).is_empty());
    }
}
