//! Heading-driven lot detection: explicit "Lot N° 3 : ..." lines.

use lazy_static::lazy_static;
use regex::Regex;

use crate::normalize::amounts::parse_amount;
use crate::normalize::text::clean_title;
use crate::pipeline::Table;
use crate::segment::{dedupe_seeds, LotSeed, SegmentationStrategy};

lazy_static! {
    static ref LOT_HEADING: Regex =
        Regex::new(r"(?im)^\s*lot\s*(?:n[°o]\s*)?(\d{1,3})\s*[:\-–.]?\s*(.*)$").unwrap();
    static ref BLOCK_ESTIMATED: Regex =
        Regex::new(r"(?i)(?:montant\s+)?estim[ée]e?\s*(?:\(€\s*HT\))?\s*:?\s*([\d\s.,]+\s*[kM]?\s*€)").unwrap();
    static ref BLOCK_MAXIMUM: Regex =
        Regex::new(r"(?i)(?:montant\s+)?maxi(?:mum|mal)?\s*(?:\(€\s*HT\))?\s*:?\s*([\d\s.,]+\s*[kM]?\s*€)").unwrap();
}

pub struct RegexBlockStrategy {
    max_lot_number: u32,
}

impl RegexBlockStrategy {
    pub fn new(max_lot_number: u32) -> Self {
        RegexBlockStrategy { max_lot_number }
    }
}

impl SegmentationStrategy for RegexBlockStrategy {
    fn name(&self) -> &'static str {
        "regex_block"
    }

    fn run(&self, text: &str, _tables: &[Table]) -> Vec<LotSeed> {
        // Heading positions delimit the blocks; each block runs to the next
        // heading and is scanned for that lot's amounts.
        let matches: Vec<(u32, String, usize, usize)> = LOT_HEADING
            .captures_iter(text)
            .filter_map(|caps| {
                let number: u32 = caps[1].parse().ok()?;
                if number == 0 || number > self.max_lot_number {
                    return None;
                }
                let whole = caps.get(0)?;
                Some((
                    number,
                    caps[2].trim().to_string(),
                    whole.start(),
                    whole.end(),
                ))
            })
            .collect();

        let mut seeds = Vec::new();
        for (i, (number, heading_rest, _start, end)) in matches.iter().enumerate() {
            let block_end = matches
                .get(i + 1)
                .map(|next| next.2)
                .unwrap_or(text.len());
            let block = &text[*end..block_end];

            let title = Some(clean_title(heading_rest)).filter(|t| !t.is_empty());
            let estimated = BLOCK_ESTIMATED
                .captures(block)
                .and_then(|caps| parse_amount(&caps[1]));
            let maximum = BLOCK_MAXIMUM
                .captures(block)
                .and_then(|caps| parse_amount(&caps[1]));

            seeds.push(LotSeed {
                number: *number,
                title,
                estimated,
                maximum,
            });
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

    #[test]
    fn test_headings_with_titles_and_amounts() {
        let text = "\
Lot 1 : Scanners mobiles
Montant estimé : 1 200 000 €
Montant maximum : 1 500 000 €

Lot N° 2 - Maintenance préventive
Montant estimé : 150 k€
";
        let strategy = RegexBlockStrategy::new(200);
        let seeds = strategy.run(text, &[]);
        assert_eq!(seeds.len(), 2);
        assert_eq!(seeds[0].title.as_deref(), Some("Scanners mobiles"));
        assert_eq!(
            seeds[0].maximum,
            Some(Decimal::from_str("1500000").unwrap())
        );
        assert_eq!(seeds[1].number, 2);
        assert_eq!(seeds[1].title.as_deref(), Some("Maintenance préventive"));
        assert_eq!(
            seeds[1].estimated,
            Some(Decimal::from_str("150000").unwrap())
        );
    }

    #[test]
    fn test_amounts_stay_in_their_block() {
        let text = "Lot 1 : A\n\nLot 2 : B\nMontant estimé : 500 000 €\n";
        let strategy = RegexBlockStrategy::new(200);
        let seeds = strategy.run(text, &[]);
        assert_eq!(seeds[0].estimated, None);
        assert_eq!(
            seeds[1].estimated,
            Some(Decimal::from_str("500000").unwrap())
        );
    }

    #[test]
    fn test_duplicate_headings_deduplicated() {
        let text = "Lot 1 : A\ntexte\nLot 1 : A (rappel)\n";
        let strategy = RegexBlockStrategy::new(200);
        let seeds = strategy.run(text, &[]);
        assert_eq!(seeds.len(), 1);
        assert_eq!(seeds[0].title.as_deref(), Some("A"));
    }

    #[test]
    fn test_mid_sentence_lot_mentions_ignored() {
        let text = "Le lot 3 est décrit plus bas.\n";
        let strategy = RegexBlockStrategy::new(200);
        assert!(strategy.run(text, &[]).is_empty());
    }
}
