//! Contextual line analysis: numbered lot lists without "Lot" headings.
//!
//! Picks up the "Allotissement" section style, where lots appear as numbered
//! lines ("3 - Consommables de laboratoire"), sometimes wrapped over several
//! lines.

use lazy_static::lazy_static;
use regex::Regex;

use crate::normalize::text::clean_title;
use crate::pipeline::Table;
use crate::segment::{dedupe_seeds, LotSeed, SegmentationStrategy};

lazy_static! {
    static ref SECTION_ANCHOR: Regex = Regex::new(
        r"(?i)allotissement|d[ée]composition\s+en\s+lots|liste\s+des\s+lots|d[ée]signation\s+des\s+lots"
    )
    .unwrap();
    static ref NUMBERED_LINE: Regex =
        Regex::new(r"^\s*(\d{1,3})\s*[.:\-–)]\s+(\S.*)$").unwrap();
    static ref AMOUNT_LINE: Regex =
        Regex::new(r"(?i)^(montant|estimatif|maximum|valeur|quantit[ée])\b|€").unwrap();
}

/// Lines scanned after the section anchor.
const SECTION_SPAN: usize = 60;

pub struct LineAnalysisStrategy {
    max_lot_number: u32,
}

impl LineAnalysisStrategy {
    pub fn new(max_lot_number: u32) -> Self {
        LineAnalysisStrategy { max_lot_number }
    }
}

/// A continuation line extends the previous lot title: non-empty, does not
/// start a new numbered entry, reads like wrapped prose rather than a new
/// section, and is not an amount or quantity label under the lot heading.
fn is_continuation(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty()
        && !NUMBERED_LINE.is_match(line)
        && !SECTION_ANCHOR.is_match(line)
        && !AMOUNT_LINE.is_match(trimmed)
        && trimmed.chars().next().is_some_and(|c| !c.is_ascii_digit())
        && trimmed.len() < 80
}

impl SegmentationStrategy for LineAnalysisStrategy {
    fn name(&self) -> &'static str {
        "line_analysis"
    }

    fn run(&self, text: &str, _tables: &[Table]) -> Vec<LotSeed> {
        let lines: Vec<&str> = text.lines().collect();
        let Some(anchor) = lines.iter().position(|l| SECTION_ANCHOR.is_match(l)) else {
            return Vec::new();
        };

        let mut seeds: Vec<LotSeed> = Vec::new();
        let mut blank_run = 0usize;

        for line in lines
            .iter()
            .skip(anchor + 1)
            .take(SECTION_SPAN)
        {
            if line.trim().is_empty() {
                blank_run += 1;
                // Two blank lines end the list.
                if blank_run >= 2 && !seeds.is_empty() {
                    break;
                }
                continue;
            }
            blank_run = 0;

            if let Some(caps) = NUMBERED_LINE.captures(line) {
                if let Ok(number) = caps[1].parse::<u32>() {
                    if number >= 1 && number <= self.max_lot_number {
                        seeds.push(LotSeed {
                            number,
                            title: Some(caps[2].to_string()),
                            estimated: None,
                            maximum: None,
                        });
                        continue;
                    }
                }
            }

            if is_continuation(line) {
                if let Some(last) = seeds.last_mut() {
                    last.title = Some(match last.title.take() {
                        Some(t) => format!("{t} {}", line.trim()),
                        None => line.trim().to_string(),
                    });
                }
            }
        }

        // titles are cleaned once fully assembled, wrapped lines included
        for seed in &mut seeds {
            seed.title = seed
                .title
                .take()
                .map(|t| clean_title(&t))
                .filter(|t| !t.is_empty());
        }

        dedupe_seeds(seeds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_numbered_list_after_anchor() {
        let text = "\
ARTICLE 2 - ALLOTISSEMENT

1 - Scanners mobiles
2 - Maintenance préventive
3 - Consommables de laboratoire
";
        let strategy = LineAnalysisStrategy::new(200);
        let seeds = strategy.run(text, &[]);
        assert_eq!(seeds.len(), 3);
        assert_eq!(seeds[2].title.as_deref(), Some("Consommables de laboratoire"));
    }

    #[test]
    fn test_wrapped_title_joined() {
        let text = "\
Liste des lots :

1 - Fourniture et installation de
dispositifs de perfusion
2 - Maintenance
";
        let strategy = LineAnalysisStrategy::new(200);
        let seeds = strategy.run(text, &[]);
        assert_eq!(seeds.len(), 2);
        assert_eq!(
            seeds[0].title.as_deref(),
            Some("Fourniture et installation de dispositifs de perfusion")
        );
    }

    #[test]
    fn test_amount_label_line_not_glued_to_title() {
        let text = "\
Liste des lots :

1 - Scanners mobiles
Montant estimé : 500 000 €
2 - Maintenance préventive
";
        let strategy = LineAnalysisStrategy::new(200);
        let seeds = strategy.run(text, &[]);
        assert_eq!(seeds.len(), 2);
        assert_eq!(seeds[0].title.as_deref(), Some("Scanners mobiles"));
    }

    #[test]
    fn test_no_anchor_no_lots() {
        let text = "1 - Introduction\n2 - Contexte\n";
        let strategy = LineAnalysisStrategy::new(200);
        assert!(strategy.run(text, &[]).is_empty());
    }

    #[test]
    fn test_list_ends_after_blank_gap() {
        let text = "\
Allotissement

1 - Scanners


4 - Modalités de paiement
";
        let strategy = LineAnalysisStrategy::new(200);
        let seeds = strategy.run(text, &[]);
        assert_eq!(seeds.len(), 1);
        assert_eq!(seeds[0].number, 1);
    }
}
