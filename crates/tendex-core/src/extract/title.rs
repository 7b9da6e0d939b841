//! Document title heuristic.
//!
//! Procurement notices usually open with the procedure title set in capitals
//! over one or more lines. The heuristic scans the top of the document for
//! blocks of consecutive mostly-uppercase lines, joins each block into one
//! candidate and scores the candidates.

use crate::normalize::text::clean_title;

/// Lines examined at the top of the document.
const WINDOW_LINES: usize = 30;
/// A line is "uppercase" when at least this fraction of its letters are.
const UPPERCASE_RATIO: f32 = 0.8;

const TITLE_KEYWORDS: [&str; 8] = [
    "FOURNITURE",
    "ACQUISITION",
    "PRESTATION",
    "MAINTENANCE",
    "ACCORD-CADRE",
    "ACCORD CADRE",
    "MARCHÉ",
    "LOCATION",
];

fn uppercase_ratio(line: &str) -> f32 {
    let letters: Vec<char> = line.chars().filter(|c| c.is_alphabetic()).collect();
    if letters.is_empty() {
        return 0.0;
    }
    let upper = letters.iter().filter(|c| c.is_uppercase()).count();
    upper as f32 / letters.len() as f32
}

fn is_title_line(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= 4 && uppercase_ratio(trimmed) >= UPPERCASE_RATIO
}

#[derive(Debug)]
struct Candidate {
    text: String,
    first_line: usize,
}

impl Candidate {
    fn score(&self) -> f32 {
        let mut score = uppercase_ratio(&self.text);

        // Titles are substantial but not walls of text.
        let len = self.text.chars().count();
        if (20..=150).contains(&len) {
            score += 0.5;
        } else if len > 150 {
            score -= 0.3;
        }

        // Earlier blocks are likelier titles.
        score += (WINDOW_LINES - self.first_line.min(WINDOW_LINES)) as f32
            / WINDOW_LINES as f32
            * 0.3;

        let upper = self.text.to_uppercase();
        if TITLE_KEYWORDS.iter().any(|k| upper.contains(k)) {
            score += 0.5;
        }

        score
    }
}

/// Find the document title near the top of the raw text, if any.
///
/// Consecutive uppercase lines are joined with single spaces, so a title
/// wrapped over several lines comes back as one string.
pub fn detect_document_title(text: &str) -> Option<String> {
    let lines: Vec<&str> = text.lines().take(WINDOW_LINES).collect();

    let mut candidates: Vec<Candidate> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_start = 0usize;

    for (i, line) in lines.iter().enumerate() {
        if is_title_line(line) {
            if current.is_empty() {
                current_start = i;
            }
            current.push(line.trim());
        } else if !current.is_empty() {
            candidates.push(Candidate {
                text: current.join(" "),
                first_line: current_start,
            });
            current.clear();
        }
    }
    if !current.is_empty() {
        candidates.push(Candidate {
            text: current.join(" "),
            first_line: current_start,
        });
    }

    candidates
        .into_iter()
        .max_by(|a, b| {
            a.score()
                .partial_cmp(&b.score())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|c| clean_title(&c.text))
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_multi_line_title_is_joined() {
        let text = "CHU DE BORDEAUX\n\nFOURNITURE, INSTALLATION ET MAINTENANCE\nDE SCANNERS MOBILES\n\nRèglement de la consultation\n";
        let title = detect_document_title(text).unwrap();
        assert_eq!(title, "FOURNITURE, INSTALLATION ET MAINTENANCE DE SCANNERS MOBILES");
    }

    #[test]
    fn test_punctuation_preserved_across_joined_lines() {
        let text = "FOURNITURE, INSTALLATION,\nMAINTENANCE D'EQUIPEMENTS\n";
        let title = detect_document_title(text).unwrap();
        assert_eq!(title, "FOURNITURE, INSTALLATION, MAINTENANCE D'EQUIPEMENTS");
    }

    #[test]
    fn test_keyword_block_beats_letterhead() {
        let text = "AGENCE RÉGIONALE\n\ntexte en minuscules ici\n\nACQUISITION DE DISPOSITIFS MÉDICAUX STÉRILES\n";
        let title = detect_document_title(text).unwrap();
        assert_eq!(title, "ACQUISITION DE DISPOSITIFS MÉDICAUX STÉRILES");
    }

    #[test]
    fn test_lowercase_document_has_no_title() {
        let text = "ce document ne contient\nque des lignes en minuscules\nsans aucun titre\n";
        assert_eq!(detect_document_title(text), None);
    }

    #[test]
    fn test_window_ignores_late_uppercase() {
        let mut text = String::new();
        for i in 0..40 {
            text.push_str(&format!("ligne ordinaire numéro {i}\n"));
        }
        text.push_str("FOURNITURE DE GANTS D'EXAMEN\n");
        assert_eq!(detect_document_title(&text), None);
    }
}
