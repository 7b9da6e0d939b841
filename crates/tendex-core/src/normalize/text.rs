//! Text cleanup for decoded document streams and extracted fragments.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref MULTI_SPACE: Regex = Regex::new(r"[ \t]{2,}").unwrap();
    static ref MULTI_NEWLINE: Regex = Regex::new(r"\n{3,}").unwrap();
    // A word split by a spurious line break inside a letter run. `[^\W\d_]`
    // matches any Unicode letter, accented ones included.
    static ref BROKEN_WORD: Regex = Regex::new(r"([^\W\d_])-\n([^\W\d_])").unwrap();
    static ref SPACE_BEFORE_PUNCT: Regex = Regex::new(r" +([,.;)])").unwrap();
    static ref TITLE_NOISE: Regex = Regex::new(r"[^\w\s,.()/'\-]").unwrap();
    static ref TRAILING_AMOUNT: Regex =
        Regex::new(r"(?i)[\s:\-–]*\d[\d\s.,]*\s*[kM]?\s*€(\s*HT)?\s*$").unwrap();
}

/// Repair decoding artifacts without altering meaning.
///
/// Only unambiguous substitutions are applied: rejoining hyphen-broken words,
/// straightening curly apostrophes, collapsing runs of spaces, capping
/// blank-line runs, dropping the space decoders insert before punctuation.
/// Content is never rewritten.
pub fn repair_ocr_text(text: &str) -> String {
    let text = text
        .replace('\u{00a0}', " ")
        .replace('\r', "")
        .replace(['\u{2019}', '\u{02bc}'], "'");
    let text = BROKEN_WORD.replace_all(&text, "$1$2");
    let text = SPACE_BEFORE_PUNCT.replace_all(&text, "$1");
    let text = MULTI_SPACE.replace_all(&text, " ");
    let text = MULTI_NEWLINE.replace_all(&text, "\n\n");
    text.trim().to_string()
}

/// Clean an extracted field fragment: flatten line breaks, trim punctuation
/// dangling at the edges.
pub fn clean_field_value(raw: &str) -> String {
    let flat = raw.replace('\n', " ").replace('\u{00a0}', " ");
    let flat = MULTI_SPACE.replace_all(&flat, " ");
    flat.trim()
        .trim_matches(|c: char| matches!(c, ':' | ';' | '-' | '*' | '|'))
        .trim()
        .to_string()
}

const TRAILING_STOP_WORDS: [&str; 8] = ["de", "des", "du", "et", "ou", "la", "le", "les"];

/// Clean a title candidate. Keeps the punctuation that carries meaning in
/// procedure titles (commas, periods, parentheses, slashes), drops stray
/// symbols, and trims a trailing amount or dangling stop-word left over from
/// the surrounding layout.
pub fn clean_title(raw: &str) -> String {
    let flat = clean_field_value(raw);
    let flat = TRAILING_AMOUNT.replace(&flat, "");
    let cleaned = TITLE_NOISE.replace_all(&flat, " ");
    let mut title = MULTI_SPACE.replace_all(&cleaned, " ").trim().to_string();

    while let Some(last) = title.split_whitespace().last() {
        if TRAILING_STOP_WORDS.contains(&last.to_lowercase().as_str()) {
            title.truncate(title.len() - last.len());
            title = title.trim_end().to_string();
        } else {
            break;
        }
    }
    title
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_repair_rejoins_broken_words() {
        assert_eq!(repair_ocr_text("fournit-\nure de scanners"), "fourniture de scanners");
        // accented letters count as letters
        assert_eq!(repair_ocr_text("procé-\ndure ouverte"), "procédure ouverte");
    }

    #[test]
    fn test_repair_collapses_whitespace() {
        assert_eq!(
            repair_ocr_text("ACCORD    CADRE\n\n\n\n\nLot 1"),
            "ACCORD CADRE\n\nLot 1"
        );
    }

    #[test]
    fn test_repair_never_merges_across_plain_newlines() {
        // plain newline without hyphen stays a newline
        assert_eq!(repair_ocr_text("ligne un\nligne deux"), "ligne un\nligne deux");
    }

    #[test]
    fn test_clean_field_value() {
        assert_eq!(clean_field_value("  : Scanners mobiles ;"), "Scanners mobiles");
        assert_eq!(clean_field_value("ligne\nsuite"), "ligne suite");
    }

    #[test]
    fn test_repair_apostrophes_and_punctuation_spacing() {
        assert_eq!(repair_ocr_text("appel d\u{2019}offres ouvert ."), "appel d'offres ouvert.");
        assert_eq!(repair_ocr_text("lots 1 , 2 et 3"), "lots 1, 2 et 3");
    }

    #[test]
    fn test_clean_title_keeps_meaningful_punctuation() {
        assert_eq!(
            clean_title("FOURNITURE, INSTALLATION (LOT 1/2) §§"),
            "FOURNITURE, INSTALLATION (LOT 1/2)"
        );
    }

    #[test]
    fn test_clean_title_strips_trailing_amount_and_stop_word() {
        assert_eq!(clean_title("Scanners mobiles - 1 200 000 €"), "Scanners mobiles");
        assert_eq!(clean_title("Fourniture et installation de"), "Fourniture et installation");
    }
}
