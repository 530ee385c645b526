use crate::models::Language;

/// Devanagari Unicode block.
const DEVANAGARI_START: char = '\u{0900}';
const DEVANAGARI_END: char = '\u{097F}';

fn is_devanagari(c: char) -> bool {
    (DEVANAGARI_START..=DEVANAGARI_END).contains(&c)
}

/// Classify a query as Hindi or English by script presence: any code
/// point in the Devanagari block means Hindi, otherwise English.
///
/// Hinglish written in Latin script classifies as English. That is an
/// accepted simplification of the deployed system, not a defect.
pub fn detect(query: &str) -> Language {
    if query.chars().any(is_devanagari) {
        Language::Hi
    } else {
        Language::En
    }
}
