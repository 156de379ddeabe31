//! Text normalization shared by indexing, query writing and answer extraction.
//!
//! Two lowercasings are in play. Questions are lowercased with Turkish rules
//! (`I` -> `ı`, `İ` -> `i`); chunk text and index tokens use the default
//! Unicode mapping. The two only disagree on the dotted/dotless I pair.

/// Lowercase with Turkish casing for the `I`/`İ` pair, Unicode default for everything else.
pub fn to_lower_tr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            'I' => out.push('ı'),
            'İ' => out.push('i'),
            _ => out.extend(c.to_lowercase()),
        }
    }
    out
}

pub fn contains_digit(s: &str) -> bool {
    s.chars().any(|c| c.is_ascii_digit())
}

/// Length in characters, not bytes.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn is_word_char(c: char) -> bool {
    c.is_alphabetic() || c.is_ascii_digit()
}

/// Search terms as written by the query writer: every non letter/digit becomes a separator.
pub fn split_query(question: &str) -> Vec<String> {
    let normalized: String = to_lower_tr(question)
        .chars()
        .map(|c| if is_word_char(c) { c } else { ' ' })
        .collect();
    normalized.split_whitespace().map(str::to_string).collect()
}

/// Question tokens as seen by answer extraction.
///
/// Punctuation is deleted rather than replaced, so `CSE3063'ün` stays a single
/// token `cse3063ün`. Only the ASCII space survives as a separator.
pub fn strip_question(question: &str) -> Vec<String> {
    let kept: String = to_lower_tr(question)
        .chars()
        .filter(|&c| is_word_char(c) || c == ' ')
        .collect();
    kept.split_whitespace().map(str::to_string).collect()
}

const INDEX_EXTRA_LETTERS: &str = "ğüşıöçĞÜŞİÖÇ";

fn is_index_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || INDEX_EXTRA_LETTERS.contains(c)
}

/// Index-time tokenizer: default lowercasing, split on anything outside ASCII
/// alphanumerics plus the Turkish letters, drop tokens shorter than `min_len` chars.
pub fn index_tokens(text: &str, min_len: usize) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !is_index_char(c))
        .filter(|t| char_len(t) >= min_len)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turkish_i_pair() {
        assert_eq!(to_lower_tr("IŞIK"), "ışık");
        assert_eq!(to_lower_tr("İSTANBUL"), "istanbul");
        assert_eq!(to_lower_tr("CSE3063 Önkoşul"), "cse3063 önkoşul");
    }

    #[test]
    fn default_lowercase_differs_on_dotted_i() {
        assert_ne!("İ".to_lowercase(), to_lower_tr("İ"));
    }

    #[test]
    fn split_query_replaces_punctuation() {
        assert_eq!(split_query("CSE3063'ün önkoşulu nedir?"), vec!["cse3063", "ün", "önkoşulu", "nedir"]);
    }

    #[test]
    fn strip_question_deletes_punctuation() {
        assert_eq!(strip_question("CSE3063'ün önkoşulu nedir?"), vec!["cse3063ün", "önkoşulu", "nedir"]);
        assert_eq!(strip_question("  Dr. Ayşe  "), vec!["dr", "ayşe"]);
    }

    #[test]
    fn index_tokens_keep_turkish_letters_and_min_length() {
        let toks = index_tokens("Öğrenci işleri: CSE3063, ve OOP!", 3);
        assert_eq!(toks, vec!["öğrenci", "işleri", "cse3063", "oop"]);
    }

    #[test]
    fn digit_detection() {
        assert!(contains_digit("cse3063"));
        assert!(!contains_digit("önkoşul"));
    }
}
