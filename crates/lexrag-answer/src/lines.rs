//! Line classifiers used while assembling an answer block.

use lexrag_core::text::to_lower_tr;

/// Prefixes of academic-title lines (`Prof. Dr. ...`, `Doç. ...`, `Arş. Gör. ...`).
pub const TITLE_PREFIXES: [&str; 5] = ["prof", "doç", "dr", "öğr", "arş"];

/// Markers of a semester/term header above a course list.
pub const TERM_MARKERS: [&str; 3] = ["dönem", "semester", "yarıyıl"];

/// Number of lines scanned upward from a course line for its term header.
pub const HEADER_LOOKBACK: usize = 6;

/// A course entry starts (after optional whitespace) with two or more ASCII
/// capitals directly followed by three or more digits, e.g. `CSE3063 ...`.
pub fn is_course_line(line: &str) -> bool {
    let rest = line.trim_start();
    let letters = rest.bytes().take_while(u8::is_ascii_uppercase).count();
    if letters < 2 {
        return false;
    }
    rest.bytes().skip(letters).take_while(u8::is_ascii_digit).count() >= 3
}

pub fn is_title_line(line: &str) -> bool {
    let lower = to_lower_tr(line);
    TITLE_PREFIXES.iter().any(|p| lower.starts_with(p))
}

pub fn has_term_marker(line: &str) -> bool {
    let lower = to_lower_tr(line);
    TERM_MARKERS.iter().any(|m| lower.contains(m))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn course_lines() {
        assert!(is_course_line("CSE3063 Object Oriented Design"));
        assert!(is_course_line("   MATH1001 Calculus"));
        assert!(is_course_line("ATA121"));
        assert!(!is_course_line("CSE 3063 spaced"));
        assert!(!is_course_line("C3063 one letter"));
        assert!(!is_course_line("CSE30 two digits"));
        assert!(!is_course_line("cse3063 lowercase"));
    }

    #[test]
    fn title_lines() {
        assert!(is_title_line("Prof. Dr. Ali Yılmaz"));
        assert!(is_title_line("DOÇ. DR. AYŞE KAYA"));
        assert!(is_title_line("Arş. Gör. Mehmet"));
        assert!(!is_title_line("Ofis: M2-240"));
    }

    #[test]
    fn term_markers() {
        assert!(has_term_marker("1. Dönem (Güz)"));
        assert!(has_term_marker("3. YARIYIL"));
        assert!(has_term_marker("Fall Semester"));
        assert!(!has_term_marker("CSE3055 Database Systems"));
    }
}
