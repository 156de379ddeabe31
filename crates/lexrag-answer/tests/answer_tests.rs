use lexrag_answer::{TemplateAnswerAgent, NO_INFORMATION};
use lexrag_core::traits::AnswerAgent;
use lexrag_core::types::Hit;

const SYLLABUS: &str = "Dönem: Güz\nCSE3055 Database Systems\nCSE3063 Object Oriented Design - Önkoşul: CSE1242\nCSE3215 Digital Logic";

#[test]
fn empty_hits_give_fixed_fallback() {
    let agent = TemplateAnswerAgent::new();
    for q in ["CSE3063 önkoşulu nedir?", "", "staj"] {
        let answer = agent.answer(q, &[]);
        assert_eq!(answer.final_text, NO_INFORMATION);
        assert!(answer.citations.is_empty());
    }
}

#[test]
fn course_code_question_extracts_course_line_with_header() {
    let hits = vec![Hit::new("ders_plani.txt", 5, 100.0).with_text(SYLLABUS)];
    let answer = TemplateAnswerAgent::new().answer("CSE3063 önkoşulu nedir?", &hits);

    assert!(answer.final_text.contains("CSE3063"));
    assert!(answer.final_text.contains("CSE1242"));
    assert_eq!(answer.final_text, "Dönem: Güz\nCSE3063 Object Oriented Design - Önkoşul: CSE1242");
    assert_eq!(answer.citations.len(), 1);
    assert_eq!(answer.citations[0].to_string(), "ders_plani.txt:P5:0-0");
    assert!(answer.to_string().contains("ders_plani.txt:P5"));
}

#[test]
fn escaped_newlines_are_real_line_breaks() {
    let escaped = SYLLABUS.replace('\n', "\\n");
    let hits = vec![Hit::new("ders_plani.txt", 5, 1.0).with_text(escaped)];
    let answer = TemplateAnswerAgent::new().answer("CSE3215", &hits);
    assert_eq!(answer.final_text, "Dönem: Güz\nCSE3215 Digital Logic");
}

#[test]
fn staff_question_returns_contact_block() {
    let text = "Prof. Dr. Ali Veli\nOfis: M2-240\nE-posta: ali@uni.edu\n\nDoç. Dr. Ayşe Kaya\nOfis: M2-118";
    let hits = vec![Hit::new("akademik_kadro.txt", 2, 40.0).with_text(text)];
    let answer = TemplateAnswerAgent::new().answer("Ayşe Kaya hocanın ofisi nerede?", &hits);
    assert_eq!(answer.final_text, "Doç. Dr. Ayşe Kaya\nOfis: M2-118");
}

#[test]
fn unmatched_digit_question_falls_back_to_truncated_text() {
    let long = "x".repeat(350);
    let hits = vec![Hit::new("doc.txt", 0, 1.0).with_text(long.clone())];
    let answer = TemplateAnswerAgent::new().answer("EE9999", &hits);
    assert_eq!(answer.final_text, format!("{}...", &long[..300]));
    assert_eq!(answer.citations[0].to_string(), "doc.txt:P0:0-0");
}

#[test]
fn only_the_top_hit_is_used() {
    let hits = vec![
        Hit::new("a.txt", 1, 50.0).with_text("staj tarihleri"),
        Hit::new("b.txt", 0, 40.0).with_text("staj staj staj tarihleri"),
    ];
    let answer = TemplateAnswerAgent::new().answer("staj tarihleri", &hits);
    assert_eq!(answer.final_text, "staj tarihleri");
    assert_eq!(answer.citations[0].doc_id, "a.txt");
}

#[test]
fn missing_chunk_text_yields_empty_answer_with_citation() {
    let hits = vec![Hit::new("a.txt", 3, 1.0)];
    let answer = TemplateAnswerAgent::new().answer("anything", &hits);
    assert_eq!(answer.final_text, "");
    assert_eq!(answer.citations[0].to_string(), "a.txt:P3:0-0");
}
