use std::fs;
use std::io::Cursor;
use std::sync::Arc;

use lexrag_core::config::PipelineSettings;
use lexrag_core::data_processor::DataProcessor;
use lexrag_core::store::ChunkStore;
use lexrag_core::trace::{JsonlTraceSink, MemoryTraceSink, TraceEvent};
use lexrag_core::types::Citation;
use lexrag_pipeline::{evaluate, run_batch, BatchRow, QueryCache, RagOrchestrator, DEFAULT_K};

const PLAN: &str = "Bilgisayar Mühendisliği Ders Planı\n\n\
Dönem: Güz\nCSE3055 Database Systems\nCSE3063 Object Oriented Design - Önkoşul: CSE1242\n\n\
Dönem: Bahar\nCSE3064 Web Programming - Önkoşul: CSE3063";

const STAFF: &str = "Akademik Kadro\n\n\
Prof. Dr. Ali Veli\nOfis: M2-240\nE-posta: ali@uni.edu\n\n\
Doç. Dr. Ayşe Kaya\nOfis: M2-118\nE-posta: ayse@uni.edu";

fn orchestrator(dir: &std::path::Path) -> RagOrchestrator {
    let corpus = dir.join("corpus");
    fs::create_dir_all(&corpus).unwrap();
    fs::write(corpus.join("ders_plani.txt"), PLAN).unwrap();
    fs::write(corpus.join("akademik_kadro.txt"), STAFF).unwrap();
    let processor = DataProcessor::new();
    let chunks = processor.process_directory(&corpus).unwrap();
    let index = processor.build_index(&chunks).unwrap();
    RagOrchestrator::standard(index, ChunkStore::new(chunks), &PipelineSettings::default())
}

#[test]
fn course_question_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let sink = Arc::new(MemoryTraceSink::new());
    let orch = orchestrator(dir.path()).with_sink(Arc::clone(&sink));

    let answer = orch.run("CSE3063 dersinin önkoşulu nedir?");
    assert_eq!(answer.final_text, "Dönem: Güz\nCSE3063 Object Oriented Design - Önkoşul: CSE1242");
    assert_eq!(answer.citations[0].to_string(), "ders_plani.txt:P1:0-0");
    assert_eq!(
        answer.to_string(),
        "Dönem: Güz\nCSE3063 Object Oriented Design - Önkoşul: CSE1242\n\nders_plani.txt:P1:0-0"
    );

    let events = sink.events();
    assert_eq!(events[1].outputs_summary, "Detected intent: COURSE_INFO");
    assert_eq!(events[2].outputs_summary, r#"Search terms: ["cse3063", "önkoşulu"]"#);
}

#[test]
fn staff_question_gets_office_block() {
    let dir = tempfile::tempdir().unwrap();
    let orch = orchestrator(dir.path());
    let answer = orch.run("Ayşe Kaya hoca nerede oturuyor?");
    assert_eq!(answer.final_text, "Doç. Dr. Ayşe Kaya\nOfis: M2-118\nE-posta: ayse@uni.edu");
    assert_eq!(answer.citations[0].doc_id, "akademik_kadro.txt");
}

#[test]
fn jsonl_sink_writes_one_event_per_stage() {
    let dir = tempfile::tempdir().unwrap();
    let trace_path = dir.path().join("logs/run.jsonl");
    let orch = orchestrator(dir.path()).with_sink(JsonlTraceSink::new(&trace_path));
    orch.run("yemekhane");

    let raw = fs::read_to_string(&trace_path).unwrap();
    let events: Vec<TraceEvent> = raw.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
    let stages: Vec<&str> = events.iter().map(|e| e.stage.as_str()).collect();
    assert_eq!(stages, ["START", "INTENT", "QUERY", "RETRIEVE", "RERANK", "ANSWER", "END"]);
    assert!(raw.contains("\"outputsSummary\""));
}

#[test]
fn cache_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let cache_path = dir.path().join("answers.json");
    let first = orchestrator(dir.path()).with_cache(QueryCache::load(&cache_path)).run("CSE3064 önkoşul");

    let sink = Arc::new(MemoryTraceSink::new());
    let orch = orchestrator(dir.path()).with_cache(QueryCache::load(&cache_path)).with_sink(Arc::clone(&sink));
    assert_eq!(orch.run("cse3064 önkoşul "), first);
    assert_eq!(sink.stages(), vec!["START", "CACHE", "END"]);
}

#[test]
fn batch_writes_rows_in_input_order() {
    let dir = tempfile::tempdir().unwrap();
    let orch = orchestrator(dir.path());
    let input = "{\"id\":\"a\",\"question\":\"CSE3063 önkoşul\"}\n\n{\"q\":\"yemekhane\"}\n";
    let mut out = Vec::new();
    let mut seen = 0;
    let n = run_batch(&orch, Cursor::new(input), &mut out, |_| seen += 1).unwrap();
    assert_eq!((n, seen), (2, 2));

    let raw = String::from_utf8(out).unwrap();
    let first: serde_json::Value = serde_json::from_str(raw.lines().next().unwrap()).unwrap();
    assert_eq!(first["citations"][0]["docId"], "ders_plani.txt");
    assert_eq!(first["citations"][0]["sectionId"], "P2");
    assert_eq!(first["citations"][0]["startOffset"], 0);

    let rows: Vec<BatchRow> = raw.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
    assert_eq!(rows[0].id, "a");
    // both plan paragraphs hold both terms; the spring one has them adjacent
    assert_eq!(rows[0].citations, vec![Citation::new("ders_plani.txt", "P2", 0, 0)]);
    assert_eq!(rows[0].answer, "Dönem: Bahar\nCSE3064 Web Programming - Önkoşul: CSE3063");
    assert_eq!(rows[1].id, "3");
    assert!(rows[1].citations.is_empty());
}

#[test]
fn batch_rejects_line_without_question() {
    let dir = tempfile::tempdir().unwrap();
    let orch = orchestrator(dir.path());
    let err = run_batch(&orch, Cursor::new("{\"q\":\"staj\"}\n{\"id\":2}\n"), Vec::<u8>::new(), |_| {}).unwrap_err();
    assert!(err.to_string().contains("line 2"));
}

#[test]
fn evaluation_summary() {
    let dir = tempfile::tempdir().unwrap();
    let orch = orchestrator(dir.path());
    let gold = concat!(
        "{\"question\":\"CSE3063 önkoşul\",\"expected_doc\":\"ders_plani\",\"expected_chunk\":2}\n",
        "{\"question\":\"Ayşe Kaya ofis\",\"expected_doc\":\"akademik_kadro.txt\",\"expected_chunk\":0}\n",
        "{\"question\":\"yemekhane\",\"expected_doc\":\"menu.txt\"}\n",
        "{\"question\":\"ofis önkoşul\",\"expected_doc\":\"ders_plani\"}\n",
    );
    let (results, summary) = evaluate(&orch, Cursor::new(gold), DEFAULT_K).unwrap();
    assert_eq!(results.len(), 4);
    assert!(results[0].doc_match && results[0].chunk_match);
    assert!(results[1].doc_match && !results[1].chunk_match);
    assert!(!results[2].doc_match && !results[2].covered);
    // all four hits tie at 10, so the staff file ranks first by name
    assert_eq!(results[3].ranked_docs, vec!["akademik_kadro.txt", "ders_plani.txt"]);
    assert!(!results[3].doc_match && results[3].covered);
    assert_eq!((summary.doc_matches, summary.chunk_total, summary.chunk_matches, summary.covered), (2, 2, 1, 3));
    assert_eq!(summary.coverage_at_k(), 0.75);
    assert_eq!(summary.latency().map(|l| l.n), Some(4));

    let (results, _) = evaluate(&orch, Cursor::new(gold), 1).unwrap();
    assert!(!results[3].covered);
}
