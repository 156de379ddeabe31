//! Wires the stages together: IntentDetect -> QueryWrite -> Retrieve -> Rerank -> Extract.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use tracing::{debug, info, warn};

use lexrag_answer::TemplateAnswerAgent;
use lexrag_core::config::PipelineSettings;
use lexrag_core::store::ChunkStore;
use lexrag_core::trace::{TraceEvent, TraceSink};
use lexrag_core::traits::{AnswerAgent, IntentDetector, QueryWriter, Reranker, Retriever};
use lexrag_core::types::{Answer, Hit, InvertedIndex};
use lexrag_text::{KeywordRetriever, SimpleReranker};

use crate::cache::QueryCache;
use crate::intent::RuleBasedIntentDetector;
use crate::query::HeuristicQueryWriter;

fn elapsed_ms(since: Instant) -> u64 {
    u64::try_from(since.elapsed().as_millis()).unwrap_or(u64::MAX)
}

pub struct RagOrchestrator {
    intent_detector: Box<dyn IntentDetector>,
    query_writer: Box<dyn QueryWriter>,
    retriever: Box<dyn Retriever>,
    reranker: Box<dyn Reranker>,
    answer_agent: Box<dyn AnswerAgent>,
    index: Arc<InvertedIndex>,
    sinks: Vec<Box<dyn TraceSink>>,
    cache: Option<Mutex<QueryCache>>,
}

impl RagOrchestrator {
    pub fn new(
        intent_detector: Box<dyn IntentDetector>,
        query_writer: Box<dyn QueryWriter>,
        retriever: Box<dyn Retriever>,
        reranker: Box<dyn Reranker>,
        answer_agent: Box<dyn AnswerAgent>,
        index: Arc<InvertedIndex>,
    ) -> Self {
        Self { intent_detector, query_writer, retriever, reranker, answer_agent, index, sinks: Vec::new(), cache: None }
    }

    /// Built-in stages over a loaded corpus, tuned by `settings`.
    pub fn standard(index: InvertedIndex, store: ChunkStore, settings: &PipelineSettings) -> Self {
        let detector = settings
            .intent_rules
            .clone()
            .map_or_else(RuleBasedIntentDetector::new, RuleBasedIntentDetector::with_rules);
        Self::new(
            Box::new(detector),
            Box::new(HeuristicQueryWriter::from_settings(&settings.query)),
            Box::new(KeywordRetriever),
            Box::new(SimpleReranker::new(store)),
            Box::new(TemplateAnswerAgent),
            Arc::new(index),
        )
    }

    pub fn with_sink(mut self, sink: impl TraceSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn with_cache(mut self, cache: QueryCache) -> Self {
        self.cache = Some(Mutex::new(cache));
        self
    }

    fn emit(&self, event: TraceEvent) {
        for sink in &self.sinks {
            sink.record(&event);
        }
    }

    fn cached(&self, question: &str) -> Option<Answer> {
        let cache = self.cache.as_ref()?.lock().ok()?;
        cache.get(question).cloned()
    }

    fn remember(&self, question: &str, answer: &Answer) {
        let Some(cache) = &self.cache else { return };
        match cache.lock() {
            Ok(mut c) => {
                if let Err(e) = c.put(question, answer.clone()) {
                    warn!(error = %e, "failed to persist query cache");
                }
            }
            Err(_) => warn!("query cache lock poisoned"),
        }
    }

    /// Answer one question. Never fails: empty results degrade to the fallback answer.
    pub fn run(&self, question: &str) -> Answer {
        self.run_ranked(question).0
    }

    /// Like [`run`](Self::run), also returning the reranked hits. A cached answer comes back with no hits.
    pub fn run_ranked(&self, question: &str) -> (Answer, Vec<Hit>) {
        let started = Instant::now();
        self.emit(TraceEvent::new("START", question, "Question received", 0));

        if let Some(answer) = self.cached(question) {
            self.emit(TraceEvent::new("CACHE", question, "Cache hit", elapsed_ms(started)));
            self.emit(TraceEvent::new("END", question, format!("Total duration: {}ms", elapsed_ms(started)), elapsed_ms(started)));
            debug!("answered from cache");
            return (answer, Vec::new());
        }

        let t = Instant::now();
        let intent = self.intent_detector.detect(question);
        self.emit(TraceEvent::new("INTENT", question, format!("Detected intent: {intent}"), elapsed_ms(t)));

        let t = Instant::now();
        let terms = self.query_writer.write(question, intent);
        self.emit(TraceEvent::new("QUERY", intent.to_string(), format!("Search terms: {terms:?}"), elapsed_ms(t)));

        let t = Instant::now();
        let mut hits = self.retriever.retrieve(&terms, &self.index);
        self.emit(TraceEvent::new("RETRIEVE", terms.join(" "), format!("Found chunks: {}", hits.len()), elapsed_ms(t)));

        let t = Instant::now();
        self.reranker.rerank(&terms, &mut hits);
        let best = hits.first().map_or_else(|| "none".to_string(), |h| format!("{}", h.score));
        self.emit(TraceEvent::new("RERANK", format!("{} hits", hits.len()), format!("Best score: {best}"), elapsed_ms(t)));

        let t = Instant::now();
        let answer = self.answer_agent.answer(question, &hits);
        let mut event = TraceEvent::new("ANSWER", format!("{} hits", hits.len()), "Answer generated.", elapsed_ms(t));
        if hits.is_empty() {
            event = event.with_errors("no candidate chunks");
        }
        self.emit(event);

        self.remember(question, &answer);
        let total = elapsed_ms(started);
        self.emit(TraceEvent::new("END", question, format!("Total duration: {total}ms"), total));
        info!(%intent, terms = terms.len(), hits = hits.len(), ms = total, "answered");
        (answer, hits)
    }
}
