use lexrag_core::config::QuerySettings;
use lexrag_core::text::{char_len, contains_digit, split_query, to_lower_tr};
use lexrag_core::traits::QueryWriter;
use lexrag_core::types::Intent;

pub const STOP_WORDS: [&str; 31] = [
    // question particles
    "nedir", "kimdir", "nasıl", "nerede", "hangi", "kaç", "mi", "mı", "mu", "mü", "soru",
    // conjunctions and pronouns
    "ve", "ile", "için", "bu", "şu", "o", "bir", "var", "yok", "veya", "olarak",
    // words present in nearly every document
    "ders", "dersi", "dersinin", "hakkında", "bilgi", "ilgili", "kısmı", "bölüm", "mühendisliği",
];

/// Genitive and accusative endings left behind when an apostrophe is split off (`CSE3063'ün`).
pub const SUFFIX_PARTICLES: [&str; 12] = ["in", "ın", "un", "ün", "nin", "nın", "nun", "nün", "yi", "yı", "yu", "yü"];

/// Term injected for staff questions so office lines are matched.
pub const STAFF_BOOST_TERM: &str = "ofis";

/// Built-in synonym table: a key found in the lowercased question appends its phrases.
pub fn default_synonyms() -> Vec<(String, Vec<String>)> {
    let table: [(&str, &[&str]); 13] = [
        ("çap", &["çift anadal", "ikinci anadal", "madde 35"]),
        ("yandal", &["yan dal"]),
        ("staj", &["pratik çalışma", "zorunlu staj", "iş günü"]),
        ("kalmak", &["başarısız", "tekrar", "ff", "dersten kalma", "alt limit"]),
        ("dondurma", &["kayıt dondurma", "izinli sayılma", "haklı ve geçerli neden"]),
        ("yurt dışı", &["erasmus", "farabi", "değişim", "anlaşmalı üniversite"]),
        ("af", &["öğrenci affı"]),
        ("yaz okulu", &["yaz öğretimi", "başka üniversiteden ders"]),
        ("büt", &["bütünleme"]),
        ("tek ders", &["mezuniyet sınavı", "tek ders sınavı"]),
        ("diploma kayıp", &["duplikata", "yeniden düzenleme"]),
        ("ofis", &["oda", "yer", "nerede", "iletişim", "e-posta"]),
        ("ön koşul", &["prerequisite", "önkoşul", "condition"]),
    ];
    table
        .iter()
        .map(|(k, syns)| (k.to_string(), syns.iter().map(|s| s.to_string()).collect()))
        .collect()
}

/// Normalize, tokenize and filter a question into search terms.
///
/// The default writer does no expansion. [`HeuristicQueryWriter::from_settings`]
/// turns on synonym phrases and suffix-particle removal.
#[derive(Debug, Default, Clone)]
pub struct HeuristicQueryWriter {
    synonyms: Vec<(String, Vec<String>)>,
    drop_suffix_particles: bool,
}

impl HeuristicQueryWriter {
    pub fn new() -> Self { Self::default() }

    pub fn from_settings(settings: &QuerySettings) -> Self {
        let synonyms = match (&settings.synonyms, settings.expand_synonyms) {
            (_, false) => Vec::new(),
            (Some(table), true) => table
                .iter()
                .map(|(k, syns)| (to_lower_tr(k), syns.clone()))
                .collect(),
            (None, true) => default_synonyms(),
        };
        Self { synonyms, drop_suffix_particles: settings.drop_suffix_particles }
    }

    fn is_stop_word(&self, token: &str) -> bool {
        STOP_WORDS.contains(&token) || (self.drop_suffix_particles && SUFFIX_PARTICLES.contains(&token))
    }
}

impl QueryWriter for HeuristicQueryWriter {
    fn write(&self, question: &str, intent: Intent) -> Vec<String> {
        let mut terms: Vec<String> = split_query(question)
            .into_iter()
            .filter(|t| char_len(t) >= 2)
            .filter(|t| !self.is_stop_word(t) || contains_digit(t))
            .collect();
        if intent == Intent::StaffLookup && !terms.iter().any(|t| t == STAFF_BOOST_TERM) {
            terms.push(STAFF_BOOST_TERM.to_string());
        }
        if !self.synonyms.is_empty() {
            let lowered = to_lower_tr(question);
            for (key, phrases) in &self.synonyms {
                if lowered.contains(key.as_str()) {
                    terms.extend(phrases.iter().cloned());
                }
            }
        }
        terms
    }
}
