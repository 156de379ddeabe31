use lexrag_core::config::IntentRule;
use lexrag_core::text::to_lower_tr;
use lexrag_core::traits::IntentDetector;
use lexrag_core::types::Intent;

fn rule(intent: Intent, keywords: &[&str]) -> IntentRule {
    IntentRule { intent, keywords: keywords.iter().map(|k| k.to_string()).collect() }
}

/// Built-in priority: staff > course > policy > registration.
pub fn default_rules() -> Vec<IntentRule> {
    vec![
        rule(Intent::StaffLookup, &["hoca", "ofis", "mail", "iletişim", "kimdir", "başkan", "odası", "yeri"]),
        rule(Intent::CourseInfo, &["ders", "kredi", "ects", "akts", "önkoşul", "dönem"]),
        rule(Intent::PolicyFaq, &["yönetmelik", "yönerge", "sınav", "staj", "mezuniyet", "çap", "yatay"]),
        rule(Intent::Registration, &["kayıt", "dondurma", "harç"]),
    ]
}

/// Ordered keyword rules over the lowercased question; first matching rule wins.
#[derive(Debug, Clone)]
pub struct RuleBasedIntentDetector {
    rules: Vec<IntentRule>,
}

impl Default for RuleBasedIntentDetector {
    fn default() -> Self { Self { rules: default_rules() } }
}

impl RuleBasedIntentDetector {
    pub fn new() -> Self { Self::default() }

    pub fn with_rules(rules: Vec<IntentRule>) -> Self {
        let rules = rules
            .into_iter()
            .map(|r| IntentRule { intent: r.intent, keywords: r.keywords.iter().map(|k| to_lower_tr(k)).collect() })
            .collect();
        Self { rules }
    }
}

impl IntentDetector for RuleBasedIntentDetector {
    fn detect(&self, question: &str) -> Intent {
        let q = to_lower_tr(question);
        if q.trim().is_empty() {
            return Intent::Unknown;
        }
        self.rules
            .iter()
            .find(|r| r.keywords.iter().any(|k| q.contains(k.as_str())))
            .map_or(Intent::Unknown, |r| r.intent)
    }
}
