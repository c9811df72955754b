//! Offline keyword classifier
//!
//! Used when the remote classifier is unreachable. Rules are checked in order
//! and the first rule with any keyword present wins, regardless of where in
//! the text the keyword appears.

use crate::classifier::TicketClassifier;
use aho_corasick::AhoCorasick;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use ticketdesk_core::{
    Category, Error, PredictionRequest, PredictionResult, Result, TopCategoryScore,
};
use tracing::debug;

/// Ordered keyword rules. Order matters.
const RULES: [(Category, &[&str]); 4] = [
    (Category::Incident, &["password", "login", "credential"]),
    (Category::Request, &["request", "access", "need"]),
    (Category::Problem, &["error", "issue", "bug"]),
    (Category::Change, &["update", "deploy", "change"]),
];

/// Category used when no rule matches
const DEFAULT_CATEGORY: Category = Category::Incident;

/// Primary confidence is drawn from `[MIN_CONFIDENCE, MAX_CONFIDENCE)`
const MIN_CONFIDENCE: f64 = 0.70;
const MAX_CONFIDENCE: f64 = 0.95;

/// Shares of the residual confidence given to the two secondary candidates
const SECONDARY_SHARES: [f64; 2] = [0.6, 0.4];

/// Keyword heuristic producing a full [`PredictionResult`] without network access.
///
/// Confidence and the choice of secondary categories come from an injected
/// random source; [`FallbackClassifier::with_seed`] makes output reproducible.
pub struct FallbackClassifier {
    name: String,
    matcher: AhoCorasick,
    pattern_rules: Vec<usize>,
    rng: Mutex<StdRng>,
}

impl FallbackClassifier {
    /// Create a classifier seeded from OS entropy
    pub fn new() -> Result<Self> {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Create a classifier with a fixed seed
    pub fn with_seed(seed: u64) -> Result<Self> {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    /// Create a classifier drawing from the given generator
    pub fn with_rng(rng: StdRng) -> Result<Self> {
        let mut keywords = Vec::new();
        let mut pattern_rules = Vec::new();
        for (rule, (_, words)) in RULES.iter().enumerate() {
            for word in words.iter() {
                keywords.push(*word);
                pattern_rules.push(rule);
            }
        }

        let matcher = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(&keywords)
            .map_err(|e| Error::config(format!("Failed to build keyword matcher: {}", e)))?;

        Ok(Self {
            name: "keyword-fallback".to_string(),
            matcher,
            pattern_rules,
            rng: Mutex::new(rng),
        })
    }

    /// Pick the primary category. Deterministic.
    pub fn primary_category(&self, subject: &str, body: &str) -> Category {
        let text = format!("{} {}", subject, body).to_lowercase();

        let winning_rule = self
            .matcher
            .find_overlapping_iter(&text)
            .map(|m| self.pattern_rules[m.pattern().as_usize()])
            .min();

        match winning_rule {
            Some(rule) => {
                debug!(rule = rule + 1, category = %RULES[rule].0, "fallback keyword rule matched");
                RULES[rule].0
            }
            None => {
                debug!("no fallback keyword rule matched, using default");
                DEFAULT_CATEGORY
            }
        }
    }

    /// Classify without any I/O
    pub fn classify(&self, subject: &str, body: &str) -> PredictionResult {
        let primary = self.primary_category(subject, body);

        let (confidence, secondary) = {
            let mut rng = self.rng.lock();
            let confidence = rng.gen_range(MIN_CONFIDENCE..MAX_CONFIDENCE);
            let mut others = primary.others();
            others.shuffle(&mut *rng);
            (confidence, [others[0], others[1]])
        };

        let residual = (1.0 - confidence).max(0.0);

        let mut top_categories = Vec::with_capacity(3);
        top_categories.push(TopCategoryScore::new(primary, confidence));
        for (category, share) in secondary.into_iter().zip(SECONDARY_SHARES) {
            top_categories.push(TopCategoryScore::new(category, residual * share));
        }

        PredictionResult::new(primary, confidence, top_categories)
    }
}

#[async_trait::async_trait]
impl TicketClassifier for FallbackClassifier {
    async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult> {
        Ok(self.classify(&request.subject, &request.body))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> FallbackClassifier {
        FallbackClassifier::with_seed(42).unwrap()
    }

    #[test]
    fn test_keyword_rules() {
        let c = classifier();
        assert_eq!(c.classify("Can't reset my password", "").category, Category::Incident);
        assert_eq!(c.classify("Need access to billing tool", "").category, Category::Request);
        assert_eq!(c.classify("App throws error on save", "").category, Category::Problem);
        assert_eq!(c.classify("Please deploy the new template", "").category, Category::Change);
    }

    #[test]
    fn test_no_keyword_defaults_to_incident() {
        let c = classifier();
        assert_eq!(c.classify("Printer on fire", "third floor").category, Category::Incident);
        assert_eq!(c.classify("", "").category, Category::Incident);
    }

    #[test]
    fn test_earlier_rule_wins_regardless_of_position() {
        let c = classifier();
        // "bug" appears first in the text but the access rule is checked first
        assert_eq!(c.primary_category("bug in report", "need access"), Category::Request);
        // password beats everything
        assert_eq!(c.primary_category("deploy error", "request password"), Category::Incident);
    }

    #[test]
    fn test_matching_is_case_insensitive_and_spans_subject_and_body() {
        let c = classifier();
        assert_eq!(c.primary_category("URGENT", "Please UPDATE the banner"), Category::Change);
        assert_eq!(c.primary_category("Login", ""), Category::Incident);
    }

    #[test]
    fn test_result_shape() {
        let c = classifier();
        let result = c.classify("App throws error on save", "");

        assert!((MIN_CONFIDENCE..MAX_CONFIDENCE).contains(&result.confidence));
        assert_eq!(result.top_categories.len(), 3);
        assert_eq!(result.top_categories[0].category, result.category);
        assert_eq!(result.top_categories[0].score, result.confidence);

        let residual = 1.0 - result.confidence;
        assert!((result.top_categories[1].score - residual * 0.6).abs() < 1e-12);
        assert!((result.top_categories[2].score - residual * 0.4).abs() < 1e-12);
        assert!(result.is_well_formed());
    }

    #[test]
    fn test_same_seed_same_output() {
        let a = FallbackClassifier::with_seed(7).unwrap();
        let b = FallbackClassifier::with_seed(7).unwrap();

        for _ in 0..5 {
            assert_eq!(
                a.classify("Need access", "to the VPN"),
                b.classify("Need access", "to the VPN")
            );
        }
    }

    #[tokio::test]
    async fn test_trait_predict_matches_classify() {
        let a = FallbackClassifier::with_seed(3).unwrap();
        let b = FallbackClassifier::with_seed(3).unwrap();
        let request = PredictionRequest::new("Login broken", "Cannot login since yesterday");

        let via_trait = a.predict(&request).await.unwrap();
        let direct = b.classify(&request.subject, &request.body);
        assert_eq!(via_trait, direct);
        assert_eq!(a.name(), "keyword-fallback");
    }
}
