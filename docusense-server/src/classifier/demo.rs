//! Built-in demo classifier
//!
//! Fitted at startup from a handful of in-code examples so the service can
//! classify tickets immediately. The model is rebuilt identically on every
//! start; nothing is persisted.

use tracing::info;

use super::{ClassifierError, LinearModelConfig, TextClassifier, TicketClassifier};

/// Categories the demo model is trained on
pub const DEMO_CATEGORIES: [&str; 4] = ["Account", "Billing", "Technical", "Delivery"];

const TRAINING_EXAMPLES: [(&str, &str); 8] = [
    ("cannot login password reset account locked", "Account"),
    ("invoice charged twice refund billing", "Billing"),
    ("app crashes when opening settings technical bug", "Technical"),
    ("delivery late package not arrived shipping", "Delivery"),
    ("change email update profile account", "Account"),
    ("payment failed credit card billing", "Billing"),
    ("error 500 on checkout technical", "Technical"),
    ("where is my order delivery tracking", "Delivery"),
];

/// Demo TF-IDF + logistic regression model
pub struct DemoClassifier {
    inner: TextClassifier,
}

impl DemoClassifier {
    /// Fit the demo model on the built-in examples
    pub fn train() -> Result<Self, ClassifierError> {
        let texts: Vec<&str> = TRAINING_EXAMPLES.iter().map(|(text, _)| *text).collect();
        let labels: Vec<&str> = TRAINING_EXAMPLES.iter().map(|(_, label)| *label).collect();

        let inner = TextClassifier::fit(&texts, &labels, LinearModelConfig::default())?;

        info!(
            examples = texts.len(),
            vocabulary = inner.vocabulary_size(),
            categories = ?inner.labels(),
            "Demo classifier trained"
        );

        Ok(Self { inner })
    }
}

impl TicketClassifier for DemoClassifier {
    fn predict(&self, text: &str) -> Result<String, ClassifierError> {
        self.inner.predict(text)
    }

    fn labels(&self) -> &[String] {
        self.inner.labels()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> DemoClassifier {
        DemoClassifier::train().expect("demo model should train")
    }

    #[test]
    fn test_labels_are_demo_categories() {
        let model = classifier();
        let mut expected: Vec<String> = DEMO_CATEGORIES.iter().map(|c| c.to_string()).collect();
        expected.sort();
        assert_eq!(model.labels(), expected.as_slice());
    }

    #[test]
    fn test_login_ticket_is_account() {
        let model = classifier();
        assert_eq!(model.predict("Can't log in forgot password").unwrap(), "Account");
    }

    #[test]
    fn test_representative_tickets() {
        let model = classifier();
        assert_eq!(model.predict("my invoice was charged twice").unwrap(), "Billing");
        assert_eq!(model.predict("the app crashes on startup").unwrap(), "Technical");
        assert_eq!(model.predict("package has not arrived yet").unwrap(), "Delivery");
    }

    #[test]
    fn test_training_examples_classify_to_own_label() {
        let model = classifier();
        for (text, label) in TRAINING_EXAMPLES {
            assert_eq!(model.predict(text).unwrap(), label, "text: {}", text);
        }
    }

    #[test]
    fn test_empty_text_still_gets_a_category() {
        let model = classifier();
        let label = model.predict("").unwrap();
        assert!(DEMO_CATEGORIES.contains(&label.as_str()));
    }
}
