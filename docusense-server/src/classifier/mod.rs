//! Ticket text classification
//!
//! The service depends only on [`TicketClassifier`]; `main` builds the demo
//! model once at startup and hands it to request handlers through `AppState`.

pub mod demo;
pub mod tfidf;

use ndarray::Array2;
use thiserror::Error;

use linfa::traits::{Fit, Predict};
use linfa::Dataset;
use linfa_logistic::{MultiFittedLogisticRegression, MultiLogisticRegression};

pub use demo::{DemoClassifier, DEMO_CATEGORIES};
pub use tfidf::TfidfVectorizer;

/// Classifier failures
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// Fitting the model failed
    #[error("Training failed: {0}")]
    Training(String),

    /// Inference failed for a single text
    #[error("Prediction failed: {0}")]
    Prediction(String),
}

/// Assigns one category label to a ticket's combined text
///
/// Implementations are shared read-only across concurrent requests.
pub trait TicketClassifier: Send + Sync {
    /// Predict the category of `text`
    fn predict(&self, text: &str) -> Result<String, ClassifierError>;

    /// Labels this classifier can return, sorted
    fn labels(&self) -> &[String];
}

/// Linear-model training parameters
#[derive(Debug, Clone, Copy)]
pub struct LinearModelConfig {
    pub max_iterations: u64,
    /// L2 penalty strength
    pub alpha: f64,
}

impl Default for LinearModelConfig {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            alpha: 1.0,
        }
    }
}

/// TF-IDF features feeding a multinomial logistic regression
pub struct TextClassifier {
    vectorizer: TfidfVectorizer,
    model: MultiFittedLogisticRegression<f64, String>,
    labels: Vec<String>,
}

impl TextClassifier {
    /// Fit the vectorizer and the linear model on labelled texts
    pub fn fit<S: AsRef<str>, L: AsRef<str>>(
        texts: &[S],
        labels: &[L],
        config: LinearModelConfig,
    ) -> Result<Self, ClassifierError> {
        if texts.len() != labels.len() {
            return Err(ClassifierError::Training(format!(
                "{} texts but {} labels",
                texts.len(),
                labels.len()
            )));
        }
        if texts.is_empty() {
            return Err(ClassifierError::Training("No training examples".to_string()));
        }

        let vectorizer = TfidfVectorizer::fit(texts)?;
        let records = vectorizer.transform(texts);
        let targets: ndarray::Array1<String> =
            labels.iter().map(|l| l.as_ref().to_string()).collect();

        let mut distinct: Vec<String> = targets.to_vec();
        distinct.sort();
        distinct.dedup();
        if distinct.len() < 2 {
            return Err(ClassifierError::Training(
                "At least two distinct labels are required".to_string(),
            ));
        }

        let dataset = Dataset::new(records, targets);
        let model = MultiLogisticRegression::default()
            .max_iterations(config.max_iterations)
            .alpha(config.alpha)
            .fit(&dataset)
            .map_err(|e| ClassifierError::Training(e.to_string()))?;

        Ok(Self {
            vectorizer,
            model,
            labels: distinct,
        })
    }

    /// Number of terms in the fitted vocabulary
    pub fn vocabulary_size(&self) -> usize {
        self.vectorizer.vocabulary().len()
    }

    fn predict_features(&self, features: &Array2<f64>) -> Result<String, ClassifierError> {
        let predictions: ndarray::Array1<String> = self.model.predict(features);
        predictions
            .into_iter()
            .next()
            .ok_or_else(|| ClassifierError::Prediction("Model returned no label".to_string()))
    }
}

impl TicketClassifier for TextClassifier {
    fn predict(&self, text: &str) -> Result<String, ClassifierError> {
        let features = self.vectorizer.transform(&[text]);
        self.predict_features(&features)
    }

    fn labels(&self) -> &[String] {
        &self.labels
    }
}
