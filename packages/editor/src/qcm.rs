//! # Multiple-choice questions
//!
//! A [`Qcm`] is embedded in `qcm` blocks. Evaluation is a pure function of the
//! question and the set of selected option ids:
//!
//! - **single**: correct iff exactly one option is selected and it is correct
//! - **multiple**: correct iff the selection equals the set of correct options

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

/// Minimum number of options a question keeps
pub const MIN_OPTIONS: usize = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QcmType {
    #[default]
    Single,
    Multiple,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QcmOption {
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

impl QcmOption {
    pub fn new(id: impl Into<String>, text: impl Into<String>, is_correct: bool) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            is_correct,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Qcm {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub question: String,

    #[serde(default)]
    pub options: Vec<QcmOption>,

    #[serde(rename = "type", default)]
    pub kind: QcmType,

    #[serde(default)]
    pub explanation: String,
}

impl Default for Qcm {
    /// Blank single-answer question with the two starter options
    fn default() -> Self {
        Self {
            id: String::new(),
            question: String::new(),
            options: vec![
                QcmOption::new("opt-1", "", false),
                QcmOption::new("opt-2", "", false),
            ],
            kind: QcmType::Single,
            explanation: String::new(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum QcmError {
    #[error("Question text is empty")]
    EmptyQuestion,

    #[error("A question needs at least two options, found {0}")]
    TooFewOptions(usize),

    #[error("Option {0} has no text")]
    EmptyOption(String),

    #[error("No option is marked correct")]
    NoCorrectOption,

    #[error("Single-answer question has {0} correct options")]
    MultipleCorrectForSingle(usize),

    #[error("Option not found: {0}")]
    OptionNotFound(String),
}

impl Qcm {
    pub fn new(id: impl Into<String>, question: impl Into<String>, kind: QcmType) -> Self {
        Self {
            id: id.into(),
            question: question.into(),
            kind,
            ..Default::default()
        }
    }

    pub fn with_options(mut self, options: Vec<QcmOption>) -> Self {
        self.options = options;
        self
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = explanation.into();
        self
    }

    pub fn correct_option_ids(&self) -> BTreeSet<&str> {
        self.options
            .iter()
            .filter(|opt| opt.is_correct)
            .map(|opt| opt.id.as_str())
            .collect()
    }

    /// Whether `selected` answers the question correctly
    pub fn evaluate<'a, I>(&self, selected: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        let selected: BTreeSet<&str> = selected.into_iter().collect();

        match self.kind {
            QcmType::Single => {
                if selected.len() != 1 {
                    return false;
                }
                self.options
                    .iter()
                    .any(|opt| opt.is_correct && selected.contains(opt.id.as_str()))
            }
            QcmType::Multiple => selected == self.correct_option_ids(),
        }
    }

    /// Authoring checks run before a question is inserted into a document
    pub fn validate(&self) -> Result<(), QcmError> {
        if self.question.trim().is_empty() {
            return Err(QcmError::EmptyQuestion);
        }

        if self.options.len() < MIN_OPTIONS {
            return Err(QcmError::TooFewOptions(self.options.len()));
        }

        if let Some(blank) = self.options.iter().find(|opt| opt.text.trim().is_empty()) {
            return Err(QcmError::EmptyOption(blank.id.clone()));
        }

        let correct = self.options.iter().filter(|opt| opt.is_correct).count();
        if correct == 0 {
            return Err(QcmError::NoCorrectOption);
        }
        if self.kind == QcmType::Single && correct > 1 {
            return Err(QcmError::MultipleCorrectForSingle(correct));
        }

        Ok(())
    }

    /// Switch answer mode. Going to single keeps only the first correct option.
    pub fn set_type(&mut self, kind: QcmType) {
        self.kind = kind;

        if kind == QcmType::Single {
            let mut seen_correct = false;
            for opt in &mut self.options {
                if opt.is_correct {
                    opt.is_correct = !seen_correct;
                    seen_correct = true;
                }
            }
        }
    }

    /// Mark an option (in)correct. On a single question this clears the others.
    pub fn mark_correct(&mut self, option_id: &str, is_correct: bool) -> Result<(), QcmError> {
        if !self.options.iter().any(|opt| opt.id == option_id) {
            return Err(QcmError::OptionNotFound(option_id.to_string()));
        }

        for opt in &mut self.options {
            if opt.id == option_id {
                opt.is_correct = is_correct;
            } else if self.kind == QcmType::Single && is_correct {
                opt.is_correct = false;
            }
        }

        Ok(())
    }

    pub fn add_option(&mut self, id: impl Into<String>, text: impl Into<String>) {
        self.options.push(QcmOption::new(id, text, false));
    }

    pub fn remove_option(&mut self, option_id: &str) -> Result<QcmOption, QcmError> {
        let pos = self
            .options
            .iter()
            .position(|opt| opt.id == option_id)
            .ok_or_else(|| QcmError::OptionNotFound(option_id.to_string()))?;

        if self.options.len() <= MIN_OPTIONS {
            return Err(QcmError::TooFewOptions(self.options.len() - 1));
        }

        Ok(self.options.remove(pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capitals() -> Qcm {
        Qcm::new("q-1", "Capital of France?", QcmType::Single).with_options(vec![
            QcmOption::new("a", "Paris", true),
            QcmOption::new("b", "Lyon", false),
            QcmOption::new("c", "Nice", false),
        ])
    }

    fn primes() -> Qcm {
        Qcm::new("q-2", "Which are prime?", QcmType::Multiple).with_options(vec![
            QcmOption::new("A", "2", true),
            QcmOption::new("B", "3", true),
            QcmOption::new("C", "4", false),
        ])
    }

    #[test]
    fn test_single_correct_option() {
        let qcm = capitals();
        assert!(qcm.evaluate(["a"]));
        assert!(!qcm.evaluate(["b"]));
        assert!(!qcm.evaluate(["c"]));
    }

    #[test]
    fn test_single_requires_exactly_one_selection() {
        let qcm = capitals();
        assert!(!qcm.evaluate([]));
        assert!(!qcm.evaluate(["a", "b"]));
        assert!(!qcm.evaluate(["unknown"]));
    }

    #[test]
    fn test_multiple_is_set_equality() {
        let qcm = primes();
        assert!(qcm.evaluate(["A", "B"]));
        assert!(qcm.evaluate(["B", "A"]));
        assert!(!qcm.evaluate(["A"]));
        assert!(!qcm.evaluate(["A", "B", "C"]));
        assert!(!qcm.evaluate([]));
    }

    #[test]
    fn test_validate() {
        assert!(capitals().validate().is_ok());
        assert!(primes().validate().is_ok());

        let mut blank = capitals();
        blank.question = "   ".to_string();
        assert_eq!(blank.validate(), Err(QcmError::EmptyQuestion));

        let mut no_correct = capitals();
        no_correct.options.iter_mut().for_each(|o| o.is_correct = false);
        assert_eq!(no_correct.validate(), Err(QcmError::NoCorrectOption));

        let mut empty_option = capitals();
        empty_option.options[1].text.clear();
        assert_eq!(
            empty_option.validate(),
            Err(QcmError::EmptyOption("b".to_string()))
        );

        assert_eq!(Qcm::default().validate(), Err(QcmError::EmptyQuestion));
    }

    #[test]
    fn test_switch_to_single_keeps_first_correct() {
        let mut qcm = primes();
        qcm.set_type(QcmType::Single);

        assert_eq!(qcm.correct_option_ids(), BTreeSet::from(["A"]));
        assert!(qcm.validate().is_ok());
    }

    #[test]
    fn test_mark_correct_on_single_clears_others() {
        let mut qcm = capitals();
        qcm.mark_correct("c", true).unwrap();
        assert_eq!(qcm.correct_option_ids(), BTreeSet::from(["c"]));

        let mut multi = primes();
        multi.mark_correct("C", true).unwrap();
        assert_eq!(multi.correct_option_ids().len(), 3);

        assert!(qcm.mark_correct("zzz", true).is_err());
    }

    #[test]
    fn test_remove_option_keeps_minimum() {
        let mut qcm = capitals();
        assert!(qcm.remove_option("c").is_ok());
        assert_eq!(qcm.remove_option("b"), Err(QcmError::TooFewOptions(1)));
        assert_eq!(qcm.options.len(), 2);
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_value(capitals()).unwrap();
        assert_eq!(json["type"], "single");
        assert_eq!(json["options"][0]["isCorrect"], true);
    }
}
