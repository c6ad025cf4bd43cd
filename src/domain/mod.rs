//! Domain value types for lesion classification.
//!
//! This module defines the fixed label set of the bundled model and the
//! immutable result value returned by the classifier.

use crate::processors::argmax_first;
use serde::{Deserialize, Serialize};

/// The fixed, ordered label set of the bundled lesion model.
///
/// The variant order matches the model's output tensor and must not change;
/// output index 0 is `NonCancer`, 1 is `Benign`, 2 is `Malignant`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LesionClass {
    /// The lesion is not cancerous.
    NonCancer,
    /// The lesion is a benign growth.
    Benign,
    /// The lesion is malignant.
    Malignant,
}

impl LesionClass {
    /// All classes in model output order.
    pub const ALL: [LesionClass; 3] = [
        LesionClass::NonCancer,
        LesionClass::Benign,
        LesionClass::Malignant,
    ];

    /// Returns the label string as emitted by the model's training pipeline.
    pub fn label(self) -> &'static str {
        match self {
            LesionClass::NonCancer => "Non_Cancer",
            LesionClass::Benign => "benign",
            LesionClass::Malignant => "malignant",
        }
    }

    /// Returns the class for a model output index, if in range.
    pub fn from_index(index: usize) -> Option<LesionClass> {
        Self::ALL.get(index).copied()
    }

    /// Returns the model output index of this class.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for LesionClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// The result of classifying one lesion photo.
///
/// A plain immutable value: the predicted class, its confidence, and the full
/// per-class score mapping (0-100 scale, summing to ~100). The predicted
/// class and confidence are derived from the scores at construction, so they
/// always correspond to the maximum score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    class: LesionClass,
    confidence: f32,
    scores: [f32; 3],
}

impl ClassificationResult {
    /// Builds a result from per-class scores in model output order.
    ///
    /// The predicted class is the maximum score, ties broken by the first
    /// index in label order, and the confidence is that score.
    pub fn from_scores(scores: [f32; 3]) -> Self {
        // Fixed-size non-empty input, argmax_first cannot return None.
        let class_index = argmax_first(&scores).unwrap_or(0);
        let class = LesionClass::from_index(class_index).unwrap_or(LesionClass::NonCancer);

        Self {
            class,
            confidence: scores[class_index],
            scores,
        }
    }

    /// The predicted class.
    pub fn class(&self) -> LesionClass {
        self.class
    }

    /// Confidence of the predicted class, on a 0-100 scale.
    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    /// Score of the given class, on a 0-100 scale.
    pub fn score(&self, class: LesionClass) -> f32 {
        self.scores[class.index()]
    }

    /// Iterates over all classes and their scores in label order.
    pub fn scores(&self) -> impl Iterator<Item = (LesionClass, f32)> + '_ {
        LesionClass::ALL
            .iter()
            .zip(self.scores.iter())
            .map(|(&class, &score)| (class, score))
    }
}

impl std::fmt::Display for ClassificationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({:.1}%)", self.class.label(), self.confidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_set_order_and_strings() {
        let labels: Vec<&str> = LesionClass::ALL.iter().map(|c| c.label()).collect();
        assert_eq!(labels, vec!["Non_Cancer", "benign", "malignant"]);
    }

    #[test]
    fn test_from_index_round_trips() {
        for class in LesionClass::ALL {
            assert_eq!(LesionClass::from_index(class.index()), Some(class));
        }
        assert_eq!(LesionClass::from_index(3), None);
    }

    #[test]
    fn test_result_reports_maximum_class() {
        let result = ClassificationResult::from_scores([4.1, 82.7, 13.2]);
        assert_eq!(result.class(), LesionClass::Benign);
        assert_eq!(result.confidence(), 82.7);
        assert_eq!(result.score(LesionClass::NonCancer), 4.1);
        assert_eq!(result.score(LesionClass::Malignant), 13.2);
    }

    #[test]
    fn test_result_tie_breaks_to_first_label() {
        let result = ClassificationResult::from_scores([40.0, 40.0, 20.0]);
        assert_eq!(result.class(), LesionClass::NonCancer);
        assert_eq!(result.confidence(), 40.0);
    }

    #[test]
    fn test_scores_iterates_in_label_order() {
        let result = ClassificationResult::from_scores([10.0, 30.0, 60.0]);
        let pairs: Vec<(LesionClass, f32)> = result.scores().collect();
        assert_eq!(
            pairs,
            vec![
                (LesionClass::NonCancer, 10.0),
                (LesionClass::Benign, 30.0),
                (LesionClass::Malignant, 60.0),
            ]
        );
    }

    #[test]
    fn test_result_serde_round_trip() {
        let result = ClassificationResult::from_scores([4.1, 82.7, 13.2]);
        let json = serde_json::to_string(&result).unwrap();
        let restored: ClassificationResult = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, result);
    }

    #[test]
    fn test_display_formats_label_and_confidence() {
        let result = ClassificationResult::from_scores([4.1, 82.7, 13.2]);
        assert_eq!(result.to_string(), "benign (82.7%)");
    }
}
