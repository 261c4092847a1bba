//! Attribute vocabularies - the closed option lists creatures are built from
//!
//! Each creature attribute (material, behavior, trait) is drawn from its own
//! ordered vocabulary. A vocabulary must be non-empty and its entries
//! distinct; order is preserved because it is the order options are
//! presented in during the wizard.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VocabularyError {
    #[error("the {0} vocabulary must not be empty")]
    Empty(&'static str),
    #[error("the {name} vocabulary contains '{value}' more than once")]
    Duplicate { name: &'static str, value: String },
}

/// An ordered list of distinct permitted values for one attribute dimension.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    values: Vec<String>,
}

impl Vocabulary {
    /// Validate and build a vocabulary. Order of `values` is preserved;
    /// `name` only labels validation errors.
    pub fn new(
        name: &'static str,
        values: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<Self, VocabularyError> {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return Err(VocabularyError::Empty(name));
        }
        for (i, value) in values.iter().enumerate() {
            if values[..i].contains(value) {
                return Err(VocabularyError::Duplicate {
                    name,
                    value: value.clone(),
                });
            }
        }
        Ok(Self { values })
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// The three vocabularies a creature is assembled from.
#[derive(Debug, Clone)]
pub struct VocabularySet {
    pub materials: Vocabulary,
    pub behaviors: Vocabulary,
    pub traits: Vocabulary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_vocabulary() {
        let values: Vec<String> = vec![];
        assert!(Vocabulary::new("materials", values).is_err());
    }

    #[test]
    fn test_rejects_duplicate_values() {
        let result = Vocabulary::new("materials", ["Glass", "Dust", "Glass"]);
        assert!(matches!(
            result,
            Err(VocabularyError::Duplicate { value, .. }) if value == "Glass"
        ));
    }

    #[test]
    fn test_preserves_order_and_membership() {
        let vocab = Vocabulary::new("materials", ["Glass", "Dust"]).unwrap();
        assert_eq!(vocab.values(), ["Glass", "Dust"]);
        assert!(vocab.contains("Dust"));
        assert!(!vocab.contains("Nostalgia"));
        assert_eq!(vocab.len(), 2);
    }
}
