//! Scoring of image embeddings against the encoded categories.
//!
//! Computes dot products between a single image embedding and every category
//! embedding, turns the scores into probabilities with a softmax, and selects
//! the top-k categories.

use crate::error::TagError;
use crate::math::softmax;
use crate::types::Tag;

use super::categories::CategorySet;

/// Category embeddings laid out for brute-force scoring.
///
/// Stores a flat N × dim row-major matrix. Both image and category embeddings
/// are L2-normalized, so the dot product is the cosine similarity.
pub struct CategoryScorer {
    categories: CategorySet,
    /// Flat matrix: N × dim, row i holds category i's embedding.
    matrix: Vec<f32>,
    embedding_dim: usize,
}

impl CategoryScorer {
    /// Build a scorer from pre-computed category embeddings.
    ///
    /// `embeddings` must hold one vector per category, all the same length,
    /// in the category set's order.
    pub fn from_embeddings(
        categories: CategorySet,
        embeddings: Vec<Vec<f32>>,
    ) -> Result<Self, TagError> {
        if embeddings.len() != categories.len() {
            return Err(TagError::Model {
                message: format!(
                    "Encoded {} label embeddings for {} categories",
                    embeddings.len(),
                    categories.len()
                ),
            });
        }

        let embedding_dim = embeddings.first().map(|e| e.len()).unwrap_or(0);
        if embedding_dim == 0 {
            return Err(TagError::Model {
                message: "Label embeddings are empty".to_string(),
            });
        }

        let mut matrix = Vec::with_capacity(categories.len() * embedding_dim);
        for (i, embedding) in embeddings.iter().enumerate() {
            if embedding.len() != embedding_dim {
                return Err(TagError::Model {
                    message: format!(
                        "Label embedding {} has dimension {} (expected {})",
                        i,
                        embedding.len(),
                        embedding_dim
                    ),
                });
            }
            matrix.extend_from_slice(embedding);
        }

        Ok(Self {
            categories,
            matrix,
            embedding_dim,
        })
    }

    /// The category set this scorer was built from.
    pub fn categories(&self) -> &CategorySet {
        &self.categories
    }

    /// Embedding dimension of the stored matrix.
    pub fn embedding_dim(&self) -> usize {
        self.embedding_dim
    }

    /// Score an image embedding against every category.
    ///
    /// Returns one tag per category, softmax probabilities, sorted by score
    /// descending.
    pub fn score(&self, image_embedding: &[f32]) -> Result<Vec<Tag>, TagError> {
        if image_embedding.len() != self.embedding_dim {
            return Err(TagError::Model {
                message: format!(
                    "Image embedding dimension {} does not match category embeddings ({})",
                    image_embedding.len(),
                    self.embedding_dim
                ),
            });
        }

        let n = self.categories.len();
        let dim = self.embedding_dim;
        let mut similarities = Vec::with_capacity(n);
        for i in 0..n {
            let offset = i * dim;
            let dot: f32 = (0..dim)
                .map(|j| image_embedding[j] * self.matrix[offset + j])
                .sum();
            similarities.push(dot);
        }

        let probabilities = softmax(&similarities);
        let mut tags: Vec<Tag> = self
            .categories
            .names()
            .iter()
            .zip(probabilities)
            .map(|(name, score)| Tag::new(name.clone(), score))
            .collect();

        tags.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap());
        Ok(tags)
    }

    /// The `k` best categories for an image embedding, best first.
    ///
    /// `k` is clamped to the category count.
    pub fn top_k(&self, image_embedding: &[f32], k: usize) -> Result<Vec<Tag>, TagError> {
        let mut tags = self.score(image_embedding)?;
        tags.truncate(k);
        Ok(tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer_abc() -> CategoryScorer {
        let categories =
            CategorySet::new(vec!["a".into(), "b".into(), "c".into()]).unwrap();
        // Unit vectors: a points along x, b along y, c at 45 degrees.
        let embeddings = vec![
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![0.707, 0.707],
        ];
        CategoryScorer::from_embeddings(categories, embeddings).unwrap()
    }

    #[test]
    fn test_from_embeddings_rejects_count_mismatch() {
        let categories = CategorySet::new(vec!["a".into(), "b".into()]).unwrap();
        let err = CategoryScorer::from_embeddings(categories, vec![vec![1.0, 0.0]]).unwrap_err();
        assert!(err.to_string().contains("2 categories"));
    }

    #[test]
    fn test_from_embeddings_rejects_ragged_dimensions() {
        let categories = CategorySet::new(vec!["a".into(), "b".into()]).unwrap();
        let embeddings = vec![vec![1.0, 0.0], vec![1.0, 0.0, 0.0]];
        assert!(CategoryScorer::from_embeddings(categories, embeddings).is_err());
    }

    #[test]
    fn test_score_orders_descending() {
        let scorer = scorer_abc();
        let tags = scorer.score(&[1.0, 0.0]).unwrap();
        assert_eq!(tags.len(), 3);
        assert_eq!(tags[0].name, "a");
        assert_eq!(tags[1].name, "c");
        assert_eq!(tags[2].name, "b");
        assert!(tags[0].score >= tags[1].score);
        assert!(tags[1].score >= tags[2].score);
    }

    #[test]
    fn test_scores_are_probabilities() {
        let scorer = scorer_abc();
        let tags = scorer.score(&[0.6, 0.8]).unwrap();
        let sum: f32 = tags.iter().map(|t| t.score).sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert!(tags.iter().all(|t| t.score > 0.0 && t.score < 1.0));
    }

    #[test]
    fn test_every_tag_is_a_known_category() {
        let scorer = scorer_abc();
        let tags = scorer.score(&[0.3, -0.4]).unwrap();
        for tag in &tags {
            assert!(scorer.categories().contains(&tag.name));
        }
    }

    #[test]
    fn test_top_k_clamps_to_category_count() {
        let scorer = scorer_abc();
        let tags = scorer.top_k(&[1.0, 0.0], 10).unwrap();
        assert_eq!(tags.len(), 3);

        let tags = scorer.top_k(&[1.0, 0.0], 1).unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].name, "a");
    }

    #[test]
    fn test_score_rejects_dimension_mismatch() {
        let scorer = scorer_abc();
        let err = scorer.score(&[1.0, 0.0, 0.0]).unwrap_err();
        assert!(err.to_string().contains("dimension"));
    }
}
