//! Category aggregation
//!
//! Weighted sums over the normalizer table. Sums are accumulated in table
//! order starting from zero, which reproduces the left-to-right evaluation of
//! the written-out formula exactly.

use super::normalizers::{Category, NORMALIZERS, NORMALIZER_COUNT};
use crate::config::WeightsConfig;

/// Four category scores and the overall score, unrounded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryScores {
    pub environmental: f64,
    pub logistics: f64,
    pub economic: f64,
    pub advanced: f64,
    pub overall: f64,
}

impl CategoryScores {
    pub const fn get(&self, category: Category) -> f64 {
        match category {
            Category::Environmental => self.environmental,
            Category::Logistics => self.logistics,
            Category::Economic => self.economic,
            Category::Advanced => self.advanced,
        }
    }
}

/// Weighted sum of one category's sub-scores.
pub fn category_score(
    category: Category,
    sub_scores: &[f64; NORMALIZER_COUNT],
    weights: &WeightsConfig,
) -> f64 {
    NORMALIZERS
        .iter()
        .zip(sub_scores)
        .filter(|(n, _)| n.category == category)
        .fold(0.0, |acc, (n, score)| acc + score * (n.weight)(weights))
}

/// Aggregate sub-scores (in [`NORMALIZERS`] order) into category and overall scores.
pub fn aggregate(sub_scores: &[f64; NORMALIZER_COUNT], weights: &WeightsConfig) -> CategoryScores {
    let environmental = category_score(Category::Environmental, sub_scores, weights);
    let logistics = category_score(Category::Logistics, sub_scores, weights);
    let economic = category_score(Category::Economic, sub_scores, weights);
    let advanced = category_score(Category::Advanced, sub_scores, weights);

    let mut scores = CategoryScores {
        environmental,
        logistics,
        economic,
        advanced,
        overall: 0.0,
    };
    scores.overall = Category::ALL
        .iter()
        .fold(0.0, |acc, &c| acc + scores.get(c) * c.overall_weight(weights));
    scores
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_ones_aggregate_to_one() {
        let scores = aggregate(&[1.0; NORMALIZER_COUNT], &WeightsConfig::default());
        for category in Category::ALL {
            assert!((scores.get(category) - 1.0).abs() < 1e-9);
        }
        assert!((scores.overall - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_all_zeros_aggregate_to_zero() {
        let scores = aggregate(&[0.0; NORMALIZER_COUNT], &WeightsConfig::default());
        assert_eq!(scores.overall, 0.0);
    }

    #[test]
    fn test_matches_written_out_formula_exactly() {
        // Sub-scores chosen so that evaluation order would show up in the last bits
        let mut sub = [0.0; NORMALIZER_COUNT];
        for (i, s) in sub.iter_mut().enumerate() {
            *s = 0.137 + 0.0431 * i as f64;
        }
        let scores = aggregate(&sub, &WeightsConfig::default());

        let env = sub[0] * 0.2 + sub[1] * 0.2 + sub[2] * 0.15 + sub[3] * 0.15 + sub[4] * 0.15
            + sub[5] * 0.1
            + sub[6] * 0.05;
        let log = sub[7] * 0.25 + sub[8] * 0.35 + sub[9] * 0.2 + sub[10] * 0.2;
        let eco = sub[11] * 0.3 + sub[12] * 0.15 + sub[13] * 0.2 + sub[14] * 0.2 + sub[15] * 0.15;
        let adv = sub[16] * 0.3 + sub[17] * 0.3 + sub[18] * 0.2 + sub[19] * 0.2;
        let overall = env * 0.35 + log * 0.30 + eco * 0.25 + adv * 0.10;

        assert_eq!(scores.environmental, env);
        assert_eq!(scores.logistics, log);
        assert_eq!(scores.economic, eco);
        assert_eq!(scores.advanced, adv);
        assert_eq!(scores.overall, overall);
    }

    #[test]
    fn test_category_isolated_from_others() {
        let mut sub = [0.0; NORMALIZER_COUNT];
        // Transport only: 0.35 of logistics, 0.30 of overall
        sub[8] = 1.0;
        let scores = aggregate(&sub, &WeightsConfig::default());
        assert_eq!(scores.environmental, 0.0);
        assert!((scores.logistics - 0.35).abs() < 1e-12);
        assert!((scores.overall - 0.105).abs() < 1e-12);
    }
}
