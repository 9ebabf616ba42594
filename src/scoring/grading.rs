//! Sustainability grade classifier: first-match-wins over the grade table.

use crate::config::GradeRule;
use crate::types::SustainabilityGrade;

impl GradeRule {
    /// Inclusive on every bound.
    pub fn matches(&self, score: f64, efficiency: f64, cost_per_ton: f64) -> bool {
        score >= self.min_score && efficiency >= self.min_efficiency && cost_per_ton <= self.max_cost_per_ton
    }
}

/// Walk `rules` top-down and return the first matching grade, or `F`.
pub fn classify(rules: &[GradeRule], score: f64, efficiency: f64, cost_per_ton: f64) -> SustainabilityGrade {
    rules
        .iter()
        .find(|rule| rule.matches(score, efficiency, cost_per_ton))
        .map_or(SustainabilityGrade::F, |rule| rule.grade)
}
