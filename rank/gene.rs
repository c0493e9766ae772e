use crate::priority::{PriorityResult, PriorityType};
use crate::variant::VariantEvaluation;
use std::collections::BTreeMap;
use std::fmt;

/// The three scores the scorer derives for a gene. All start at 0.0.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GeneScores {
    pub filter: f32,
    pub priority: f32,
    pub combined: f32,
}

/// Every piece of evidence gathered for one gene, plus the scores derived from it.
///
/// A gene is assembled while the filtering and prioritizing stages run, then handed by value
/// to a [`GeneScorer`](crate::scorer::GeneScorer), which returns the scored gene.
#[derive(Debug, Clone, PartialEq)]
pub struct Gene {
    symbol: String,
    entrez_gene_id: u32,
    variant_evaluations: Vec<VariantEvaluation>,
    priority_results: BTreeMap<PriorityType, PriorityResult>,
    scores: GeneScores,
}

impl Gene {
    pub fn new(symbol: &str, entrez_gene_id: u32) -> Self {
        Self {
            symbol: symbol.to_string(),
            entrez_gene_id,
            variant_evaluations: Vec::new(),
            priority_results: BTreeMap::new(),
            scores: GeneScores::default(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn entrez_gene_id(&self) -> u32 {
        self.entrez_gene_id
    }

    pub fn add_variant(&mut self, variant: VariantEvaluation) {
        self.variant_evaluations.push(variant);
    }

    /// Inserts a result, replacing any earlier result from the same prioritizer.
    pub fn add_priority_result(&mut self, result: PriorityResult) {
        if let Some(previous) = self.priority_results.insert(result.priority_type(), result) {
            log::debug!(
                "{}: replaced earlier {} result (score {})",
                self.symbol,
                previous.priority_type(),
                previous.score()
            );
        }
    }

    pub fn variant_evaluations(&self) -> &[VariantEvaluation] {
        &self.variant_evaluations
    }

    pub(crate) fn variant_evaluations_mut(&mut self) -> &mut [VariantEvaluation] {
        &mut self.variant_evaluations
    }

    /// Priority results ordered by prioritizer type.
    pub fn priority_results(&self) -> impl Iterator<Item = &PriorityResult> {
        self.priority_results.values()
    }

    pub fn priority_result(&self, priority_type: PriorityType) -> Option<&PriorityResult> {
        self.priority_results.get(&priority_type)
    }

    pub fn has_variants(&self) -> bool {
        !self.variant_evaluations.is_empty()
    }

    pub fn passed_variant_count(&self) -> usize {
        self.variant_evaluations
            .iter()
            .filter(|variant| variant.passed_all_filters())
            .count()
    }

    pub fn scores(&self) -> GeneScores {
        self.scores
    }

    pub fn filter_score(&self) -> f32 {
        self.scores.filter
    }

    pub fn priority_score(&self) -> f32 {
        self.scores.priority
    }

    pub fn combined_score(&self) -> f32 {
        self.scores.combined
    }

    pub(crate) fn set_scores(&mut self, scores: GeneScores) {
        self.scores = scores;
    }
}

impl fmt::Display for Gene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) filter={} priority={} combined={} variants={} priority_results={}",
            self.symbol,
            self.entrez_gene_id,
            self.scores.filter,
            self.scores.priority,
            self.scores.combined,
            self.variant_evaluations.len(),
            self.priority_results.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FilterResult, FilterType};

    #[test]
    fn new_gene_has_zero_scores() {
        let gene = Gene::new("TEST1", 1234);
        assert_eq!(gene.scores(), GeneScores::default());
        assert_eq!(gene.filter_score(), 0.0);
        assert_eq!(gene.priority_score(), 0.0);
        assert_eq!(gene.combined_score(), 0.0);
        assert!(!gene.has_variants());
    }

    #[test]
    fn adding_variants_keeps_insertion_order_and_scores() {
        let mut gene = Gene::new("TEST1", 1234);
        gene.add_variant(VariantEvaluation::builder("1", 20, "A", "T").build());
        gene.add_variant(
            VariantEvaluation::builder("1", 10, "C", "G")
                .filter_results([FilterResult::fail(FilterType::FrequencyFilter)])
                .build(),
        );

        let positions: Vec<_> = gene.variant_evaluations().iter().map(|v| v.position()).collect();
        assert_eq!(positions, vec![20, 10]);
        assert_eq!(gene.passed_variant_count(), 1);
        assert_eq!(gene.combined_score(), 0.0);
    }

    #[test]
    fn one_priority_result_per_prioritizer() {
        let mut gene = Gene::new("TEST1", 1234);
        gene.add_priority_result(PriorityResult::new(PriorityType::OmimPriority, 1234, "TEST1", 0.5));
        gene.add_priority_result(PriorityResult::new(PriorityType::HiphivePriority, 1234, "TEST1", 0.7));
        gene.add_priority_result(PriorityResult::new(PriorityType::OmimPriority, 1234, "TEST1", 1.0));

        assert_eq!(gene.priority_results().count(), 2);
        assert_eq!(
            gene.priority_result(PriorityType::OmimPriority).map(PriorityResult::score),
            Some(1.0)
        );
    }
}
