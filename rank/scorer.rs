// ========================================================================================
//
//                           Gene scoring: filter, priority, combined
//
// ========================================================================================
//
// A gene's filter score summarises its qualifying variants under the allele requirement of
// the mode of inheritance. Its priority score summarises the prioritizers. The combined score
// is the mean of the two and is the only key the ranking looks at.

use crate::gene::{Gene, GeneScores};
use crate::priority::PriorityResult;
use crate::ranking::rank_genes;
use crate::types::{AlleleRequirement, ModeOfInheritance};
use crate::variant::VariantEvaluation;
use itertools::Itertools;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the scores of several prioritizers that ran on the same gene are merged.
///
/// All policies agree when a gene carries exactly one result (its score) or none (0.0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityCombination {
    /// Multiply the scores; every prioritizer must agree for the gene to score well.
    #[default]
    Product,
    Mean,
    Max,
}

impl PriorityCombination {
    pub fn combine<'a>(self, results: impl IntoIterator<Item = &'a PriorityResult>) -> f32 {
        let scores: Vec<f32> = results.into_iter().map(PriorityResult::score).collect();
        if scores.is_empty() {
            return 0.0;
        }
        match self {
            Self::Product => scores.iter().product(),
            Self::Mean => scores.iter().sum::<f32>() / scores.len() as f32,
            Self::Max => scores.iter().copied().fold(0.0, f32::max),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::Mean => "mean",
            Self::Max => "max",
        }
    }
}

impl fmt::Display for PriorityCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The variants a gene's filter score was built from, as positions into its evaluations.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterEvidence {
    pub score: f32,
    pub contributing: Vec<usize>,
}

/// Everything scoring decides about one gene, computed without touching the gene.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScoreCard {
    pub scores: GeneScores,
    pub contributing: Vec<usize>,
}

pub trait GeneScorer: Sync {
    /// Computes the scores of `gene` under `mode` and returns the scored gene.
    fn score_gene(&self, gene: Gene, mode: ModeOfInheritance) -> Gene;

    /// Scores every gene, then returns them ranked by combined score, best first.
    fn score_genes(&self, genes: Vec<Gene>, mode: ModeOfInheritance) -> Vec<Gene>;
}

/// Scores genes directly from raw variant and prioritizer scores.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RawScoreGeneScorer {
    priority_combination: PriorityCombination,
    sequential: bool,
}

impl RawScoreGeneScorer {
    pub fn new(priority_combination: PriorityCombination) -> Self {
        Self {
            priority_combination,
            sequential: false,
        }
    }

    /// Scores batches on the calling thread instead of the rayon pool.
    pub fn sequential(mut self) -> Self {
        self.sequential = true;
        self
    }

    pub fn priority_combination(&self) -> PriorityCombination {
        self.priority_combination
    }

    /// The pure part of scoring: reads the gene, decides its scores and contributing variants.
    pub fn score_card(&self, gene: &Gene, mode: ModeOfInheritance) -> ScoreCard {
        let evidence = filter_evidence(gene.variant_evaluations(), mode.allele_requirement());
        let priority = self.priority_combination.combine(gene.priority_results());
        ScoreCard {
            scores: GeneScores {
                filter: evidence.score,
                priority,
                combined: combined_score(evidence.score, priority),
            },
            contributing: evidence.contributing,
        }
    }
}

impl GeneScorer for RawScoreGeneScorer {
    fn score_gene(&self, mut gene: Gene, mode: ModeOfInheritance) -> Gene {
        let card = self.score_card(&gene, mode);

        // Every flag is rewritten so rescoring never accumulates contributions.
        for (index, variant) in gene.variant_evaluations_mut().iter_mut().enumerate() {
            variant.set_contributes_to_gene_score(card.contributing.contains(&index));
        }
        gene.set_scores(card.scores);

        log::debug!(
            "Scored {} under {}: filter={} priority={} combined={} ({} of {} variants contributing)",
            gene.symbol(),
            mode,
            card.scores.filter,
            card.scores.priority,
            card.scores.combined,
            card.contributing.len(),
            gene.variant_evaluations().len()
        );
        gene
    }

    fn score_genes(&self, genes: Vec<Gene>, mode: ModeOfInheritance) -> Vec<Gene> {
        let total = genes.len();
        let scored: Vec<Gene> = if self.sequential {
            genes
                .into_iter()
                .map(|gene| self.score_gene(gene, mode))
                .collect()
        } else {
            genes
                .into_par_iter()
                .map(|gene| self.score_gene(gene, mode))
                .collect()
        };

        // Ranking happens only once every score is final.
        let ranked = rank_genes(scored);
        log::info!(
            "Scored and ranked {total} genes under {mode} (priority combination: {})",
            self.priority_combination
        );
        ranked
    }
}

pub fn combined_score(filter_score: f32, priority_score: f32) -> f32 {
    (filter_score + priority_score) / 2.0
}

/// Picks the variants that explain a gene under the given allele requirement.
///
/// Only variants that passed every filter are candidates. A single-allele gene is explained by
/// its most damaging candidate (every candidate tied at the top contributes). A two-allele gene
/// with at least two candidates is explained by its two most damaging ones, and scores their
/// mean; with fewer candidates it falls back to the single-allele rule.
pub fn filter_evidence(
    variants: &[VariantEvaluation],
    requirement: AlleleRequirement,
) -> FilterEvidence {
    let candidates: Vec<usize> = variants
        .iter()
        .enumerate()
        .filter(|(_, variant)| variant.passed_all_filters())
        .map(|(index, _)| index)
        .collect();

    match (requirement, candidates.len()) {
        (_, 0) => FilterEvidence::default(),
        (AlleleRequirement::TwoAlleles, count) if count >= 2 => best_pair(variants, &candidates),
        (AlleleRequirement::SingleAllele, _) | (AlleleRequirement::TwoAlleles, _) => {
            best_single(variants, &candidates)
        }
    }
}

fn best_single(variants: &[VariantEvaluation], candidates: &[usize]) -> FilterEvidence {
    let score = candidates
        .iter()
        .map(|&index| variants[index].variant_score())
        .fold(f32::NEG_INFINITY, f32::max);
    let contributing = candidates
        .iter()
        .copied()
        .filter(|&index| variants[index].variant_score() == score)
        .collect();
    FilterEvidence {
        score,
        contributing,
    }
}

fn best_pair(variants: &[VariantEvaluation], candidates: &[usize]) -> FilterEvidence {
    // sorted_by is stable, so equally scored candidates keep their insertion order.
    let top_two: Vec<usize> = candidates
        .iter()
        .copied()
        .sorted_by(|&a, &b| {
            variants[b]
                .variant_score()
                .total_cmp(&variants[a].variant_score())
        })
        .take(2)
        .collect();
    let score = top_two
        .iter()
        .map(|&index| variants[index].variant_score())
        .sum::<f32>()
        / 2.0;
    FilterEvidence {
        score,
        contributing: top_two,
    }
}
