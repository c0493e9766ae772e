use crate::gene::Gene;
use std::cmp::Ordering;

/// Orders genes by combined score, best first. Genes with equal scores keep their input order.
///
/// The tie-break on input position is explicit, so the result does not depend on the sort
/// algorithm being stable.
pub fn rank_genes(genes: Vec<Gene>) -> Vec<Gene> {
    let mut indexed: Vec<(usize, Gene)> = genes.into_iter().enumerate().collect();
    indexed.sort_by(|(index_a, gene_a), (index_b, gene_b)| {
        compare_scores_descending(gene_a.combined_score(), gene_b.combined_score())
            .then_with(|| index_a.cmp(index_b))
    });
    indexed.into_iter().map(|(_, gene)| gene).collect()
}

/// Descending order on scores. `0.0` and `-0.0` compare equal; scores are never NaN once
/// clamped, but `total_cmp` keeps the order total if one slips through.
fn compare_scores_descending(a: f32, b: f32) -> Ordering {
    b.partial_cmp(&a).unwrap_or_else(|| b.total_cmp(&a))
}

/// A gene together with its 1-based position in a ranking.
#[derive(Debug, Clone, Copy)]
pub struct RankedGene<'a> {
    pub rank: usize,
    pub gene: &'a Gene,
}

/// Pairs each gene of an already ranked list with its rank. Genes whose combined scores are
/// equal share the rank of the first of them.
pub fn with_ranks(ranked: &[Gene]) -> Vec<RankedGene<'_>> {
    let mut out = Vec::with_capacity(ranked.len());
    let mut current_rank = 0usize;
    let mut previous_score: Option<f32> = None;
    for (position, gene) in ranked.iter().enumerate() {
        let score = gene.combined_score();
        if previous_score.is_none_or(|previous| {
            compare_scores_descending(previous, score) != Ordering::Equal
        }) {
            current_rank = position + 1;
        }
        previous_score = Some(score);
        out.push(RankedGene {
            rank: current_rank,
            gene,
        });
    }
    out
}
