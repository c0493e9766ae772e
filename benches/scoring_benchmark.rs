// ========================================================================================
//
//                      GENE SCORING AND RANKING THROUGHPUT BENCHMARK
//
// ========================================================================================
//
// Measures how scoring plus ranking scales with the number of candidate genes, comparing
// the rayon-parallel scorer against the single-threaded one under a recessive model (the
// path that sorts candidate variants).
//
// ========================================================================================

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use generank::filter::{FilterResult, FilterType};
use generank::gene::Gene;
use generank::priority::{PriorityResult, PriorityType};
use generank::scorer::{GeneScorer, RawScoreGeneScorer};
use generank::types::ModeOfInheritance;
use generank::variant::VariantEvaluation;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Gene counts to benchmark. Roughly a gene panel, an exome's worth of hits, and a genome's.
const GENE_COUNTS: [usize; 3] = [500, 5_000, 20_000];
/// Variants attached to each simulated gene.
const VARIANTS_PER_GENE: usize = 8;

fn simulated_genes(count: usize) -> Vec<Gene> {
    let mut rng = StdRng::seed_from_u64(0x5EED_6E4E + count as u64);
    (0..count)
        .map(|i| {
            let id = i as u32 + 1;
            let symbol = format!("GENE{id}");
            let mut gene = Gene::new(&symbol, id);
            for v in 0..VARIANTS_PER_GENE {
                let frequency = if rng.gen_bool(0.8) {
                    FilterResult::pass(FilterType::FrequencyFilter)
                } else {
                    FilterResult::fail(FilterType::FrequencyFilter)
                };
                gene.add_variant(
                    VariantEvaluation::builder("1", (i * VARIANTS_PER_GENE + v) as u64 + 1, "A", "G")
                        .variant_score(rng.r#gen::<f32>())
                        .filter_results([frequency])
                        .build(),
                );
            }
            gene.add_priority_result(PriorityResult::new(
                PriorityType::HiphivePriority,
                id,
                &symbol,
                rng.r#gen::<f32>(),
            ));
            gene
        })
        .collect()
}

fn benchmark_scoring(c: &mut Criterion) {
    let parallel = RawScoreGeneScorer::default();
    let sequential = RawScoreGeneScorer::default().sequential();
    let mode = ModeOfInheritance::AutosomalRecessive;

    let mut group = c.benchmark_group("score_and_rank");
    for count in GENE_COUNTS {
        let genes = simulated_genes(count);
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("parallel", count), &genes, |b, input| {
            b.iter(|| {
                let ranked = parallel.score_genes(black_box(input.clone()), mode);
                black_box(ranked);
            });
        });

        group.bench_with_input(BenchmarkId::new("sequential", count), &genes, |b, input| {
            b.iter(|| {
                let ranked = sequential.score_genes(black_box(input.clone()), mode);
                black_box(ranked);
            });
        });
    }
    group.finish();
}

criterion_group!(scoring, benchmark_scoring);
criterion_main!(scoring);
