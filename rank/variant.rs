// ========================================================================================
//
//                      Variant evaluations and their severity scores
//
// ========================================================================================

use crate::filter::{FilterResult, FilterType};
use crate::types::unit_interval;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Population frequency above which (in percent) a variant is considered too common to be causal.
pub const MAX_CAUSAL_FREQUENCY_PERCENT: f32 = 2.0;

/// The predicted functional consequence of a variant on its gene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VariantEffect {
    FrameshiftVariant,
    StopGained,
    StopLost,
    StartLost,
    SpliceDonorVariant,
    SpliceAcceptorVariant,
    InframeInsertion,
    InframeDeletion,
    MissenseVariant,
    SpliceRegionVariant,
    SynonymousVariant,
    IntronVariant,
    FivePrimeUtrVariant,
    ThreePrimeUtrVariant,
    UpstreamGeneVariant,
    DownstreamGeneVariant,
    IntergenicVariant,
    #[default]
    Unknown,
}

impl VariantEffect {
    pub const ALL: [VariantEffect; 18] = [
        Self::FrameshiftVariant,
        Self::StopGained,
        Self::StopLost,
        Self::StartLost,
        Self::SpliceDonorVariant,
        Self::SpliceAcceptorVariant,
        Self::InframeInsertion,
        Self::InframeDeletion,
        Self::MissenseVariant,
        Self::SpliceRegionVariant,
        Self::SynonymousVariant,
        Self::IntronVariant,
        Self::FivePrimeUtrVariant,
        Self::ThreePrimeUtrVariant,
        Self::UpstreamGeneVariant,
        Self::DownstreamGeneVariant,
        Self::IntergenicVariant,
        Self::Unknown,
    ];

    /// Pathogenicity assumed for the effect when no predictor score is available.
    pub fn default_pathogenicity_score(self) -> f32 {
        match self {
            Self::FrameshiftVariant | Self::StopGained | Self::StartLost => 0.95,
            Self::SpliceDonorVariant | Self::SpliceAcceptorVariant => 0.90,
            Self::InframeInsertion | Self::InframeDeletion => 0.85,
            Self::StopLost => 0.70,
            Self::MissenseVariant => 0.60,
            Self::SpliceRegionVariant => 0.30,
            Self::SynonymousVariant => 0.10,
            Self::IntronVariant
            | Self::FivePrimeUtrVariant
            | Self::ThreePrimeUtrVariant
            | Self::UpstreamGeneVariant
            | Self::DownstreamGeneVariant
            | Self::IntergenicVariant
            | Self::Unknown => 0.0,
        }
    }

    /// Sequence Ontology term, e.g. `missense_variant`.
    pub fn so_term(self) -> &'static str {
        match self {
            Self::FrameshiftVariant => "frameshift_variant",
            Self::StopGained => "stop_gained",
            Self::StopLost => "stop_lost",
            Self::StartLost => "start_lost",
            Self::SpliceDonorVariant => "splice_donor_variant",
            Self::SpliceAcceptorVariant => "splice_acceptor_variant",
            Self::InframeInsertion => "inframe_insertion",
            Self::InframeDeletion => "inframe_deletion",
            Self::MissenseVariant => "missense_variant",
            Self::SpliceRegionVariant => "splice_region_variant",
            Self::SynonymousVariant => "synonymous_variant",
            Self::IntronVariant => "intron_variant",
            Self::FivePrimeUtrVariant => "5_prime_UTR_variant",
            Self::ThreePrimeUtrVariant => "3_prime_UTR_variant",
            Self::UpstreamGeneVariant => "upstream_gene_variant",
            Self::DownstreamGeneVariant => "downstream_gene_variant",
            Self::IntergenicVariant => "intergenic_variant",
            Self::Unknown => "sequence_variant",
        }
    }

    pub fn from_so_term(term: &str) -> Option<Self> {
        let term = term.trim();
        Self::ALL
            .into_iter()
            .find(|effect| effect.so_term().eq_ignore_ascii_case(term))
    }
}

impl fmt::Display for VariantEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.so_term())
    }
}

/// Where an observed population frequency comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FrequencySource {
    Unknown,
    Local,
    ThousandGenomes,
    EspAfricanAmerican,
    EspEuropeanAmerican,
    EspAll,
    ExacAfricanIncAfricanAmerican,
    ExacAmerican,
    ExacEastAsian,
    ExacSouthAsian,
    ExacFinnish,
    ExacNonFinnishEuropean,
    ExacOther,
}

impl FrequencySource {
    pub fn label(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Local => "Local",
            Self::ThousandGenomes => "1000Genomes",
            Self::EspAfricanAmerican => "ESP AA",
            Self::EspEuropeanAmerican => "ESP EA",
            Self::EspAll => "ESP All",
            Self::ExacAfricanIncAfricanAmerican => "ExAC AFR",
            Self::ExacAmerican => "ExAC AMR",
            Self::ExacEastAsian => "ExAC EAS",
            Self::ExacSouthAsian => "ExAC SAS",
            Self::ExacFinnish => "ExAC FIN",
            Self::ExacNonFinnishEuropean => "ExAC NFE",
            Self::ExacOther => "ExAC OTH",
        }
    }

    /// Anything but local and unknown sources counts as an external reference population.
    pub fn is_external(self) -> bool {
        !matches!(self, Self::Unknown | Self::Local)
    }
}

impl fmt::Display for FrequencySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frequency {
    pub source: FrequencySource,
    /// Allele frequency expressed in percent.
    pub percent: f32,
}

/// Population frequencies observed for one variant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrequencyData {
    frequencies: Vec<Frequency>,
}

impl FrequencyData {
    pub fn new(frequencies: impl IntoIterator<Item = Frequency>) -> Self {
        Self {
            frequencies: frequencies.into_iter().collect(),
        }
    }

    pub fn frequencies(&self) -> &[Frequency] {
        &self.frequencies
    }

    pub fn has_data(&self) -> bool {
        !self.frequencies.is_empty()
    }

    pub fn max_frequency(&self) -> Option<f32> {
        self.frequencies
            .iter()
            .map(|frequency| frequency.percent)
            .filter(|percent| percent.is_finite())
            .max_by(f32::total_cmp)
    }

    /// Rarer variants score higher. Unobserved variants score 1.0 and anything seen in more than
    /// [`MAX_CAUSAL_FREQUENCY_PERCENT`] of a population scores 0.0.
    pub fn score(&self) -> f32 {
        match self.max_frequency() {
            None => 1.0,
            Some(max) if max <= 0.0 => 1.0,
            Some(max) if max > MAX_CAUSAL_FREQUENCY_PERCENT => 0.0,
            Some(max) => unit_interval(1.13533 - 0.13533 * max.exp()),
        }
    }
}

/// A variant together with everything the filtering stage concluded about it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantEvaluation {
    chromosome: String,
    position: u64,
    reference: String,
    alternate: String,
    variant_effect: VariantEffect,
    frequency_data: FrequencyData,
    variant_score: f32,
    filter_results: Vec<FilterResult>,
    contributes_to_gene_score: bool,
}

impl VariantEvaluation {
    pub fn builder(
        chromosome: &str,
        position: u64,
        reference: &str,
        alternate: &str,
    ) -> VariantEvaluationBuilder {
        VariantEvaluationBuilder {
            chromosome: chromosome.trim().to_string(),
            position,
            reference: reference.to_string(),
            alternate: alternate.to_string(),
            variant_effect: VariantEffect::Unknown,
            frequency_data: FrequencyData::default(),
            predicted_pathogenicity: None,
            variant_score: None,
            filter_results: Vec::new(),
        }
    }

    pub fn chromosome(&self) -> &str {
        &self.chromosome
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn alternate(&self) -> &str {
        &self.alternate
    }

    pub fn variant_effect(&self) -> VariantEffect {
        self.variant_effect
    }

    pub fn frequency_data(&self) -> &FrequencyData {
        &self.frequency_data
    }

    pub fn variant_score(&self) -> f32 {
        self.variant_score
    }

    pub fn filter_results(&self) -> &[FilterResult] {
        &self.filter_results
    }

    pub fn filter_result(&self, filter_type: FilterType) -> Option<&FilterResult> {
        self.filter_results
            .iter()
            .find(|result| result.filter_type() == filter_type)
    }

    /// Records a filter outcome. A second result for the same filter type replaces the first
    /// without moving it in the pipeline order.
    pub fn add_filter_result(&mut self, result: FilterResult) {
        match self
            .filter_results
            .iter_mut()
            .find(|existing| existing.filter_type() == result.filter_type())
        {
            Some(existing) => *existing = result,
            None => self.filter_results.push(result),
        }
    }

    /// True when every recorded filter result is a pass. A variant nobody filtered passes
    /// vacuously, but a recorded `NOT_RUN` does not.
    pub fn passed_all_filters(&self) -> bool {
        self.filter_results.iter().all(FilterResult::passed)
    }

    pub fn passed_filter(&self, filter_type: FilterType) -> bool {
        self.filter_result(filter_type)
            .is_some_and(FilterResult::passed)
    }

    pub fn contributes_to_gene_score(&self) -> bool {
        self.contributes_to_gene_score
    }

    pub(crate) fn set_contributes_to_gene_score(&mut self, contributes: bool) {
        self.contributes_to_gene_score = contributes;
    }
}

impl fmt::Display for VariantEvaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "chr{}:{} {}>{} {} score={} contributing={}",
            self.chromosome,
            self.position,
            self.reference,
            self.alternate,
            self.variant_effect,
            self.variant_score,
            self.contributes_to_gene_score
        )
    }
}

pub struct VariantEvaluationBuilder {
    chromosome: String,
    position: u64,
    reference: String,
    alternate: String,
    variant_effect: VariantEffect,
    frequency_data: FrequencyData,
    predicted_pathogenicity: Option<f32>,
    variant_score: Option<f32>,
    filter_results: Vec<FilterResult>,
}

impl VariantEvaluationBuilder {
    pub fn variant_effect(mut self, effect: VariantEffect) -> Self {
        self.variant_effect = effect;
        self
    }

    pub fn frequency_data(mut self, frequency_data: FrequencyData) -> Self {
        self.frequency_data = frequency_data;
        self
    }

    /// Overrides the effect-based pathogenicity with a predictor score.
    pub fn predicted_pathogenicity(mut self, score: f32) -> Self {
        self.predicted_pathogenicity = Some(score);
        self
    }

    /// Supplies a finished upstream score. Takes precedence over frequency and pathogenicity.
    pub fn variant_score(mut self, score: f32) -> Self {
        self.variant_score = Some(score);
        self
    }

    pub fn filter_results(mut self, results: impl IntoIterator<Item = FilterResult>) -> Self {
        self.filter_results.extend(results);
        self
    }

    pub fn build(self) -> VariantEvaluation {
        let variant_score = match self.variant_score {
            Some(score) => unit_interval(score),
            None => {
                let pathogenicity = self
                    .predicted_pathogenicity
                    .map(unit_interval)
                    .unwrap_or_else(|| self.variant_effect.default_pathogenicity_score());
                unit_interval(self.frequency_data.score() * pathogenicity)
            }
        };

        let mut evaluation = VariantEvaluation {
            chromosome: self.chromosome,
            position: self.position,
            reference: self.reference,
            alternate: self.alternate,
            variant_effect: self.variant_effect,
            frequency_data: self.frequency_data,
            variant_score,
            filter_results: Vec::with_capacity(self.filter_results.len()),
            contributes_to_gene_score: false,
        };
        for result in self.filter_results {
            evaluation.add_filter_result(result);
        }
        evaluation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn rare(percent: f32) -> FrequencyData {
        FrequencyData::new([
            Frequency {
                source: FrequencySource::ThousandGenomes,
                percent: percent / 2.0,
            },
            Frequency {
                source: FrequencySource::ExacNonFinnishEuropean,
                percent,
            },
        ])
    }

    #[test]
    fn unfiltered_variant_passes_vacuously() {
        let variant = VariantEvaluation::builder("1", 1, "A", "T").build();
        assert!(variant.filter_results().is_empty());
        assert!(variant.passed_all_filters());
        assert!(!variant.contributes_to_gene_score());
    }

    #[test]
    fn any_failure_or_not_run_breaks_passed_all_filters() {
        let failed = VariantEvaluation::builder("1", 1, "A", "T")
            .filter_results([
                FilterResult::pass(FilterType::FrequencyFilter),
                FilterResult::fail(FilterType::PathogenicityFilter),
            ])
            .build();
        assert!(!failed.passed_all_filters());
        assert!(failed.passed_filter(FilterType::FrequencyFilter));
        assert!(!failed.passed_filter(FilterType::PathogenicityFilter));

        let not_run = VariantEvaluation::builder("1", 1, "A", "T")
            .filter_results([
                FilterResult::pass(FilterType::FrequencyFilter),
                FilterResult::not_run(FilterType::QualityFilter),
            ])
            .build();
        assert!(!not_run.passed_all_filters());
        assert!(not_run.passed_filter(FilterType::FrequencyFilter));
        assert!(!not_run.passed_filter(FilterType::QualityFilter));
    }

    #[test]
    fn repeated_filter_type_replaces_in_place() {
        let mut variant = VariantEvaluation::builder("X", 5, "G", "C")
            .filter_results([
                FilterResult::fail(FilterType::FrequencyFilter),
                FilterResult::pass(FilterType::QualityFilter),
            ])
            .build();
        variant.add_filter_result(FilterResult::pass(FilterType::FrequencyFilter));

        assert_eq!(
            variant.filter_results(),
            &[
                FilterResult::pass(FilterType::FrequencyFilter),
                FilterResult::pass(FilterType::QualityFilter),
            ]
        );
        assert!(variant.passed_all_filters());
    }

    #[test]
    fn effect_severity_orders_default_scores() {
        let score = |effect| {
            VariantEvaluation::builder("1", 1, "A", "T")
                .variant_effect(effect)
                .build()
                .variant_score()
        };
        assert!(score(VariantEffect::FrameshiftVariant) > score(VariantEffect::MissenseVariant));
        assert!(score(VariantEffect::MissenseVariant) > score(VariantEffect::SynonymousVariant));
        assert_eq!(score(VariantEffect::IntergenicVariant), 0.0);
    }

    #[test]
    fn frequency_score_decays_with_population_frequency() {
        assert!(!FrequencyData::default().has_data());
        assert_eq!(FrequencyData::default().score(), 1.0);
        assert!(rare(0.0).has_data());
        assert_abs_diff_eq!(rare(0.0).score(), 1.0, epsilon = 1e-5);
        assert!(rare(0.5).score() > rare(1.5).score());
        assert_abs_diff_eq!(rare(2.0).score(), 1.13533 - 0.13533 * 2.0_f32.exp(), epsilon = 1e-5);
        assert_eq!(rare(2.5).score(), 0.0);
    }

    #[test]
    fn reference_populations_are_external() {
        let external: Vec<_> = rare(1.0)
            .frequencies()
            .iter()
            .map(|frequency| frequency.source.is_external())
            .collect();
        assert_eq!(external, vec![true, true]);
        assert!(!FrequencySource::Local.is_external());
        assert!(!FrequencySource::Unknown.is_external());
        assert_eq!(FrequencySource::ThousandGenomes.to_string(), "1000Genomes");
    }

    #[test]
    fn derived_score_combines_frequency_and_pathogenicity() {
        let variant = VariantEvaluation::builder("1", 1, "A", "T")
            .variant_effect(VariantEffect::MissenseVariant)
            .frequency_data(rare(1.0))
            .build();
        assert_abs_diff_eq!(
            variant.variant_score(),
            rare(1.0).score() * 0.6,
            epsilon = 1e-6
        );

        let predicted = VariantEvaluation::builder("1", 1, "A", "T")
            .variant_effect(VariantEffect::MissenseVariant)
            .predicted_pathogenicity(0.9)
            .build();
        assert_abs_diff_eq!(predicted.variant_score(), 0.9, epsilon = 1e-6);
    }

    #[test]
    fn explicit_score_wins_and_is_clamped() {
        let variant = VariantEvaluation::builder("1", 1, "A", "T")
            .variant_effect(VariantEffect::FrameshiftVariant)
            .variant_score(1.4)
            .build();
        assert_eq!(variant.variant_score(), 1.0);

        let nan = VariantEvaluation::builder("1", 1, "A", "T")
            .variant_score(f32::NAN)
            .build();
        assert_eq!(nan.variant_score(), 0.0);
    }

    #[test]
    fn so_terms_round_trip_case_insensitively() {
        assert_eq!(
            VariantEffect::from_so_term("Missense_Variant"),
            Some(VariantEffect::MissenseVariant)
        );
        assert_eq!(
            VariantEffect::from_so_term("5_prime_utr_variant"),
            Some(VariantEffect::FivePrimeUtrVariant)
        );
        assert_eq!(VariantEffect::from_so_term("nonsense"), None);
    }
}
