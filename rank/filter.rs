use crate::variant::VariantEvaluation;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies the filter that produced a [`FilterResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterType {
    FrequencyFilter,
    PathogenicityFilter,
    InheritanceFilter,
    TargetFilter,
    QualityFilter,
    IntervalFilter,
    KnownVariantFilter,
    EntrezGeneIdFilter,
    PriorityScoreFilter,
    RegulatoryFeatureFilter,
}

impl FilterType {
    pub const ALL: [FilterType; 10] = [
        Self::FrequencyFilter,
        Self::PathogenicityFilter,
        Self::InheritanceFilter,
        Self::TargetFilter,
        Self::QualityFilter,
        Self::IntervalFilter,
        Self::KnownVariantFilter,
        Self::EntrezGeneIdFilter,
        Self::PriorityScoreFilter,
        Self::RegulatoryFeatureFilter,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::FrequencyFilter => "FREQUENCY_FILTER",
            Self::PathogenicityFilter => "PATHOGENICITY_FILTER",
            Self::InheritanceFilter => "INHERITANCE_FILTER",
            Self::TargetFilter => "TARGET_FILTER",
            Self::QualityFilter => "QUALITY_FILTER",
            Self::IntervalFilter => "INTERVAL_FILTER",
            Self::KnownVariantFilter => "KNOWN_VARIANT_FILTER",
            Self::EntrezGeneIdFilter => "ENTREZ_GENE_ID_FILTER",
            Self::PriorityScoreFilter => "PRIORITY_SCORE_FILTER",
            Self::RegulatoryFeatureFilter => "REGULATORY_FEATURE_FILTER",
        }
    }

    /// Case-insensitive lookup by label. The trailing `_FILTER` may be omitted.
    pub fn from_label(text: &str) -> Option<Self> {
        let wanted = text.trim().to_ascii_uppercase();
        Self::ALL.into_iter().find(|filter_type| {
            let label = filter_type.label();
            label == wanted || label.strip_suffix("_FILTER") == Some(wanted.as_str())
        })
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterStatus {
    Pass,
    Fail,
    NotRun,
}

impl FilterStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
            Self::NotRun => "NOT_RUN",
        }
    }

    pub fn from_label(text: &str) -> Option<Self> {
        match text.trim().to_ascii_uppercase().as_str() {
            "PASS" => Some(Self::Pass),
            "FAIL" => Some(Self::Fail),
            "NOT_RUN" | "NOTRUN" => Some(Self::NotRun),
            _ => None,
        }
    }
}

/// The outcome of running one filter over one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterResult {
    filter_type: FilterType,
    status: FilterStatus,
}

impl FilterResult {
    pub const fn new(filter_type: FilterType, status: FilterStatus) -> Self {
        Self {
            filter_type,
            status,
        }
    }

    pub const fn pass(filter_type: FilterType) -> Self {
        Self::new(filter_type, FilterStatus::Pass)
    }

    pub const fn fail(filter_type: FilterType) -> Self {
        Self::new(filter_type, FilterStatus::Fail)
    }

    pub const fn not_run(filter_type: FilterType) -> Self {
        Self::new(filter_type, FilterStatus::NotRun)
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }

    pub fn status(&self) -> FilterStatus {
        self.status
    }

    pub fn passed(&self) -> bool {
        self.status == FilterStatus::Pass
    }

    pub fn failed(&self) -> bool {
        self.status == FilterStatus::Fail
    }

    pub fn was_run(&self) -> bool {
        self.status != FilterStatus::NotRun
    }
}

impl fmt::Display for FilterResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.filter_type, self.status.label())
    }
}

/// A filter applied to individual variants. Implementations live outside this crate; the
/// scorer only ever reads the results they leave behind.
pub trait VariantFilter {
    fn filter_type(&self) -> FilterType;

    fn run_filter(&self, variant: &VariantEvaluation) -> FilterResult;
}

/// Runs each filter in pipeline order and records its result on the variant.
///
/// Every filter sees the variant as left by the filters before it, so a filter that wants to
/// short-circuit on earlier failures can inspect [`VariantEvaluation::filter_results`].
pub fn apply_filters(variant: &mut VariantEvaluation, filters: &[&dyn VariantFilter]) {
    for filter in filters {
        let result = filter.run_filter(variant);
        if result.filter_type() != filter.filter_type() {
            log::warn!(
                "Filter declared as {} reported a result for {}; recording it as reported.",
                filter.filter_type(),
                result.filter_type()
            );
        }
        variant.add_filter_result(result);
    }
}
