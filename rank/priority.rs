use crate::types::unit_interval;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The prioritizer that produced a [`PriorityResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriorityType {
    OmimPriority,
    HiphivePriority,
    PhivePriority,
    PhenixPriority,
    ExomewalkerPriority,
    NonePriority,
}

impl PriorityType {
    pub const ALL: [PriorityType; 6] = [
        Self::OmimPriority,
        Self::HiphivePriority,
        Self::PhivePriority,
        Self::PhenixPriority,
        Self::ExomewalkerPriority,
        Self::NonePriority,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::OmimPriority => "OMIM_PRIORITY",
            Self::HiphivePriority => "HIPHIVE_PRIORITY",
            Self::PhivePriority => "PHIVE_PRIORITY",
            Self::PhenixPriority => "PHENIX_PRIORITY",
            Self::ExomewalkerPriority => "EXOMEWALKER_PRIORITY",
            Self::NonePriority => "NONE",
        }
    }

    /// Case-insensitive lookup by label. The trailing `_PRIORITY` may be omitted.
    pub fn from_label(text: &str) -> Option<Self> {
        let wanted = text.trim().to_ascii_uppercase();
        Self::ALL.into_iter().find(|priority_type| {
            let label = priority_type.label();
            label == wanted || label.strip_suffix("_PRIORITY") == Some(wanted.as_str())
        })
    }
}

impl fmt::Display for PriorityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A disease or organism model whose phenotypes matched the patient's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPhenotypeMatch {
    pub model_id: String,
    pub score: f64,
    pub matched_phenotypes: Vec<String>,
}

/// Evidence linking a query gene to the gene a prioritizer actually matched against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneMatch {
    pub query_gene_id: u32,
    pub match_gene_id: u32,
    pub score: f64,
    pub best_match_models: Vec<ModelPhenotypeMatch>,
}

impl GeneMatch {
    pub const NO_HIT: GeneMatch = GeneMatch {
        query_gene_id: 0,
        match_gene_id: 0,
        score: 0.0,
        best_match_models: Vec::new(),
    };

    pub fn is_hit(&self) -> bool {
        *self != Self::NO_HIT
    }
}

impl Default for GeneMatch {
    fn default() -> Self {
        Self::NO_HIT
    }
}

/// One prioritizer's verdict on one gene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityResult {
    priority_type: PriorityType,
    gene_id: u32,
    gene_symbol: String,
    score: f32,
    evidence: GeneMatch,
}

impl PriorityResult {
    /// Scores outside `[0, 1]` are clamped; upstream prioritizers are expected to normalise.
    pub fn new(priority_type: PriorityType, gene_id: u32, gene_symbol: &str, score: f32) -> Self {
        Self {
            priority_type,
            gene_id,
            gene_symbol: gene_symbol.to_string(),
            score: unit_interval(score),
            evidence: GeneMatch::NO_HIT,
        }
    }

    pub fn with_evidence(mut self, evidence: GeneMatch) -> Self {
        self.evidence = evidence;
        self
    }

    pub fn priority_type(&self) -> PriorityType {
        self.priority_type
    }

    pub fn gene_id(&self) -> u32 {
        self.gene_id
    }

    pub fn gene_symbol(&self) -> &str {
        &self.gene_symbol
    }

    pub fn score(&self) -> f32 {
        self.score
    }

    pub fn evidence(&self) -> &GeneMatch {
        &self.evidence
    }
}

impl fmt::Display for PriorityResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({}) score={}",
            self.priority_type, self.gene_symbol, self.gene_id, self.score
        )
    }
}
