// ========================================================================================
//                             High-Level Data Contracts
// ========================================================================================

// This file is ONLY for types that are SHARED BETWEEN FILES, not types that only are used in one file.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The genetic transmission pattern assumed while scoring a gene.
///
/// The scorer never branches on the individual modes. Every mode is resolved once, through
/// [`ModeOfInheritance::allele_requirement`], into the number of qualifying alleles a gene
/// needs before its filter evidence is complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModeOfInheritance {
    #[default]
    Uninitialized,
    AutosomalDominant,
    AutosomalRecessive,
    XDominant,
    XRecessive,
    Mitochondrial,
}

/// How many qualifying alleles a gene must carry under a mode of inheritance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlleleRequirement {
    /// A single damaging allele explains the phenotype (dominant-like modes).
    SingleAllele,
    /// Two alleles are required: homozygous or compound heterozygous (recessive modes).
    TwoAlleles,
}

impl ModeOfInheritance {
    pub const ALL: [ModeOfInheritance; 6] = [
        Self::Uninitialized,
        Self::AutosomalDominant,
        Self::AutosomalRecessive,
        Self::XDominant,
        Self::XRecessive,
        Self::Mitochondrial,
    ];

    pub fn allele_requirement(self) -> AlleleRequirement {
        match self {
            Self::AutosomalRecessive | Self::XRecessive => AlleleRequirement::TwoAlleles,
            Self::Uninitialized
            | Self::AutosomalDominant
            | Self::XDominant
            | Self::Mitochondrial => AlleleRequirement::SingleAllele,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Uninitialized => "UNINITIALIZED",
            Self::AutosomalDominant => "AUTOSOMAL_DOMINANT",
            Self::AutosomalRecessive => "AUTOSOMAL_RECESSIVE",
            Self::XDominant => "X_DOMINANT",
            Self::XRecessive => "X_RECESSIVE",
            Self::Mitochondrial => "MITOCHONDRIAL",
        }
    }
}

impl fmt::Display for ModeOfInheritance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Clamps an upstream score into `[0.0, 1.0]`. Non-finite input carries no evidence and maps to 0.
#[inline]
pub fn unit_interval(score: f32) -> f32 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}
