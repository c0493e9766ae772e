#![deny(unused_variables)]
#![deny(dead_code)]
#![deny(unused_imports)]
#![deny(clippy::no_effect_underscore_binding)]
//! Inheritance-aware gene ranking.
//!
//! Variants arrive already filtered and scored, prioritizer results arrive already normalised.
//! This crate folds both into one score per gene and orders the genes by it:
//!
//! ```
//! use generank::filter::{FilterResult, FilterType};
//! use generank::gene::Gene;
//! use generank::scorer::{GeneScorer, RawScoreGeneScorer};
//! use generank::types::ModeOfInheritance;
//! use generank::variant::VariantEvaluation;
//!
//! let mut gene = Gene::new("FGFR2", 2263);
//! gene.add_variant(
//!     VariantEvaluation::builder("10", 123_256_215, "T", "G")
//!         .variant_score(0.8)
//!         .filter_results([FilterResult::pass(FilterType::FrequencyFilter)])
//!         .build(),
//! );
//!
//! let ranked = RawScoreGeneScorer::default().score_genes(vec![gene], ModeOfInheritance::AutosomalDominant);
//! assert_eq!(ranked[0].filter_score(), 0.8);
//! assert_eq!(ranked[0].combined_score(), 0.4);
//! ```
pub mod config;
pub mod filter;
pub mod gene;
pub mod io;
pub mod priority;
pub mod ranking;
pub mod scorer;
pub mod types;
pub mod variant;
