// ========================================================================================
//
//                     Tabular inputs: annotated variants and priority results
//
// ========================================================================================

use crate::filter::{FilterResult, FilterStatus, FilterType};
use crate::gene::Gene;
use crate::priority::{PriorityResult, PriorityType};
use crate::ranking::with_ranks;
use crate::variant::{Frequency, FrequencyData, FrequencySource, VariantEffect, VariantEvaluation};
use ahash::AHashMap;
use flate2::read::MultiGzDecoder;
use serde::Deserialize;
use std::fmt::Write as FmtWrite;
use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InputError {
    #[error("Failed to open '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Malformed table: {0}")]
    Csv(#[from] csv::Error),
    #[error("Line {line}: unknown filter type '{value}'")]
    UnknownFilterType { line: u64, value: String },
    #[error("Line {line}: unknown filter status '{value}' (expected PASS, FAIL or NOT_RUN)")]
    UnknownFilterStatus { line: u64, value: String },
    #[error("Line {line}: filter entry '{value}' is not of the form TYPE:STATUS")]
    MalformedFilter { line: u64, value: String },
    #[error("Line {line}: unknown variant effect '{value}'")]
    UnknownEffect { line: u64, value: String },
    #[error("Line {line}: unknown prioritizer '{value}'")]
    UnknownPriorityType { line: u64, value: String },
}

/// One row of the variant table.
///
/// Required columns: `gene_symbol entrez_id chrom pos ref alt`. Optional columns: `effect`
/// (Sequence Ontology term), `variant_score`, `max_freq` (percent), `pathogenicity` and
/// `filters` (`TYPE:STATUS` pairs joined by `;`, with `.` or empty meaning none).
#[derive(Debug, Deserialize)]
struct VariantRow {
    gene_symbol: String,
    entrez_id: u32,
    chrom: String,
    pos: u64,
    #[serde(rename = "ref")]
    reference: String,
    alt: String,
    #[serde(default)]
    effect: Option<String>,
    #[serde(default)]
    variant_score: Option<f32>,
    #[serde(default)]
    max_freq: Option<f32>,
    #[serde(default)]
    pathogenicity: Option<f32>,
    #[serde(default)]
    filters: Option<String>,
}

/// One row of the priority table: `gene_symbol entrez_id prioritizer score`.
#[derive(Debug, Deserialize)]
struct PriorityRow {
    gene_symbol: String,
    entrez_id: u32,
    prioritizer: String,
    score: f32,
}

/// Opens a text file, transparently decompressing `.gz` inputs.
pub fn open_table(path: &Path) -> Result<Box<dyn Read + Send>, InputError> {
    let file = File::open(path).map_err(|source| InputError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let reader: Box<dyn Read + Send> = if path.extension().is_some_and(|ext| ext == "gz") {
        Box::new(MultiGzDecoder::new(BufReader::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    Ok(reader)
}

fn tsv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_reader(reader)
}

/// Collects genes in the order their symbols are first seen.
#[derive(Debug, Default)]
pub struct GeneCollector {
    genes: Vec<Gene>,
    by_symbol: AHashMap<String, usize>,
}

impl GeneCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gene_mut(&mut self, symbol: &str, entrez_gene_id: u32) -> &mut Gene {
        let index = match self.by_symbol.get(symbol) {
            Some(&index) => {
                let known_id = self.genes[index].entrez_gene_id();
                if known_id != entrez_gene_id {
                    log::warn!(
                        "{symbol}: entrez id {entrez_gene_id} conflicts with {known_id} seen earlier; keeping {known_id}"
                    );
                }
                index
            }
            None => {
                self.genes.push(Gene::new(symbol, entrez_gene_id));
                self.by_symbol.insert(symbol.to_string(), self.genes.len() - 1);
                self.genes.len() - 1
            }
        };
        &mut self.genes[index]
    }

    pub fn read_variants<R: Read>(&mut self, reader: R) -> Result<usize, InputError> {
        let mut tsv = tsv_reader(reader);
        let headers = tsv.headers()?.clone();
        let mut count = 0usize;
        for record in tsv.records() {
            let record = record?;
            let line = record.position().map_or(0, |position| position.line());
            let row: VariantRow = record.deserialize(Some(&headers))?;
            let variant = build_variant(&row, line)?;
            self.gene_mut(&row.gene_symbol, row.entrez_id)
                .add_variant(variant);
            count += 1;
        }
        Ok(count)
    }

    pub fn read_priority_results<R: Read>(&mut self, reader: R) -> Result<usize, InputError> {
        let mut tsv = tsv_reader(reader);
        let headers = tsv.headers()?.clone();
        let mut count = 0usize;
        for record in tsv.records() {
            let record = record?;
            let line = record.position().map_or(0, |position| position.line());
            let row: PriorityRow = record.deserialize(Some(&headers))?;
            let priority_type = PriorityType::from_label(&row.prioritizer).ok_or_else(|| {
                InputError::UnknownPriorityType {
                    line,
                    value: row.prioritizer.clone(),
                }
            })?;
            let result =
                PriorityResult::new(priority_type, row.entrez_id, &row.gene_symbol, row.score);
            self.gene_mut(&row.gene_symbol, row.entrez_id)
                .add_priority_result(result);
            count += 1;
        }
        Ok(count)
    }

    pub fn into_genes(self) -> Vec<Gene> {
        self.genes
    }
}

/// Reads the variant table and, when given, the priority table into unscored genes.
pub fn load_genes(variants: &Path, priorities: Option<&Path>) -> Result<Vec<Gene>, InputError> {
    let mut collector = GeneCollector::new();
    let variant_count = collector.read_variants(open_table(variants)?)?;
    log::info!(
        "Read {variant_count} variants from {}",
        variants.display()
    );
    if let Some(path) = priorities {
        let result_count = collector.read_priority_results(open_table(path)?)?;
        log::info!("Read {result_count} priority results from {}", path.display());
    }
    let genes = collector.into_genes();
    log::info!("Collected {} genes", genes.len());
    Ok(genes)
}

fn build_variant(row: &VariantRow, line: u64) -> Result<VariantEvaluation, InputError> {
    let mut builder = VariantEvaluation::builder(&row.chrom, row.pos, &row.reference, &row.alt);

    if let Some(term) = row.effect.as_deref().filter(|term| !is_missing(term)) {
        let effect =
            VariantEffect::from_so_term(term).ok_or_else(|| InputError::UnknownEffect {
                line,
                value: term.to_string(),
            })?;
        builder = builder.variant_effect(effect);
    }
    if let Some(percent) = row.max_freq {
        builder = builder.frequency_data(FrequencyData::new([Frequency {
            source: FrequencySource::Unknown,
            percent,
        }]));
    }
    if let Some(score) = row.pathogenicity {
        builder = builder.predicted_pathogenicity(score);
    }
    if let Some(score) = row.variant_score {
        builder = builder.variant_score(score);
    }
    if let Some(filters) = row.filters.as_deref() {
        builder = builder.filter_results(parse_filter_results(filters, line)?);
    }
    Ok(builder.build())
}

fn is_missing(field: &str) -> bool {
    let field = field.trim();
    field.is_empty() || field == "."
}

/// Parses `FREQUENCY_FILTER:PASS;PATHOGENICITY_FILTER:FAIL`. `.` and the empty string mean no
/// filter was run.
pub fn parse_filter_results(field: &str, line: u64) -> Result<Vec<FilterResult>, InputError> {
    if is_missing(field) {
        return Ok(Vec::new());
    }
    field
        .split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (type_text, status_text) =
                entry
                    .split_once(':')
                    .ok_or_else(|| InputError::MalformedFilter {
                        line,
                        value: entry.to_string(),
                    })?;
            let filter_type = FilterType::from_label(type_text).ok_or_else(|| {
                InputError::UnknownFilterType {
                    line,
                    value: type_text.to_string(),
                }
            })?;
            let status = FilterStatus::from_label(status_text).ok_or_else(|| {
                InputError::UnknownFilterStatus {
                    line,
                    value: status_text.to_string(),
                }
            })?;
            Ok(FilterResult::new(filter_type, status))
        })
        .collect()
}

/// Writes an already ranked gene list as a tab-separated table.
pub fn write_ranked_genes<W: Write>(writer: &mut W, ranked: &[Gene]) -> io::Result<()> {
    writeln!(
        writer,
        "#RANK\tGENE\tENTREZ_ID\tCOMBINED_SCORE\tFILTER_SCORE\tPRIORITY_SCORE\tPASSED_VARIANTS\tCONTRIBUTING_VARIANTS"
    )?;

    let mut combined_buffer = ryu::Buffer::new();
    let mut filter_buffer = ryu::Buffer::new();
    let mut priority_buffer = ryu::Buffer::new();
    let mut contributing = String::new();

    for entry in with_ranks(ranked) {
        let gene = entry.gene;
        contributing.clear();
        for variant in gene
            .variant_evaluations()
            .iter()
            .filter(|variant| variant.contributes_to_gene_score())
        {
            if !contributing.is_empty() {
                contributing.push(',');
            }
            write!(
                contributing,
                "{}:{}{}>{}",
                variant.chromosome(),
                variant.position(),
                variant.reference(),
                variant.alternate()
            )
            .map_err(io::Error::other)?;
        }
        if contributing.is_empty() {
            contributing.push('.');
        }

        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            entry.rank,
            gene.symbol(),
            gene.entrez_gene_id(),
            combined_buffer.format(gene.combined_score()),
            filter_buffer.format(gene.filter_score()),
            priority_buffer.format(gene.priority_score()),
            gene.passed_variant_count(),
            contributing
        )?;
    }
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARIANTS: &str = "\
# annotated variants
gene_symbol\tentrez_id\tchrom\tpos\tref\talt\teffect\tvariant_score\tfilters
FGFR2\t2263\t10\t123256215\tT\tG\tmissense_variant\t0.8\tFREQUENCY_FILTER:PASS;PATHOGENICITY_FILTER:PASS
GNRHR2\t114814\t1\t145000000\tA\tT\tsynonymous_variant\t\tFREQUENCY_FILTER:FAIL
FGFR2\t2263\t10\t123256300\tC\tA\tframeshift_variant\t\t.
";

    const PRIORITIES: &str = "\
gene_symbol\tentrez_id\tprioritizer\tscore
FGFR2\t2263\tHIPHIVE\t0.9
SHH\t6469\tOMIM_PRIORITY\t1.0
";

    #[test]
    fn groups_variants_by_gene_in_first_seen_order() {
        let mut collector = GeneCollector::new();
        assert_eq!(collector.read_variants(VARIANTS.as_bytes()).unwrap(), 3);
        let genes = collector.into_genes();

        let symbols: Vec<&str> = genes.iter().map(Gene::symbol).collect();
        assert_eq!(symbols, vec!["FGFR2", "GNRHR2"]);

        let fgfr2 = &genes[0];
        assert_eq!(fgfr2.variant_evaluations().len(), 2);
        assert_eq!(fgfr2.variant_evaluations()[0].variant_score(), 0.8);
        assert_eq!(fgfr2.variant_evaluations()[0].filter_results().len(), 2);
        assert!(fgfr2.variant_evaluations()[1].filter_results().is_empty());
        assert_eq!(
            fgfr2.variant_evaluations()[1].variant_effect(),
            VariantEffect::FrameshiftVariant
        );
        assert!(!genes[1].variant_evaluations()[0].passed_all_filters());
    }

    #[test]
    fn priority_only_genes_are_created() {
        let mut collector = GeneCollector::new();
        collector.read_variants(VARIANTS.as_bytes()).unwrap();
        assert_eq!(collector.read_priority_results(PRIORITIES.as_bytes()).unwrap(), 2);
        let genes = collector.into_genes();

        assert_eq!(genes.len(), 3);
        assert_eq!(genes[2].symbol(), "SHH");
        assert!(!genes[2].has_variants());
        assert_eq!(
            genes[0]
                .priority_result(PriorityType::HiphivePriority)
                .map(PriorityResult::score),
            Some(0.9)
        );
    }

    #[test]
    fn reports_bad_filter_entries_with_line_numbers() {
        let table = "gene_symbol\tentrez_id\tchrom\tpos\tref\talt\tfilters\nA\t1\t1\t5\tA\tT\tFREQUENCY_FILTER=PASS\n";
        let err = GeneCollector::new()
            .read_variants(table.as_bytes())
            .unwrap_err();
        assert!(matches!(err, InputError::MalformedFilter { line: 2, .. }), "{err}");

        assert!(matches!(
            parse_filter_results("COVERAGE:PASS", 7),
            Err(InputError::UnknownFilterType { line: 7, .. })
        ));
        assert!(matches!(
            parse_filter_results("QUALITY:SKIPPED", 3),
            Err(InputError::UnknownFilterStatus { line: 3, .. })
        ));
    }

    #[test]
    fn unknown_prioritizer_is_an_error() {
        let table = "gene_symbol\tentrez_id\tprioritizer\tscore\nA\t1\tPAGERANK\t0.5\n";
        assert!(matches!(
            GeneCollector::new().read_priority_results(table.as_bytes()),
            Err(InputError::UnknownPriorityType { line: 2, .. })
        ));
    }

    #[test]
    fn writes_ranked_table_with_shared_ranks() {
        let mut first = Gene::new("A", 1);
        first.add_priority_result(PriorityResult::new(PriorityType::OmimPriority, 1, "A", 1.0));
        let mut second = Gene::new("B", 2);
        second.add_priority_result(PriorityResult::new(PriorityType::OmimPriority, 2, "B", 1.0));

        let scorer = crate::scorer::RawScoreGeneScorer::default();
        let ranked = crate::scorer::GeneScorer::score_genes(
            &scorer,
            vec![first, second],
            crate::types::ModeOfInheritance::Uninitialized,
        );

        let mut out = Vec::new();
        write_ranked_genes(&mut out, &ranked).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "1\tA\t1\t0.5\t0.0\t1.0\t0\t.");
        assert_eq!(lines[2], "1\tB\t2\t0.5\t0.0\t1.0\t0\t.");
    }
}
