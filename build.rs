use grep::regex::RegexMatcher;
use grep::searcher::{Searcher, Sink, SinkMatch};
use std::error::Error;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// Directories holding generank's own Rust sources.
const SOURCE_DIRS: [&str; 4] = ["rank", "cli", "tests", "benches"];

/// One source rule enforced at build time.
struct LintRule {
    name: &'static str,
    pattern: &'static str,
    remedy: &'static str,
    // Underscore names inside comments and string literals are not bindings.
    skip_comments_and_strings: bool,
}

const RULES: [LintRule; 2] = [
    LintRule {
        name: "underscore-prefixed binding",
        pattern: r"\b(_[a-zA-Z0-9_]+)\b",
        remedy: "Use the binding under its real name, or drop it.",
        skip_comments_and_strings: true,
    },
    LintRule {
        name: "#[allow(dead_code)] attribute",
        pattern: r"#\s*\[\s*allow\s*\(\s*dead_code\s*\)\s*\]",
        remedy: "Call the item from scoring code or its tests, or delete it.",
        skip_comments_and_strings: false,
    },
];

/// Gathers the offending lines of one file for one rule.
struct RuleHits<'a> {
    rule: &'a LintRule,
    path: PathBuf,
    lines: Vec<String>,
}

impl<'a> RuleHits<'a> {
    fn new(rule: &'a LintRule, path: &Path) -> Self {
        Self {
            rule,
            path: path.to_path_buf(),
            lines: Vec::new(),
        }
    }

    fn into_report(self) -> Option<String> {
        if self.lines.is_empty() {
            return None;
        }
        let mut report = format!(
            "\ngenerank lint: {} x {} in {}\n",
            self.lines.len(),
            self.rule.name,
            self.path.display()
        );
        for line in &self.lines {
            report.push_str(&format!("   {line}\n"));
        }
        report.push_str(&format!("{}\n", self.rule.remedy));
        Some(report)
    }
}

fn is_comment_or_string(line_text: &str) -> bool {
    if line_text.trim_start().starts_with("//") {
        return true;
    }
    // Odd-numbered segments between quotes are string contents.
    line_text
        .split('"')
        .enumerate()
        .any(|(i, part)| i % 2 == 1 && part.contains('_'))
}

impl Sink for RuleHits<'_> {
    type Error = std::io::Error;

    fn matched(&mut self, _: &Searcher, mat: &SinkMatch) -> Result<bool, Self::Error> {
        let line_number = mat.line_number().unwrap_or(0);
        let line_text = std::str::from_utf8(mat.bytes()).unwrap_or("").trim_end();
        if !(self.rule.skip_comments_and_strings && is_comment_or_string(line_text)) {
            self.lines.push(format!("{line_number}:{line_text}"));
        }
        Ok(true)
    }
}

fn rust_sources() -> Vec<PathBuf> {
    SOURCE_DIRS
        .into_iter()
        .flat_map(|dir| {
            WalkDir::new(dir)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.path().extension().is_some_and(|ext| ext == "rs"))
                .map(|e| e.into_path())
        })
        .collect()
}

fn check_rule(rule: &LintRule, sources: &[PathBuf]) -> Result<(), Box<dyn Error>> {
    let matcher = RegexMatcher::new_line_matcher(rule.pattern)?;
    let mut searcher = Searcher::new();
    for path in sources {
        let mut hits = RuleHits::new(rule, path);
        searcher.search_path(&matcher, path, &mut hits)?;
        if let Some(report) = hits.into_report() {
            return Err(report.into());
        }
    }
    Ok(())
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    for dir in SOURCE_DIRS {
        println!("cargo:rerun-if-changed={dir}");
    }

    let sources = rust_sources();
    for rule in &RULES {
        if let Err(e) = check_rule(rule, &sources) {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
