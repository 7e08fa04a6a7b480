//! Ordered diagnostic classification rules
//!
//! Each adapter carries one [`RuleSet`]: an ordered pattern table per phase.
//! The first rule matching a line wins. Output that matches no error rule is
//! never dropped; it falls back to the broadest bucket for the phase
//! (compile error for a failed build, runtime error for a failed run). The
//! fallback is a known misclassification risk, so the tables are tested
//! against recorded real toolchain output.

use regex::Regex;

use crate::report::{Diagnostic, DiagnosticKind};

/// Cap on diagnostics extracted from one stream
const MAX_DIAGNOSTICS: usize = 32;

/// Cap on the fallback message length
const MAX_FALLBACK_LEN: usize = 500;

/// Pipeline phase the output came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticPhase {
    /// Build / parse check output
    Build,
    /// Sample-test execution output
    Run,
}

impl DiagnosticPhase {
    /// Broadest bucket for unmatched output in this phase
    pub fn fallback_kind(&self) -> DiagnosticKind {
        match self {
            DiagnosticPhase::Build => DiagnosticKind::Compile,
            DiagnosticPhase::Run => DiagnosticKind::Runtime,
        }
    }
}

/// One compiled pattern rule
struct Rule {
    pattern: Regex,
    kind: DiagnosticKind,
}

/// Ordered pattern tables for one toolchain
pub struct RuleSet {
    build_rules: Vec<Rule>,
    run_rules: Vec<Rule>,
}

impl RuleSet {
    /// Compile the rule tables. Patterns are static adapter tables; an
    /// invalid one is a programming error caught by the adapter tests.
    pub fn new(
        build_table: &[(&str, DiagnosticKind)],
        run_table: &[(&str, DiagnosticKind)],
    ) -> Self {
        let compile = |table: &[(&str, DiagnosticKind)]| {
            table
                .iter()
                .map(|(pattern, kind)| Rule {
                    pattern: Regex::new(pattern).expect("static classification pattern"),
                    kind: *kind,
                })
                .collect()
        };
        Self {
            build_rules: compile(build_table),
            run_rules: compile(run_table),
        }
    }

    fn rules_for(&self, phase: DiagnosticPhase) -> &[Rule] {
        match phase {
            DiagnosticPhase::Build => &self.build_rules,
            DiagnosticPhase::Run => &self.run_rules,
        }
    }

    fn match_line(&self, phase: DiagnosticPhase, line: &str) -> Option<DiagnosticKind> {
        self.rules_for(phase)
            .iter()
            .find(|rule| rule.pattern.is_match(line))
            .map(|rule| rule.kind)
    }

    /// Classify failure output from the given phase.
    ///
    /// Always yields at least one non-warning diagnostic.
    pub fn classify(&self, phase: DiagnosticPhase, output: &str) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        for line in output.lines() {
            let line = line.trim_end();
            if line.trim().is_empty() || diagnostics.len() >= MAX_DIAGNOSTICS {
                continue;
            }
            if let Some(kind) = self.match_line(phase, line) {
                diagnostics.push(Diagnostic::new(kind, line));
            }
        }

        let has_error = diagnostics
            .iter()
            .any(|d| d.kind != DiagnosticKind::Warning);
        if !has_error {
            let message = if output.trim().is_empty() {
                "process failed without diagnostic output".to_string()
            } else {
                truncate(output.trim(), MAX_FALLBACK_LEN)
            };
            diagnostics.push(Diagnostic::new(phase.fallback_kind(), message));
        }
        diagnostics
    }

    /// Extract only warning-rule matches, for output of a successful step
    pub fn matched_warnings(&self, phase: DiagnosticPhase, output: &str) -> Vec<Diagnostic> {
        output
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.trim().is_empty())
            .filter(|line| self.match_line(phase, line) == Some(DiagnosticKind::Warning))
            .take(MAX_DIAGNOSTICS)
            .map(|line| Diagnostic::new(DiagnosticKind::Warning, line))
            .collect()
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_rules() -> RuleSet {
        RuleSet::new(
            &[
                (r"^error\[E0308\]", DiagnosticKind::Type),
                (r"^error", DiagnosticKind::Compile),
                (r"^warning", DiagnosticKind::Warning),
            ],
            &[(r"panicked at", DiagnosticKind::Runtime)],
        )
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let rules = sample_rules();
        let diags = rules.classify(DiagnosticPhase::Build, "error[E0308]: mismatched types");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::Type);
    }

    #[test]
    fn test_unmatched_build_output_falls_back_to_compile() {
        let rules = sample_rules();
        let diags = rules.classify(DiagnosticPhase::Build, "ld: cannot find -lm");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::Compile);
        assert!(diags[0].message.contains("cannot find"));
    }

    #[test]
    fn test_unmatched_run_output_falls_back_to_runtime() {
        let rules = sample_rules();
        let diags = rules.classify(DiagnosticPhase::Run, "Segmentation fault (core dumped)");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::Runtime);
    }

    #[test]
    fn test_empty_failure_output_is_not_dropped() {
        let rules = sample_rules();
        let diags = rules.classify(DiagnosticPhase::Build, "   \n");
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("without diagnostic output"));
    }

    #[test]
    fn test_warnings_alone_still_get_fallback() {
        // A failed step whose only matched lines are warnings still needs a
        // real error diagnostic.
        let rules = sample_rules();
        let diags = rules.classify(DiagnosticPhase::Build, "warning: unused variable `x`");
        assert!(diags.iter().any(|d| d.kind == DiagnosticKind::Warning));
        assert!(diags.iter().any(|d| d.kind == DiagnosticKind::Compile));
    }

    #[test]
    fn test_matched_warnings_only() {
        let rules = sample_rules();
        let warnings = rules.matched_warnings(
            DiagnosticPhase::Build,
            "warning: unused import\nnote: consider removing it",
        );
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, DiagnosticKind::Warning);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let text = "é".repeat(400);
        let out = truncate(&text, 501);
        assert!(out.ends_with("..."));
        assert!(out.len() <= 504);
    }
}
