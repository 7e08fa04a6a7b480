//! JSONL dataset loading
//!
//! One problem per line. Invalid lines are skipped with a warning rather
//! than aborting the run.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::dataset::Problem;
use crate::error::{EvalError, EvalResult};

/// A loaded, read-only set of problems
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    problems: Vec<Problem>,
}

/// Summary of a loaded dataset
#[derive(Debug, Clone, serde::Serialize)]
pub struct DatasetStats {
    pub total_samples: usize,
    pub difficulty_range: Option<(u32, u32)>,
    pub unique_tags: usize,
    /// Most common tags, descending
    pub top_tags: Vec<(String, usize)>,
}

impl Dataset {
    /// Load problems from a JSONL file.
    ///
    /// `difficulty_cutoff` drops problems above the cutoff (and problems
    /// with no difficulty at all when a cutoff is set); `max_samples` caps
    /// how many problems are kept, in file order.
    pub fn load(
        path: impl AsRef<Path>,
        difficulty_cutoff: Option<u32>,
        max_samples: usize,
    ) -> EvalResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| EvalError::Dataset {
            path: PathBuf::from(path),
            source,
        })?;

        let mut problems = Vec::new();
        for (line_no, line) in content.lines().enumerate() {
            if problems.len() >= max_samples {
                break;
            }
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let problem: Problem = match serde_json::from_str(line) {
                Ok(problem) => problem,
                Err(e) => {
                    tracing::warn!(line = line_no + 1, error = %e, "skipping invalid dataset line");
                    continue;
                }
            };

            if let Some(cutoff) = difficulty_cutoff {
                match problem.difficulty {
                    Some(d) if d <= cutoff => {}
                    _ => continue,
                }
            }

            problems.push(problem);
        }

        tracing::info!(count = problems.len(), path = %path.display(), "loaded dataset");
        Ok(Self { problems })
    }

    /// Build a dataset from already-validated problems
    pub fn from_problems(problems: Vec<Problem>) -> Self {
        Self { problems }
    }

    pub fn len(&self) -> usize {
        self.problems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Problem> {
        self.problems.iter()
    }

    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }

    /// Keep only problems carrying at least one of the given tags
    pub fn filter_by_tags(&self, tags: &[String]) -> Self {
        if tags.is_empty() {
            return self.clone();
        }
        Self {
            problems: self
                .problems
                .iter()
                .filter(|p| p.tags.iter().any(|t| tags.contains(t)))
                .cloned()
                .collect(),
        }
    }

    /// Summarize the loaded problems
    pub fn stats(&self) -> DatasetStats {
        let difficulties: Vec<u32> = self.problems.iter().filter_map(|p| p.difficulty).collect();
        let difficulty_range = difficulties
            .iter()
            .min()
            .zip(difficulties.iter().max())
            .map(|(lo, hi)| (*lo, *hi));

        let mut tag_counts: HashMap<&str, usize> = HashMap::new();
        for problem in &self.problems {
            for tag in &problem.tags {
                *tag_counts.entry(tag.as_str()).or_default() += 1;
            }
        }
        let unique_tags = tag_counts.len();
        let mut top_tags: Vec<(String, usize)> = tag_counts
            .into_iter()
            .map(|(tag, count)| (tag.to_string(), count))
            .collect();
        top_tags.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        top_tags.truncate(5);

        DatasetStats {
            total_samples: self.problems.len(),
            difficulty_range,
            unique_tags,
            top_tags,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_jsonl(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file
    }

    #[test]
    fn test_load_skips_invalid_lines() {
        let file = write_jsonl(&[
            r#"{"src_uid": "a", "difficulty": 800, "sample_inputs": ["1"], "sample_outputs": ["1"]}"#,
            "not json at all",
            r#"{"src_uid": "b", "difficulty": 1200}"#,
        ]);

        let dataset = Dataset::load(file.path(), None, 100).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.problems()[0].src_uid, "a");
    }

    #[test]
    fn test_load_applies_difficulty_cutoff() {
        let file = write_jsonl(&[
            r#"{"src_uid": "easy", "difficulty": 800}"#,
            r#"{"src_uid": "hard", "difficulty": 2600}"#,
            r#"{"src_uid": "unrated"}"#,
        ]);

        let dataset = Dataset::load(file.path(), Some(1000), 100).unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.problems()[0].src_uid, "easy");
    }

    #[test]
    fn test_load_caps_samples() {
        let file = write_jsonl(&[
            r#"{"src_uid": "a"}"#,
            r#"{"src_uid": "b"}"#,
            r#"{"src_uid": "c"}"#,
        ]);

        let dataset = Dataset::load(file.path(), None, 2).unwrap();
        assert_eq!(dataset.len(), 2);
    }

    #[test]
    fn test_load_missing_file_is_an_error() {
        let result = Dataset::load("/nonexistent/problems.jsonl", None, 10);
        assert!(matches!(result, Err(EvalError::Dataset { .. })));
    }

    #[test]
    fn test_filter_by_tags() {
        let file = write_jsonl(&[
            r#"{"src_uid": "a", "tags": ["math"]}"#,
            r#"{"src_uid": "b", "tags": ["graphs"]}"#,
        ]);
        let dataset = Dataset::load(file.path(), None, 10).unwrap();
        let filtered = dataset.filter_by_tags(&["math".to_string()]);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered.problems()[0].src_uid, "a");
    }

    #[test]
    fn test_stats() {
        let file = write_jsonl(&[
            r#"{"src_uid": "a", "difficulty": 800, "tags": ["math", "dp"]}"#,
            r#"{"src_uid": "b", "difficulty": 1500, "tags": ["math"]}"#,
        ]);
        let dataset = Dataset::load(file.path(), None, 10).unwrap();
        let stats = dataset.stats();
        assert_eq!(stats.total_samples, 2);
        assert_eq!(stats.difficulty_range, Some((800, 1500)));
        assert_eq!(stats.unique_tags, 2);
        assert_eq!(stats.top_tags[0], ("math".to_string(), 2));
    }
}
