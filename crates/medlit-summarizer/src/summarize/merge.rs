//! Combine per-chunk partial summaries into one summary and a confidence.

use crate::models::{Confidence, MAX_KEY_FINDINGS, PartialSummary, Summary};

/// Merge partials in chunk order.
///
/// Findings are concatenated then cut to the first six; methodology and
/// conclusion are the newline-joined non-empty values. Near-duplicates from
/// overlapping chunks are kept.
#[must_use]
pub fn merge(partials: &[PartialSummary]) -> (Summary, Confidence) {
    if partials.is_empty() {
        return (Summary::default(), Confidence::Empty);
    }

    let key_findings =
        partials.iter().flat_map(|p| p.key_findings.iter().cloned()).take(MAX_KEY_FINDINGS).collect();

    let join = |field: fn(&PartialSummary) -> &str| {
        partials.iter().map(field).filter(|s| !s.is_empty()).collect::<Vec<_>>().join("\n")
    };

    let confidence = if partials.iter().any(|p| p.used_fallback) {
        Confidence::Fallback
    } else {
        Confidence::Generative
    };

    let summary = Summary {
        key_findings,
        methodology: join(|p| p.methodology.as_str()),
        conclusion: join(|p| p.conclusion.as_str()),
    };
    (summary, confidence)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partial(findings: &[&str], methodology: &str, conclusion: &str, fallback: bool) -> PartialSummary {
        PartialSummary {
            key_findings: findings.iter().map(|s| (*s).to_string()).collect(),
            methodology: methodology.to_string(),
            conclusion: conclusion.to_string(),
            used_fallback: fallback,
        }
    }

    #[test]
    fn test_merge_empty() {
        let (summary, confidence) = merge(&[]);
        assert!(summary.is_empty());
        assert_eq!(confidence, Confidence::Empty);
        assert!(confidence.score().abs() < f64::EPSILON);
    }

    #[test]
    fn test_merge_concatenates_in_order() {
        let partials = [
            partial(&["a", "b", "c", "d"], "RCT", "", false),
            partial(&["e", "f", "g"], "", "Works", false),
            partial(&["h"], "RCT", "Works", false),
        ];
        let (summary, confidence) = merge(&partials);

        assert_eq!(summary.key_findings, vec!["a", "b", "c", "d", "e", "f"]);
        assert_eq!(summary.methodology, "RCT\nRCT");
        assert_eq!(summary.conclusion, "Works\nWorks");
        assert_eq!(confidence, Confidence::Generative);
    }

    #[test]
    fn test_single_fallback_lowers_confidence() {
        let partials = [
            partial(&["a"], "", "", false),
            partial(&["b"], "", "", true),
            partial(&["c"], "", "", false),
        ];
        let (_, confidence) = merge(&partials);
        assert_eq!(confidence, Confidence::Fallback);
        assert!((confidence.score() - 0.6).abs() < f64::EPSILON);
    }
}
