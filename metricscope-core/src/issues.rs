//! Issue ordering and severity tallies.

use serde::Serialize;

use crate::domain::{Issue, Severity};

/// Number of issues per severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeverityCounts {
    /// Critical issues.
    pub critical: usize,
    /// High severity issues.
    pub high: usize,
    /// Medium severity issues.
    pub medium: usize,
    /// Low severity issues.
    pub low: usize,
    /// Informational issues.
    pub info: usize,
    /// All issues.
    pub total: usize,
}

impl SeverityCounts {
    /// Count for one severity.
    pub fn count(&self, severity: Severity) -> usize {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
            Severity::Info => self.info,
        }
    }
}

/// Issues ordered worst first; issues of equal severity keep input order.
pub fn sort_by_severity(issues: &[Issue]) -> Vec<Issue> {
    let mut sorted = issues.to_vec();
    sorted.sort_by(|a, b| b.severity.cmp(&a.severity));
    sorted
}

/// Tally issues by severity.
pub fn severity_counts(issues: &[Issue]) -> SeverityCounts {
    let mut counts = SeverityCounts::default();
    for issue in issues {
        let slot = match issue.severity {
            Severity::Critical => &mut counts.critical,
            Severity::High => &mut counts.high,
            Severity::Medium => &mut counts.medium,
            Severity::Low => &mut counts.low,
            Severity::Info => &mut counts.info,
        };
        *slot += 1;
        counts.total += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(id: &str, severity: Severity) -> Issue {
        Issue {
            id: id.to_string(),
            severity,
            message: format!("issue {id}"),
            rule: "java:S1541".to_string(),
            file: "src/Enrollment.java".to_string(),
            line: 10,
            column: None,
        }
    }

    #[test]
    fn sorts_worst_first_and_stably() {
        let issues = vec![
            issue("1", Severity::Low),
            issue("2", Severity::Critical),
            issue("3", Severity::Medium),
            issue("4", Severity::Critical),
            issue("5", Severity::Info),
        ];
        let sorted = sort_by_severity(&issues);
        let ids: Vec<_> = sorted.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "4", "3", "1", "5"]);
    }

    #[test]
    fn counts_each_severity() {
        let issues = vec![
            issue("1", Severity::High),
            issue("2", Severity::High),
            issue("3", Severity::Info),
        ];
        let counts = severity_counts(&issues);
        assert_eq!(counts.high, 2);
        assert_eq!(counts.count(Severity::Info), 1);
        assert_eq!(counts.count(Severity::Critical), 0);
        assert_eq!(counts.total, 3);
        assert_eq!(severity_counts(&[]), SeverityCounts::default());
    }
}
