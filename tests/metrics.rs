//! Tests for run counters.

#[cfg(feature = "metrics")]
mod metrics_tests {
    use serde_json::json;
    use tally::{Reject, RunMetrics};

    fn sample_metrics() -> RunMetrics {
        let mut metrics = RunMetrics::new();
        for _ in 0..5 {
            metrics.record_line();
        }
        metrics.record_accept();
        metrics.record_accept();
        metrics.record_reject(&Reject::HeaderOrBlank);
        metrics.record_reject(&Reject::HeaderOrBlank);
        metrics.record_reject(&Reject::ArityMismatch {
            expected: 6,
            found: 4,
        });
        metrics
    }

    #[test]
    fn test_counters() {
        let metrics = sample_metrics();
        assert_eq!(metrics.lines, 5);
        assert_eq!(metrics.records, 2);
        assert_eq!(metrics.rejected(), 3);
        assert_eq!(metrics.reject_count("header-or-blank"), 2);
        assert_eq!(metrics.reject_count("arity-mismatch"), 1);
        // Labels that never fired read as zero.
        assert_eq!(metrics.reject_count("malformed-quoting"), 0);
        assert_eq!(metrics.reject_count("no-such-label"), 0);
    }

    #[test]
    fn test_default_is_zeroed() {
        let metrics = RunMetrics::default();
        assert_eq!(metrics.lines, 0);
        assert_eq!(metrics.records, 0);
        assert_eq!(metrics.rejected(), 0);
        assert!(metrics.rejects.is_empty());
    }

    #[test]
    fn test_merge_sums_counters() {
        let mut left = sample_metrics();
        let mut right = RunMetrics::new();
        right.record_line();
        right.record_reject(&Reject::MalformedQuoting);
        right.record_reject(&Reject::HeaderOrBlank);

        left.merge(right);
        assert_eq!(left.lines, 6);
        assert_eq!(left.records, 2);
        assert_eq!(left.rejected(), 5);
        assert_eq!(left.reject_count("header-or-blank"), 3);
        assert_eq!(left.reject_count("malformed-quoting"), 1);
    }

    #[test]
    fn test_to_json() {
        let value = sample_metrics().to_json();
        assert_eq!(value["lines"], json!(5));
        assert_eq!(value["records"], json!(2));
        assert_eq!(value["rejected"], json!(3));
        assert_eq!(value["rejects"]["header-or-blank"], json!(2));
        assert_eq!(value["rejects"]["arity-mismatch"], json!(1));
    }

    #[test]
    fn test_save_to_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("metrics.json");
        sample_metrics().save_to_file(&path)?;

        let text = std::fs::read_to_string(&path)?;
        let value: serde_json::Value = serde_json::from_str(&text)?;
        assert_eq!(value["lines"], json!(5));
        assert_eq!(value["rejects"]["header-or-blank"], json!(2));
        Ok(())
    }

    #[test]
    fn test_print_smoke() {
        // Output goes to stdout; this only checks it does not panic.
        sample_metrics().print();
        RunMetrics::default().print();
    }
}
