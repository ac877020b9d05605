//! Per-type metric aggregation.

use std::collections::BTreeMap;

use agentops_core::MetricSample;

use crate::stats::Summary;

/// Summary of all samples sharing one metric type.
pub type MetricSummary = Summary;

/// Group samples by metric type, preserving sample order within each group.
pub fn group_by_type(samples: &[MetricSample]) -> BTreeMap<&str, Vec<&MetricSample>> {
    let mut groups: BTreeMap<&str, Vec<&MetricSample>> = BTreeMap::new();
    for sample in samples {
        groups.entry(sample.metric_type.as_str()).or_default().push(sample);
    }
    groups
}

/// Summarize samples per metric type. No samples gives an empty map.
pub fn aggregate(samples: &[MetricSample]) -> BTreeMap<String, MetricSummary> {
    group_by_type(samples)
        .into_iter()
        .map(|(metric_type, group)| {
            let values: Vec<f64> = group.iter().map(|s| s.value).collect();
            (metric_type.to_string(), Summary::of(&values))
        })
        .collect()
}

/// Values of every sample of `metric_type`, in sample order.
pub fn values_of(samples: &[MetricSample], metric_type: &str) -> Vec<f64> {
    samples
        .iter()
        .filter(|s| s.metric_type == metric_type)
        .map(|s| s.value)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentops_core::{AgentId, RESPONSE_TIME};

    fn sample(metric_type: &str, value: f64) -> MetricSample {
        MetricSample::new(AgentId::new(), "t", metric_type, value, "ms")
    }

    #[test]
    fn test_aggregate_empty() {
        assert!(aggregate(&[]).is_empty());
    }

    #[test]
    fn test_aggregate_groups_by_type() {
        let samples = vec![
            sample(RESPONSE_TIME, 100.0),
            sample("tokens", 10.0),
            sample(RESPONSE_TIME, 200.0),
            sample(RESPONSE_TIME, 300.0),
        ];
        let summaries = aggregate(&samples);

        assert_eq!(summaries.len(), 2);
        let rt = &summaries[RESPONSE_TIME];
        assert_eq!(rt.count, 3);
        assert_eq!(rt.average, 200.0);
        assert_eq!(rt.median, 200.0);
        assert!((rt.std_dev - 81.65).abs() < 0.01);
        assert_eq!(summaries["tokens"].count, 1);
    }

    #[test]
    fn test_average_within_bounds() {
        let samples: Vec<_> = [3.5, 19.0, 7.25, 0.5, 12.0]
            .iter()
            .map(|v| sample("latency", *v))
            .collect();
        let s = &aggregate(&samples)["latency"];
        assert!(s.min <= s.average && s.average <= s.max);
    }

    #[test]
    fn test_values_of_keeps_order() {
        let samples = vec![sample("a", 3.0), sample("b", 1.0), sample("a", 2.0)];
        assert_eq!(values_of(&samples, "a"), vec![3.0, 2.0]);
    }
}
