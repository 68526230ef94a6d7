//! Folding channel verdicts into one check result.

use crate::classifier::classify;
use crate::error::CheckError;
use crate::types::{ChannelVerdict, CheckResult, ReplicationChannel, Severity, ThresholdConfig};

/// Placeholder for a section with no channels
const EMPTY_SECTION: &str = "-";

/// Reduce verdicts to a single result.
///
/// The summary always carries all three sections in fixed order:
/// `[Crit] ... [Warn] ... [ OK ] ...`, each listing its fragments in decode
/// order or `-` when empty.
pub fn aggregate(verdicts: &[ChannelVerdict]) -> Result<CheckResult, CheckError> {
    if verdicts.is_empty() {
        return Err(CheckError::NoChannels);
    }

    let section = |severity: Severity| -> String {
        let fragments: Vec<&str> = verdicts
            .iter()
            .filter(|v| v.severity == severity)
            .map(|v| v.message.as_str())
            .collect();
        if fragments.is_empty() {
            EMPTY_SECTION.to_string()
        } else {
            fragments.join(" ")
        }
    };

    let summary = format!(
        "[Crit] {} [Warn] {} [ OK ] {}",
        section(Severity::Critical),
        section(Severity::Warning),
        section(Severity::Ok)
    );

    let overall = verdicts
        .iter()
        .map(|v| v.severity)
        .max()
        .unwrap_or(Severity::Ok);

    Ok(CheckResult::new(overall, summary))
}

/// Classify every channel and aggregate the verdicts
pub fn evaluate(
    channels: Vec<ReplicationChannel>,
    config: &ThresholdConfig,
) -> Result<CheckResult, CheckError> {
    let verdicts: Vec<ChannelVerdict> = channels
        .into_iter()
        .map(|channel| classify(channel, config))
        .collect();
    aggregate(&verdicts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict(name: &str, severity: Severity) -> ChannelVerdict {
        ChannelVerdict {
            channel: ReplicationChannel::new(name, true, true, 0),
            severity,
            message: name.to_string(),
        }
    }

    #[test]
    fn test_dominance() {
        let cases = [
            (vec![Severity::Ok, Severity::Warning, Severity::Ok], Severity::Warning),
            (
                vec![Severity::Ok, Severity::Warning, Severity::Critical],
                Severity::Critical,
            ),
            (vec![Severity::Ok, Severity::Ok], Severity::Ok),
        ];
        for (severities, expected) in cases {
            let verdicts: Vec<_> = severities
                .into_iter()
                .enumerate()
                .map(|(i, s)| verdict(&format!("c{i}"), s))
                .collect();
            assert_eq!(aggregate(&verdicts).unwrap().overall, expected);
        }
    }

    #[test]
    fn test_empty_is_no_channels() {
        assert!(matches!(aggregate(&[]), Err(CheckError::NoChannels)));
        assert!(matches!(
            evaluate(Vec::new(), &ThresholdConfig::new(1, 2)),
            Err(CheckError::NoChannels)
        ));
    }

    #[test]
    fn test_sections_keep_decode_order() {
        let verdicts = vec![
            verdict("w1", Severity::Warning),
            verdict("o1", Severity::Ok),
            verdict("c1", Severity::Critical),
            verdict("w2", Severity::Warning),
            verdict("c2", Severity::Critical),
        ];
        let result = aggregate(&verdicts).unwrap();
        assert_eq!(result.summary, "[Crit] c1 c2 [Warn] w1 w2 [ OK ] o1");
    }

    #[test]
    fn test_summary_for_ok_and_stopped_channel() {
        let channels = vec![
            ReplicationChannel::new("a", true, true, 0),
            ReplicationChannel::new("b", false, true, 0),
        ];
        let result = evaluate(channels, &ThresholdConfig::default()).unwrap();
        assert_eq!(result.overall, Severity::Critical);
        assert_eq!(
            result.summary,
            "[Crit] b=io:No,sql:Yes,behind:0 [Warn] - [ OK ] a=io:Yes,sql:Yes,behind:0"
        );
    }

    #[test]
    fn test_duplicate_sentinel_names() {
        let channels = vec![
            ReplicationChannel::new("-", true, true, 1),
            ReplicationChannel::new("-", true, true, 50),
        ];
        let result = evaluate(channels, &ThresholdConfig::new(30, 0)).unwrap();
        assert_eq!(result.overall, Severity::Warning);
        assert_eq!(
            result.summary,
            "[Crit] - [Warn] -=io:Yes,sql:Yes,behind:50 [ OK ] -=io:Yes,sql:Yes,behind:1"
        );
    }
}
