//! Per-channel threshold classification.

use crate::types::{ChannelVerdict, ReplicationChannel, Severity, ThresholdConfig};

/// Classify one channel. First matching rule wins:
/// a stopped thread is CRITICAL, then the critical lag threshold, then the
/// warning lag threshold. A threshold of zero never triggers.
pub fn classify(channel: ReplicationChannel, config: &ThresholdConfig) -> ChannelVerdict {
    let lag = channel.seconds_behind;
    let severity = if !channel.is_running() {
        Severity::Critical
    } else if config.crit_seconds > 0 && lag > config.crit_seconds {
        Severity::Critical
    } else if config.warn_seconds > 0 && lag > config.warn_seconds {
        Severity::Warning
    } else {
        Severity::Ok
    };

    ChannelVerdict {
        message: fragment(&channel),
        channel,
        severity,
    }
}

/// `<name>=io:<Yes|No>,sql:<Yes|No>,behind:<seconds>`
pub fn fragment(channel: &ReplicationChannel) -> String {
    format!(
        "{}=io:{},sql:{},behind:{}",
        channel.channel_name,
        yes_no(channel.io_running),
        yes_no(channel.sql_running),
        channel.seconds_behind
    )
}

fn yes_no(running: bool) -> &'static str {
    if running { "Yes" } else { "No" }
}
