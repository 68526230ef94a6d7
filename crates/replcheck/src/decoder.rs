//! Replica status result set decoding.

use mysql_wire::ResultSet;
use tracing::debug;

use crate::error::CheckError;
use crate::types::{ReplicationChannel, StatusColumns};

/// Channel name used when the server exposes no channel column
pub const UNNAMED_CHANNEL: &str = "-";

/// Thread state value meaning "running"
const RUNNING: &str = "Yes";

/// Positions of the status columns within one result set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnMap {
    io_running: usize,
    sql_running: usize,
    seconds_behind: usize,
    channel_name: Option<usize>,
}

impl ColumnMap {
    /// Resolve all names up front so a missing column fails before any row
    fn resolve(result: &ResultSet, names: &StatusColumns) -> Result<Self, CheckError> {
        let indexes = result.column_indexes();
        let lookup = |name: &str| indexes.get(name).copied();

        match (
            lookup(names.io_running),
            lookup(names.sql_running),
            lookup(names.seconds_behind),
        ) {
            (Some(io_running), Some(sql_running), Some(seconds_behind)) => Ok(Self {
                io_running,
                sql_running,
                seconds_behind,
                channel_name: lookup(names.channel_name),
            }),
            _ => Err(CheckError::Schema {
                io_running: names.io_running,
                sql_running: names.sql_running,
                seconds_behind: names.seconds_behind,
            }),
        }
    }
}

/// Decode a replica status result set into channels, in row order.
///
/// Zero rows decode to an empty list; deciding what that means is left to
/// the aggregator.
pub fn decode(
    result: &ResultSet,
    names: &StatusColumns,
) -> Result<Vec<ReplicationChannel>, CheckError> {
    let map = ColumnMap::resolve(result, names)?;
    debug!(?map, rows = result.rows.len(), "Decoding replica status");

    result
        .rows
        .iter()
        .map(|row| {
            let cell = |index: usize| row.get(index).and_then(|value| value.as_deref());

            let io_running = cell(map.io_running) == Some(RUNNING);
            let sql_running = cell(map.sql_running) == Some(RUNNING);
            let channel_name = map
                .channel_name
                .and_then(cell)
                .unwrap_or(UNNAMED_CHANNEL)
                .to_string();
            let seconds_behind = parse_lag(
                cell(map.seconds_behind),
                io_running && sql_running,
                names.seconds_behind,
            )?;

            Ok(ReplicationChannel {
                channel_name,
                io_running,
                sql_running,
                seconds_behind,
            })
        })
        .collect()
}

/// The server reports NULL lag whenever a thread is stopped; that row is
/// critical regardless, so NULL reads as 0 there and the summary shows
/// `behind:0` for it. NULL on a running channel is unexpected output.
fn parse_lag(raw: Option<&str>, running: bool, column: &'static str) -> Result<i64, CheckError> {
    match raw {
        Some(text) => text.parse::<i64>().map_err(|e| CheckError::Parse {
            column,
            value: format!("{:?}", text),
            reason: e.to_string(),
        }),
        None if !running => Ok(0),
        None => Err(CheckError::Parse {
            column,
            value: "NULL".to_string(),
            reason: "lag is NULL while both threads are running".to_string(),
        }),
    }
}
