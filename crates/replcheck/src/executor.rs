//! Deadline-bound status query execution.

use async_trait::async_trait;
use mysql_wire::{Connection, ResultSet};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::decoder::decode;
use crate::error::CheckError;
use crate::types::{ReplicationChannel, StatusSyntax};

/// Something that can answer the replica status query
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatusSource: Send {
    /// Run `query` and return its full result set
    async fn fetch(&mut self, query: &str) -> Result<ResultSet, CheckError>;

    /// Release the underlying connection
    async fn close(&mut self);
}

#[async_trait]
impl<S> StatusSource for Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn fetch(&mut self, query: &str) -> Result<ResultSet, CheckError> {
        self.query(query).await.map_err(CheckError::Query)
    }

    async fn close(&mut self) {
        Connection::close(self).await
    }
}

/// Run the status query and decode it on its own task, racing `deadline`.
///
/// The task owns `source` and closes it once the query returns. If the
/// deadline wins, the task is aborted, dropping the connection; the
/// statement may keep running on the server.
pub async fn query_with_deadline(
    mut source: Box<dyn StatusSource>,
    syntax: StatusSyntax,
    deadline: Duration,
) -> Result<Vec<ReplicationChannel>, CheckError> {
    let mut task = tokio::spawn(async move {
        let fetched = source.fetch(syntax.query()).await;
        source.close().await;
        decode(&fetched?, &syntax.columns())
    });

    let outcome = tokio::select! {
        biased;

        joined = &mut task => match joined {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "Status query task failed");
                Err(CheckError::Task(e.to_string()))
            }
        },
        _ = sleep(deadline) => {
            task.abort();
            warn!(deadline_ms = deadline.as_millis(), "Status query timed out");
            Err(CheckError::Timeout)
        }
    };

    if let Ok(channels) = &outcome {
        debug!(channels = channels.len(), "Status query decoded");
    }
    outcome
}
