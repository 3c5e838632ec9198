use futures::StreamExt;
use tokio::sync::Mutex;

use crate::pipeline::{Envelope, PipelineError, Sink};

/// In-memory sink that gathers a whole input snapshot.
///
/// Unlike a streaming sink it does not skip bad records: the first upstream
/// error aborts the run, since a partially loaded snapshot would misprice.
pub struct CollectSink<T> {
    rows: Mutex<Vec<Envelope<T>>>,
}

impl<T> CollectSink<T> {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
        }
    }

    pub fn into_payloads(self) -> Vec<T> {
        self.rows.into_inner().into_iter().map(|env| env.payload).collect()
    }
}

impl<T> Default for CollectSink<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl<T: Send + 'static> Sink<T> for CollectSink<T> {
    async fn run<S>(&self, mut input: S) -> Result<(), PipelineError>
    where
        S: futures::Stream<Item = Result<Envelope<T>, PipelineError>> + Send + Unpin + 'static,
    {
        let mut rows = self.rows.lock().await;
        while let Some(item) = input.next().await {
            match item {
                Ok(env) => rows.push(env),
                Err(e) => {
                    tracing::error!(error = %e, "input snapshot rejected");
                    return Err(e);
                }
            }
        }
        metrics::counter!("snapshot_records_loaded_total").increment(rows.len() as u64);
        Ok(())
    }
}
