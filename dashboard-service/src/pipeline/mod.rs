use std::{pin::Pin, sync::Arc};

use futures::{Stream, StreamExt};

#[derive(Debug, Clone)]
pub struct Envelope<T> {
    pub payload: T,
}

impl<T> Envelope<T> {
    pub fn new(payload: T) -> Self {
        Self { payload }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("source error: {0}")]
    Source(String),
    #[error("transform error: {0}")]
    Transform(String),
}

pub type EnvelopeStream<T> = Pin<Box<dyn Stream<Item = Result<Envelope<T>, PipelineError>> + Send>>;

#[async_trait::async_trait]
pub trait Source<T>: Send + Sync {
    async fn stream(&self) -> EnvelopeStream<T>;
}

#[async_trait::async_trait]
pub trait Transform<I, O>: Send + Sync {
    async fn apply(&self, input: Envelope<I>) -> Result<Envelope<O>, PipelineError>;
}

#[async_trait::async_trait]
pub trait Sink<T>: Send + Sync {
    async fn run<S>(&self, input: S) -> Result<(), PipelineError>
    where
        S: Stream<Item = Result<Envelope<T>, PipelineError>> + Send + Unpin + 'static;
}

pub struct Pipeline<S, T, K> {
    pub source: S,
    pub transforms: Vec<Arc<dyn Transform<T, T> + Send + Sync>>, // same-type transforms chain
    pub sink: K,
}

impl<T, S, K> Pipeline<S, T, K>
where
    T: Send + 'static,
    S: Source<T> + Send + Sync + 'static,
    K: Sink<T> + Send + Sync + 'static,
{
    /// Drive the source through every transform into the sink, handing the
    /// sink back so callers can take what it collected.
    pub async fn run(self) -> Result<K, PipelineError> {
        let mut stream = self.source.stream().await;

        for t in self.transforms {
            stream = Box::pin(stream.then(move |item| {
                let t_inner = t.clone();
                async move {
                    match item {
                        Ok(env) => t_inner.apply(env).await,
                        Err(e) => Err(e),
                    }
                }
            }));
        }

        self.sink.run(stream).await?;
        Ok(self.sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::CollectSink;

    struct VecSource(Vec<i64>);

    #[async_trait::async_trait]
    impl Source<i64> for VecSource {
        async fn stream(&self) -> EnvelopeStream<i64> {
            let items: Vec<Result<Envelope<i64>, PipelineError>> =
                self.0.iter().copied().map(|v| Ok(Envelope::new(v))).collect();
            Box::pin(futures::stream::iter(items))
        }
    }

    struct Double;

    #[async_trait::async_trait]
    impl Transform<i64, i64> for Double {
        async fn apply(&self, input: Envelope<i64>) -> Result<Envelope<i64>, PipelineError> {
            Ok(Envelope::new(input.payload * 2))
        }
    }

    struct RejectNegative;

    #[async_trait::async_trait]
    impl Transform<i64, i64> for RejectNegative {
        async fn apply(&self, input: Envelope<i64>) -> Result<Envelope<i64>, PipelineError> {
            if input.payload < 0 {
                return Err(PipelineError::Transform("negative".to_string()));
            }
            Ok(input)
        }
    }

    #[tokio::test]
    async fn transforms_apply_in_order() {
        let pipeline: Pipeline<_, i64, _> = Pipeline {
            source: VecSource(vec![1, 2, 3]),
            transforms: vec![Arc::new(Double), Arc::new(Double)],
            sink: CollectSink::new(),
        };
        let sink = pipeline.run().await.unwrap();
        assert_eq!(sink.into_payloads(), vec![4, 8, 12]);
    }

    #[tokio::test]
    async fn first_error_fails_the_run() {
        let pipeline: Pipeline<_, i64, _> = Pipeline {
            source: VecSource(vec![1, -2, 3]),
            transforms: vec![Arc::new(RejectNegative)],
            sink: CollectSink::new(),
        };
        let err = pipeline.run().await.err().unwrap();
        assert!(matches!(err, PipelineError::Transform(_)));
    }
}
