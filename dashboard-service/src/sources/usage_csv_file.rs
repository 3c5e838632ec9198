use std::{fs::File, path::PathBuf};

use csv::StringRecord;
use energy_client::domain::{parse_timestamp, UsageReading};

use crate::pipeline::{Envelope, EnvelopeStream, PipelineError, Source};

/// Delimited-file source for `UsageReading`.
///
/// Expected header columns (by name):
/// - datetime (ISO-8601, naive or zone-aware)
/// - usage_kwh
/// - the household segment column (`household_type` unless configured)
///
/// Any other columns are ignored. The delimiter defaults to `,`; pipe-delimited
/// `.dat` exports use `|`.
pub struct UsageCsvFileSource {
    path: PathBuf,
    segment_column: String,
    delimiter: u8,
}

impl UsageCsvFileSource {
    pub fn new<P: Into<PathBuf>>(path: P, segment_column: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            segment_column: segment_column.into(),
            delimiter: b',',
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

struct ColumnIndex {
    datetime: usize,
    usage_kwh: usize,
    segment: usize,
}

impl ColumnIndex {
    fn resolve(headers: &StringRecord, segment_column: &str) -> Result<Self, PipelineError> {
        let find = |name: &str| -> Result<usize, PipelineError> {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| PipelineError::Source(format!("missing column '{name}' in usage header")))
        };

        Ok(Self {
            datetime: find("datetime")?,
            usage_kwh: find("usage_kwh")?,
            segment: find(segment_column)?,
        })
    }
}

fn field(record: &StringRecord, idx: usize) -> Result<&str, PipelineError> {
    record
        .get(idx)
        .map(str::trim)
        .ok_or_else(|| PipelineError::Source(format!("short usage record: {} fields", record.len())))
}

fn record_to_usage_reading(record: &StringRecord, columns: &ColumnIndex) -> Result<UsageReading, PipelineError> {
    let ts_str = field(record, columns.datetime)?;
    let timestamp = parse_timestamp(ts_str).map_err(|e| PipelineError::Source(e.to_string()))?;

    let kwh_str = field(record, columns.usage_kwh)?;
    let usage_kwh: f64 = kwh_str
        .parse()
        .map_err(|e| PipelineError::Source(format!("invalid usage_kwh '{kwh_str}': {e}")))?;

    let segment = field(record, columns.segment)?;
    if segment.is_empty() {
        return Err(PipelineError::Source("empty household segment".to_string()));
    }

    Ok(UsageReading::new(timestamp, segment, usage_kwh))
}

#[async_trait::async_trait]
impl Source<UsageReading> for UsageCsvFileSource {
    async fn stream(&self) -> EnvelopeStream<UsageReading> {
        // Blocking CSV reader inside a single async task; the snapshots are small.
        let path = self.path.clone();
        let segment_column = self.segment_column.clone();
        let delimiter = self.delimiter;
        let s = async_stream::try_stream! {
            let file = File::open(&path)
                .map_err(|e| PipelineError::Source(format!("failed to open usage file {}: {e}", path.display())))?;
            let mut rdr = csv::ReaderBuilder::new()
                .delimiter(delimiter)
                .from_reader(file);
            let headers = rdr
                .headers()
                .map_err(|e| PipelineError::Source(format!("failed to read usage headers: {e}")))?
                .clone();
            let columns = ColumnIndex::resolve(&headers, &segment_column)?;

            for (line, result) in rdr.records().enumerate() {
                let record = result.map_err(|e| PipelineError::Source(format!(
                    "failed to read usage record: {e}"
                )))?;

                let reading = match record_to_usage_reading(&record, &columns) {
                    Ok(r) => r,
                    Err(e) => {
                        metrics::counter!("usage_csv_parse_errors_total").increment(1);
                        Err(PipelineError::Source(format!("usage record {}: {e}", line + 1)))?
                    }
                };

                yield Envelope::new(reading);
            }
        };

        Box::pin(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;
    use std::io::Write;
    use time::macros::datetime;

    fn write_file(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    async fn collect(source: UsageCsvFileSource) -> Result<Vec<UsageReading>, PipelineError> {
        let rows: Vec<Envelope<UsageReading>> = source.stream().await.try_collect().await?;
        Ok(rows.into_iter().map(|e| e.payload).collect())
    }

    #[tokio::test]
    async fn reads_rows_by_header_name() {
        let f = write_file(
            "household_id,household_type,datetime,usage_kwh\n\
             h1,flat,2024-01-01 14:05:00,1.5\n\
             h2,detached,2024-01-01T14:30:00,0.75\n",
        );
        let rows = collect(UsageCsvFileSource::new(f.path(), "household_type")).await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], UsageReading::new(datetime!(2024-01-01 14:05), "flat", 1.5));
        assert_eq!(rows[1].household_segment, "detached");
        assert_eq!(rows[1].usage_kwh, 0.75);
    }

    #[tokio::test]
    async fn pipe_delimited_files_are_supported() {
        let f = write_file("datetime|usage_kwh|segment\n2024-01-01T00:30:00Z|0.2|terrace\n");
        let rows = collect(UsageCsvFileSource::new(f.path(), "segment").with_delimiter(b'|'))
            .await
            .unwrap();
        assert_eq!(rows, vec![UsageReading::new(datetime!(2024-01-01 0:30), "terrace", 0.2)]);
    }

    #[tokio::test]
    async fn malformed_timestamp_fails_the_load() {
        let f = write_file("datetime,usage_kwh,household_type\nnot-a-time,1.0,flat\n");
        let err = collect(UsageCsvFileSource::new(f.path(), "household_type")).await.unwrap_err();
        assert!(matches!(err, PipelineError::Source(msg) if msg.contains("usage record 1")));
    }

    #[tokio::test]
    async fn missing_segment_column_is_reported() {
        let f = write_file("datetime,usage_kwh\n2024-01-01T00:30:00,1.0\n");
        let err = collect(UsageCsvFileSource::new(f.path(), "household_type")).await.unwrap_err();
        assert!(matches!(err, PipelineError::Source(msg) if msg.contains("household_type")));
    }
}
