//! Asynchronous provider-events reader
//!
//! Streams provider webhook deliveries from a CSV file in batches for
//! concurrent ingestion. Built on `csv-async`; CSV format concerns live in
//! the `csv_format` module.
//!
//! Invalid rows are logged and skipped: a malformed delivery in a replay
//! file must not stall the rest of the batch, mirroring how a webhook
//! endpoint rejects one delivery without refusing the next.

use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::stream::StreamExt;
use tracing::warn;

use crate::core::reconciler::ProviderEvent;
use crate::io::csv_format::EventRecord;

/// Batch reader over a provider-events CSV stream
pub struct EventReader<R: AsyncRead + Unpin> {
    csv_reader: csv_async::AsyncDeserializer<R>,
}

impl<R: AsyncRead + Unpin + Send + 'static> EventReader<R> {
    /// Wrap an async reader providing events CSV data
    pub fn new(reader: R) -> Self {
        let csv_reader = AsyncReaderBuilder::new()
            .flexible(true)
            .trim(csv_async::Trim::All)
            .create_deserializer(reader);

        Self { csv_reader }
    }

    /// Read up to `batch_size` provider events
    ///
    /// Returns an empty vector at end of input. Rows that fail to parse are
    /// logged at `warn` and skipped.
    pub async fn read_batch(&mut self, batch_size: usize) -> Vec<ProviderEvent> {
        let mut batch = Vec::with_capacity(batch_size);
        let mut records = self.csv_reader.deserialize::<EventRecord>();

        while batch.len() < batch_size {
            match records.next().await {
                Some(Ok(record)) => batch.push(ProviderEvent::from(record)),
                Some(Err(e)) => warn!(error = %e, "skipping malformed event row"),
                None => break,
            }
        }

        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "account,amount_minor,currency,provider,reference\n";

    fn reader_over(content: String) -> EventReader<futures::io::Cursor<Vec<u8>>> {
        EventReader::new(futures::io::Cursor::new(content.into_bytes()))
    }

    #[tokio::test]
    async fn test_reads_events_in_batches() {
        let mut content = HEADER.to_string();
        for i in 0..5 {
            content.push_str(&format!("1,1000,eur,stripe,pi_{}\n", i));
        }
        let mut reader = reader_over(content);

        let first = reader.read_batch(3).await;
        assert_eq!(first.len(), 3);
        assert_eq!(first[0].reference, "pi_0");

        let second = reader.read_batch(3).await;
        assert_eq!(second.len(), 2);

        let done = reader.read_batch(3).await;
        assert!(done.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_rows_are_skipped() {
        let content = format!(
            "{}1,1000,eur,stripe,pi_0\n\
             not-a-number,1000,eur,stripe,pi_1\n\
             2,2000,eur,stripe,pi_2\n",
            HEADER
        );
        let mut reader = reader_over(content);

        let batch = reader.read_batch(10).await;
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].reference, "pi_0");
        assert_eq!(batch[1].reference, "pi_2");
    }
}
