//! Stream driver: the read loop that feeds the metrics and emits snapshots

use anyhow::Result;
use logtally_common::{parse_line, Metrics};
use std::future::Future;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

/// Number of consumed lines between periodic snapshots.
pub const SNAPSHOT_INTERVAL: u64 = 10;

/// Owns the metrics state and the output sink for one run.
///
/// Lines are fully processed one at a time; the shutdown notification is
/// only observed between lines, so a snapshot never sees a half-applied
/// update. Every consumed line advances the snapshot cadence, whether or
/// not it parsed.
pub struct StreamDriver<W> {
    metrics: Metrics,
    lines_seen: u64,
    out: W,
}

impl<W: AsyncWrite + Unpin> StreamDriver<W> {
    pub fn new(out: W) -> Self {
        Self {
            metrics: Metrics::new(),
            lines_seen: 0,
            out,
        }
    }

    /// Run until the input is exhausted or `shutdown` resolves, then drain.
    ///
    /// Both exits emit exactly one final snapshot of the accumulated state.
    pub async fn run<R, F>(mut self, input: R, shutdown: F) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        F: Future<Output = ()>,
    {
        let mut lines = input.lines();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    info!("shutdown requested, draining");
                    break;
                }
                line = lines.next_line() => {
                    match line? {
                        Some(line) => self.consume(&line).await?,
                        None => break,
                    }
                }
            }
        }

        self.drain().await
    }

    /// Process one consumed line: parse, fold into the metrics, and emit a
    /// periodic snapshot when the cadence counter wraps.
    async fn consume(&mut self, line: &str) -> Result<()> {
        match parse_line(line) {
            Ok(record) => self.metrics.record(record),
            Err(e) => debug!("skipping malformed line: {}", e),
        }

        self.lines_seen += 1;
        if self.lines_seen % SNAPSHOT_INTERVAL == 0 {
            self.emit_snapshot().await?;
        }
        Ok(())
    }

    /// Emit one final snapshot of the accumulated state.
    async fn drain(mut self) -> Result<()> {
        self.emit_snapshot().await
    }

    async fn emit_snapshot(&mut self) -> Result<()> {
        self.out
            .write_all(self.metrics.render_snapshot().as_bytes())
            .await?;
        // Flush per snapshot so a consumer tailing the output sees it live.
        self.out.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::future::pending;
    use std::time::Duration;
    use tokio::io::BufReader;
    use tokio::sync::oneshot;

    async fn run_to_completion(input: &str) -> String {
        let mut out = Vec::new();
        StreamDriver::new(&mut out)
            .run(BufReader::new(input.as_bytes()), pending())
            .await
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    fn valid_line(status: u16, bytes: u64) -> String {
        format!(
            r#"192.168.1.1 - [2026-08-30 12:00:00] "GET /projects/260 HTTP/1.1" {} {}"#,
            status, bytes
        )
    }

    #[tokio::test]
    async fn empty_input_drains_with_zero_totals() {
        assert_eq!(run_to_completion("").await, "File size: 0\n");
    }

    #[tokio::test]
    async fn single_line_snapshot_at_drain() {
        let output = run_to_completion(&valid_line(200, 1024)).await;
        assert_eq!(output, "File size: 1024\n200: 1\n");
    }

    #[tokio::test]
    async fn twenty_five_lines_emit_three_snapshots() {
        let input: String = (0..25).map(|_| valid_line(200, 100) + "\n").collect();
        let output = run_to_completion(&input).await;

        assert_eq!(output.matches("File size:").count(), 3);
        assert_eq!(
            output,
            "File size: 1000\n200: 10\n\
             File size: 2000\n200: 20\n\
             File size: 2500\n200: 25\n"
        );
    }

    #[tokio::test]
    async fn malformed_lines_advance_the_cadence() {
        // 7 valid lines and 3 malformed ones: the tenth consumed line
        // still triggers the periodic snapshot, which then matches the
        // drain snapshot exactly.
        let mut input = String::new();
        for _ in 0..7 {
            input.push_str(&valid_line(200, 10));
            input.push('\n');
        }
        for _ in 0..3 {
            input.push_str("not a log line\n");
        }

        let output = run_to_completion(&input).await;
        assert_eq!(output, "File size: 70\n200: 7\nFile size: 70\n200: 7\n");
    }

    #[tokio::test]
    async fn unknown_status_adds_bytes_but_never_prints() {
        let input = format!("{}\n{}\n", valid_line(999, 512), valid_line(200, 100));
        let output = run_to_completion(&input).await;
        assert_eq!(output, "File size: 612\n200: 1\n");
        assert!(!output.contains("999"));
    }

    #[tokio::test]
    async fn mixed_status_codes_print_in_ascending_order() {
        let input = format!(
            "{}\n{}\n{}\n",
            valid_line(500, 1),
            valid_line(200, 2),
            valid_line(301, 3)
        );
        let output = run_to_completion(&input).await;
        assert_eq!(output, "File size: 6\n200: 1\n301: 1\n500: 1\n");
    }

    #[tokio::test]
    async fn shutdown_mid_stream_drains_once() {
        let (mut client, server) = tokio::io::duplex(4096);
        let (tx, rx) = oneshot::channel::<()>();
        let shutdown = async {
            let _ = rx.await;
        };

        let mut out = Vec::new();
        let task = StreamDriver::new(&mut out).run(BufReader::new(server), shutdown);

        // Feed 7 valid lines, let the driver consume them, then interrupt.
        let feed = async {
            for _ in 0..7 {
                client
                    .write_all((valid_line(200, 10) + "\n").as_bytes())
                    .await
                    .unwrap();
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
            tx.send(()).unwrap();
        };

        let (result, ()) = tokio::join!(task, feed);
        result.unwrap();
        drop(client);

        assert_eq!(String::from_utf8(out).unwrap(), "File size: 70\n200: 7\n");
    }
}
