use std::future::Future;
use std::io;
use std::sync::Arc;

use serde::Serialize;
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader,
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::gateway::Gateway;
use crate::handlers;
use crate::protocol::{JsonRpcError, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse};

/// Maximum bytes per JSON-RPC message (1 MiB), newline included.
pub const MAX_MESSAGE_BYTES: usize = 1024 * 1024;

/// One read from the input stream.
#[derive(Debug, PartialEq, Eq)]
enum Frame {
    Eof,
    Line,
    /// The line was longer than [`MAX_MESSAGE_BYTES`]; it has been skipped
    /// up to and including its newline.
    Oversized(usize),
}

/// A message queued for the output stream.
#[derive(Debug)]
enum Outbound {
    Notification(JsonRpcNotification),
    Response(JsonRpcResponse),
}

/// Why the read side stopped.
#[derive(Debug, PartialEq, Eq)]
enum ReadEnd {
    Eof,
    Shutdown,
    WriterClosed,
}

/// MCP bridge that speaks newline-delimited JSON-RPC 2.0 on stdio and
/// forwards every operation through a [`Gateway`].
pub struct BridgeServer<G> {
    gateway: Arc<G>,
}

impl<G> BridgeServer<G>
where
    G: Gateway + 'static,
{
    pub fn new(gateway: G) -> Self {
        Self {
            gateway: Arc::new(gateway),
        }
    }

    /// Serve stdin/stdout until EOF or SIGINT/SIGTERM.
    pub async fn run(&self) -> io::Result<()> {
        let reader = BufReader::new(tokio::io::stdin());
        let writer = tokio::io::stdout();
        self.serve(reader, writer, shutdown_signal()).await
    }

    /// Serve one session over arbitrary streams.
    ///
    /// Every request runs on its own task and its envelope is written as
    /// soon as it completes, so output order follows completion order, not
    /// input order. On EOF in-flight requests are drained first; when
    /// `shutdown` resolves they are abandoned and only already-finished
    /// envelopes are written.
    pub async fn serve<R, W, S>(&self, reader: R, writer: W, shutdown: S) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
        S: Future<Output = ()>,
    {
        let (tx, rx) = mpsc::unbounded_channel();

        // Always the first line on the wire.
        let _ = tx.send(Outbound::Notification(JsonRpcNotification::initialize()));

        let reading = async move {
            let mut in_flight = JoinSet::new();
            let end = self.read_loop(reader, &tx, &mut in_flight, shutdown).await;

            match &end {
                Ok(ReadEnd::Eof) => {
                    debug!(pending = in_flight.len(), "Input closed, draining in-flight requests");
                    while let Some(joined) = in_flight.join_next().await {
                        if let Err(e) = joined {
                            warn!(error = %e, "Request task failed");
                        }
                    }
                }
                _ => in_flight.shutdown().await,
            }
            end
        };

        let (read_result, write_result) = tokio::join!(reading, write_loop(writer, rx));

        let end = read_result?;
        write_result?;
        info!(reason = ?end, "Bridge stopped");
        Ok(())
    }

    async fn read_loop<R, S>(
        &self,
        mut reader: R,
        tx: &UnboundedSender<Outbound>,
        in_flight: &mut JoinSet<()>,
        shutdown: S,
    ) -> io::Result<ReadEnd>
    where
        R: AsyncBufRead + Unpin,
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut raw = Vec::new();

        loop {
            raw.clear();
            let frame = tokio::select! {
                biased;
                _ = &mut shutdown => return Ok(ReadEnd::Shutdown),
                _ = tx.closed() => return Ok(ReadEnd::WriterClosed),
                frame = read_frame(&mut reader, &mut raw) => frame?,
            };
            if frame == Frame::Eof {
                return Ok(ReadEnd::Eof);
            }

            // Reap finished tasks so the set does not grow for the whole session.
            while let Some(joined) = in_flight.try_join_next() {
                if let Err(e) = joined {
                    warn!(error = %e, "Request task failed");
                }
            }

            if let Frame::Oversized(bytes) = frame {
                warn!(bytes, limit = MAX_MESSAGE_BYTES, "Message too large");
                send_parse_error(tx);
                continue;
            }

            let trimmed = match std::str::from_utf8(&raw) {
                Ok(s) => s.trim(),
                Err(e) => {
                    warn!(error = %e, "Message is not valid UTF-8");
                    send_parse_error(tx);
                    continue;
                }
            };

            if trimmed.is_empty() {
                continue;
            }

            let req = match JsonRpcRequest::parse(trimmed) {
                Ok(r) => r,
                Err(e) => {
                    warn!(error = %e, "Parse error");
                    send_parse_error(tx);
                    continue;
                }
            };

            debug!(method = %req.method, id = ?req.id, "Received request");

            let gateway = Arc::clone(&self.gateway);
            let tx = tx.clone();
            in_flight.spawn(async move {
                if let Some(resp) = handlers::dispatch(&req, gateway.as_ref()).await {
                    if tx.send(Outbound::Response(resp)).is_err() {
                        debug!(id = ?req.id, "Output closed, dropping response");
                    }
                }
            });
        }
    }
}

/// Read one line into `buf`, buffering at most [`MAX_MESSAGE_BYTES`].
///
/// A longer line is consumed without being stored.
async fn read_frame<R>(reader: &mut R, buf: &mut Vec<u8>) -> io::Result<Frame>
where
    R: AsyncBufRead + Unpin,
{
    let limit = MAX_MESSAGE_BYTES as u64 + 1;
    let n = (&mut *reader).take(limit).read_until(b'\n', buf).await?;
    if n == 0 {
        return Ok(Frame::Eof);
    }
    if n <= MAX_MESSAGE_BYTES {
        return Ok(Frame::Line);
    }

    let mut skipped = n;
    if buf.last() != Some(&b'\n') {
        skipped += discard_line(reader).await?;
    }
    buf.clear();
    Ok(Frame::Oversized(skipped))
}

/// Consume input up to and including the next newline (or EOF).
async fn discard_line<R>(reader: &mut R) -> io::Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut skipped = 0;
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(skipped);
        }
        match available.iter().position(|b| *b == b'\n') {
            Some(i) => {
                reader.consume(i + 1);
                return Ok(skipped + i + 1);
            }
            None => {
                let len = available.len();
                reader.consume(len);
                skipped += len;
            }
        }
    }
}

fn send_parse_error(tx: &UnboundedSender<Outbound>) {
    let _ = tx.send(Outbound::Response(JsonRpcResponse::error(
        None,
        JsonRpcError::parse_error(),
    )));
}

/// Single owner of the output stream; writes queued envelopes one at a time.
async fn write_loop<W>(writer: W, mut rx: UnboundedReceiver<Outbound>) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut writer = EnvelopeWriter::new(writer);
    while let Some(message) = rx.recv().await {
        match &message {
            Outbound::Notification(n) => writer.write(n).await?,
            Outbound::Response(r) => writer.write(r).await?,
        }
    }
    Ok(())
}

/// Serializes one envelope per line.
pub struct EnvelopeWriter<W> {
    inner: W,
}

impl<W> EnvelopeWriter<W>
where
    W: AsyncWrite + Unpin,
{
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Write `message` as a single JSON line and flush.
    ///
    /// The line is assembled before writing so it goes out in one `write_all`.
    pub async fn write<T: Serialize>(&mut self, message: &T) -> io::Result<()> {
        let mut line = serde_json::to_vec(message)?;
        line.push(b'\n');
        self.inner.write_all(&line).await?;
        self.inner.flush().await
    }
}

/// Resolves on SIGINT, or SIGTERM on Unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Cannot listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
