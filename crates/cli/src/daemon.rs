use ipmon_application::use_cases::{
    HandleMessageUseCase, RequestEnvelope, Response, ResponseEnvelope,
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, warn};

const REPLY_QUEUE: usize = 256;

/// Answers JSON request lines from `input` with JSON reply lines on `output`.
///
/// Every request runs as its own task, so a slow lookup does not hold up the
/// lines behind it. Replies are written in completion order and carry the
/// request's `id`, when one was given, to match them up.
pub async fn serve<R, W>(
    router: Arc<HandleMessageUseCase>,
    input: R,
    output: W,
) -> anyhow::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel::<ResponseEnvelope>(REPLY_QUEUE);
    let writer = tokio::spawn(write_replies(rx, output));

    let mut lines = BufReader::new(input).lines();
    let mut tasks: JoinSet<()> = JoinSet::new();

    while let Some(line) = lines.next_line().await? {
        while tasks.try_join_next().is_some() {}

        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<RequestEnvelope>(&line) {
            Ok(envelope) => {
                let router = router.clone();
                let tx = tx.clone();
                tasks.spawn(async move {
                    let reply = router.handle_envelope(envelope).await;
                    if tx.send(reply).await.is_err() {
                        debug!("Reply dropped, output closed");
                    }
                });
            }
            Err(e) => {
                debug!(error = %e, "Rejected request line");
                let reply = ResponseEnvelope {
                    id: request_id(&line),
                    response: Response::failure(format!("Invalid request: {}", e)),
                };
                if tx.send(reply).await.is_err() {
                    break;
                }
            }
        }
    }

    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            warn!(error = %e, "Request task failed");
        }
    }
    drop(tx);

    writer.await??;
    Ok(())
}

/// Best-effort `id` from a line that did not parse as a request.
fn request_id(line: &str) -> Option<serde_json::Value> {
    serde_json::from_str::<serde_json::Value>(line)
        .ok()
        .and_then(|value| value.get("id").cloned())
}

async fn write_replies<W>(
    mut replies: mpsc::Receiver<ResponseEnvelope>,
    mut output: W,
) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(reply) = replies.recv().await {
        let mut out = serde_json::to_vec(&reply)?;
        out.push(b'\n');
        output.write_all(&out).await?;
        output.flush().await?;
    }
    Ok(())
}
