use serde_json::Value;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

/// Spawn a background task that writes each received message as one JSON line
/// to `out`. The task ends when every sender is dropped.
pub fn spawn_line_writer<W>(mut out: W, mut rx: mpsc::Receiver<Value>) -> tokio::task::JoinHandle<std::io::Result<()>>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match serde_json::to_vec(&msg) {
                Ok(mut line) => {
                    // serde_json::to_vec doesn't include newline; add it
                    line.push(b'\n');
                    if let Err(e) = out.write_all(&line).await {
                        tracing::error!(error=%e, "failed to write response line");
                        return Err(e);
                    }
                    out.flush().await?;
                }
                Err(e) => {
                    tracing::error!(error=%e, "failed to serialize response");
                }
            }
        }
        out.flush().await
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn writes_one_line_per_message() {
        let (client, mut server) = tokio::io::duplex(4096);
        let (tx, rx) = mpsc::channel(8);
        let handle = spawn_line_writer(client, rx);
        tx.send(json!({"id": 1})).await.unwrap();
        tx.send(json!({"id": 2})).await.unwrap();
        drop(tx);
        handle.await.unwrap().unwrap();

        let mut buf = String::new();
        server.read_to_string(&mut buf).await.unwrap();
        assert_eq!(buf, "{\"id\":1}\n{\"id\":2}\n");
    }
}
