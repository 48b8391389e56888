use std::future::Future;
use tokio::sync::mpsc;

/// Capacity 1: a command cannot run ahead of its consumer by more than one chunk.
const CHUNK_BUFFER: usize = 1;

/// Producer half of a command's chunk sequence.
pub struct Emitter {
    tx: mpsc::Sender<String>,
}

impl Emitter {
    /// Hands one chunk to the consumer, suspending until there is room for it.
    pub async fn emit(&self, chunk: impl Into<String>) {
        if self.tx.send(chunk.into()).await.is_err() {
            tracing::debug!("chunk consumer dropped, discarding output");
        }
    }
}

/// Runs `body` with a fresh emitter and pulls every chunk it emits, in order, until the body
/// finishes. `body` owns the emitter, so the sequence ends exactly when the body does and can
/// never be driven a second time.
pub async fn drive<F, Fut, T>(body: F, mut on_chunk: impl FnMut(String)) -> T
where
    F: FnOnce(Emitter) -> Fut,
    Fut: Future<Output = T>,
{
    let (tx, mut rx) = mpsc::channel(CHUNK_BUFFER);
    let producer = body(Emitter { tx });
    let consumer = async {
        while let Some(chunk) = rx.recv().await {
            on_chunk(chunk);
        }
    };

    let (out, ()) = tokio::join!(producer, consumer);
    out
}
