use std::io::BufRead;

use tokio::sync::mpsc;

/// Lines typed by the user.
///
/// A plain thread does the blocking reads and forwards each line over a
/// channel. An unanswered read stays on that thread, so leaving the loop at a
/// prompt never holds up runtime shutdown.
pub struct InputLines {
    rx: mpsc::UnboundedReceiver<String>,
}

impl InputLines {
    pub fn stdin() -> Self {
        Self::spawn(std::io::BufReader::new(std::io::stdin()))
    }

    /// Reads `reader` line by line on a background thread until it ends or
    /// the receiving side is dropped.
    pub fn spawn<R>(reader: R) -> Self
    where
        R: BufRead + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let spawned = std::thread::Builder::new()
            .name("moodlist-input".to_string())
            .spawn(move || {
                for line in reader.lines() {
                    let Ok(line) = line else { break };
                    if tx.send(line).is_err() {
                        break;
                    }
                }
            });

        if let Err(e) = spawned {
            tracing::warn!(error = %e, "cannot start input reader");
        }

        InputLines { rx }
    }

    /// The next trimmed line, or `None` once input is closed.
    pub async fn next(&mut self) -> Option<String> {
        self.rx.recv().await.map(|line| line.trim().to_string())
    }
}
