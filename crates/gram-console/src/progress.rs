//! Upload progress.
//!
//! The percentages are synthetic checkpoints at phase boundaries, not measured
//! transfer progress: 25 when compression starts, 50 at encoding, 75 before
//! the network call and 100 once the backend accepted the submission.

use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Checkpoint {
    Idle,
    Compressing,
    Encoding,
    Uploading,
    Done,
}

impl Checkpoint {
    pub fn percent(self) -> u8 {
        match self {
            Checkpoint::Idle => 0,
            Checkpoint::Compressing => 25,
            Checkpoint::Encoding => 50,
            Checkpoint::Uploading => 75,
            Checkpoint::Done => 100,
        }
    }
}

/// Broadcasts the current percentage to any number of observers
#[derive(Debug)]
pub struct ProgressReporter {
    tx: watch::Sender<u8>,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        let (tx, _) = watch::channel(0);
        Self { tx }
    }
}

impl ProgressReporter {
    pub fn subscribe(&self) -> watch::Receiver<u8> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> u8 {
        *self.tx.borrow()
    }

    pub fn report(&self, checkpoint: Checkpoint) {
        tracing::trace!(percent = checkpoint.percent(), "Upload progress");
        self.tx.send_replace(checkpoint.percent());
    }

    pub fn reset(&self) {
        self.report(Checkpoint::Idle);
    }
}
