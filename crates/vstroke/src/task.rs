//! One-shot background work with a polled result.
//!
//! The frame loop must never block on file I/O, so decoding and encoding
//! run on their own thread and hand their result back through a channel.
//! The owner polls once per tick.

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use crate::error::{Error, Result};

/// Handle to a job running on its own thread.
#[derive(Debug)]
pub struct BackgroundTask<T> {
    name: String,
    receiver: Receiver<Result<T>>,
}

impl<T: Send + 'static> BackgroundTask<T> {
    /// Run `job` on a new named thread.
    pub fn spawn<F>(name: impl Into<String>, job: F) -> Result<Self>
    where
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        let name = name.into();
        let (sender, receiver) = mpsc::channel();
        thread::Builder::new().name(name.clone()).spawn(move || {
            // the receiver may already be gone; nobody is waiting then
            let _ = sender.send(job());
        })?;
        Ok(Self { name, receiver })
    }
}

impl<T> BackgroundTask<T> {
    /// Thread name given at spawn.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The result, if the job has finished. Never blocks.
    ///
    /// A job that died without sending (a panic) reports
    /// [`Error::TaskAborted`]. Once a result has been returned, later polls
    /// report the same error.
    pub fn poll(&mut self) -> Option<Result<T>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(Error::TaskAborted(self.name.clone()))),
        }
    }

    /// Block until the job finishes.
    pub fn wait(self) -> Result<T> {
        self.receiver
            .recv()
            .unwrap_or_else(|_| Err(Error::TaskAborted(self.name)))
    }
}
