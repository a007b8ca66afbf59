use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};
use parking_lot::Mutex;

use crate::error::{ParallelError, Result};

/// Completion handle of one partition's task
///
/// Handles resolve independently: a failed partition never affects the
/// others.
#[derive(Debug)]
pub struct PartitionHandle<T> {
    index: usize,
    rx: Receiver<Result<T>>,
    /// Outcome taken off the channel by [`PartitionHandle::is_done`]
    done: Mutex<Option<Result<T>>>,
}

impl<T> PartitionHandle<T> {
    /// Creates a handle and the sender its task completes
    pub(crate) fn channel(index: usize) -> (Sender<Result<T>>, Self) {
        let (tx, rx) = bounded(1);
        (
            tx,
            Self {
                index,
                rx,
                done: Mutex::new(None),
            },
        )
    }

    /// Index of the partition this handle belongs to
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns true once the task has finished, or was dropped unrun
    pub fn is_done(&self) -> bool {
        let mut done = self.done.lock();
        if done.is_some() {
            return true;
        }
        match self.rx.try_recv() {
            Ok(outcome) => *done = Some(outcome),
            Err(TryRecvError::Disconnected) => *done = Some(Err(ParallelError::Disconnected)),
            Err(TryRecvError::Empty) => return false,
        }
        true
    }

    /// Blocks until the task finishes and returns its outcome
    pub fn join(self) -> Result<T> {
        match self.done.into_inner() {
            Some(outcome) => outcome,
            None => self.rx.recv().unwrap_or(Err(ParallelError::Disconnected)),
        }
    }
}

/// Waits for every handle and returns the outcomes in partition order
pub fn join_all<T, I>(handles: I) -> Vec<Result<T>>
where
    I: IntoIterator<Item = PartitionHandle<T>>,
{
    let mut handles: Vec<_> = handles.into_iter().collect();
    handles.sort_by_key(PartitionHandle::index);
    handles.into_iter().map(PartitionHandle::join).collect()
}
