//! Hand-off from producer threads to the UI loop.

use std::sync::mpsc::{self, Receiver, Sender};

/// Values waiting for the UI thread's next idle pass.
///
/// Producers push through a [`Sender`] from any thread; the UI thread drains
/// the queue once per loop iteration and keeps only the newest value.
pub struct IdleQueue<T> {
    tx: Sender<T>,
    rx: Receiver<T>,
}

impl<T> IdleQueue<T> {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    /// A handle producers can move to another thread.
    pub fn sender(&self) -> Sender<T> {
        self.tx.clone()
    }

    /// Drain everything queued so far and return the newest value.
    pub fn take_latest(&self) -> Option<T> {
        self.rx.try_iter().last()
    }
}

impl<T> Default for IdleQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn empty_queue_yields_nothing() {
        let queue: IdleQueue<u8> = IdleQueue::new();
        assert_eq!(queue.take_latest(), None);
    }

    #[test]
    fn newest_value_wins() {
        let queue = IdleQueue::new();
        let tx = queue.sender();
        thread::spawn(move || {
            for i in 0..5 {
                tx.send(i).unwrap();
            }
        })
        .join()
        .unwrap();

        assert_eq!(queue.take_latest(), Some(4));
        assert_eq!(queue.take_latest(), None);
    }
}
