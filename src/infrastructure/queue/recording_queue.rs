use async_channel::{Receiver, Sender};
use thiserror::Error;

use crate::modules::recording::events::RecordingTask;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("recording queue is closed")]
    Closed,
}

/// Producer half of the recording queue. Unbounded and FIFO: `enqueue` never waits.
#[derive(Clone)]
pub struct RecordingQueue {
    sender: Sender<RecordingTask>,
}

/// Consumer half, owned by the single recording worker.
pub struct RecordingQueueReceiver {
    receiver: Receiver<RecordingTask>,
}

pub fn recording_queue() -> (RecordingQueue, RecordingQueueReceiver) {
    let (sender, receiver) = async_channel::unbounded();
    (RecordingQueue { sender }, RecordingQueueReceiver { receiver })
}

impl RecordingQueue {
    pub fn enqueue(&self, task: RecordingTask) -> Result<(), QueueError> {
        self.sender.try_send(task).map_err(|_| QueueError::Closed)
    }

    pub fn len(&self) -> usize {
        self.sender.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sender.is_empty()
    }
}

impl RecordingQueueReceiver {
    /// Waits for the next task. Fails only once every producer has been dropped
    /// and the backlog is drained.
    pub async fn dequeue(&self) -> Result<RecordingTask, QueueError> {
        self.receiver.recv().await.map_err(|_| QueueError::Closed)
    }

    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str) -> RecordingTask {
        RecordingTask {
            request_id: id.to_string(),
            url: format!("https://example.com/{}", id),
        }
    }

    #[tokio::test]
    async fn dequeues_in_submission_order() {
        let (queue, receiver) = recording_queue();
        for id in ["a", "b", "c"] {
            queue.enqueue(task(id)).unwrap();
        }
        assert_eq!(queue.len(), 3);

        let order: Vec<String> = vec![
            receiver.dequeue().await.unwrap().request_id,
            receiver.dequeue().await.unwrap().request_id,
            receiver.dequeue().await.unwrap().request_id,
        ];
        assert_eq!(order, ["a", "b", "c"]);
        assert!(receiver.is_empty());
    }

    #[tokio::test]
    async fn closed_once_producers_are_gone() {
        let (queue, receiver) = recording_queue();
        queue.enqueue(task("last")).unwrap();
        drop(queue);

        assert_eq!(receiver.dequeue().await.unwrap().request_id, "last");
        assert_eq!(receiver.dequeue().await, Err(QueueError::Closed));
    }

    #[tokio::test]
    async fn enqueue_fails_without_consumer() {
        let (queue, receiver) = recording_queue();
        drop(receiver);
        assert_eq!(queue.enqueue(task("x")), Err(QueueError::Closed));
    }
}
