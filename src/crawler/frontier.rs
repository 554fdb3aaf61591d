//! Frontier queue of URLs awaiting a visit
//!
//! The frontier is a plain FIFO, which makes the traversal breadth first. It does
//! not deduplicate on enqueue: the same URL may sit in the queue several times, and
//! the session discards repeats when it dequeues them.

use std::collections::VecDeque;
use std::sync::Mutex;

/// Multi-producer, multi-consumer URL queue for one domain
#[derive(Debug, Default)]
pub struct Frontier {
    queue: Mutex<VecDeque<String>>,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a URL to the back of the queue
    pub fn push(&self, url: impl Into<String>) {
        self.lock().push_back(url.into());
    }

    /// Appends every URL, preserving their order
    pub fn extend<I>(&self, urls: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.lock().extend(urls);
    }

    /// Takes the URL at the front of the queue
    pub fn pop(&self) -> Option<String> {
        self.lock().pop_front()
    }

    /// Number of queued entries, repeats included
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<String>> {
        // The queue holds plain strings; a panic elsewhere cannot leave it torn
        self.queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_fifo_order() {
        let frontier = Frontier::new();
        frontier.push("https://shop.test/a");
        frontier.extend(vec![
            "https://shop.test/b".to_string(),
            "https://shop.test/c".to_string(),
        ]);

        assert_eq!(frontier.len(), 3);
        assert_eq!(frontier.pop().as_deref(), Some("https://shop.test/a"));
        assert_eq!(frontier.pop().as_deref(), Some("https://shop.test/b"));
        assert_eq!(frontier.pop().as_deref(), Some("https://shop.test/c"));
        assert!(frontier.pop().is_none());
        assert!(frontier.is_empty());
    }

    #[test]
    fn test_repeats_are_kept() {
        let frontier = Frontier::new();
        frontier.push("https://shop.test/a");
        frontier.push("https://shop.test/a");
        assert_eq!(frontier.len(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_producers() {
        let frontier = Arc::new(Frontier::new());
        let mut handles = Vec::new();

        for worker in 0..8 {
            let frontier = Arc::clone(&frontier);
            handles.push(tokio::spawn(async move {
                for i in 0..100 {
                    frontier.push(format!("https://shop.test/{}/{}", worker, i));
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(frontier.len(), 800);
    }
}
