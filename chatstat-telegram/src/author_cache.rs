//! Bounded cache of message authors, keyed by (chat id, message id).
//!
//! Telegram reaction updates do not include the message author, so every counted message is
//! remembered here and looked up when a reaction arrives. Eviction is insertion-ordered; a
//! miss means the reaction cannot be attributed and the classifier drops or degrades the
//! event accordingly.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

pub struct MessageAuthorCache {
    capacity: usize,
    inner: Mutex<CacheInner>,
}

struct CacheInner {
    map: HashMap<(i64, i64), i64>,
    order: VecDeque<(i64, i64)>,
}

impl MessageAuthorCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: Mutex::new(CacheInner {
                map: HashMap::new(),
                order: VecDeque::new(),
            }),
        }
    }

    /// Remembers the author of a message, evicting the oldest entries past capacity.
    pub fn put(&self, chat_id: i64, message_id: i64, author_id: i64) {
        let mut inner = self.inner.lock().expect("author cache poisoned");
        let key = (chat_id, message_id);
        if inner.map.insert(key, author_id).is_none() {
            inner.order.push_back(key);
        }
        while inner.map.len() > self.capacity {
            match inner.order.pop_front() {
                Some(oldest) => {
                    inner.map.remove(&oldest);
                }
                None => break,
            }
        }
    }

    pub fn get(&self, chat_id: i64, message_id: i64) -> Option<i64> {
        let inner = self.inner.lock().expect("author cache poisoned");
        inner.map.get(&(chat_id, message_id)).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_then_get() {
        let cache = MessageAuthorCache::new(10);
        cache.put(-100, 1, 7);

        assert_eq!(cache.get(-100, 1), Some(7));
        assert_eq!(cache.get(-100, 2), None);
        assert_eq!(cache.get(-200, 1), None);
    }

    #[test]
    fn test_put_overwrites_author() {
        let cache = MessageAuthorCache::new(10);
        cache.put(-100, 1, 7);
        cache.put(-100, 1, 8);

        assert_eq!(cache.get(-100, 1), Some(8));
    }

    #[test]
    fn test_oldest_entry_is_evicted_at_capacity() {
        let cache = MessageAuthorCache::new(2);
        cache.put(-100, 1, 7);
        cache.put(-100, 2, 8);
        cache.put(-100, 3, 9);

        assert_eq!(cache.get(-100, 1), None);
        assert_eq!(cache.get(-100, 2), Some(8));
        assert_eq!(cache.get(-100, 3), Some(9));
    }

    #[test]
    fn test_overwrite_does_not_grow_order_queue() {
        let cache = MessageAuthorCache::new(2);
        cache.put(-100, 1, 7);
        cache.put(-100, 1, 7);
        cache.put(-100, 1, 7);
        cache.put(-100, 2, 8);

        // Both entries still fit; nothing was evicted by the repeated puts.
        assert_eq!(cache.get(-100, 1), Some(7));
        assert_eq!(cache.get(-100, 2), Some(8));
    }
}
