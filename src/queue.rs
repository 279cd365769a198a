//! Fixed-capacity render queue.
//!
//! One queue exists per (region, render type). Entries are appended during
//! the frame's visibility walk and drained by the batch builders; the
//! backing storage is allocated once and reused so the per-frame loop never
//! allocates.

/// Bounded ordered container of draw records.
///
/// Insertion order is render order. Callers choose the iteration direction:
/// translucent geometry iterates in reverse to approximate back-to-front
/// ordering without a full sort.
pub struct StaticQueue<T> {
    entries: Vec<T>,
    capacity: usize,
}

impl<T> StaticQueue<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends an entry. A full queue drops the entry rather than grow.
    pub fn push(&mut self, value: T) {
        if self.entries.len() == self.capacity {
            log::warn!(
                "[StaticQueue] queue full ({} entries), dropping draw",
                self.capacity
            );
            return;
        }
        self.entries.push(value);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Empties the queue without releasing its storage.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Forward iteration: insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.entries.iter()
    }

    /// Reverse iteration: back-to-front order for translucency.
    pub fn iter_rev(&self) -> std::iter::Rev<std::slice::Iter<'_, T>> {
        self.entries.iter().rev()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_preserves_insertion_order() {
        let mut queue = StaticQueue::new(8);
        queue.push(1);
        queue.push(2);
        queue.push(3);

        let forward: Vec<i32> = queue.iter().copied().collect();
        assert_eq!(forward, vec![1, 2, 3]);

        let reverse: Vec<i32> = queue.iter_rev().copied().collect();
        assert_eq!(reverse, vec![3, 2, 1]);
    }

    #[test]
    fn full_queue_drops_new_entries() {
        let mut queue = StaticQueue::new(2);
        queue.push('a');
        queue.push('b');
        queue.push('c');
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.iter().copied().collect::<Vec<_>>(), vec!['a', 'b']);
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut queue = StaticQueue::new(4);
        queue.push(7);
        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(queue.capacity(), 4);
    }
}
