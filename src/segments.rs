//! Fixed-capacity queue of traversed path segments.
//!
//! Every resolved move appends a [`Segment`]. The touch pipeline drains the
//! queue once per tick. When the queue is full the two oldest segments are
//! merged so the path's first start and last end survive while memory stays
//! bounded.

use glam::DVec3;
use serde::Serialize;

/// One traversal slice awaiting block and fluid touch evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Segment {
    /// Start position.
    pub from: DVec3,
    /// End position.
    pub to: DVec3,
    /// Displacement requested before collision resolution, when known.
    pub original: Option<DVec3>,
}

impl Segment {
    /// A segment with no known original displacement.
    #[must_use]
    pub const fn between(from: DVec3, to: DVec3) -> Self {
        Self {
            from,
            to,
            original: None,
        }
    }

    /// A segment produced by a resolved move of `original`.
    #[must_use]
    pub const fn resolved(from: DVec3, to: DVec3, original: DVec3) -> Self {
        Self {
            from,
            to,
            original: Some(original),
        }
    }

    /// Displacement covered by the segment.
    #[must_use]
    pub fn delta(&self) -> DVec3 {
        self.to - self.from
    }
}

/// Ring buffer of [`Segment`]s with merge-on-overflow.
#[derive(Debug, Clone)]
pub struct SegmentQueue {
    slots: Box<[Segment]>,
    head: usize,
    len: usize,
}

impl SegmentQueue {
    /// Creates a queue holding at most `capacity` segments (at least two).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(2);
        Self {
            slots: vec![Segment::between(DVec3::ZERO, DVec3::ZERO); capacity].into_boxed_slice(),
            head: 0,
            len: 0,
        }
    }

    /// Maximum number of retained segments.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of queued segments.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the queue is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn slot(&self, offset: usize) -> usize {
        (self.head + offset) % self.slots.len()
    }

    /// Segment at logical position `index`, oldest first.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Segment> {
        if index >= self.len {
            return None;
        }
        self.slots.get(self.slot(index))
    }

    /// Oldest segment.
    #[must_use]
    pub fn first(&self) -> Option<&Segment> {
        self.get(0)
    }

    /// Newest segment.
    #[must_use]
    pub fn last(&self) -> Option<&Segment> {
        self.len.checked_sub(1).and_then(|i| self.get(i))
    }

    /// Appends `segment`, merging the two oldest first when full.
    pub fn push(&mut self, segment: Segment) {
        if self.len == self.slots.len() {
            self.merge_oldest();
        }
        let tail = self.slot(self.len);
        if let Some(slot) = self.slots.get_mut(tail) {
            *slot = segment;
            self.len += 1;
        }
    }

    /// Collapses the two oldest segments into one spanning both.
    ///
    /// The merged segment loses its original displacement, so the touch
    /// pipeline treats it as a single slice.
    fn merge_oldest(&mut self) {
        let (Some(oldest), Some(second)) = (self.get(0).copied(), self.get(1).copied()) else {
            return;
        };
        self.head = self.slot(1);
        self.len -= 1;
        let head = self.head;
        if let Some(slot) = self.slots.get_mut(head) {
            *slot = Segment::between(oldest.from, second.to);
        }
    }

    /// Removes and returns the newest segment.
    pub fn pop_last(&mut self) -> Option<Segment> {
        let last = self.last().copied()?;
        self.len -= 1;
        Some(last)
    }

    /// Removes every segment.
    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }

    /// Removes every segment, returning them oldest first.
    pub fn drain(&mut self) -> Vec<Segment> {
        let out = self.iter().copied().collect();
        self.clear();
        out
    }

    /// Iterates segments oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Segment> {
        (0..self.len).filter_map(|i| self.get(i))
    }
}

impl Default for SegmentQueue {
    fn default() -> Self {
        Self::with_capacity(crate::constants::SEGMENT_CAPACITY)
    }
}
