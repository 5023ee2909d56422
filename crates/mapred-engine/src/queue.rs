//! Shortest-job-first job queue
//!
//! Jobs carry a caller-supplied byte-size hint; `pop` always returns a job
//! whose hint is the current queue minimum. Map jobs are hinted with the
//! input file size, reduce jobs with the partition's byte charge, so each
//! phase drains smallest-first.
//!
//! Backed by a binary heap keyed on the hint. An insertion sequence number
//! makes the heap order total; jobs with equal hints dequeue in submission
//! order, though callers may not rely on that.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A unit of work owned by the queue until dequeued.
pub(crate) struct Job {
    pub task: Box<dyn FnOnce() + Send + 'static>,
    pub size: u64,
}

struct Entry {
    job: Job,
    seq: u64,
}

// BinaryHeap is a max-heap; reverse the comparison so the smallest hint
// (then the earliest submission) surfaces first.
impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .job
            .size
            .cmp(&self.job.size)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.job.size == other.job.size && self.seq == other.seq
    }
}

impl Eq for Entry {}

/// Size-ordered job queue. Not internally synchronized: the pool accesses
/// it under the pool lock only.
pub(crate) struct SjfQueue {
    heap: BinaryHeap<Entry>,
    next_seq: u64,
}

impl SjfQueue {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    pub fn push(&mut self, task: Box<dyn FnOnce() + Send + 'static>, size: u64) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry {
            job: Job { task, size },
            seq,
        });
    }

    /// Detach and return a smallest-hint job.
    pub fn pop(&mut self) -> Option<Job> {
        self.heap.pop().map(|entry| entry.job)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
