//! Queue and history bookkeeping, independent of any audio backend.
//!
//! The queue holds upcoming songs in play order. The history records songs
//! in the order they became current, most recent first; the song currently
//! playing sits at the history head until a backward skip pops it off.

use std::collections::VecDeque;

use core_library::Song;

/// Where an enqueued song lands relative to the existing queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// Play right after the current song.
    Next,
    /// Play after everything already queued.
    Last,
}

#[derive(Debug, Default, Clone)]
pub struct PlayQueue {
    queue: VecDeque<Song>,
    history: VecDeque<Song>,
}

impl PlayQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, song: Song, position: Position) {
        match position {
            Position::Next => self.queue.push_front(song),
            Position::Last => self.queue.push_back(song),
        }
    }

    /// Pops the queue head, records it at the history head and returns it.
    /// Returns `None` when the queue is empty, leaving everything untouched.
    pub fn advance(&mut self) -> Option<Song> {
        let song = self.queue.pop_front()?;
        self.history.push_front(song.clone());
        Some(song)
    }

    /// Pops the history head and returns it as the song to go back to,
    /// pushing `current` to the queue head so a forward skip replays it.
    /// Returns `None` when the history is empty, leaving everything
    /// untouched.
    pub fn rewind(&mut self, current: Option<Song>) -> Option<Song> {
        if self.history.is_empty() {
            return None;
        }
        let previous = self.history.pop_front()?;
        if let Some(current) = current {
            self.queue.push_front(current);
        }
        Some(previous)
    }

    pub fn clear(&mut self) {
        self.queue.clear();
        self.history.clear();
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn is_queue_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn queued(&self) -> Vec<Song> {
        self.queue.iter().cloned().collect()
    }

    pub fn history(&self) -> Vec<Song> {
        self.history.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(id: &str) -> Song {
        Song::new(id, "al1", id.to_uppercase(), 1)
    }

    fn ids(songs: &[Song]) -> Vec<&str> {
        songs.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn advance_pops_head_into_history() {
        let mut q = PlayQueue::new();
        for id in ["a", "b", "c"] {
            q.enqueue(song(id), Position::Last);
        }

        let current = q.advance().unwrap();
        assert_eq!(current.id, "a");
        assert_eq!(ids(&q.queued()), vec!["b", "c"]);
        assert_eq!(ids(&q.history()), vec!["a"]);
    }

    #[test]
    fn advance_on_empty_queue_changes_nothing() {
        let mut q = PlayQueue::new();
        q.enqueue(song("z"), Position::Last);
        q.advance();

        assert!(q.advance().is_none());
        assert_eq!(ids(&q.history()), vec!["z"]);
    }

    #[test]
    fn rewind_on_empty_history_changes_nothing() {
        let mut q = PlayQueue::new();
        q.enqueue(song("b"), Position::Last);

        assert!(q.rewind(Some(song("a"))).is_none());
        assert_eq!(ids(&q.queued()), vec!["b"]);
    }

    #[test]
    fn rewind_restores_previous_and_requeues_current() {
        let mut q = PlayQueue::new();
        q.enqueue(song("b"), Position::Last);
        q.history.push_front(song("z"));

        let previous = q.rewind(Some(song("a"))).unwrap();
        assert_eq!(previous.id, "z");
        assert_eq!(ids(&q.queued()), vec!["a", "b"]);
        assert!(q.history().is_empty());
    }

    #[test]
    fn rewind_undoes_advance() {
        let mut q = PlayQueue::new();
        for id in ["a", "b", "c"] {
            q.enqueue(song(id), Position::Last);
        }

        let current = q.advance().unwrap();
        let back = q.rewind(Some(current)).unwrap();
        assert_eq!(back.id, "a");
        assert_eq!(ids(&q.queued()), vec!["a", "b", "c"]);
        assert!(q.history().is_empty());
    }

    #[test]
    fn enqueue_next_goes_to_head_last_to_tail() {
        let mut q = PlayQueue::new();
        q.enqueue(song("b"), Position::Last);
        q.enqueue(song("c"), Position::Last);

        q.enqueue(song("x"), Position::Next);
        assert_eq!(ids(&q.queued()), vec!["x", "b", "c"]);

        let mut q = PlayQueue::new();
        q.enqueue(song("b"), Position::Last);
        q.enqueue(song("c"), Position::Last);

        q.enqueue(song("x"), Position::Last);
        assert_eq!(ids(&q.queued()), vec!["b", "c", "x"]);
    }

    #[test]
    fn clear_drops_queue_and_history() {
        let mut q = PlayQueue::new();
        q.enqueue(song("a"), Position::Last);
        q.advance();
        q.enqueue(song("b"), Position::Last);

        q.clear();
        assert!(q.is_queue_empty());
        assert_eq!(q.history_len(), 0);
    }
}
