//! Frame-indexed command recording.
//!
//! A [`CommandSequence`] maps a tick index to the commands recorded at that
//! tick, in recording order. Commands are closures over a target type `C`
//! that is passed in at execution time, so the sequence never holds a
//! reference to what it drives.
//!
//! Execution does not consume the commands. The same sequence can be played
//! back again from tick zero.

use std::collections::BTreeMap;
use std::fmt;

use tracing::trace;

/// A recorded action against a target of type `C`.
pub type Command<C> = Box<dyn Fn(&mut C)>;

/// Ordered, tick-indexed list of commands.
pub struct CommandSequence<C> {
    frames: BTreeMap<u64, Vec<Command<C>>>,
    len: usize,
}

impl<C> CommandSequence<C> {
    pub fn new() -> Self {
        Self {
            frames: BTreeMap::new(),
            len: 0,
        }
    }

    /// Append `command` to the list for `frame`.
    ///
    /// Commands for the same frame run in the order they were recorded.
    /// Frames need not be recorded in increasing order.
    pub fn record(&mut self, frame: u64, command: impl Fn(&mut C) + 'static) {
        self.frames.entry(frame).or_default().push(Box::new(command));
        self.len += 1;
        trace!(frame, total = self.len, "command recorded");
    }

    /// Run every command recorded at `frame` against `target`.
    ///
    /// Returns how many ran. A frame with nothing recorded is not an error.
    pub fn try_execute_all_at(&self, frame: u64, target: &mut C) -> usize {
        let Some(commands) = self.frames.get(&frame) else {
            return 0;
        };

        for command in commands {
            command(target);
        }
        trace!(frame, executed = commands.len(), "commands executed");
        commands.len()
    }

    /// Number of commands recorded at `frame`.
    pub fn commands_at(&self, frame: u64) -> usize {
        self.frames.get(&frame).map_or(0, Vec::len)
    }

    /// Total commands across all frames.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of distinct frames with at least one command.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Highest frame with a command, if any.
    pub fn last_frame(&self) -> Option<u64> {
        self.frames.keys().next_back().copied()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
        self.len = 0;
    }
}

impl<C> Default for CommandSequence<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for CommandSequence<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandSequence")
            .field("frames", &self.frames.len())
            .field("commands", &self.len)
            .field("last_frame", &self.last_frame())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- 1. Recording -------------------------------------------------------

    #[test]
    fn new_sequence_is_empty() {
        let seq: CommandSequence<Vec<u32>> = CommandSequence::new();
        assert!(seq.is_empty());
        assert_eq!(seq.len(), 0);
        assert_eq!(seq.frame_count(), 0);
        assert_eq!(seq.last_frame(), None);
    }

    #[test]
    fn record_groups_by_frame() {
        let mut seq: CommandSequence<Vec<u32>> = CommandSequence::new();
        seq.record(3, |log| log.push(1));
        seq.record(0, |log| log.push(2));
        seq.record(3, |log| log.push(3));

        assert_eq!(seq.len(), 3);
        assert_eq!(seq.frame_count(), 2);
        assert_eq!(seq.commands_at(3), 2);
        assert_eq!(seq.commands_at(0), 1);
        assert_eq!(seq.commands_at(1), 0);
        assert_eq!(seq.last_frame(), Some(3));
    }

    // -- 2. Execution -------------------------------------------------------

    #[test]
    fn execute_runs_in_recorded_order() {
        let mut seq: CommandSequence<Vec<u32>> = CommandSequence::new();
        for value in [10, 20, 30] {
            seq.record(5, move |log| log.push(value));
        }

        let mut log = Vec::new();
        assert_eq!(seq.try_execute_all_at(5, &mut log), 3);
        assert_eq!(log, vec![10, 20, 30]);
    }

    #[test]
    fn execute_missing_frame_is_noop() {
        let mut seq: CommandSequence<Vec<u32>> = CommandSequence::new();
        seq.record(1, |log| log.push(1));

        let mut log = Vec::new();
        assert_eq!(seq.try_execute_all_at(0, &mut log), 0);
        assert_eq!(seq.try_execute_all_at(2, &mut log), 0);
        assert!(log.is_empty());
    }

    #[test]
    fn execute_only_touches_requested_frame() {
        let mut seq: CommandSequence<Vec<u32>> = CommandSequence::new();
        seq.record(0, |log| log.push(0));
        seq.record(1, |log| log.push(1));

        let mut log = Vec::new();
        seq.try_execute_all_at(1, &mut log);
        assert_eq!(log, vec![1]);
    }

    #[test]
    fn execution_is_repeatable() {
        let mut seq: CommandSequence<u32> = CommandSequence::new();
        seq.record(0, |n| *n += 1);

        let mut n = 0;
        seq.try_execute_all_at(0, &mut n);
        seq.try_execute_all_at(0, &mut n);
        assert_eq!(n, 2);
        assert_eq!(seq.len(), 1);
    }

    // -- 3. Clear -----------------------------------------------------------

    #[test]
    fn clear_drops_everything() {
        let mut seq: CommandSequence<u32> = CommandSequence::new();
        seq.record(0, |n| *n += 1);
        seq.record(7, |n| *n += 1);
        seq.clear();

        assert!(seq.is_empty());
        assert_eq!(seq.frame_count(), 0);

        let mut n = 0;
        assert_eq!(seq.try_execute_all_at(0, &mut n), 0);
        assert_eq!(n, 0);
    }

    #[test]
    fn debug_summarizes() {
        let mut seq: CommandSequence<u32> = CommandSequence::new();
        seq.record(4, |_| {});
        let text = format!("{seq:?}");
        assert!(text.contains("commands: 1"), "{text}");
        assert!(text.contains("Some(4)"), "{text}");
    }
}
