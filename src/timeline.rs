//! Per-attribute value histories.
//!
//! Every observable attribute on the board stores its full history in a
//! [`Timeline`]: an append-only sequence of values with a movable read
//! cursor. Stepping the duel forward or backward moves the cursor of every
//! affected attribute by one, so undoing a message never recomputes
//! anything from the log head.

/// Starting value a [`Timeline`] is seeded with before any message has
/// touched the attribute.
pub trait Sentinel {
    fn sentinel() -> Self;
}

impl Sentinel for u32 {
    fn sentinel() -> Self {
        0
    }
}

impl Sentinel for i32 {
    fn sentinel() -> Self {
        -1
    }
}

impl Sentinel for bool {
    fn sentinel() -> Self {
        false
    }
}

/// An append-and-rewind history with a single read cursor.
///
/// Construction seeds the history with the type's sentinel and parks the
/// cursor on it. `advance(true, v)` records a new value and steps onto it;
/// `advance(false, _)` re-walks onto a value recorded earlier; `retreat`
/// steps back one. Misuse (retreating past the sentinel, advancing past the
/// tail without appending, appending while re-walking) is a programming bug
/// and asserts in debug builds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeline<T> {
    values: Vec<T>,
    cursor: usize,
}

impl<T: Sentinel> Default for Timeline<T> {
    fn default() -> Self {
        Timeline {
            values: vec![T::sentinel()],
            cursor: 0,
        }
    }
}

impl<T> Timeline<T> {
    /// Move the cursor forward one position, appending `value` as the next
    /// element first when `append` is true. When `append` is false the next
    /// element must already exist.
    pub fn advance(&mut self, append: bool, value: T) {
        if append {
            debug_assert!(
                self.cursor + 1 == self.values.len(),
                "appended while re-walking recorded history"
            );
            self.values.push(value);
        }
        debug_assert!(
            self.cursor + 1 < self.values.len(),
            "advanced past the recorded history"
        );
        self.cursor += 1;
    }

    /// Move the cursor back one position.
    pub fn retreat(&mut self) {
        debug_assert!(self.cursor > 0, "retreated past the sentinel");
        self.cursor -= 1;
    }

    /// The value at the cursor.
    pub fn current(&self) -> &T {
        &self.values[self.cursor]
    }

    /// Cursor offset from the sentinel; equals the number of forward steps
    /// minus the number of backward steps since construction.
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Number of recorded values, sentinel included.
    pub fn recorded(&self) -> usize {
        self.values.len()
    }

    /// True while the cursor still sits on the sentinel.
    pub fn at_sentinel(&self) -> bool {
        self.cursor == 0
    }
}
