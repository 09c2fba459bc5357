//! Byte ranges into notation source.

use std::ops::Range;

/// A half-open byte range `start..end` into the notation source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    start: usize,
    end: usize,
}

impl Span {
    pub fn new(range: Range<usize>) -> Self {
        Self {
            start: range.start,
            end: range.end.max(range.start),
        }
    }

    /// Span of `part` inside `source`.
    ///
    /// `part` must be a subslice of `source`; any other string yields an
    /// empty span at offset zero.
    pub(crate) fn of(source: &str, part: &str) -> Self {
        let base = source.as_ptr() as usize;
        let start = (part.as_ptr() as usize).wrapping_sub(base);
        if start.saturating_add(part.len()) > source.len() {
            return Self::default();
        }
        Self::new(start..start + part.len())
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}
