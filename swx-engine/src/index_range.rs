//! Half-open bin interval describing an effect's working range

use std::ops::Range;

use crate::error::RangeError;

/// `[begin, end)` over frequency bins, `begin <= end` always holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct IndexRange {
    begin: u16,
    end: u16,
}

impl IndexRange {
    /// Panics if `begin > end`
    pub fn new(begin: u16, end: u16) -> Self {
        assert!(begin <= end, "invalid index range: {begin} > {end}");
        Self { begin, end }
    }

    pub fn try_new(begin: u16, end: u16) -> Result<Self, RangeError> {
        if begin <= end {
            Ok(Self { begin, end })
        } else {
            Err(RangeError { begin, end })
        }
    }

    /// Range from first to last, both inclusive
    pub fn inclusive(first: u16, last: u16) -> Self {
        Self::new(first, end_after(last))
    }

    #[inline]
    pub fn begin(&self) -> u16 {
        self.begin
    }

    #[inline]
    pub fn end(&self) -> u16 {
        self.end
    }

    #[inline]
    pub fn first(&self) -> u16 {
        self.begin
    }

    /// Last index inside the range; meaningless for an empty range
    #[inline]
    pub fn last(&self) -> u16 {
        debug_assert!(!self.is_empty());
        self.end.wrapping_sub(1)
    }

    #[inline]
    pub fn size(&self) -> u16 {
        self.end - self.begin
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Move the beginning, keeping the end
    pub fn set_first(&mut self, first: u16) {
        assert!(first <= self.end, "invalid index range: {first} > {}", self.end);
        self.begin = first;
    }

    /// Move the end so that `last` is the final included index
    pub fn set_last(&mut self, last: u16) {
        let end = end_after(last);
        assert!(self.begin <= end, "invalid index range: {} > {end}", self.begin);
        self.end = end;
    }

    /// Replace both bounds, `last` inclusive
    pub fn set_new_range(&mut self, first: u16, last: u16) {
        *self = Self::inclusive(first, last);
    }

    #[inline]
    pub fn contains(&self, index: u16) -> bool {
        (self.begin..self.end).contains(&index)
    }

    /// As a `usize` range for slicing
    #[inline]
    pub fn as_range(&self) -> Range<usize> {
        usize::from(self.begin)..usize::from(self.end)
    }
}

fn end_after(last: u16) -> u16 {
    match last.checked_add(1) {
        Some(end) => end,
        None => panic!("invalid index range: last {last} has no end"),
    }
}
