//! Wrapping step counter for periodic re-triggering

use swx_engine::{Storage, StorageError, StorageFactors};

use crate::channel_state::ChannelState;

/// 16-bit counter that wraps at a caller-supplied modulo
///
/// Effects use it to fire something every N steps, e.g. picking new
/// random target bins every few hundred milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModuloCounter {
    counter: u16,
}

impl ModuloCounter {
    #[inline]
    pub fn value(&self) -> u16 {
        self.counter
    }

    #[inline]
    pub fn reset(&mut self) {
        self.counter = 0;
    }

    /// Advance, returning the new value and whether the counter wrapped
    pub fn next_value_for(&mut self, modulo: u16) -> (u16, bool) {
        let next = u32::from(self.counter) + 1;
        if next >= u32::from(modulo) {
            self.counter = 0;
            (0, true)
        } else {
            self.counter = next as u16;
            (self.counter, false)
        }
    }
}

impl ChannelState for ModuloCounter {
    fn required_storage(_: &StorageFactors) -> usize {
        0
    }

    fn resize(&mut self, _: &StorageFactors, _: &mut Storage) -> Result<(), StorageError> {
        Ok(())
    }

    fn reset(&mut self, _: &mut [f32]) {
        ModuloCounter::reset(self);
    }
}
