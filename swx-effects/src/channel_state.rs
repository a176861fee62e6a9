//! Per-channel effect state laid out in shared storage
//!
//! Every state fragment implements [`ChannelState`]: it reports how many
//! bytes it needs for given [`StorageFactors`], claims its buffers from a
//! [`Storage`] cursor and can clear itself. Fragments compose as tuples,
//! laid out in tuple order, so a compound state is just
//! `(AnalysisChannelState, SynthesisChannelState)`.
//!
//! [`ChannelStates`] owns the arena and one state per audio channel.

use std::mem::size_of;

use swx_engine::{align, BufferRange, SharedStorage, Storage, StorageError, StorageFactors};
use tracing::debug;

/// State carried between process calls for one audio channel
pub trait ChannelState {
    /// Bytes of shared storage needed for `factors`
    fn required_storage(factors: &StorageFactors) -> usize
    where
        Self: Sized;

    /// Claim this state's buffers from `storage`
    fn resize(
        &mut self,
        factors: &StorageFactors,
        storage: &mut Storage,
    ) -> Result<(), StorageError>;

    /// Clear all state; `storage` is the channel's region of the arena
    fn reset(&mut self, storage: &mut [f32]);
}

/// Stateless effects
impl ChannelState for () {
    fn required_storage(_: &StorageFactors) -> usize {
        0
    }

    fn resize(&mut self, _: &StorageFactors, _: &mut Storage) -> Result<(), StorageError> {
        Ok(())
    }

    fn reset(&mut self, _: &mut [f32]) {}
}

macro_rules! compound_channel_state {
    ($($fragment:ident),+) => {
        impl<$($fragment: ChannelState),+> ChannelState for ($($fragment,)+) {
            fn required_storage(factors: &StorageFactors) -> usize {
                0 $(+ align($fragment::required_storage(factors)))+
            }

            #[allow(non_snake_case)]
            fn resize(
                &mut self,
                factors: &StorageFactors,
                storage: &mut Storage,
            ) -> Result<(), StorageError> {
                let ($($fragment,)+) = self;
                $($fragment.resize(factors, storage)?;)+
                Ok(())
            }

            #[allow(non_snake_case)]
            fn reset(&mut self, storage: &mut [f32]) {
                let ($($fragment,)+) = self;
                $($fragment.reset(storage);)+
            }
        }
    };
}

compound_channel_state!(A, B);
compound_channel_state!(A, B, C);
compound_channel_state!(A, B, C, D);

/// One `f32` per bin, DC and Nyquist included
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HalfFftBuffer {
    range: BufferRange,
}

impl HalfFftBuffer {
    #[inline]
    pub fn range(&self) -> BufferRange {
        self.range
    }

    #[inline]
    pub fn get<'a>(&self, storage: &'a [f32]) -> &'a [f32] {
        self.range.slice(storage)
    }

    #[inline]
    pub fn get_mut<'a>(&self, storage: &'a mut [f32]) -> &'a mut [f32] {
        self.range.slice_mut(storage)
    }
}

impl ChannelState for HalfFftBuffer {
    fn required_storage(factors: &StorageFactors) -> usize {
        usize::from(factors.number_of_bins()) * size_of::<f32>()
    }

    fn resize(
        &mut self,
        factors: &StorageFactors,
        storage: &mut Storage,
    ) -> Result<(), StorageError> {
        self.range = storage.allocate(Self::required_storage(factors))?;
        Ok(())
    }

    fn reset(&mut self, storage: &mut [f32]) {
        self.get_mut(storage).fill(0.0);
    }
}

/// Owner of the shared arena and every channel's state
///
/// Each channel gets an equally sized, aligned region of the arena; its
/// state's buffer ranges are relative to that region. Regions are disjoint,
/// so channels can be processed independently.
#[derive(Debug, Default)]
pub struct ChannelStates<S> {
    arena: SharedStorage,
    channels: Vec<S>,
    region_len: usize,
    factors: Option<StorageFactors>,
}

impl<S: ChannelState + Default> ChannelStates<S> {
    pub fn new() -> Self {
        Self {
            arena: SharedStorage::new(),
            channels: Vec::new(),
            region_len: 0,
            factors: None,
        }
    }

    /// Lay out and reset all channel states for `factors`
    ///
    /// Reallocates only when the factors differ from the last successful call.
    pub fn configure(&mut self, factors: StorageFactors) -> Result<(), StorageError> {
        if self.factors == Some(factors) {
            return Ok(());
        }
        self.factors = None;

        let region_bytes = align(S::required_storage(&factors));
        let channel_count = usize::from(factors.number_of_channels);
        self.arena.resize(region_bytes * channel_count);
        self.region_len = region_bytes / size_of::<f32>();
        self.channels.clear();
        self.channels.resize_with(channel_count, S::default);

        let regions = split_regions(self.arena.as_mut_slice(), self.region_len, channel_count);
        for (state, region) in self.channels.iter_mut().zip(regions) {
            let mut storage = Storage::new(region_bytes);
            state.resize(&factors, &mut storage)?;
            state.reset(region);
        }

        self.factors = Some(factors);
        debug!(
            channels = channel_count,
            bytes_per_channel = region_bytes,
            fft_size = factors.fft_size,
            "Configured channel state storage"
        );
        Ok(())
    }

    /// Reset every channel, e.g. on a transport discontinuity
    pub fn reset(&mut self) {
        let regions = split_regions(
            self.arena.as_mut_slice(),
            self.region_len,
            self.channels.len(),
        );
        for (state, region) in self.channels.iter_mut().zip(regions) {
            state.reset(region);
        }
    }

    /// Factors of the current layout, `None` until configured
    pub fn factors(&self) -> Option<StorageFactors> {
        self.factors
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// One channel's state together with its storage region
    pub fn channel_mut(&mut self, index: usize) -> Option<(&mut S, &mut [f32])> {
        let state = self.channels.get_mut(index)?;
        let start = index * self.region_len;
        let region = &mut self.arena.as_mut_slice()[start..start + self.region_len];
        Some((state, region))
    }

    /// Every channel's state with its storage region
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&mut S, &mut [f32])> {
        let regions = split_regions(
            self.arena.as_mut_slice(),
            self.region_len,
            self.channels.len(),
        );
        self.channels.iter_mut().zip(regions)
    }
}

fn split_regions(
    memory: &mut [f32],
    region_len: usize,
    count: usize,
) -> impl Iterator<Item = &mut [f32]> {
    let mut rest = memory;
    (0..count).map(move |_| {
        let (region, tail) = std::mem::take(&mut rest).split_at_mut(region_len);
        rest = tail;
        region
    })
}
