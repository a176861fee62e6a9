//! Engine-side building blocks for SWX frequency-domain effects
//!
//! Provides the immutable engine setup and its unit conversions, the shared
//! channel-state storage arena, bin ranges and per-frame channel views, and
//! a windowed FFT frame engine.

mod channel_data;
mod config;
mod error;
mod index_range;
mod setup;
mod stft;
mod storage;
mod window;

pub use channel_data::ChannelDataAmPh;
pub use config::EngineConfig;
pub use error::{ConfigError, RangeError, SetupError, StorageError};
pub use index_range::IndexRange;
pub use setup::{Setup, MAX_FFT_SIZE, MAX_OVERLAP_FACTOR, MIN_FFT_SIZE};
pub use stft::Stft;
pub use storage::{
    align, align_index, BufferRange, SharedStorage, Storage, StorageFactors, VECTOR_ALIGNMENT,
};
pub use window::Window;
