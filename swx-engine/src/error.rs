//! Error types for engine configuration and storage layout

use std::io;

use thiserror::Error;

/// Rejected engine setup values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SetupError {
    #[error("FFT size {0} is not a power of two in the supported range")]
    InvalidFftSize(u32),
    #[error("overlap factor {overlap} is not valid for FFT size {fft_size}")]
    InvalidOverlapFactor { overlap: u32, fft_size: u32 },
    #[error("sample rate must be non-zero")]
    InvalidSampleRate,
    #[error("number of channels must be non-zero")]
    InvalidChannelCount,
}

/// Shared storage too small for the requested channel-state layout
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("not enough shared storage space: {required} bytes required, {available} available")]
    Insufficient { required: usize, available: usize },
}

/// Invalid bin range bounds
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid index range: begin {begin} is past end {end}")]
pub struct RangeError {
    pub begin: u16,
    pub end: u16,
}

/// Engine configuration parsing and loading failures
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("line {line}: invalid value {value:?} for {key}")]
    InvalidValue {
        line: usize,
        key: String,
        value: String,
    },
    #[error("unknown window {0:?}")]
    UnknownWindow(String),
    #[error("invalid setup: {0}")]
    Setup(#[from] SetupError),
}
