//! Loader counters.

/// Counters accumulated since the loader was created.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadMetrics {
    /// `ensure_loaded` calls answered from the directory.
    pub hits: u64,
    /// `ensure_loaded` calls that had to decode at least one buffer.
    pub loads: u64,
    /// Buffers decoded and registered.
    pub buffers_decoded: u64,
    /// Bytes decoded into registered buffers.
    pub bytes_decoded: u64,
    /// Buffers whose decode failed.
    pub decode_failures: u64,
    /// Resource headers that could not be read.
    pub header_failures: u64,
    /// Scene transitions.
    pub scenes: u64,
}
