//! Boundary to the container reader and the decoders.
//!
//! The arena never parses resource files. A [`ResourceSource`] reports
//! how many bytes each of a zone's buffers needs and fills a buffer the
//! loader has already allocated.

use crate::error::DecodeError;
use crate::id::{BufferKind, ResourceRef, ZoneId};

/// Decoded sizes of a zone's buffers, read from the resource header.
///
/// A `None` slot means the zone has no buffer of that kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResourceHeader {
    sizes: [Option<u32>; 3],
}

impl ResourceHeader {
    /// A header declaring only a primary buffer.
    pub fn primary(size: u32) -> Self {
        Self::default().with(BufferKind::Primary, size)
    }

    /// Declare a buffer of `kind`.
    pub fn with(mut self, kind: BufferKind, size: u32) -> Self {
        self.sizes[kind.index()] = Some(size);
        self
    }

    /// Decoded size of `kind`, if the zone has one.
    pub fn size(&self, kind: BufferKind) -> Option<u32> {
        self.sizes[kind.index()]
    }

    /// Declared kinds with their sizes, in primary, secondary, audio order.
    pub fn buffers(&self) -> impl Iterator<Item = (BufferKind, u32)> + '_ {
        BufferKind::ALL
            .iter()
            .filter_map(move |&kind| self.size(kind).map(|size| (kind, size)))
    }

    /// Sum of all declared sizes.
    pub fn total_size(&self) -> u64 {
        self.buffers().map(|(_, size)| u64::from(size)).sum()
    }
}

/// Supplier of resource headers and decoded bytes.
pub trait ResourceSource {
    /// Read the header of `zone`'s resource.
    fn header(&self, zone: ZoneId) -> Result<ResourceHeader, DecodeError>;

    /// Decode `resource` into `buf`, which is exactly the declared size.
    fn decode_into(&self, buf: &mut [u8], resource: ResourceRef) -> Result<(), DecodeError>;
}
