//! Strongly-typed identifiers for zones, sprites, buffers and generations.

use std::fmt;

/// Identifies a resource zone.
///
/// Zones are numbered densely from zero; the zone directory is sized
/// once at startup and indexed directly by `ZoneId`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ZoneId(pub u16);

impl ZoneId {
    /// Index into a dense per-zone table.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u16> for ZoneId {
    fn from(v: u16) -> Self {
        Self(v)
    }
}

/// Identifies a displayed sprite.
///
/// Assigned by the animation scheduler when a sprite is spawned; the
/// arena only ever reads it for diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpriteId(pub u32);

impl fmt::Display for SpriteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for SpriteId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Arena pass counter.
///
/// Incremented every time the allocation cursor wraps back to the arena
/// base, and on reset/unfreeze. Two ranges with identical offsets but
/// different generations describe different contents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Generation(pub u32);

impl Generation {
    /// The following generation, wrapping on overflow.
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The three buffer slots a zone can own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BufferKind {
    /// Main graphics / frame data.
    Primary,
    /// Overlay graphics.
    Secondary,
    /// Sound effects.
    Audio,
}

impl BufferKind {
    /// All kinds in directory scan order.
    pub const ALL: [BufferKind; 3] = [Self::Primary, Self::Secondary, Self::Audio];

    /// Slot index within a zone entry.
    pub fn index(self) -> usize {
        match self {
            Self::Primary => 0,
            Self::Secondary => 1,
            Self::Audio => 2,
        }
    }

    /// Short lowercase name, used in log output.
    pub fn name(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::Audio => "audio",
        }
    }
}

impl fmt::Display for BufferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Names one decodable resource block: a zone's buffer of a given kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ResourceRef {
    /// Owning zone.
    pub zone: ZoneId,
    /// Which of the zone's buffers.
    pub kind: BufferKind,
}

impl ResourceRef {
    /// Create a resource reference.
    pub fn new(zone: ZoneId, kind: BufferKind) -> Self {
        Self { zone, kind }
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "zone {}/{}", self.zone, self.kind)
    }
}
