//! Result of a virtual-memory peek.

use serde::Serialize;

/// Bytes read through a hart's address translation, or the fact that they
/// could not be observed.
///
/// `Unmapped` is distinct from a run of zero bytes: it means at least one
/// byte of the range was unmapped, denied, or outside every memory region.
///
/// ```
/// use hammer_core::MemoryRead;
///
/// let read = MemoryRead::Mapped { bytes: vec![1, 0, 2, 0], granularity: 2 };
/// assert_eq!(read.elements(), Some(vec![1, 2]));
/// assert_eq!(read.to_u64_le(), Some(0x0002_0001));
/// assert!(MemoryRead::Unmapped.bytes().is_none());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum MemoryRead {
    /// Every byte was readable.
    Mapped {
        /// Raw bytes in address order.
        bytes: Vec<u8>,
        /// Element size requested by the caller.
        granularity: usize,
    },
    /// Some byte was not observable.
    Unmapped,
}

impl MemoryRead {
    /// Raw bytes, or `None` when unmapped.
    pub fn bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Mapped { bytes, .. } => Some(bytes),
            Self::Unmapped => None,
        }
    }

    /// Whether the read succeeded.
    pub const fn is_mapped(&self) -> bool {
        matches!(self, Self::Mapped { .. })
    }

    /// Little-endian elements of `granularity` bytes each.
    ///
    /// `None` when unmapped or when `granularity` is not between 1 and 8.
    pub fn elements(&self) -> Option<Vec<u64>> {
        let Self::Mapped { bytes, granularity } = self else {
            return None;
        };
        if !(1..=8).contains(granularity) {
            return None;
        }
        Some(bytes.chunks(*granularity).map(le_value).collect())
    }

    /// The first eight bytes (or fewer) as one little-endian integer.
    pub fn to_u64_le(&self) -> Option<u64> {
        self.bytes().map(|b| le_value(&b[..b.len().min(8)]))
    }
}

fn le_value(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .rev()
        .fold(0, |acc, &b| (acc << 8) | u64::from(b))
}
