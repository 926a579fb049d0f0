//! Versioned bitmap codec
//!
//! Every flag enumeration on the wire maps each constant to a bit
//! position *per protocol version*; a constant may be undefined for some
//! versions, and the set of defined bits differs per version. Decoding
//! and encoding must consult the per-version table, never a single
//! global mask.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::info;

use super::error::{Error, Result};
use super::version::ProtocolVersion;

/// A flag enumeration whose wire bit position is version-dependent.
pub trait WireBitmap: Sized + Copy + Eq + 'static {
    /// Every constant of this enumeration.
    const ALL: &'static [Self];

    /// Name of the flag family, for error reporting.
    const FAMILY: &'static str;

    /// The bit for this flag in the given version, or `None` if the flag
    /// is not defined for that version.
    fn bit(self, pv: ProtocolVersion) -> Option<u32>;

    /// Mask of all bits defined for the given version.
    #[must_use]
    fn known_mask(pv: ProtocolVersion) -> u32 {
        Self::ALL.iter().filter_map(|f| f.bit(pv)).fold(0, |m, b| m | b)
    }
}

// Default is non-strict: undefined bits are masked to zero before decode.
static STRICT_PARSE: AtomicBool = AtomicBool::new(false);

/// Set bitmap parsing to strict or non-strict, process-wide.
///
/// In strict mode, set bits that map to no known constant cause a
/// [`Error::BadBits`] failure. In non-strict mode (the default) such bits
/// are silently cleared before decoding.
pub fn set_strict_parsing(strict: bool) {
    STRICT_PARSE.store(strict, Ordering::Relaxed);
    info!(strict, "strict message parsing {}", if strict { "ON" } else { "OFF" });
}

/// True if strict bitmap parsing is in effect.
#[must_use]
pub fn strict_parsing() -> bool {
    STRICT_PARSE.load(Ordering::Relaxed)
}

/// Decode a wire bitmap into the set of flags it carries, ordered by bit
/// position.
///
/// Bits defined for *some* version but not `pv` are a
/// [`Error::VersionMismatch`]; bits defined for no version at all follow
/// the strict/non-strict mode.
pub fn decode_bitmap<T: WireBitmap>(bitmap: u32, pv: ProtocolVersion) -> Result<Vec<T>> {
    let known_any = ProtocolVersion::ALL
        .iter()
        .fold(0u32, |m, &v| m | T::known_mask(v));

    let mut bitmap = bitmap;
    let junk = bitmap & !known_any;
    if junk != 0 {
        if strict_parsing() {
            return Err(Error::BadBits { what: T::FAMILY, bits: junk, version: pv });
        }
        bitmap &= known_any;
    }

    let here = T::known_mask(pv);
    let misversioned = bitmap & !here;
    if misversioned != 0 {
        return Err(Error::VersionMismatch { what: T::FAMILY, version: pv });
    }

    let mut flags = Vec::new();
    for &f in T::ALL {
        if let Some(bit) = f.bit(pv) {
            if bitmap & bit != 0 {
                flags.push(f);
            }
        }
    }
    Ok(flags)
}

/// Encode a set of flags as a wire bitmap for the given version.
///
/// Any flag not applicable to `pv` is a [`Error::VersionMismatch`].
pub fn encode_bitmap<T: WireBitmap>(flags: &[T], pv: ProtocolVersion) -> Result<u32> {
    let mut bitmap = 0u32;
    for &f in flags {
        let bit = f
            .bit(pv)
            .ok_or(Error::VersionMismatch { what: T::FAMILY, version: pv })?;
        bitmap |= bit;
    }
    Ok(bitmap)
}
