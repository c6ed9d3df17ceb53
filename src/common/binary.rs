//! Binary data parsing utilities.
//!
//! The only binary structure this crate reads is the header of the embedded
//! query package, which is a sequence of little-endian length-prefixed blocks.

use zerocopy::{FromBytes, LE, U32};

/// Binary parsing error type
#[derive(Debug, Clone)]
pub enum BinaryError {
    /// Not enough data to read the requested type
    InsufficientData { expected: usize, available: usize },
    /// Failed to parse the data
    ParseError(String),
}

impl std::fmt::Display for BinaryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinaryError::InsufficientData {
                expected,
                available,
            } => {
                write!(
                    f,
                    "Insufficient data: expected {}, got {}",
                    expected, available
                )
            },
            BinaryError::ParseError(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for BinaryError {}

/// Result type for binary operations
pub type BinaryResult<T> = Result<T, BinaryError>;

/// Read a little-endian u32 from a byte slice at the given offset.
///
/// # Examples
///
/// ```
/// use pbixkit::common::binary::read_u32_le;
/// let data = [0x78, 0x56, 0x34, 0x12];
/// assert_eq!(read_u32_le(&data, 0).unwrap(), 0x12345678);
/// ```
#[inline]
pub fn read_u32_le(data: &[u8], offset: usize) -> BinaryResult<u32> {
    let end = offset.checked_add(4).ok_or_else(|| {
        BinaryError::ParseError("offset overflow".to_string())
    })?;
    if end > data.len() {
        return Err(BinaryError::InsufficientData {
            expected: end,
            available: data.len(),
        });
    }
    U32::<LE>::read_from_bytes(&data[offset..end])
        .map(|v| v.get())
        .map_err(|_| BinaryError::ParseError("Failed to read u32".to_string()))
}

/// Read a u32 length prefix at `offset` and return the block that follows it.
///
/// Returns the block and the offset just past it.
pub fn read_length_prefixed(data: &[u8], offset: usize) -> BinaryResult<(&[u8], usize)> {
    let len = read_u32_le(data, offset)? as usize;
    let start = offset + 4;
    let end = start
        .checked_add(len)
        .ok_or_else(|| BinaryError::ParseError("block length overflow".to_string()))?;
    if end > data.len() {
        return Err(BinaryError::InsufficientData {
            expected: end,
            available: data.len(),
        });
    }
    Ok((&data[start..end], end))
}
