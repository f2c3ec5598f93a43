//! # Persistence Format
//!
//! Binary encoding of one submission row, as stored by `RedbSheet`.
//!
//! Format: Header (5 bytes) + postcard-serialized row.
//! - 4 bytes: Magic ("SRVY")
//! - 1 byte: Version
//!
//! Size and header are checked before the payload is parsed.

use crate::batcher::SubmissionRow;
use crate::{SurveyError, primitives};

/// Maximum accepted size of one encoded row.
pub const MAX_ROW_PAYLOAD_SIZE: usize = 64 * 1024;

/// Header length in bytes.
const HEADER_SIZE: usize = 5;

// =============================================================================
// ROW HEADER
// =============================================================================

/// The header that precedes every encoded row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowHeader {
    pub magic: [u8; 4],
    pub version: u8,
}

impl RowHeader {
    /// Create a header with the current format version.
    #[must_use]
    pub fn new() -> Self {
        Self {
            magic: *primitives::MAGIC_BYTES,
            version: primitives::FORMAT_VERSION,
        }
    }

    /// Validate the header.
    pub fn validate(&self) -> Result<(), SurveyError> {
        if &self.magic != primitives::MAGIC_BYTES {
            return Err(SurveyError::SerializationError(
                "Invalid magic bytes".to_string(),
            ));
        }
        if self.version != primitives::FORMAT_VERSION {
            return Err(SurveyError::SerializationError(format!(
                "Unsupported version: {} (expected {})",
                self.version,
                primitives::FORMAT_VERSION
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4] = self.version;
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SurveyError> {
        let Some(header) = bytes.get(..HEADER_SIZE) else {
            return Err(SurveyError::SerializationError(
                "Header too short".to_string(),
            ));
        };
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&header[0..4]);
        Ok(Self {
            magic,
            version: header[4],
        })
    }
}

impl Default for RowHeader {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// SERIALIZATION FUNCTIONS
// =============================================================================

/// Encode a row (header + payload).
pub fn row_to_bytes(row: &SubmissionRow) -> Result<Vec<u8>, SurveyError> {
    let payload =
        postcard::to_stdvec(row).map_err(|e| SurveyError::SerializationError(e.to_string()))?;

    let mut result = Vec::with_capacity(HEADER_SIZE + payload.len());
    result.extend_from_slice(&RowHeader::new().to_bytes());
    result.extend_from_slice(&payload);
    Ok(result)
}

/// Decode a row produced by [`row_to_bytes`].
pub fn row_from_bytes(bytes: &[u8]) -> Result<SubmissionRow, SurveyError> {
    if bytes.len() > MAX_ROW_PAYLOAD_SIZE {
        return Err(SurveyError::SerializationError(format!(
            "Data size {} bytes exceeds maximum allowed {} bytes",
            bytes.len(),
            MAX_ROW_PAYLOAD_SIZE
        )));
    }

    let header = RowHeader::from_bytes(bytes)?;
    header.validate()?;

    postcard::from_bytes(&bytes[HEADER_SIZE..]).map_err(|e| {
        SurveyError::SerializationError(format!("Failed to deserialize row: {}", e))
    })
}

// =============================================================================
// TESTS
// =============================================================================
