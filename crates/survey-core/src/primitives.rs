//! # Survey Primitives
//!
//! Fixed constants of the survey workflow.
//!
//! The survey starts with no respondent data but a fixed shape.
//! These primitives are compiled into the binary and are immutable at runtime.

/// Maximum number of free-text indicators a respondent may propose per category.
pub const MAX_ADDITIONS_PER_CATEGORY: usize = 2;

/// Recommended minimum number of predefined picks per category.
///
/// Categories with at least one but fewer than this many picks raise an
/// advisory warning. It is never enforced at submission.
pub const RECOMMENDED_MIN_SELECTIONS: usize = 2;

/// Label prefix that marks a respondent-proposed indicator.
pub const NEW_INDICATOR_PREFIX: &str = "(NUEVO) ";

/// Number of cells in a submission row.
pub const ROW_WIDTH: usize = 11;

/// Timestamp layout shared by every row of one submission (strftime syntax).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Magic bytes for the encoded row format.
pub const MAGIC_BYTES: &[u8; 4] = b"SRVY";

/// Current row encoding version.
///
/// Increment this when making breaking changes to the row encoding.
pub const FORMAT_VERSION: u8 = 1;

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum length in bytes for an indicator label (predefined or proposed).
pub const MAX_LABEL_LENGTH: usize = 512;

/// Maximum length in bytes for free-text profile fields (name, profession).
pub const MAX_PROFILE_FIELD_LENGTH: usize = 256;

/// Maximum length in bytes for a category name in a custom catalog.
pub const MAX_CATEGORY_LENGTH: usize = 256;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_free_text_slots() {
        assert_eq!(MAX_ADDITIONS_PER_CATEGORY, 2);
    }

    #[test]
    fn row_has_eleven_cells() {
        assert_eq!(ROW_WIDTH, 11);
    }

    #[test]
    fn magic_bytes_correct() {
        assert_eq!(MAGIC_BYTES, b"SRVY");
    }
}
