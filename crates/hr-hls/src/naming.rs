//! Segment file naming.

use hr_core::SegmentKind;

/// File name for the segment consuming counter value `counter`:
/// `<prefix>-<counter>-init.mp4` or `<prefix>-<counter>.m4s`.
pub fn segment_file_name(prefix: &str, counter: u64, kind: SegmentKind) -> String {
    format!("{prefix}-{counter}{}", kind.file_suffix())
}
