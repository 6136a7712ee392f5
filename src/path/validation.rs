use crate::constants::MAX_SEGMENT_CHAR;
use crate::constants::MIN_SEGMENT_CHAR;
use crate::constants::RESERVED_SEGMENT;
use crate::constants::SEGMENT_SEPARATOR;
use crate::UsageError;

fn check_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment.chars().all(|c| (MIN_SEGMENT_CHAR..=MAX_SEGMENT_CHAR).contains(&c))
        && segment != "."
        && segment != ".."
        && segment != RESERVED_SEGMENT
}

/// Splits a path into its segments.
///
/// The empty string is the root path and yields no segments. Any other path
/// must start with `/`, and every segment after it must be non-empty printable
/// ASCII, other than `.`, `..` and `zookeeper`.
///
/// # Errors
/// [`UsageError`] carrying the whole input if any part of it is malformed.
pub fn disassemble_path(path: &str) -> std::result::Result<Vec<String>, UsageError> {
    if path.is_empty() {
        return Ok(Vec::new());
    }

    let rest = path
        .strip_prefix(SEGMENT_SEPARATOR)
        .ok_or_else(|| UsageError::new("invalid path", path))?;

    rest.split(SEGMENT_SEPARATOR)
        .map(|segment| {
            if check_segment(segment) {
                Ok(segment.to_string())
            } else {
                Err(UsageError::new("invalid path", path))
            }
        })
        .collect()
}

/// Splits a key into its segments. Same grammar as [`disassemble_path`], but a
/// key names an entry and so can not be the root.
pub fn disassemble_key(key: &str) -> std::result::Result<Vec<String>, UsageError> {
    let segments = disassemble_path(key)?;
    if segments.is_empty() {
        return Err(UsageError::new("invalid key", key));
    }
    Ok(segments)
}

/// Serializes segments back into a path: `/` followed by the `/`-joined
/// segments, or the empty string for the root.
pub fn assemble_path<S: AsRef<str>>(segments: &[S]) -> String {
    let mut path = String::new();
    for segment in segments {
        path.push(SEGMENT_SEPARATOR);
        path.push_str(segment.as_ref());
    }
    path
}

/// Serializes the segments of a key. Same format as [`assemble_path`].
pub fn assemble_key<S: AsRef<str>>(segments: &[S]) -> String {
    debug_assert!(!segments.is_empty(), "a key has at least one segment");
    assemble_path(segments)
}
