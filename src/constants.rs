// -
// Key grammar

/// Segment reserved by ZooKeeper; rejected everywhere for portability
pub(crate) const RESERVED_SEGMENT: &str = "zookeeper";

pub(crate) const SEGMENT_SEPARATOR: char = '/';

/// Printable ASCII range allowed inside a segment
pub(crate) const MIN_SEGMENT_CHAR: char = '\u{20}';
pub(crate) const MAX_SEGMENT_CHAR: char = '\u{7E}';

// -
// Connection strings

pub(crate) const SCHEME_SEPARATOR: &str = "://";

/// Scheme of the built-in in-memory backend
pub const MEM_SCHEME: &str = "mem";

// -
// Configuration

pub(crate) const CONFIG_ENV_PREFIX: &str = "DKV";
pub(crate) const CONFIG_PATH_ENV: &str = "CONFIG_PATH";
