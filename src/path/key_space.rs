use super::disassemble_key;
use super::disassemble_path;
use crate::constants::SEGMENT_SEPARATOR;
use crate::UsageError;

/// A client's view of the backend namespace, rooted at a prefix path.
///
/// User keys are mapped under the prefix before they reach a store, and keys
/// coming back from a store are mapped out again.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeySpace {
    prefix: String,
}

/// A validated key, translated into the backend namespace.
///
/// `parent` is the backend key of the entry that must exist before this key
/// can be created, or `None` if the key sits directly under the client root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedKey {
    full: String,
    parent: Option<String>,
}

impl KeySpace {
    /// # Errors
    /// [`UsageError`] if `prefix` is not a valid path.
    pub fn new(prefix: &str) -> std::result::Result<Self, UsageError> {
        disassemble_path(prefix)?;
        Ok(Self {
            prefix: prefix.to_string(),
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Validates `key` and maps it under the prefix.
    pub fn scope(
        &self,
        key: &str,
    ) -> std::result::Result<ScopedKey, UsageError> {
        disassemble_key(key)?;

        // Validated keys always start with the separator
        let parent = match key.rfind(SEGMENT_SEPARATOR) {
            Some(0) | None => None,
            Some(idx) => Some(format!("{}{}", self.prefix, &key[..idx])),
        };

        Ok(ScopedKey {
            full: format!("{}{}", self.prefix, key),
            parent,
        })
    }

    /// Maps a backend key back into this key space.
    ///
    /// Returns `None` for keys outside the prefix.
    pub fn unscope<'a>(
        &self,
        full: &'a str,
    ) -> Option<&'a str> {
        full.strip_prefix(self.prefix.as_str())
            .filter(|rest| rest.starts_with(SEGMENT_SEPARATOR))
    }
}

impl ScopedKey {
    pub fn full(&self) -> &str {
        &self.full
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }
}

impl std::fmt::Display for ScopedKey {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(&self.full)
    }
}
