use std::fmt;
use std::path::Path;

use tracing::debug;

use super::arena::{Arena, DEFAULT_CAPACITY};
use super::error::PoolError;

/// Byte offset of a fragment inside a [`TextPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextOffset(u32);

impl TextOffset {
    #[must_use]
    pub const fn new(offset: u32) -> Self {
        Self(offset)
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for TextOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Append-only buffer of NUL-terminated script fragments.
///
/// Fragments are addressed by byte offset, so offsets handed out before a
/// growth still resolve to the same fragment afterwards.
#[derive(Debug, Clone)]
pub struct TextPool {
    bytes: Arena<u8>,
}

impl Default for TextPool {
    fn default() -> Self {
        Self::new()
    }
}

impl TextPool {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            bytes: Arena::with_capacity("text", bytes),
        }
    }

    /// Append a fragment and return the offset of its first byte.
    ///
    /// # Errors
    ///
    /// [`PoolError::InvalidFragment`] if `source` contains a NUL byte, or
    /// [`PoolError::AllocationFailure`] if the buffer cannot grow. The pool is
    /// unchanged on error.
    pub fn add_fragment(&mut self, source: &str) -> Result<TextOffset, PoolError> {
        if let Some(position) = source.bytes().position(|b| b == 0) {
            return Err(PoolError::InvalidFragment { position });
        }
        self.bytes.reserve_for(source.len() + 1)?;
        let offset = self.bytes.extend_from_slice(source.as_bytes())?;
        self.bytes.push(0)?;
        Ok(TextOffset(offset))
    }

    /// Read a script file and append its contents as one fragment.
    ///
    /// # Errors
    ///
    /// [`PoolError::Io`] if the file cannot be read, plus everything
    /// [`add_fragment`](Self::add_fragment) can return. A failed read appends
    /// nothing.
    pub fn add_from_file(&mut self, path: impl AsRef<Path>) -> Result<TextOffset, PoolError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let offset = self.add_fragment(&source)?;
        debug!(
            path = %path.display(),
            offset = offset.0,
            len = source.len(),
            "loaded script fragment"
        );
        Ok(offset)
    }

    /// The fragment starting at `offset`, up to (not including) its NUL.
    ///
    /// Returns `None` if `offset` lies outside the used region or does not
    /// start on a character boundary.
    #[must_use]
    pub fn fragment(&self, offset: TextOffset) -> Option<&str> {
        let tail = self.bytes.as_slice().get(offset.0 as usize..)?;
        let end = tail.iter().position(|&b| b == 0)?;
        std::str::from_utf8(&tail[..end]).ok()
    }

    /// Whether `offset` lies inside the used region.
    #[must_use]
    pub fn contains(&self, offset: TextOffset) -> bool {
        (offset.0 as usize) < self.bytes.len()
    }

    /// Bytes in use, terminators included.
    #[must_use]
    pub fn used(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.bytes.capacity()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.len() == 0
    }

    /// Double the buffer capacity.
    ///
    /// # Errors
    ///
    /// [`PoolError::AllocationFailure`] if the allocation fails.
    pub fn grow(&mut self) -> Result<(), PoolError> {
        self.bytes.grow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragments_are_nul_terminated() {
        let mut pool = TextPool::new();
        let a = pool.add_fragment("return x > 1").unwrap();
        let b = pool.add_fragment("return true").unwrap();
        assert_eq!(a, TextOffset::new(0));
        assert_eq!(b, TextOffset::new(13));
        assert_eq!(pool.used(), 25);
        assert_eq!(pool.fragment(a), Some("return x > 1"));
        assert_eq!(pool.fragment(b), Some("return true"));
    }

    #[test]
    fn offsets_survive_growth() {
        let mut pool = TextPool::with_capacity(4);
        let offsets: Vec<(TextOffset, String)> = (0..50)
            .map(|i| {
                let src = format!("return {i}");
                (pool.add_fragment(&src).unwrap(), src)
            })
            .collect();
        assert!(pool.capacity() >= pool.used());
        for (offset, src) in offsets {
            assert_eq!(pool.fragment(offset), Some(src.as_str()));
        }
    }

    #[test]
    fn growth_doubles_capacity() {
        let mut pool = TextPool::with_capacity(8);
        pool.add_fragment("0123456789").unwrap();
        assert_eq!(pool.capacity(), 16);
        pool.grow().unwrap();
        assert_eq!(pool.capacity(), 32);
    }

    #[test]
    fn empty_fragment_is_allowed() {
        let mut pool = TextPool::new();
        let offset = pool.add_fragment("").unwrap();
        assert_eq!(pool.fragment(offset), Some(""));
        assert!(pool.contains(offset));
    }

    #[test]
    fn interior_nul_is_rejected() {
        let mut pool = TextPool::new();
        let err = pool.add_fragment("ab\0cd").unwrap_err();
        assert!(matches!(err, PoolError::InvalidFragment { position: 2 }));
        assert!(pool.is_empty());
    }

    #[test]
    fn fragment_outside_used_region_is_none() {
        let mut pool = TextPool::new();
        pool.add_fragment("x").unwrap();
        assert_eq!(pool.fragment(TextOffset::new(2)), None);
        assert!(!pool.contains(TextOffset::new(2)));
    }

    #[test]
    fn missing_file_appends_nothing() {
        let mut pool = TextPool::new();
        pool.add_fragment("kept").unwrap();
        let err = pool
            .add_from_file("/definitely/not/a/real/path.lua")
            .unwrap_err();
        assert!(matches!(err, PoolError::Io(_)));
        assert_eq!(pool.used(), 5);
    }
}
