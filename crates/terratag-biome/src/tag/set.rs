//! Bounded, ordered, duplicate-free tag output.

use std::hash::{Hash, Hasher};

use super::BiomeTag;

/// Maximum number of tags a single classification can produce.
pub const MAX_TAGS: usize = 8;

static_assertions::assert_eq_size!(BiomeTag, u16);

/// Output of one classification: up to [`MAX_TAGS`] distinct tags in
/// descending rule priority.
///
/// Callers own the storage; the classifier only writes into it. A `TagSet`
/// lives inline (no heap), so it can sit on a worker's stack or in a
/// preallocated result buffer.
#[derive(Clone, Copy, Debug, Default)]
pub struct TagSet {
    tags: [BiomeTag; MAX_TAGS],
    len: u8,
}

impl TagSet {
    /// Creates an empty set.
    pub const fn new() -> Self {
        Self {
            tags: [BiomeTag(0); MAX_TAGS],
            len: 0,
        }
    }

    /// Removes every tag.
    ///
    /// Stale entries past the count are left in place; they are never exposed.
    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// The retained tags, highest priority first.
    #[inline]
    pub fn as_slice(&self) -> &[BiomeTag] {
        &self.tags[..self.len as usize]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` once [`MAX_TAGS`] tags are held.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len as usize == MAX_TAGS
    }

    #[inline]
    pub fn contains(&self, tag: BiomeTag) -> bool {
        self.as_slice().contains(&tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = BiomeTag> + '_ {
        self.as_slice().iter().copied()
    }

    /// Appends `tag` unless it is already present or the set is full.
    ///
    /// Returns `true` if the tag was appended.
    #[inline]
    pub fn push(&mut self, tag: BiomeTag) -> bool {
        if self.is_full() || self.contains(tag) {
            return false;
        }
        self.tags[self.len as usize] = tag;
        self.len += 1;
        true
    }

    /// Copies the tags into a caller-owned buffer and reports the count.
    ///
    /// Only `buf[..count]` is written.
    ///
    /// # Panics
    ///
    /// Panics if `buf` is shorter than [`MAX_TAGS`].
    pub fn write_to(&self, buf: &mut [BiomeTag], count: &mut usize) {
        assert!(
            buf.len() >= MAX_TAGS,
            "tag buffer holds {} tags, needs at least {MAX_TAGS}",
            buf.len()
        );
        let n = self.len();
        buf[..n].copy_from_slice(self.as_slice());
        *count = n;
    }
}

impl PartialEq for TagSet {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for TagSet {}

impl Hash for TagSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}

impl<'a> IntoIterator for &'a TagSet {
    type Item = &'a BiomeTag;
    type IntoIter = std::slice::Iter<'a, BiomeTag>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_suppresses_duplicates() {
        let mut set = TagSet::new();
        assert!(set.push(BiomeTag(3)));
        assert!(set.push(BiomeTag(1)));
        assert!(!set.push(BiomeTag(3)));
        assert_eq!(set.as_slice(), &[BiomeTag(3), BiomeTag(1)]);
    }

    #[test]
    fn test_push_stops_at_capacity() {
        let mut set = TagSet::new();
        for i in 1..=MAX_TAGS as u16 {
            assert!(set.push(BiomeTag(i)));
        }
        assert!(set.is_full());
        assert!(!set.push(BiomeTag(100)));
        assert_eq!(set.len(), MAX_TAGS);
        assert!(!set.contains(BiomeTag(100)));
    }

    #[test]
    fn test_clear_hides_previous_tags() {
        let mut set = TagSet::new();
        set.push(BiomeTag(7));
        set.clear();
        assert!(set.is_empty());
        assert!(!set.contains(BiomeTag(7)));
        assert_eq!(set.iter().count(), 0);
    }

    #[test]
    fn test_write_to_only_touches_prefix() {
        let mut set = TagSet::new();
        set.push(BiomeTag(5));
        set.push(BiomeTag(9));

        let mut buf = [BiomeTag(0xFFFF); MAX_TAGS];
        let mut count = usize::MAX;
        set.write_to(&mut buf, &mut count);

        assert_eq!(count, 2);
        assert_eq!(&buf[..2], &[BiomeTag(5), BiomeTag(9)]);
        assert!(buf[2..].iter().all(|&t| t == BiomeTag(0xFFFF)));
    }

    #[test]
    fn test_write_to_accepts_longer_buffer() {
        let mut set = TagSet::new();
        set.push(BiomeTag(3));

        let mut buf = vec![BiomeTag(0xFFFF); MAX_TAGS + 4];
        let mut count = 0;
        set.write_to(&mut buf, &mut count);

        assert_eq!(count, 1);
        assert_eq!(buf[0], BiomeTag(3));
        assert!(buf[1..].iter().all(|&t| t == BiomeTag(0xFFFF)));
    }

    #[test]
    #[should_panic(expected = "needs at least")]
    fn test_write_to_rejects_short_buffer() {
        let set = TagSet::new();
        let mut buf = [BiomeTag(0); MAX_TAGS - 1];
        let mut count = 0;
        set.write_to(&mut buf, &mut count);
    }

    #[test]
    fn test_equality_ignores_stale_entries() {
        let mut a = TagSet::new();
        a.push(BiomeTag(1));
        a.push(BiomeTag(2));
        a.push(BiomeTag(3));
        a.clear();
        a.push(BiomeTag(4));

        let mut b = TagSet::new();
        b.push(BiomeTag(4));

        assert_eq!(a, b);
    }
}
