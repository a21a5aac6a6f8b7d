//! Bounded store of decoded phoneme buffers.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::sync::Arc;
use slotmap::SlotMap;
use vx_ir::{BufferShape, PhonemeBuffer};

use crate::bank::SampleBank;

slotmap::new_key_type! {
    /// Key for an entry in the cache's slot storage.
    pub(crate) struct EntryKey;
}

/// Default cache ceiling: 64 MiB of tracked 16-bit audio.
pub const DEFAULT_CEILING_BYTES: usize = 64 * 1024 * 1024;

/// Sample cache sizing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheConfig {
    /// Aggregate tracked size that triggers a cleanup pass
    pub ceiling_bytes: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ceiling_bytes: DEFAULT_CEILING_BYTES }
    }
}

/// Allocation primitive for shaped buffers (normally the audio device).
pub trait BufferAllocator {
    fn allocate(&self, shape: BufferShape) -> PhonemeBuffer;
}

/// Allocates silent buffers on the heap.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeapAllocator;

impl BufferAllocator for HeapAllocator {
    fn allocate(&self, shape: BufferShape) -> PhonemeBuffer {
        PhonemeBuffer::new(shape)
    }
}

/// How an entry was inserted, and therefore how it is found.
#[derive(Clone, Debug, PartialEq, Eq)]
enum EntryLabel {
    Shape(BufferShape),
    Phoneme(String),
}

#[derive(Debug)]
struct CacheEntry {
    label: EntryLabel,
    buffer: Arc<PhonemeBuffer>,
    /// Bytes billed at insert; unbilled exactly once on removal.
    bytes: usize,
    last_used: u64,
}

/// LRU cache of phoneme buffers under a byte ceiling.
///
/// Entries are found either by acoustic shape (scratch buffers from
/// [`SampleCache::get_or_create`]) or by phoneme name (decoded assets from
/// [`SampleCache::insert_phoneme`]). When an insert would push the tracked
/// size over the ceiling, least-recently-used entries are evicted down to
/// half the ceiling before the new entry goes in.
///
/// Single writer. The render thread never touches the cache; it reads an
/// immutable [`SampleBank`] snapshot instead.
#[derive(Debug)]
pub struct SampleCache {
    entries: SlotMap<EntryKey, CacheEntry>,
    by_shape: BTreeMap<BufferShape, EntryKey>,
    by_phoneme: BTreeMap<String, EntryKey>,
    ceiling: usize,
    size: usize,
    clock: u64,
}

impl SampleCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: SlotMap::with_key(),
            by_shape: BTreeMap::new(),
            by_phoneme: BTreeMap::new(),
            ceiling: config.ceiling_bytes,
            size: 0,
            clock: 0,
        }
    }

    /// Aggregate tracked size of all entries, in bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn ceiling(&self) -> usize {
        self.ceiling
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a buffer by shape, allocating and inserting it on a miss.
    pub fn get_or_create(
        &mut self,
        shape: BufferShape,
        allocator: &impl BufferAllocator,
    ) -> Arc<PhonemeBuffer> {
        if let Some(&key) = self.by_shape.get(&shape) {
            return self.touch(key);
        }

        let buffer = Arc::new(allocator.allocate(shape));
        let key = self.insert_entry(EntryLabel::Shape(shape), buffer.clone());
        self.by_shape.insert(shape, key);
        buffer
    }

    /// Insert (or replace) the decoded buffer for `phoneme`.
    pub fn insert_phoneme(&mut self, phoneme: &str, buffer: PhonemeBuffer) -> Arc<PhonemeBuffer> {
        self.remove(phoneme);

        let buffer = Arc::new(buffer);
        let key = self.insert_entry(EntryLabel::Phoneme(String::from(phoneme)), buffer.clone());
        self.by_phoneme.insert(String::from(phoneme), key);
        buffer
    }

    /// Returns true if a buffer is cached for `phoneme`.
    pub fn has(&self, phoneme: &str) -> bool {
        self.by_phoneme.contains_key(phoneme)
    }

    /// Fetch the buffer for `phoneme`, marking it most recently used.
    pub fn get(&mut self, phoneme: &str) -> Option<Arc<PhonemeBuffer>> {
        let key = *self.by_phoneme.get(phoneme)?;
        Some(self.touch(key))
    }

    /// Remove the buffer for `phoneme`. Returns true if it was present.
    pub fn remove(&mut self, phoneme: &str) -> bool {
        match self.by_phoneme.remove(phoneme) {
            Some(key) => {
                self.release(key);
                true
            }
            None => false,
        }
    }

    /// Evict least-recently-used entries until the tracked size is at most
    /// half the ceiling. Returns the number of entries evicted.
    pub fn cleanup(&mut self) -> usize {
        let target = self.ceiling / 2;
        let mut evicted = 0;
        while self.size > target && self.evict_lru() {
            evicted += 1;
        }
        tracing::debug!(evicted, size = self.size, ceiling = self.ceiling, "sample cache cleanup");
        evicted
    }

    /// Immutable snapshot of all phoneme entries for the renderer.
    pub fn bank(&self) -> SampleBank {
        self.by_phoneme
            .iter()
            .filter_map(|(name, key)| {
                self.entries.get(*key).map(|e| (name.clone(), e.buffer.clone()))
            })
            .collect()
    }

    fn insert_entry(&mut self, label: EntryLabel, buffer: Arc<PhonemeBuffer>) -> EntryKey {
        let bytes = buffer.tracked_bytes();
        if self.size + bytes > self.ceiling {
            self.cleanup();
            // Half the ceiling may still not leave room for a large entry.
            while self.size + bytes > self.ceiling && self.evict_lru() {}
            if bytes > self.ceiling {
                tracing::warn!(bytes, ceiling = self.ceiling, "buffer larger than cache ceiling");
            }
        }

        self.clock += 1;
        self.size += bytes;
        self.entries.insert(CacheEntry {
            label,
            buffer,
            bytes,
            last_used: self.clock,
        })
    }

    fn touch(&mut self, key: EntryKey) -> Arc<PhonemeBuffer> {
        self.clock += 1;
        let entry = &mut self.entries[key];
        entry.last_used = self.clock;
        entry.buffer.clone()
    }

    fn evict_lru(&mut self) -> bool {
        let lru = self
            .entries
            .iter()
            .min_by_key(|(_, e)| e.last_used)
            .map(|(key, _)| key);

        match lru {
            Some(key) => {
                if let Some(entry) = self.entries.get(key) {
                    match &entry.label {
                        EntryLabel::Shape(shape) => {
                            self.by_shape.remove(shape);
                        }
                        EntryLabel::Phoneme(name) => {
                            self.by_phoneme.remove(name.as_str());
                        }
                    }
                }
                self.release(key);
                true
            }
            None => false,
        }
    }

    fn release(&mut self, key: EntryKey) {
        if let Some(entry) = self.entries.remove(key) {
            self.size -= entry.bytes;
        }
    }
}

impl Default for SampleCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}
