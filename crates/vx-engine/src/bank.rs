//! Read-only phoneme buffer snapshot for the render thread.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::sync::Arc;
use vx_ir::PhonemeBuffer;

/// Immutable map from phoneme name to decoded buffer.
///
/// Built off the real-time path (see `SampleCache::bank`) and swapped into
/// the renderer whole. Lookups borrow the key and never allocate.
#[derive(Clone, Debug, Default)]
pub struct SampleBank {
    buffers: BTreeMap<String, Arc<PhonemeBuffer>>,
}

impl SampleBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, phoneme: &str) -> Option<&PhonemeBuffer> {
        self.buffers.get(phoneme).map(|b| &**b)
    }

    pub fn has(&self, phoneme: &str) -> bool {
        self.buffers.contains_key(phoneme)
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    pub fn phonemes(&self) -> impl Iterator<Item = &str> {
        self.buffers.keys().map(String::as_str)
    }
}

impl FromIterator<(String, Arc<PhonemeBuffer>)> for SampleBank {
    fn from_iter<I: IntoIterator<Item = (String, Arc<PhonemeBuffer>)>>(iter: I) -> Self {
        Self {
            buffers: iter.into_iter().collect(),
        }
    }
}
