//! Types for the processor module.

use std::fmt;

/// Generated artifacts for one unit: a still image and its narration.
#[derive(Clone, PartialEq, Eq)]
pub struct Clip {
    /// Index of the unit this clip was generated from.
    pub index: usize,
    pub visual: Vec<u8>,
    pub audio: Vec<u8>,
}

impl Clip {
    pub fn new(index: usize, visual: Vec<u8>, audio: Vec<u8>) -> Self {
        Self {
            index,
            visual,
            audio,
        }
    }
}

// Byte buffers are summarized so failures stay readable in logs.
impl fmt::Debug for Clip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Clip")
            .field("index", &self.index)
            .field("visual_bytes", &self.visual.len())
            .field("audio_bytes", &self.audio.len())
            .finish()
    }
}
