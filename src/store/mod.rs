// Purpose: persistent sample storage. Maps key positions through a fixed
// assignment table to mono PCM buffers the render side streams from.
//
// The PCM was recorded at SOURCE_RATE and is played at OUTPUT_RATE with no
// resampling in between. That is not a bug to correct: the constant pitch
// shift is part of the instrument.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::backend::SampleId;
use crate::io::converter::{bytes_to_pcm16, pcm16_to_f32};
use crate::{KEY_HIGH, KEY_LOW, KEY_SPAN};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read sample data: {0}")]
    Io(#[from] std::io::Error),
    #[error("raw PCM has an odd byte length ({0} bytes; samples are 16-bit)")]
    OddLength(usize),
    #[error("sample table is full ({0} entries)")]
    TableFull(usize),
    #[error("assignment references sample {id} but only {count} are loaded")]
    UnknownSample { id: SampleId, count: usize },
    #[error("assignment range {low}..={high} is outside the playable keys")]
    BadKeyRange { low: u8, high: u8 },
}

/// Declarative description of a store: which files to load and which key
/// ranges play which sample.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone)]
pub struct SampleManifest {
    /// Raw i16 LE mono PCM files, in [`SampleId`] order.
    pub files: Vec<PathBuf>,
    pub assignments: Vec<KeyAssignment>,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct KeyAssignment {
    pub low: u8,
    pub high: u8,
    pub sample: SampleId,
}

/// The fixed key → sample mapping plus the PCM it points at.
///
/// Cloning is cheap (the PCM is shared), which lets the control context and
/// the render context each hold the same store.
#[derive(Clone)]
pub struct SampleStore {
    pcm: Vec<Arc<[f32]>>,
    map: Vec<SampleId>, // KEY_SPAN entries, indexed by key - KEY_LOW
}

impl SampleStore {
    /// An empty store; every key maps to sample 0 until assigned.
    pub fn new() -> Self {
        Self {
            pcm: Vec::new(),
            map: vec![0; KEY_SPAN],
        }
    }

    pub fn from_manifest(manifest: &SampleManifest) -> Result<Self, StoreError> {
        let mut store = Self::new();
        for path in &manifest.files {
            store.load_raw(path)?;
        }
        for a in &manifest.assignments {
            store.assign(a.low, a.high, a.sample)?;
        }
        Ok(store)
    }

    /// Add a decoded mono buffer; returns its id.
    pub fn add_pcm(&mut self, frames: Vec<f32>) -> Result<SampleId, StoreError> {
        if self.pcm.len() > SampleId::MAX as usize {
            return Err(StoreError::TableFull(self.pcm.len()));
        }
        let id = self.pcm.len() as SampleId;
        self.pcm.push(frames.into());
        Ok(id)
    }

    /// Load a raw signed 16-bit little-endian mono PCM file.
    pub fn load_raw(&mut self, path: impl AsRef<Path>) -> Result<SampleId, StoreError> {
        let bytes = fs::read(path)?;
        if bytes.len() % 2 != 0 {
            return Err(StoreError::OddLength(bytes.len()));
        }
        self.add_pcm(pcm16_to_f32(&bytes_to_pcm16(&bytes)))
    }

    /// Point every key in `low..=high` at `sample`.
    pub fn assign(&mut self, low: u8, high: u8, sample: SampleId) -> Result<(), StoreError> {
        if low < KEY_LOW || high > KEY_HIGH || low > high {
            return Err(StoreError::BadKeyRange { low, high });
        }
        if (sample as usize) >= self.pcm.len() {
            return Err(StoreError::UnknownSample {
                id: sample,
                count: self.pcm.len(),
            });
        }
        for key in low..=high {
            self.map[(key - KEY_LOW) as usize] = sample;
        }
        Ok(())
    }

    /// The sample bound to `key`, or `None` outside the playable range.
    pub fn sample_for(&self, key: u8) -> Option<SampleId> {
        if !(KEY_LOW..=KEY_HIGH).contains(&key) {
            return None;
        }
        Some(self.map[(key - KEY_LOW) as usize])
    }

    /// The PCM behind an id. A cheap clone; the render side holds one while
    /// a voice streams from it.
    pub fn frames(&self, id: SampleId) -> Option<Arc<[f32]>> {
        self.pcm.get(id as usize).cloned()
    }

    pub fn len(&self) -> usize {
        self.pcm.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pcm.is_empty()
    }
}

impl Default for SampleStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_samples(n: usize) -> SampleStore {
        let mut store = SampleStore::new();
        for i in 0..n {
            store.add_pcm(vec![i as f32; 4]).unwrap();
        }
        store
    }

    #[test]
    fn keys_outside_the_range_map_to_nothing() {
        let store = store_with_samples(1);
        assert_eq!(store.sample_for(KEY_LOW - 1), None);
        assert_eq!(store.sample_for(KEY_HIGH + 1), None);
        assert_eq!(store.sample_for(KEY_LOW), Some(0));
        assert_eq!(store.sample_for(KEY_HIGH), Some(0));
    }

    #[test]
    fn assignment_covers_its_key_range_only() {
        let mut store = store_with_samples(2);
        store.assign(40, 50, 1).unwrap();
        assert_eq!(store.sample_for(39), Some(0));
        assert_eq!(store.sample_for(40), Some(1));
        assert_eq!(store.sample_for(50), Some(1));
        assert_eq!(store.sample_for(51), Some(0));
    }

    #[test]
    fn assignment_validates_range_and_sample() {
        let mut store = store_with_samples(1);
        assert!(matches!(
            store.assign(KEY_LOW - 1, 40, 0),
            Err(StoreError::BadKeyRange { .. })
        ));
        assert!(matches!(
            store.assign(40, 50, 7),
            Err(StoreError::UnknownSample { id: 7, .. })
        ));
    }

    #[test]
    fn frames_round_trip_through_the_store() {
        let mut store = SampleStore::new();
        let id = store.add_pcm(vec![0.25, -0.25]).unwrap();
        let frames = store.frames(id).unwrap();
        assert_eq!(&frames[..], &[0.25, -0.25]);
        assert_eq!(store.frames(id + 1), None);
    }
}
