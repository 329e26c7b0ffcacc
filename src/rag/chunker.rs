//! Fixed-window text chunking with overlap.
//!
//! Windows are measured in characters (Unicode scalar values), so a chunk
//! boundary never falls inside a multi-byte character.

use serde::{Deserialize, Serialize};

use crate::core::errors::RagError;

/// Validated chunk boundary parameters.
///
/// Construction guarantees `0 <= overlap < chunk_size`, so the stride is
/// always positive and chunking always terminates. Deserialization goes
/// through the same check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawChunkingConfig")]
pub struct ChunkingConfig {
    chunk_size: usize,
    overlap: usize,
}

#[derive(Deserialize)]
struct RawChunkingConfig {
    chunk_size: usize,
    overlap: usize,
}

impl TryFrom<RawChunkingConfig> for ChunkingConfig {
    type Error = RagError;

    fn try_from(raw: RawChunkingConfig) -> Result<Self, Self::Error> {
        ChunkingConfig::new(raw.chunk_size, raw.overlap)
    }
}

impl ChunkingConfig {
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self, RagError> {
        if chunk_size == 0 {
            return Err(RagError::Configuration(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if overlap >= chunk_size {
            return Err(RagError::Configuration(format!(
                "overlap ({}) must be smaller than chunk_size ({})",
                overlap, chunk_size
            )));
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Distance between the starts of consecutive chunks. Always `>= 1`.
    pub fn stride(&self) -> usize {
        self.chunk_size - self.overlap
    }
}

/// Half-open `[start, end)` character range of one chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSpan {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone)]
pub struct Chunker {
    config: ChunkingConfig,
}

impl Chunker {
    pub fn new(config: ChunkingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    /// Character spans of every chunk of a text `total_chars` long.
    pub fn chunk_spans(&self, total_chars: usize) -> Vec<ChunkSpan> {
        let chunk_size = self.config.chunk_size;
        let stride = self.config.stride();

        let mut spans = Vec::new();
        let mut start = 0;
        loop {
            let end = (start + chunk_size).min(total_chars);
            if end == total_chars {
                // an empty text has no terminal window worth emitting
                if total_chars > 0 {
                    spans.push(ChunkSpan { start, end });
                }
                break;
            }
            spans.push(ChunkSpan { start, end });
            start += stride;
        }
        spans
    }

    /// Split `text` into ordered, overlapping chunks.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        self.chunk_spans(chars.len())
            .into_iter()
            .map(|span| chars[span.start..span.end].iter().collect())
            .collect()
    }
}
