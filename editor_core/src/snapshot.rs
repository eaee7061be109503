//! Editor snapshot for deterministic parity testing

use crate::Position;
use alloc::string::String;
use alloc::vec::Vec;

#[cfg(feature = "serde_support")]
use serde::{Deserialize, Serialize};

/// Complete editor state snapshot for parity testing
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub struct EditorSnapshot {
    pub cursor: Position,
    pub lines: Vec<String>,
    pub dirty: bool,
    pub mark: Option<usize>,
    pub undo_depth: usize,
    pub top_line: usize,
    pub margin: usize,
}

impl EditorSnapshot {
    /// Compute a deterministic hash of the snapshot state
    /// This is used for fast comparison in parity tests
    #[cfg(test)]
    pub fn hash(&self) -> u64 {
        use sha2::{Digest, Sha256};

        let mut hasher = Sha256::new();

        hasher.update(self.cursor.row.to_le_bytes());
        hasher.update(self.cursor.col.to_le_bytes());

        for line in &self.lines {
            hasher.update(line.as_bytes());
            hasher.update(b"\n");
        }

        hasher.update([self.dirty as u8]);

        // usize::MAX stands in for "no mark"
        hasher.update(self.mark.unwrap_or(usize::MAX).to_le_bytes());

        hasher.update(self.undo_depth.to_le_bytes());
        hasher.update(self.top_line.to_le_bytes());
        hasher.update(self.margin.to_le_bytes());

        let result = hasher.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&result[..8]);
        u64::from_le_bytes(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn snapshot(cursor: Position) -> EditorSnapshot {
        EditorSnapshot {
            cursor,
            lines: vec!["hello".into(), "world".into()],
            dirty: false,
            mark: None,
            undo_depth: 0,
            top_line: 0,
            margin: 0,
        }
    }

    #[test]
    fn test_snapshot_hash_deterministic() {
        let snap = snapshot(Position::zero());
        assert_eq!(snap.hash(), snap.clone().hash(), "Hash should be deterministic");
    }

    #[test]
    fn test_snapshot_hash_different_for_different_state() {
        assert_ne!(
            snapshot(Position::new(0, 0)).hash(),
            snapshot(Position::new(0, 1)).hash(),
            "Different states should have different hashes"
        );

        let mut marked = snapshot(Position::zero());
        marked.mark = Some(0);
        assert_ne!(marked.hash(), snapshot(Position::zero()).hash());
    }

    #[test]
    fn test_line_boundaries_affect_hash() {
        let mut joined = snapshot(Position::zero());
        joined.lines = vec!["helloworld".into()];
        assert_ne!(joined.hash(), snapshot(Position::zero()).hash());
    }
}
