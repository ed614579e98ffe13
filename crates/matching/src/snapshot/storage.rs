// Copyright 2025 itscheems
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::{
	fs,
	path::{Path, PathBuf},
};

use tracing::info;

use super::{ExchangeSnapshot, SnapshotError, SnapshotMetadata};

const FILE_PREFIX: &str = "snapshot-";
const FILE_SUFFIX: &str = ".json";

/// Snapshot Storage trait - persistence layer for snapshots
///
/// This abstraction allows different backing stores:
/// - In-memory (testing)
/// - Local filesystem (pretty-printed JSON)
pub trait SnapshotStorage: Send {
	/// Save a snapshot
	fn save(&mut self, snapshot: &ExchangeSnapshot) -> Result<(), SnapshotError>;

	/// Load the snapshot with the highest sequence number
	fn load_latest(&self) -> Result<ExchangeSnapshot, SnapshotError>;

	/// List all available snapshots, oldest first
	fn list_snapshots(&self) -> Result<Vec<SnapshotMetadata>, SnapshotError>;
}

/// In-memory snapshot storage
pub struct MemorySnapshotStorage {
	snapshots: Vec<ExchangeSnapshot>,
}

impl MemorySnapshotStorage {
	pub fn new() -> Self {
		Self {
			snapshots: Vec::new(),
		}
	}
}

impl Default for MemorySnapshotStorage {
	fn default() -> Self {
		Self::new()
	}
}

impl SnapshotStorage for MemorySnapshotStorage {
	fn save(&mut self, snapshot: &ExchangeSnapshot) -> Result<(), SnapshotError> {
		self.snapshots.push(snapshot.clone());
		self.snapshots.sort_by_key(|s| s.metadata.sequence);
		Ok(())
	}

	fn load_latest(&self) -> Result<ExchangeSnapshot, SnapshotError> {
		self.snapshots.last().cloned().ok_or(SnapshotError::NotFound)
	}

	fn list_snapshots(&self) -> Result<Vec<SnapshotMetadata>, SnapshotError> {
		Ok(self.snapshots.iter().map(|s| s.metadata.clone()).collect())
	}
}

/// Filesystem snapshot storage
///
/// Each snapshot is written as `snapshot-{sequence}.json` in the storage
/// directory, with the sequence zero-padded so that lexical order matches
/// sequence order.
pub struct FileSnapshotStorage {
	dir: PathBuf,
}

impl FileSnapshotStorage {
	/// Open (and create if needed) a snapshot directory
	pub fn new(dir: impl AsRef<Path>) -> Result<Self, SnapshotError> {
		let dir = dir.as_ref().to_path_buf();
		fs::create_dir_all(&dir)?;
		Ok(Self { dir })
	}

	pub fn dir(&self) -> &Path {
		&self.dir
	}

	fn snapshot_files(&self) -> Result<Vec<PathBuf>, SnapshotError> {
		let mut files = Vec::new();
		for entry in fs::read_dir(&self.dir)? {
			let path = entry?.path();
			let is_snapshot = path
				.file_name()
				.and_then(|name| name.to_str())
				.is_some_and(|name| name.starts_with(FILE_PREFIX) && name.ends_with(FILE_SUFFIX));
			if is_snapshot {
				files.push(path);
			}
		}
		files.sort();
		Ok(files)
	}

	fn read(path: &Path) -> Result<ExchangeSnapshot, SnapshotError> {
		let data = fs::read(path)?;
		Ok(serde_json::from_slice(&data)?)
	}
}

impl SnapshotStorage for FileSnapshotStorage {
	fn save(&mut self, snapshot: &ExchangeSnapshot) -> Result<(), SnapshotError> {
		let path = self.dir.join(format!(
			"{}{:020}{}",
			FILE_PREFIX, snapshot.metadata.sequence, FILE_SUFFIX
		));
		let data = serde_json::to_vec_pretty(snapshot)?;
		fs::write(&path, data)?;

		info!(target: "engine", "Snapshot written to {}", path.display());
		Ok(())
	}

	fn load_latest(&self) -> Result<ExchangeSnapshot, SnapshotError> {
		let files = self.snapshot_files()?;
		let latest = files.last().ok_or(SnapshotError::NotFound)?;
		Self::read(latest)
	}

	fn list_snapshots(&self) -> Result<Vec<SnapshotMetadata>, SnapshotError> {
		self.snapshot_files()?
			.iter()
			.map(|path| Self::read(path).map(|s| s.metadata))
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use bourse_sdk::types::Symbol;

	use super::*;

	fn create_test_snapshot(sequence: u64) -> ExchangeSnapshot {
		ExchangeSnapshot {
			metadata: SnapshotMetadata {
				created_at: 1000,
				sequence,
				order_count: 0,
				balance_count: 0,
			},
			quote_symbol: Symbol::new("DAI").unwrap(),
			tokens: vec![Symbol::new("DAI").unwrap()],
			balances: Vec::new(),
			books: Vec::new(),
			next_order_id: 1,
			next_trade_id: 1,
			next_sequence: sequence,
		}
	}

	#[test]
	fn test_memory_storage_latest() {
		let mut storage = MemorySnapshotStorage::new();
		assert!(matches!(storage.load_latest(), Err(SnapshotError::NotFound)));

		storage.save(&create_test_snapshot(20)).unwrap();
		storage.save(&create_test_snapshot(10)).unwrap();

		assert_eq!(storage.load_latest().unwrap().metadata.sequence, 20);
		let listed: Vec<_> = storage
			.list_snapshots()
			.unwrap()
			.into_iter()
			.map(|m| m.sequence)
			.collect();
		assert_eq!(listed, vec![10, 20]);
	}

	#[test]
	fn test_file_storage_latest() {
		let dir = tempfile::tempdir().unwrap();
		let mut storage = FileSnapshotStorage::new(dir.path().join("snapshots")).unwrap();
		assert!(matches!(storage.load_latest(), Err(SnapshotError::NotFound)));

		storage.save(&create_test_snapshot(9)).unwrap();
		storage.save(&create_test_snapshot(100)).unwrap();
		fs::write(storage.dir().join("notes.txt"), b"ignored").unwrap();

		let latest = storage.load_latest().unwrap();
		assert_eq!(latest, create_test_snapshot(100));
		assert_eq!(storage.list_snapshots().unwrap().len(), 2);
	}
}
