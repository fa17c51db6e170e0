use crate::fs::{FsError, MAX_FILES, MAX_NAME_LEN};

/// Directory entry mapping a filename to its content chain. `head` is the
/// chain table index of the first node, `None` while the file is empty.
#[derive(Debug, Clone)]
pub struct FileRecord {
    pub name: String,
    pub size: usize,
    pub head: Option<usize>,
}

/// Fixed-capacity linear directory of file records. Lookups are O(MAX_FILES)
/// scans, which is the point at this scale.
pub struct FileTable {
    slots: Vec<Option<FileRecord>>,
}

impl FileTable {
    pub fn new() -> Self {
        Self {
            slots: vec![None; MAX_FILES],
        }
    }

    pub fn find(&self, name: &str) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.as_ref().map_or(false, |rec| rec.name == name))
    }

    pub fn get(&self, index: usize) -> &FileRecord {
        self.slots[index].as_ref().expect("empty file table slot")
    }

    pub fn get_mut(&mut self, index: usize) -> &mut FileRecord {
        self.slots[index].as_mut().expect("empty file table slot")
    }

    /// Inserts an empty record for `name` and returns its slot index.
    pub fn insert(&mut self, name: &str) -> Result<usize, FsError> {
        if name.chars().count() > MAX_NAME_LEN {
            return Err(FsError::FilenameTooLong);
        }
        if self.find(name).is_some() {
            return Err(FsError::FileAlreadyExists(name.to_string()));
        }

        let free = self
            .slots
            .iter()
            .position(|slot| slot.is_none())
            .ok_or(FsError::MaxFilesReached)?;

        self.slots[free] = Some(FileRecord {
            name: name.to_string(),
            size: 0,
            head: None,
        });
        Ok(free)
    }

    /// Clears a slot, returning its record. The record's chain must already
    /// have been released.
    pub fn remove(&mut self, index: usize) -> FileRecord {
        self.slots[index].take().expect("empty file table slot")
    }

    /// Snapshot of live filenames in slot order.
    pub fn names(&self) -> Vec<String> {
        self.slots
            .iter()
            .filter_map(|slot| slot.as_ref().map(|rec| rec.name.clone()))
            .collect()
    }
}
