use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::{info, warn};

use crate::codec::source;
use crate::error::DialogueError;
use crate::store::DialogueStore;

/// File extensions recognised as dialogue sources
pub const SOURCE_EXTENSIONS: [&str; 2] = ["yaml", "yml"];

/// A dialogue file that could not be loaded
#[derive(Debug)]
pub struct LoadFailure {
    pub path: PathBuf,
    pub error: DialogueError,
}

/// All dialogues found in one source directory
#[derive(Debug, Default)]
pub struct Project {
    root: PathBuf,
    dialogues: IndexMap<String, DialogueStore>,
    failures: Vec<LoadFailure>,
}

impl Project {
    /// Load every `*.yaml` / `*.yml` file in `root`, in file-name order.
    ///
    /// Files that fail to load are recorded in [`Project::failures`] and
    /// skipped; empty files are skipped silently. A missing directory yields
    /// an empty project.
    pub fn load(root: impl AsRef<Path>) -> Result<Self, DialogueError> {
        let root = root.as_ref();
        let mut project = Project {
            root: root.to_path_buf(),
            ..Default::default()
        };

        if !root.exists() {
            warn!(path = %root.display(), "Dialogue directory does not exist");
            return Ok(project);
        }

        let mut files: Vec<PathBuf> = fs::read_dir(root)?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| path.is_file() && is_source_file(path))
            .collect();
        files.sort();

        for path in files {
            match source::load_file(&path) {
                Ok(Some(store)) => {
                    let id = store.dialogue().id.clone();
                    if project.dialogues.contains_key(&id) {
                        warn!(dialogue_id = %id, path = %path.display(), "Duplicate dialogue id, keeping the first");
                        project.failures.push(LoadFailure {
                            path,
                            error: DialogueError::DuplicateId(id),
                        });
                        continue;
                    }
                    project.dialogues.insert(id, store);
                }
                Ok(None) => {
                    warn!(path = %path.display(), "Empty dialogue file, skipping");
                }
                Err(error) => {
                    warn!(path = %path.display(), error = %error, "Failed to load dialogue");
                    project.failures.push(LoadFailure { path, error });
                }
            }
        }

        info!(
            path = %root.display(),
            dialogues = project.dialogues.len(),
            failures = project.failures.len(),
            "Loaded dialogue project"
        );
        Ok(project)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn get(&self, id: &str) -> Option<&DialogueStore> {
        self.dialogues.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut DialogueStore> {
        self.dialogues.get_mut(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DialogueStore> {
        self.dialogues.values()
    }

    pub fn len(&self) -> usize {
        self.dialogues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dialogues.is_empty()
    }

    pub fn failures(&self) -> &[LoadFailure] {
        &self.failures
    }

    /// Add a dialogue. Fails if a dialogue with the same id is already loaded.
    pub fn add(&mut self, store: DialogueStore) -> Result<(), DialogueError> {
        let id = store.dialogue().id.clone();
        if self.dialogues.contains_key(&id) {
            return Err(DialogueError::DuplicateId(id));
        }
        self.dialogues.insert(id, store);
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Option<DialogueStore> {
        self.dialogues.shift_remove(id)
    }
}

fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SOURCE_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}
