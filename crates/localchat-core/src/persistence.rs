use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{ChatError, Result};

/// Turn a user-entered title into a file name: spaces become underscores.
pub fn title_to_filename(title: &str) -> String {
    format!("{}.txt", title.replace(' ', "_"))
}

/// Plain-text conversation files in a single directory.
#[derive(Debug, Clone)]
pub struct ConversationStore {
    dir: PathBuf,
}

impl ConversationStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `text` under the title's file name, overwriting any existing file.
    pub fn save(&self, title: &str, text: &str) -> Result<String> {
        if title.is_empty() {
            return Err(ChatError::EmptyTitle);
        }

        let filename = title_to_filename(title);
        fs::write(self.dir.join(&filename), text)?;
        info!(file = %filename, bytes = text.len(), "conversation saved");
        Ok(filename)
    }

    pub fn list_saved(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if name.ends_with(".txt") {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn load(&self, filename: &str) -> Result<String> {
        let content = fs::read_to_string(self.dir.join(filename))?;
        info!(file = %filename, bytes = content.len(), "conversation loaded");
        Ok(content)
    }
}
