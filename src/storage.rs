use std::fs;
use std::io;
use std::path::PathBuf;

use crate::error::Result;

/// Durable home of the high score, the only state that outlives a game
pub trait HighScoreStore {
    /// Returns the stored score, or `None` if nothing has been stored yet
    fn load(&self) -> Result<Option<u32>>;
    fn save(&mut self, score: u32) -> Result<()>;
}

/// Keeps the score as plain text in a single file
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStore { path: path.into() }
    }
}

impl HighScoreStore for FileStore {
    fn load(&self) -> Result<Option<u32>> {
        match fs::read_to_string(&self.path) {
            Ok(text) => match text.trim().parse() {
                Ok(score) => Ok(Some(score)),
                Err(_) => Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("{} does not hold a score", self.path.display()),
                )
                .into()),
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, score: u32) -> Result<()> {
        fs::write(&self.path, score.to_string())?;
        Ok(())
    }
}

/// Session-only store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    score: Option<u32>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_score(score: u32) -> Self {
        MemoryStore { score: Some(score) }
    }
}

impl HighScoreStore for MemoryStore {
    fn load(&self) -> Result<Option<u32>> {
        Ok(self.score)
    }

    fn save(&mut self, score: u32) -> Result<()> {
        self.score = Some(score);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("gridsnake-{}-{}", name, std::process::id()))
    }

    #[test]
    fn test_missing_file_loads_none() {
        let store = FileStore::new(temp_path("missing"));
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_file_store_persists() {
        let path = temp_path("persist");
        let mut store = FileStore::new(&path);
        store.save(120).unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.load().unwrap(), Some(120));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_garbage_is_an_error() {
        let path = temp_path("garbage");
        fs::write(&path, "not a number").unwrap();

        let error = FileStore::new(&path).load().unwrap_err();
        assert!(error.to_string().contains("does not hold a score"), "{}", error);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        assert_eq!(store.load().unwrap(), None);
        store.save(30).unwrap();
        assert_eq!(store.load().unwrap(), Some(30));
        assert_eq!(MemoryStore::with_score(7).load().unwrap(), Some(7));
    }
}
