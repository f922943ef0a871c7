//! A concrete [`FileLayer`] backed by the local filesystem, with an
//! advisory exclusive lock held for the duration of create/update and a
//! write-to-temp-and-rename for atomicity.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::time::{Duration, Instant};

use fs4::fs_std::FileExt;

use crate::operators::FileLayer;

pub struct LocalFileLayer {
    retry_interval: Duration,
    timeout: Duration,
}

impl LocalFileLayer {
    pub fn new(retry_interval: Duration, timeout: Duration) -> Self {
        LocalFileLayer { retry_interval, timeout }
    }

    fn lock_exclusive(&self, file: &File) -> io::Result<()> {
        let deadline = Instant::now() + self.timeout;
        loop {
            match file.try_lock_exclusive() {
                Ok(true) => return Ok(()),
                Ok(false) => {}
                Err(e) => return Err(e),
            }
            if Instant::now() >= deadline {
                return Err(io::Error::other("timeout period has been exceeded"));
            }
            std::thread::sleep(self.retry_interval);
        }
    }
}

impl FileLayer for LocalFileLayer {
    fn create_file(&mut self, path: &str, bytes: &[u8]) -> io::Result<()> {
        if Path::new(path).exists() {
            return Err(io::Error::new(io::ErrorKind::AlreadyExists, format!("file {path} already exists")));
        }
        let parent_missing = Path::new(path)
            .parent()
            .map(|p| !p.as_os_str().is_empty() && !p.exists())
            .unwrap_or(false);
        if parent_missing {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("open {path}: no such file or directory"),
            ));
        }

        let file = OpenOptions::new().write(true).create_new(true).open(path)?;
        self.lock_exclusive(&file)?;
        let result = (&file).write_all(bytes);
        FileExt::unlock(&file).ok();
        result
    }

    fn update_file(&mut self, path: &str, bytes: &[u8]) -> io::Result<()> {
        if !Path::new(path).exists() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("open {path}: no such file or directory"),
            ));
        }
        let file = OpenOptions::new().write(true).open(path)?;
        self.lock_exclusive(&file)?;

        let tmp_path = format!("{path}.tmp");
        let write_result = fs::write(&tmp_path, bytes).and_then(|_| fs::rename(&tmp_path, path));

        FileExt::unlock(&file).ok();
        write_result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn create_file_then_recreate_fails_already_exists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.csv");
        let path = path.to_str().unwrap();
        let mut layer = LocalFileLayer::new(Duration::from_millis(1), Duration::from_millis(50));
        layer.create_file(path, b"a,b\n1,2").unwrap();
        let err = layer.create_file(path, b"a,b\n1,2").unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn update_file_replaces_contents_atomically() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.csv");
        let path = path.to_str().unwrap();
        let mut layer = LocalFileLayer::new(Duration::from_millis(1), Duration::from_millis(50));
        layer.create_file(path, b"a,b\n1,2").unwrap();
        layer.update_file(path, b"a,b\n3,4").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "a,b\n3,4");
    }

    #[test]
    fn update_file_missing_reports_open_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.csv");
        let mut layer = LocalFileLayer::new(Duration::from_millis(1), Duration::from_millis(50));
        let err = layer.update_file(path.to_str().unwrap(), b"x").unwrap_err();
        assert!(err.to_string().contains("no such file or directory"));
    }
}
