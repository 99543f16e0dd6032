use std::collections::BTreeMap;
use std::io::{self, Cursor};
use std::sync::Arc;

use super::{FileType, Vfs, VfsFile};

/// In-memory filesystem. Directories exist implicitly wherever a file path
/// has a prefix.
#[derive(Debug, Clone, Default)]
pub struct MemVfs {
    files: BTreeMap<String, Arc<[u8]>>,
}

impl MemVfs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, contents: impl AsRef<[u8]>) {
        let path = path.into().trim_matches('/').to_string();
        self.files.insert(path, Arc::from(contents.as_ref()));
    }

    pub fn remove(&mut self, path: &str) -> bool {
        self.files.remove(path.trim_matches('/')).is_some()
    }

    fn is_dir(&self, path: &str) -> bool {
        if path.is_empty() {
            return true;
        }
        let prefix = format!("{path}/");
        self.files.range(prefix.clone()..).next().is_some_and(|(k, _)| k.starts_with(&prefix))
    }
}

fn not_found(path: &str) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("'{path}' does not exist"))
}

impl Vfs for MemVfs {
    fn enumerate(&self, dir: &str) -> io::Result<Vec<String>> {
        let dir = dir.trim_matches('/');
        if !self.is_dir(dir) {
            return Err(not_found(dir));
        }
        let prefix = if dir.is_empty() { String::new() } else { format!("{dir}/") };
        let mut names: Vec<String> = self
            .files
            .keys()
            .filter_map(|k| k.strip_prefix(prefix.as_str()))
            .map(|rest| rest.split('/').next().unwrap_or(rest).to_string())
            .collect();
        names.dedup();
        Ok(names)
    }

    fn stat(&self, path: &str) -> io::Result<FileType> {
        let path = path.trim_matches('/');
        if self.files.contains_key(path) {
            Ok(FileType::Regular)
        } else if self.is_dir(path) {
            Ok(FileType::Directory)
        } else {
            Err(not_found(path))
        }
    }

    fn open(&self, path: &str) -> io::Result<VfsFile> {
        let path = path.trim_matches('/');
        let data = self.files.get(path).ok_or_else(|| not_found(path))?.clone();
        let len = data.len() as u64;
        Ok(VfsFile::new(Cursor::new(data), len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn implicit_directories() {
        let mut vfs = MemVfs::new();
        vfs.insert("a/b/c.txt", "x");
        vfs.insert("a/d.txt", "y");
        assert_eq!(vfs.stat("a").unwrap(), FileType::Directory);
        assert_eq!(vfs.stat("a/b").unwrap(), FileType::Directory);
        assert_eq!(vfs.stat("a/d.txt").unwrap(), FileType::Regular);
        assert!(vfs.stat("a/b/c").is_err());
        assert_eq!(vfs.enumerate("a").unwrap(), ["b", "d.txt"]);
        assert_eq!(vfs.enumerate("").unwrap(), ["a"]);
    }

    #[test]
    fn sibling_prefix_is_not_a_directory() {
        let mut vfs = MemVfs::new();
        vfs.insert("ab/c", "x");
        assert!(vfs.stat("a").is_err());
    }

    #[test]
    fn open_missing() {
        assert_eq!(MemVfs::new().open("nope").unwrap_err().kind(), io::ErrorKind::NotFound);
    }
}
