use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};

use super::{FileType, Vfs, VfsFile};

/// Filesystem rooted on a host directory. Paths may not escape the root.
#[derive(Debug, Clone)]
pub struct DirVfs {
    root: PathBuf,
}

impl DirVfs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> io::Result<PathBuf> {
        let rel = Path::new(path.trim_matches('/'));
        if rel.components().any(|c| !matches!(c, Component::Normal(_) | Component::CurDir)) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("'{path}' is not a plain relative path"),
            ));
        }
        Ok(self.root.join(rel))
    }
}

impl Vfs for DirVfs {
    fn enumerate(&self, dir: &str) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(self.resolve(dir)?)? {
            let entry = entry?;
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => log::warn!("skipping non-UTF-8 file name {:?} in '{dir}'", raw),
            }
        }
        names.sort();
        Ok(names)
    }

    fn stat(&self, path: &str) -> io::Result<FileType> {
        let meta = fs::metadata(self.resolve(path)?)?;
        Ok(if meta.is_file() {
            FileType::Regular
        } else if meta.is_dir() {
            FileType::Directory
        } else {
            FileType::Other
        })
    }

    fn open(&self, path: &str) -> io::Result<VfsFile> {
        let file = File::open(self.resolve(path)?)?;
        let len = file.metadata()?.len();
        Ok(VfsFile::new(file, len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_parent_components() {
        let vfs = DirVfs::new(".");
        assert_eq!(vfs.open("../secret").unwrap_err().kind(), io::ErrorKind::InvalidInput);
        assert_eq!(vfs.stat("/etc/../x").unwrap_err().kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn reads_host_files() {
        let root = std::env::temp_dir().join(format!("resdef-dirvfs-{}", std::process::id()));
        fs::create_dir_all(root.join("defs/sub")).unwrap();
        fs::write(root.join("defs/sub/a.def"), "mat \"a\" {}").unwrap();

        let vfs = DirVfs::new(&root);
        assert_eq!(vfs.enumerate("defs").unwrap(), ["sub"]);
        assert_eq!(vfs.stat("defs/sub").unwrap(), FileType::Directory);
        assert_eq!(super::super::read_all(&vfs, "defs/sub/a.def").unwrap(), b"mat \"a\" {}");

        fs::remove_dir_all(&root).unwrap();
    }
}
