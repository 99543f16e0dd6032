//! Virtual filesystem the resource cache reads through.
//!
//! Paths are `/`-separated and relative to the filesystem root, e.g.
//! `defs/ui/panel.def`. The empty string names the root itself.

mod dir;
mod mem;

use std::fmt;
use std::io::{self, Read, Seek, SeekFrom};

pub use dir::DirVfs;
pub use mem::MemVfs;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FileType {
    Regular,
    Directory,
    Other,
}

/// Read access to a tree of files.
pub trait Vfs: Send {
    /// Names (not paths) of the entries directly under `dir`, sorted.
    fn enumerate(&self, dir: &str) -> io::Result<Vec<String>>;

    fn stat(&self, path: &str) -> io::Result<FileType>;

    fn open(&self, path: &str) -> io::Result<VfsFile>;
}

trait ReadSeek: Read + Seek + Send {}

impl<T: Read + Seek + Send> ReadSeek for T {}

/// Sequential reader over one file that knows its total length.
pub struct VfsFile {
    inner: Box<dyn ReadSeek>,
    len:   u64,
}

impl VfsFile {
    pub fn new(inner: impl Read + Seek + Send + 'static, len: u64) -> Self {
        Self { inner: Box::new(inner), len }
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Read for VfsFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Seek for VfsFile {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}

impl fmt::Debug for VfsFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VfsFile").field("len", &self.len).finish_non_exhaustive()
    }
}

/// Joins a directory and an entry name the way [`Vfs::enumerate`] results are
/// meant to be joined.
pub fn join(dir: &str, name: &str) -> String {
    let dir = dir.trim_end_matches('/');
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{dir}/{name}")
    }
}

/// Reads a whole file.
pub fn read_all(vfs: &dyn Vfs, path: &str) -> io::Result<Vec<u8>> {
    let mut file = vfs.open(path)?;
    let mut buf = Vec::with_capacity(file.len() as usize);
    file.read_to_end(&mut buf)?;
    Ok(buf)
}

/// Reads exactly `len` bytes starting at `offset`.
pub fn read_range(vfs: &dyn Vfs, path: &str, offset: u64, len: usize) -> io::Result<Vec<u8>> {
    let mut file = vfs.open(path)?;
    if offset.saturating_add(len as u64) > file.len() {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("range {offset}+{len} is past the end of '{path}' ({} bytes)", file.len()),
        ));
    }
    file.seek(SeekFrom::Start(offset))?;
    let mut buf = vec![0; len];
    file.read_exact(&mut buf)?;
    Ok(buf)
}

/// Every regular file under `dir`, recursively, in enumeration order.
///
/// Entries that cannot be stat'ed are logged and skipped.
pub fn walk_files(vfs: &dyn Vfs, dir: &str) -> io::Result<Vec<String>> {
    let mut out = Vec::new();
    walk_into(vfs, dir, &mut out)?;
    Ok(out)
}

fn walk_into(vfs: &dyn Vfs, dir: &str, out: &mut Vec<String>) -> io::Result<()> {
    for name in vfs.enumerate(dir)? {
        let path = join(dir, &name);
        match vfs.stat(&path) {
            Ok(FileType::Regular) => out.push(path),
            Ok(FileType::Directory) => {
                if let Err(e) = walk_into(vfs, &path, out) {
                    log::error!("unable to enumerate '{path}': {e}");
                }
            }
            Ok(FileType::Other) => {}
            Err(e) => log::error!("unable to stat '{path}': {e}"),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MemVfs {
        let mut vfs = MemVfs::new();
        vfs.insert("defs/a.def", "mat \"a\" {}");
        vfs.insert("defs/ui/b.def", "0123456789");
        vfs.insert("defs/ui/deep/c.def", "");
        vfs.insert("fonts/sans.db", "{}");
        vfs
    }

    #[test] fn join_root() { assert_eq!(join("", "x"), "x"); }
    #[test] fn join_dir() { assert_eq!(join("defs/", "x"), "defs/x"); }

    #[test]
    fn walks_recursively() {
        let vfs = sample();
        let files = walk_files(&vfs, "defs").unwrap();
        assert_eq!(files, ["defs/a.def", "defs/ui/b.def", "defs/ui/deep/c.def"]);
    }

    #[test]
    fn reads_ranges() {
        let vfs = sample();
        assert_eq!(read_range(&vfs, "defs/ui/b.def", 2, 3).unwrap(), b"234");
        assert_eq!(read_all(&vfs, "defs/ui/b.def").unwrap().len(), 10);
        assert!(read_range(&vfs, "defs/ui/b.def", 8, 3).is_err());
    }
}
