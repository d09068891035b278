//! In-memory filesystem fake for testing.
//!
//! Stores files, directories, and symlinks in a `HashMap` with interior
//! mutability via `RefCell`. Supports all `Fs` trait operations including
//! symlink resolution, broken-link semantics, and directory traversal.
//!
//! Non-trait setup methods (`add_file`, `add_dir`, `add_symlink`) auto-create
//! parent directories for convenience in test setup. Trait methods mirror the
//! OS contracts: `symlink` fails on an existing link path, `remove_file`
//! refuses directories, `exists` follows links and is false for broken ones.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use super::{DirEntry, Fs, WalkOptions};

/// A single entry in the fake filesystem.
#[derive(Clone, Debug)]
enum FakeEntry {
    File { content: Vec<u8> },
    Symlink { target: PathBuf },
    Dir,
}

/// In-memory filesystem for testing — no real I/O.
///
/// Uses `RefCell` for interior mutability so trait methods taking `&self`
/// can still mutate the internal state.
pub struct FakeFs {
    entries: RefCell<HashMap<PathBuf, FakeEntry>>,
    home: PathBuf,
    fail_writes: RefCell<bool>,
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("no such entry: {}", path.display()),
    )
}

impl FakeFs {
    /// Create a new fake filesystem with the given home directory.
    ///
    /// Automatically creates the home directory, `~/.config`, and
    /// `~/.local/share`.
    pub fn new(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        let mut entries = HashMap::new();
        entries.insert(PathBuf::from("/"), FakeEntry::Dir);
        entries.insert(home.clone(), FakeEntry::Dir);
        entries.insert(home.join(".config"), FakeEntry::Dir);
        entries.insert(home.join(".local"), FakeEntry::Dir);
        entries.insert(home.join(".local/share"), FakeEntry::Dir);
        Self {
            entries: RefCell::new(entries),
            home,
            fail_writes: RefCell::new(false),
        }
    }

    /// Toggle write failures. When enabled, all `Fs::write` calls fail.
    pub fn set_fail_writes(&self, fail: bool) {
        *self.fail_writes.borrow_mut() = fail;
    }

    // -- Setup helpers (not part of the Fs trait) --

    /// Add a file with content. Auto-creates parent directories.
    pub fn add_file(&self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) {
        let path = path.into();
        self.ensure_parents(&path);
        self.entries.borrow_mut().insert(
            path,
            FakeEntry::File {
                content: content.into(),
            },
        );
    }

    /// Add a directory entry. Auto-creates parent directories.
    pub fn add_dir(&self, path: impl Into<PathBuf>) {
        let path = path.into();
        self.ensure_parents(&path);
        self.entries
            .borrow_mut()
            .entry(path)
            .or_insert(FakeEntry::Dir);
    }

    /// Add a symbolic link. Auto-creates parent directories for the link path.
    pub fn add_symlink(&self, link: impl Into<PathBuf>, target: impl Into<PathBuf>) {
        let link = link.into();
        self.ensure_parents(&link);
        self.entries.borrow_mut().insert(
            link,
            FakeEntry::Symlink {
                target: target.into(),
            },
        );
    }

    /// Ensure all parent directories of `path` exist.
    fn ensure_parents(&self, path: &Path) {
        let mut entries = self.entries.borrow_mut();
        if let Some(parent) = path.parent() {
            let mut current = PathBuf::new();
            for component in parent.components() {
                current.push(component);
                entries.entry(current.clone()).or_insert(FakeEntry::Dir);
            }
        }
    }

    /// Resolve a path through symlinks (up to 32 hops to avoid infinite loops).
    fn resolve_path(&self, path: &Path) -> PathBuf {
        let entries = self.entries.borrow();
        let mut current = path.to_path_buf();
        for _ in 0..32 {
            match entries.get(&current) {
                Some(FakeEntry::Symlink { target }) => current = target.clone(),
                _ => break,
            }
        }
        current
    }
}

impl Fs for FakeFs {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        let resolved = self.resolve_path(path);
        let entries = self.entries.borrow();
        match entries.get(&resolved) {
            Some(FakeEntry::File { content }) => Ok(content.clone()),
            Some(_) => Err(io::Error::other(format!("not a file: {}", path.display()))),
            None => Err(not_found(path)),
        }
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let bytes = self.read(path)?;
        String::from_utf8(bytes)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        if *self.fail_writes.borrow() {
            return Err(io::Error::other(format!(
                "simulated write failure: {}",
                path.display()
            )));
        }
        if let Some(parent) = path.parent()
            && !self.is_dir(parent)
        {
            return Err(not_found(parent));
        }
        let resolved = self.resolve_path(path);
        self.entries.borrow_mut().insert(
            resolved,
            FakeEntry::File {
                content: contents.to_vec(),
            },
        );
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        let mut entries = self.entries.borrow_mut();
        match entries.get(path) {
            Some(FakeEntry::File { .. } | FakeEntry::Symlink { .. }) => {
                entries.remove(path);
                Ok(())
            }
            Some(FakeEntry::Dir) => Err(io::Error::other(format!(
                "is a directory: {}",
                path.display()
            ))),
            None => Err(not_found(path)),
        }
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut entries = self.entries.borrow_mut();
        if !entries.contains_key(path) {
            return Err(not_found(path));
        }
        entries.retain(|p, _| !p.starts_with(path));
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        let mut entries = self.entries.borrow_mut();
        match entries.remove(from) {
            Some(entry) => {
                entries.insert(to.to_path_buf(), entry);
                Ok(())
            }
            None => Err(not_found(from)),
        }
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut entries = self.entries.borrow_mut();
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            entries.entry(current.clone()).or_insert(FakeEntry::Dir);
        }
        Ok(())
    }

    fn symlink(&self, original: &Path, link: &Path) -> io::Result<()> {
        let mut entries = self.entries.borrow_mut();
        if entries.contains_key(link) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("link path exists: {}", link.display()),
            ));
        }
        entries.insert(
            link.to_path_buf(),
            FakeEntry::Symlink {
                target: original.to_path_buf(),
            },
        );
        Ok(())
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        let entries = self.entries.borrow();
        match entries.get(path) {
            Some(FakeEntry::Symlink { target }) => Ok(target.clone()),
            Some(_) => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a symlink: {}", path.display()),
            )),
            None => Err(not_found(path)),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        let resolved = self.resolve_path(path);
        self.entries.borrow().contains_key(&resolved)
    }

    fn is_symlink(&self, path: &Path) -> bool {
        matches!(
            self.entries.borrow().get(path),
            Some(FakeEntry::Symlink { .. })
        )
    }

    fn is_file(&self, path: &Path) -> bool {
        let resolved = self.resolve_path(path);
        matches!(
            self.entries.borrow().get(&resolved),
            Some(FakeEntry::File { .. })
        )
    }

    fn is_dir(&self, path: &Path) -> bool {
        let resolved = self.resolve_path(path);
        matches!(self.entries.borrow().get(&resolved), Some(FakeEntry::Dir))
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let entries = self.entries.borrow();
        match entries.get(path) {
            Some(FakeEntry::Dir) => {}
            Some(_) => {
                return Err(io::Error::other(format!(
                    "not a directory: {}",
                    path.display()
                )));
            }
            None => return Err(not_found(path)),
        }
        let mut children: Vec<DirEntry> = entries
            .iter()
            .filter(|(p, _)| p.parent() == Some(path))
            .map(|(p, entry)| {
                let (is_file, is_dir, is_symlink) = match entry {
                    FakeEntry::File { .. } => (true, false, false),
                    FakeEntry::Dir => (false, true, false),
                    FakeEntry::Symlink { .. } => (false, false, true),
                };
                DirEntry {
                    path: p.clone(),
                    is_file,
                    is_dir,
                    is_symlink,
                }
            })
            .collect();
        children.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(children)
    }

    fn walk_dir(&self, path: &Path, opts: &WalkOptions) -> io::Result<Vec<DirEntry>> {
        let entries = self.entries.borrow();
        let root_components = path.components().count();

        let mut results: Vec<DirEntry> = entries
            .iter()
            .filter(|(p, _)| p.starts_with(path))
            .filter_map(|(p, entry)| {
                let depth = p.components().count().saturating_sub(root_components);

                if depth < opts.min_depth {
                    return None;
                }
                if let Some(max) = opts.max_depth
                    && depth > max
                {
                    return None;
                }

                let (is_file, is_dir, is_symlink) = match entry {
                    FakeEntry::File { .. } => (true, false, false),
                    FakeEntry::Dir => (false, true, false),
                    FakeEntry::Symlink { target } => {
                        if opts.follow_links {
                            match entries.get(target) {
                                Some(FakeEntry::File { .. }) => (true, false, true),
                                Some(FakeEntry::Dir) => (false, true, true),
                                _ => (false, false, true),
                            }
                        } else {
                            (false, false, true)
                        }
                    }
                };

                Some(DirEntry {
                    path: p.clone(),
                    is_file,
                    is_dir,
                    is_symlink,
                })
            })
            .collect();

        results.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(results)
    }

    fn home_dir(&self) -> Option<PathBuf> {
        Some(self.home.clone())
    }

    fn config_dir(&self) -> Option<PathBuf> {
        Some(self.home.join(".config"))
    }

    fn data_dir(&self) -> Option<PathBuf> {
        Some(self.home.join(".local/share"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_roundtrip() {
        let fs = FakeFs::new("/home/test");
        fs.add_file("/tmp/hello.txt", "hello world");
        assert_eq!(
            fs.read_to_string(Path::new("/tmp/hello.txt")).unwrap(),
            "hello world"
        );
        assert!(fs.exists(Path::new("/tmp/hello.txt")));
        assert!(fs.is_file(Path::new("/tmp/hello.txt")));
        assert!(!fs.is_dir(Path::new("/tmp/hello.txt")));
    }

    #[test]
    fn missing_file_is_not_found() {
        let fs = FakeFs::new("/home/test");
        let err = fs.read(Path::new("/nope")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn write_requires_parent_dir() {
        let fs = FakeFs::new("/home/test");
        let err = fs.write(Path::new("/no/such/dir/f"), b"x").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);

        fs.create_dir_all(Path::new("/tmp")).unwrap();
        fs.write(Path::new("/tmp/out.txt"), b"written").unwrap();
        assert_eq!(
            fs.read_to_string(Path::new("/tmp/out.txt")).unwrap(),
            "written"
        );
    }

    #[test]
    fn symlink_resolution() {
        let fs = FakeFs::new("/home/test");
        fs.add_file("/real/file.txt", "content");
        fs.add_symlink("/link", "/real/file.txt");

        assert!(fs.is_symlink(Path::new("/link")));
        assert!(!fs.is_symlink(Path::new("/real/file.txt")));
        assert!(fs.exists(Path::new("/link")));
        assert_eq!(fs.read_to_string(Path::new("/link")).unwrap(), "content");
        assert_eq!(
            fs.read_link(Path::new("/link")).unwrap(),
            PathBuf::from("/real/file.txt")
        );
    }

    #[test]
    fn broken_symlink_does_not_exist() {
        let fs = FakeFs::new("/home/test");
        fs.add_symlink("/broken", "/nonexistent");

        assert!(fs.is_symlink(Path::new("/broken")));
        assert!(!fs.exists(Path::new("/broken")));
    }

    #[test]
    fn symlink_refuses_existing_link_path() {
        let fs = FakeFs::new("/home/test");
        fs.add_file("/tmp/occupied", "x");
        let err = fs
            .symlink(Path::new("/real"), Path::new("/tmp/occupied"))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
    }

    #[test]
    fn remove_file_refuses_directory() {
        let fs = FakeFs::new("/home/test");
        fs.add_dir("/tmp/dir");
        assert!(fs.remove_file(Path::new("/tmp/dir")).is_err());
    }

    #[test]
    fn remove_dir_all_removes_subtree() {
        let fs = FakeFs::new("/home/test");
        fs.add_file("/state/packs/vim/symlink/.vimrc", "x");
        fs.remove_dir_all(Path::new("/state/packs/vim")).unwrap();
        assert!(!fs.exists(Path::new("/state/packs/vim")));
        assert!(!fs.is_symlink(Path::new("/state/packs/vim/symlink/.vimrc")));
        assert!(fs.is_dir(Path::new("/state/packs")));
    }

    #[test]
    fn rename_replaces_target() {
        let fs = FakeFs::new("/home/test");
        fs.add_file("/tmp/old.txt", "new data");
        fs.add_file("/tmp/new.txt", "stale");

        fs.rename(Path::new("/tmp/old.txt"), Path::new("/tmp/new.txt"))
            .unwrap();
        assert!(!fs.exists(Path::new("/tmp/old.txt")));
        assert_eq!(
            fs.read_to_string(Path::new("/tmp/new.txt")).unwrap(),
            "new data"
        );
    }

    #[test]
    fn read_dir_lists_sorted_children() {
        let fs = FakeFs::new("/home/test");
        fs.add_file("/root/b.txt", "b");
        fs.add_file("/root/a.txt", "a");
        fs.add_dir("/root/sub");
        fs.add_file("/root/sub/nested.txt", "n");

        let entries = fs.read_dir(Path::new("/root")).unwrap();
        let names: Vec<String> = entries.iter().map(|e| e.file_name()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "sub"]);
        assert!(entries[2].is_dir);
    }

    #[test]
    fn read_dir_missing_is_not_found() {
        let fs = FakeFs::new("/home/test");
        let err = fs.read_dir(Path::new("/nope")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn walk_dir_depth_limits() {
        let fs = FakeFs::new("/home/test");
        fs.add_file("/root/a.txt", "a");
        fs.add_file("/root/sub/deep/b.txt", "b");

        let entries = fs
            .walk_dir(
                Path::new("/root"),
                &WalkOptions {
                    min_depth: 1,
                    max_depth: Some(1),
                    ..Default::default()
                },
            )
            .unwrap();

        let paths: Vec<&Path> = entries.iter().map(|e| e.path.as_path()).collect();
        assert!(!paths.contains(&Path::new("/root")));
        assert!(paths.contains(&Path::new("/root/a.txt")));
        assert!(!paths.contains(&Path::new("/root/sub/deep/b.txt")));
    }

    #[test]
    fn system_dirs() {
        let fs = FakeFs::new("/home/test");
        assert_eq!(fs.home_dir(), Some(PathBuf::from("/home/test")));
        assert_eq!(fs.config_dir(), Some(PathBuf::from("/home/test/.config")));
        assert_eq!(
            fs.data_dir(),
            Some(PathBuf::from("/home/test/.local/share"))
        );
    }

    #[test]
    fn auto_creates_parents() {
        let fs = FakeFs::new("/home/test");
        fs.add_file("/a/b/c/d.txt", "deep");

        assert!(fs.is_dir(Path::new("/a")));
        assert!(fs.is_dir(Path::new("/a/b")));
        assert!(fs.is_dir(Path::new("/a/b/c")));
        assert!(fs.is_file(Path::new("/a/b/c/d.txt")));
    }
}
