//! Real filesystem implementation delegating to `std::fs`, `std::os::unix::fs`,
//! `walkdir`, and `dirs`.

use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{DirEntry, Fs, WalkOptions};

/// Real filesystem — delegates every operation to the OS.
pub struct RealFs;

impl Fs for RealFs {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        std::fs::write(path, contents)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_dir_all(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        std::fs::rename(from, to)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn symlink(&self, original: &Path, link: &Path) -> io::Result<()> {
        std::os::unix::fs::symlink(original, link)
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        std::fs::read_link(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_symlink(&self, path: &Path) -> bool {
        path.is_symlink()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            let ft = entry.file_type()?;
            entries.push(DirEntry {
                path: entry.path(),
                is_file: ft.is_file(),
                is_dir: ft.is_dir(),
                is_symlink: ft.is_symlink(),
            });
        }
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    fn walk_dir(&self, path: &Path, opts: &WalkOptions) -> io::Result<Vec<DirEntry>> {
        let mut walker = WalkDir::new(path).min_depth(opts.min_depth);
        if let Some(max_depth) = opts.max_depth {
            walker = walker.max_depth(max_depth);
        }
        walker = walker.follow_links(opts.follow_links);

        let entries = walker
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|e| {
                let ft = e.file_type();
                let entry_path = e.into_path();
                let is_symlink = entry_path
                    .symlink_metadata()
                    .map(|m| m.file_type().is_symlink())
                    .unwrap_or(false);
                DirEntry {
                    path: entry_path,
                    is_file: ft.is_file(),
                    is_dir: ft.is_dir(),
                    is_symlink,
                }
            })
            .collect();

        Ok(entries)
    }

    fn home_dir(&self) -> Option<PathBuf> {
        dirs::home_dir()
    }

    fn config_dir(&self) -> Option<PathBuf> {
        dirs::config_dir()
    }

    fn data_dir(&self) -> Option<PathBuf> {
        dirs::data_dir()
    }
}
