// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Backup rotation for damaged data files.

use std::fs;
use std::path::{Path, PathBuf};

const MAX_BAK_FILES: u32 = 3;

/// Pick the next `.bak` / `.bak.N` path, rotating older backups out.
///
/// Keeps up to [`MAX_BAK_FILES`] backups: `.bak`, `.bak.2`, `.bak.3`.
/// The oldest backup is removed when the limit is reached.
pub(crate) fn rotate_bak_path(path: &Path) -> PathBuf {
    let bak = |n: u32| {
        let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        if n == 1 {
            path.with_file_name(format!("{name}.bak"))
        } else {
            path.with_file_name(format!("{name}.bak.{n}"))
        }
    };

    let oldest = bak(MAX_BAK_FILES);
    if oldest.exists() {
        let _ = fs::remove_file(&oldest);
    }

    for n in (1..MAX_BAK_FILES).rev() {
        let src = bak(n);
        if src.exists() {
            let _ = fs::rename(&src, bak(n + 1));
        }
    }

    bak(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn first_backup_appends_bak() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("je.db");
        assert_eq!(rotate_bak_path(&path), dir.path().join("je.db.bak"));
    }

    #[test]
    fn existing_backups_shift_and_oldest_drops() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("je.db");
        for name in ["je.db.bak", "je.db.bak.2", "je.db.bak.3"] {
            fs::write(dir.path().join(name), name).unwrap();
        }

        let next = rotate_bak_path(&path);

        assert_eq!(next, dir.path().join("je.db.bak"));
        assert!(!next.exists());
        assert_eq!(fs::read_to_string(dir.path().join("je.db.bak.2")).unwrap(), "je.db.bak");
        assert_eq!(fs::read_to_string(dir.path().join("je.db.bak.3")).unwrap(), "je.db.bak.2");
    }
}
