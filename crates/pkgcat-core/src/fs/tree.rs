//! Directory tree copy and replace-by-rename helpers.

use std::fs;
use std::io;
use std::path::Path;

/// Recursively copy `src` into `dst`, creating `dst`.
///
/// Symlinks are followed, so the copy contains regular files only.
pub fn copy_tree(src: &Path, dst: &Path) -> io::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());
        if src_path.is_dir() {
            copy_tree(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Replace `dst` with the fully prepared directory `staged`.
///
/// An existing `dst` is first renamed to `parking` (which must not exist), so
/// `dst` is only ever absent, old or new. If moving `staged` into place fails,
/// the old tree is renamed back. The caller owns `parking` and removes it.
pub fn replace_dir(staged: &Path, dst: &Path, parking: &Path) -> io::Result<()> {
    let had_previous = dst.exists();
    if had_previous {
        fs::rename(dst, parking)?;
    }

    if let Err(err) = fs::rename(staged, dst) {
        if had_previous {
            let _ = fs::rename(parking, dst);
        }
        return Err(err);
    }
    Ok(())
}
