// Move classified documents into per-category folders without clobbering.
//
// If the destination is taken, `_1`, `_2`, ... is inserted before the
// extension until a free name turns up. An existing file is never
// overwritten: the new name is claimed with a hard link (or an exclusive
// create when linking is not possible), both of which fail instead of
// replacing a file that appeared after the free-name check.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::analysis::category::Category;

/// `<output_dir>/<category>/<file name of src>`.
pub fn category_destination(output_dir: &Path, category: Category, src: &Path) -> PathBuf {
    let name = src.file_name().unwrap_or(src.as_os_str());
    output_dir.join(category.as_str()).join(name)
}

/// First free path among `dst`, `<stem>_1.<ext>`, `<stem>_2.<ext>`, ...
pub fn free_destination(dst: &Path) -> PathBuf {
    if !dst.exists() {
        return dst.to_path_buf();
    }

    let stem = dst
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = dst
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut counter = 1u32;
    loop {
        let candidate = dst.with_file_name(format!("{stem}_{counter}{ext}"));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// Move `src` to `dst` (or the next free variant of it) and return where it
/// ended up. Missing parent directories are created.
///
/// On error the source is left where it was and no copy remains at the
/// destination.
pub fn safe_move(src: &Path, dst: &Path) -> io::Result<PathBuf> {
    // Fail on a missing source before anything is created
    let meta = fs::metadata(src)?;

    if let Some(parent) = dst.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    loop {
        let target = free_destination(dst);
        match claim(src, &target, &meta) {
            Ok(()) => {}
            // Somebody took the name between the check and the claim
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e),
        }

        if let Err(e) = fs::remove_file(src) {
            let _ = fs::remove_file(&target);
            return Err(e);
        }

        debug!(from = %src.display(), to = %target.display(), "Moved document");
        return Ok(target);
    }
}

/// Make `target` a second name for `src`'s contents without ever replacing
/// an existing file. Hard link first; copy into an exclusively created file
/// when the link is refused (different filesystem, no link support).
fn claim(src: &Path, target: &Path, meta: &fs::Metadata) -> io::Result<()> {
    match fs::hard_link(src, target) {
        Ok(()) => return Ok(()),
        Err(e) if matches!(e.kind(), io::ErrorKind::AlreadyExists | io::ErrorKind::NotFound) => {
            return Err(e)
        }
        Err(e) => {
            debug!(to = %target.display(), error = %e, "Hard link refused, copying instead");
        }
    }

    copy_exclusive(src, target)?;
    if let Err(e) = fs::set_permissions(target, meta.permissions()) {
        let _ = fs::remove_file(target);
        return Err(e);
    }
    Ok(())
}

/// Copy `src` into a newly created `target`. Fails with `AlreadyExists` if
/// `target` is taken; a partially written target is removed on error.
pub fn copy_exclusive(src: &Path, target: &Path) -> io::Result<()> {
    let mut reader = File::open(src)?;
    let mut writer = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)?;

    let copied = io::copy(&mut reader, &mut writer).and_then(|_| writer.sync_all());
    if let Err(e) = copied {
        drop(writer);
        let _ = fs::remove_file(target);
        return Err(e);
    }
    Ok(())
}
