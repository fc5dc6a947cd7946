//! Writing generated files

use anyhow::Context;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// New contents of a generated file, written to a temporary file in the same directory and not
/// yet moved into place
#[derive(Debug)]
pub struct StagedFile<'a> {
    path: &'a Path,
    file: NamedTempFile,
}

impl StagedFile<'_> {
    /// Atomically replace the target file with staged contents
    pub fn commit(self) -> anyhow::Result<()> {
        let Self { path, file } = self;
        file.persist(path)
            .with_context(|| format!("Failed to replace generated file `{}`", path.display()))?;
        debug!(path = %path.display(), "Generated file written");

        Ok(())
    }
}

/// Stage `contents` for `path` unless the file already has exactly these contents.
///
/// Nothing is visible at `path` until [`StagedFile::commit()`] is called, dropping the staged
/// file removes the temporary file.
pub fn stage_if_changed<'a>(
    path: &'a Path,
    contents: &str,
) -> anyhow::Result<Option<StagedFile<'a>>> {
    // Avoid extra file truncation/override if it didn't change
    if fs::read_to_string(path).ok().as_deref() == Some(contents) {
        debug!(path = %path.display(), "Generated file is up to date");
        return Ok(None);
    }

    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(directory)
        .with_context(|| format!("Failed to create directory `{}`", directory.display()))?;

    let mut file = NamedTempFile::new_in(directory).with_context(|| {
        format!("Failed to create temporary file in `{}`", directory.display())
    })?;
    file.write_all(contents.as_bytes())
        .with_context(|| format!("Failed to write generated file `{}`", path.display()))?;
    // Replacing an existing file keeps its permissions
    if let Ok(metadata) = fs::metadata(path) {
        file.as_file()
            .set_permissions(metadata.permissions())
            .with_context(|| format!("Failed to copy permissions of `{}`", path.display()))?;
    }

    Ok(Some(StagedFile { path, file }))
}

/// Write `contents` to `path` unless the file already has exactly these contents.
///
/// Returns `true` if the file was written.
pub fn write_if_changed(path: &Path, contents: &str) -> anyhow::Result<bool> {
    match stage_if_changed(path, contents)? {
        Some(staged) => {
            staged.commit()?;
            Ok(true)
        }
        None => Ok(false),
    }
}
