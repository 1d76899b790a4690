use std::{io::Write, path::Path};

use tempfile::{Builder, NamedTempFile};

use crate::prelude::*;

/// Replace the file as a whole: a reader sees either the old or the new contents.
pub fn write_atomically(path: &Path, contents: &[u8]) -> Result {
    let mut file = temporary_sibling(path)?;
    file.write_all(contents)?;
    file.as_file().sync_all()?;
    file.persist(path).with_context(|| format!("failed to replace `{}`", path.display()))?;
    Ok(())
}

/// Same as [`write_atomically`], for writers that open the file by path.
///
/// The temporary file keeps the target's extension, so that encoders picking
/// the format by extension see the right one.
pub fn replace_atomically(path: &Path, write: impl FnOnce(&Path) -> Result) -> Result {
    let file = temporary_sibling(path)?;
    write(file.path())?;
    file.persist(path).with_context(|| format!("failed to replace `{}`", path.display()))?;
    Ok(())
}

fn temporary_sibling(path: &Path) -> Result<NamedTempFile> {
    let directory = path
        .parent()
        .with_context(|| format!("`{}` has no parent directory", path.display()))?;
    let suffix = path
        .extension()
        .and_then(|extension| extension.to_str())
        .map(|extension| format!(".{extension}"))
        .unwrap_or_default();
    Builder::new()
        .prefix(".pvtally")
        .suffix(&suffix)
        .tempfile_in(directory)
        .with_context(|| format!("failed to create a temporary file in `{}`", directory.display()))
}
