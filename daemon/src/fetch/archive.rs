//! Zip extraction

use std::fs;
use std::io::{Cursor, Read, Write};
use std::path::Path;

use crate::fetch::FetchError;

/// Extract a zip archive into `dest` and return the number of files written.
///
/// Entries whose names would escape `dest` are skipped.
pub fn extract_zip(data: &[u8], dest: &Path) -> Result<usize, FetchError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(data))
        .map_err(|e| FetchError::Archive(e.to_string()))?;

    fs::create_dir_all(dest).map_err(|e| FetchError::Archive(e.to_string()))?;

    let mut written = 0;
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| FetchError::Archive(format!("entry {}: {}", i, e)))?;

        let Some(relative) = entry.enclosed_name() else {
            continue;
        };
        let outpath = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&outpath).map_err(|e| FetchError::Archive(e.to_string()))?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            fs::create_dir_all(parent).map_err(|e| FetchError::Archive(e.to_string()))?;
        }

        let mut buffer = Vec::new();
        entry
            .read_to_end(&mut buffer)
            .map_err(|e| FetchError::Archive(format!("{}: {}", entry.name(), e)))?;

        let mut outfile =
            fs::File::create(&outpath).map_err(|e| FetchError::Archive(e.to_string()))?;
        outfile
            .write_all(&buffer)
            .map_err(|e| FetchError::Archive(e.to_string()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                fs::set_permissions(&outpath, fs::Permissions::from_mode(mode)).ok();
            }
        }

        written += 1;
    }

    if written == 0 {
        return Err(FetchError::Archive("archive contains no files".to_string()));
    }
    Ok(written)
}
