//! Stable client identity
//!
//! A client keeps one user id for its whole life. The id is generated once
//! and stored in a small text file whose path the caller chooses.

use std::fs;
use std::io;
use std::path::Path;

use super::errors::{ClientError, ClientResult};

/// Read the user id stored at `path`, generating and storing one if absent
///
/// An empty or whitespace-only file counts as absent. Parent directories are
/// created as needed.
pub fn load_or_create_user_id(path: &Path) -> ClientResult<String> {
    let to_error = |source: io::Error| ClientError::UserIdFile {
        path: path.to_path_buf(),
        source,
    };

    match fs::read_to_string(path) {
        Ok(content) => {
            let stored = content.trim();
            if !stored.is_empty() {
                return Ok(stored.to_string());
            }
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(to_error(e)),
    }

    let user_id = uuid::Uuid::new_v4().to_string();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(to_error)?;
    }
    fs::write(path, format!("{}\n", user_id)).map_err(to_error)?;
    Ok(user_id)
}
