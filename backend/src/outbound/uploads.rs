//! Image storage behind a capability-scoped directory handle.
//!
//! The uploads directory is opened once at startup; every write goes through
//! the `cap-std` handle, so a crafted filename cannot escape the directory.

use std::io::Write;
use std::path::Path;

use cap_std::ambient_authority;
use cap_std::fs::Dir;
use uuid::Uuid;

/// Errors surfaced by the upload store.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("uploads directory unavailable: {0}")]
    Directory(#[from] std::io::Error),
}

/// File-system backed store for uploaded images.
pub struct UploadStore {
    dir: Dir,
    public_prefix: String,
}

impl UploadStore {
    /// Open (creating if needed) the uploads directory.
    ///
    /// `public_prefix` is the URL path under which the directory is served,
    /// e.g. `/uploads`.
    pub fn open(path: &Path, public_prefix: &str) -> Result<Self, UploadError> {
        std::fs::create_dir_all(path)?;
        let dir = Dir::open_ambient_dir(path, ambient_authority())?;
        Ok(Self {
            dir,
            public_prefix: public_prefix.trim_end_matches('/').to_owned(),
        })
    }

    /// Persist image bytes under a generated name; returns the public URL.
    pub fn save_image(&self, extension: &str, bytes: &[u8]) -> Result<String, UploadError> {
        let name = format!("image-{}.{extension}", Uuid::new_v4());
        let mut file = self.dir.create(&name)?;
        file.write_all(bytes)?;
        file.flush()?;
        Ok(format!("{}/{name}", self.public_prefix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn saves_bytes_and_returns_public_url() {
        let tmp = tempfile::tempdir().expect("temp dir");
        let store = UploadStore::open(tmp.path(), "/uploads/").expect("open store");

        let url = store.save_image("png", b"not-really-a-png").expect("save");
        assert!(url.starts_with("/uploads/image-"));
        assert!(url.ends_with(".png"));

        let name = url.strip_prefix("/uploads/").expect("prefix");
        let on_disk = std::fs::read(tmp.path().join(name)).expect("file exists");
        assert_eq!(on_disk, b"not-really-a-png");
    }
}
