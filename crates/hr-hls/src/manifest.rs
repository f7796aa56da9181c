//! Append-only playlist file.
//!
//! A [`ManifestWriter`] owns one `.m3u8` file for the lifetime of a
//! recording session. Every operation appends to the file and nothing is
//! ever read back or rewritten, so the file on disk is a valid (still
//! loading) VOD playlist between any two calls.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use hr_core::{Error, Result, Segment};

use crate::playlist::{self, END_LIST};

/// Playlist file extension, without the dot.
pub const MANIFEST_EXTENSION: &str = "m3u8";

/// Lifecycle of a manifest file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestState {
    /// Created, header not yet written.
    Uninitialized,
    /// Header written; entries may be appended.
    Open,
    /// `#EXT-X-ENDLIST` written and the file released.
    Finalized,
}

/// Playlist file name for a base name, with exactly one `.m3u8` suffix.
pub fn manifest_file_name(base_name: &str) -> String {
    let suffix = format!(".{MANIFEST_EXTENSION}");
    if base_name.ends_with(&suffix) {
        base_name.to_string()
    } else {
        format!("{base_name}{suffix}")
    }
}

/// Full playlist path inside `directory`.
pub fn manifest_path(directory: &Path, base_name: &str) -> PathBuf {
    directory.join(manifest_file_name(base_name))
}

/// Writer for a single progressive playlist file.
#[derive(Debug)]
pub struct ManifestWriter {
    path: PathBuf,
    file: Option<File>,
    state: ManifestState,
}

impl ManifestWriter {
    /// Create the playlist file and hold it open for appending.
    ///
    /// Fails with [`Error::ManifestExists`] if the file is already there
    /// (its content is left untouched) or [`Error::FileCreationFailed`] if
    /// the filesystem refuses to create it.
    pub fn try_open(directory: &Path, base_name: &str) -> Result<Self> {
        let path = manifest_path(directory, base_name);

        let file = OpenOptions::new()
            .append(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::AlreadyExists {
                    Error::ManifestExists { path: path.clone() }
                } else {
                    Error::file_creation(&path, e)
                }
            })?;

        tracing::debug!("Created manifest {}", path.display());

        Ok(Self {
            path,
            file: Some(file),
            state: ManifestState::Uninitialized,
        })
    }

    /// Like [`ManifestWriter::try_open`], but never fails.
    ///
    /// On failure the error is logged once and a detached writer is
    /// returned; every subsequent operation on it is a no-op, so recording
    /// can continue without a playlist.
    pub fn open(directory: &Path, base_name: &str) -> Self {
        match Self::try_open(directory, base_name) {
            Ok(writer) => writer,
            Err(e) => {
                tracing::warn!("Manifest disabled for this session: {e}");
                Self {
                    path: manifest_path(directory, base_name),
                    file: None,
                    state: ManifestState::Uninitialized,
                }
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> ManifestState {
        self.state
    }

    /// Whether the writer still holds the playlist file.
    pub fn is_attached(&self) -> bool {
        self.file.is_some()
    }

    /// Write the fixed header block.
    ///
    /// Must be called once, before the first [`append_entry`]. Calling it
    /// again writes the header again.
    ///
    /// [`append_entry`]: ManifestWriter::append_entry
    pub fn initialize_header(&mut self, max_segment_interval: u64) -> Result<()> {
        self.write(&playlist::render_header(max_segment_interval))?;
        if self.state == ManifestState::Uninitialized {
            self.state = ManifestState::Open;
        }
        Ok(())
    }

    /// Append the playlist entry for one segment.
    pub fn append_entry(&mut self, segment: &Segment) -> Result<()> {
        self.write(&playlist::render_entry(segment))
    }

    /// Append `#EXT-X-ENDLIST`, sync to disk and release the file.
    ///
    /// Calling this again after the file was released does nothing.
    pub fn finalize(&mut self) -> Result<()> {
        let previous = std::mem::replace(&mut self.state, ManifestState::Finalized);
        let Some(mut file) = self.file.take() else {
            return Ok(());
        };
        if previous == ManifestState::Uninitialized {
            tracing::warn!(
                "Finalizing manifest {} without a header",
                self.path.display()
            );
        }

        file.write_all(END_LIST.as_bytes())?;
        file.sync_all()?;
        tracing::info!("Finalized manifest {}", self.path.display());
        Ok(())
    }

    fn write(&mut self, content: &str) -> Result<()> {
        if self.state == ManifestState::Finalized {
            return Err(Error::ManifestFinalized);
        }
        let Some(file) = self.file.as_mut() else {
            return Ok(());
        };
        file.write_all(content.as_bytes())?;
        file.flush()?;
        Ok(())
    }
}

impl Drop for ManifestWriter {
    fn drop(&mut self) {
        if self.file.is_some() && self.state == ManifestState::Open {
            tracing::warn!(
                "Manifest {} released without #EXT-X-ENDLIST",
                self.path.display()
            );
        }
    }
}
