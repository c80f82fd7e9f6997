//! Temporary output management with atomic publication.

use crate::{Error, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

const TEMP_PREFIX: &str = ".mediaconv-";

/// Private output location for one conversion.
///
/// The temporary file lives next to the destination, with a random name
/// and the destination's extension (ffmpeg picks the muxer from it), so
/// the final rename stays on one filesystem and is atomic.
///
/// # Example
///
/// ```no_run
/// use media_converter_av::Workspace;
///
/// let workspace = Workspace::new("/videos/out.mkv")?;
/// // Run the tool, writing to workspace.output()
/// workspace.finalize()?;
/// # Ok::<(), media_converter_av::Error>(())
/// ```
#[derive(Debug)]
pub struct Workspace {
    temp_path: PathBuf,
    destination: PathBuf,
}

impl Workspace {
    /// Reserve a unique temporary path for `destination`.
    pub fn new<P: AsRef<Path>>(destination: P) -> Result<Self> {
        let destination = destination.as_ref();
        if destination.file_name().is_none() {
            return Err(Error::invalid_source(format!(
                "destination has no file name: {}",
                destination.display()
            )));
        }

        let dir = match destination.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut suffix = OsString::new();
        if let Some(ext) = destination.extension() {
            suffix.push(".");
            suffix.push(ext);
        }

        let file = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(&suffix)
            .tempfile_in(dir)
            .map_err(|e| Error::filesystem(dir, e))?;

        // The tool overwrites the placeholder; it must outlive this handle.
        let temp_path = file
            .into_temp_path()
            .keep()
            .map_err(|e| Error::filesystem(dir, e.error))?;

        Ok(Self {
            temp_path,
            destination: destination.to_path_buf(),
        })
    }

    /// Where the tool should write.
    pub fn output(&self) -> &Path {
        &self.temp_path
    }

    /// Where the result is published.
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Atomically move the output over the destination.
    ///
    /// The placeholder created by [`Workspace::new`] is empty, so an empty
    /// output means the tool never wrote anything; it is removed and not
    /// published.
    pub fn finalize(self) -> Result<PathBuf> {
        let metadata =
            std::fs::metadata(&self.temp_path).map_err(|e| Error::filesystem(&self.temp_path, e))?;
        if metadata.len() == 0 {
            self.discard_placeholder();
            return Err(Error::filesystem(
                &self.temp_path,
                std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "tool wrote no output"),
            ));
        }

        std::fs::rename(&self.temp_path, &self.destination)
            .map_err(|e| Error::filesystem(&self.destination, e))?;

        #[cfg(feature = "tracing")]
        tracing::info!("Published {:?}", self.destination);

        Ok(self.destination)
    }

    /// Leave the output where it is for inspection and return its path.
    pub fn abandon(self) -> PathBuf {
        #[cfg(feature = "tracing")]
        tracing::warn!("Leaving temporary output at {:?}", self.temp_path);

        self.temp_path
    }

    /// Remove the output without publishing it.
    pub fn discard(self) {
        self.discard_placeholder();
    }

    fn discard_placeholder(&self) {
        let _ = std::fs::remove_file(&self.temp_path);
    }
}
