use bytes::Bytes;
use gram_core::AppError;
use gram_processing::guess_media_type;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// A file the administrator picked, before any processing
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub filename: String,
    pub media_type: String,
    pub data: Bytes,
}

impl SelectedFile {
    pub fn new(filename: impl Into<String>, media_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            media_type: media_type.into(),
            data: data.into(),
        }
    }

    /// Read a file from disk; the media type comes from the extension
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        let media_type = guess_media_type(&filename).unwrap_or("application/octet-stream");
        Ok(Self::new(filename, media_type, data))
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Local copy of the selected file that a front end can display.
/// The temporary file is deleted when the preview is dropped.
#[derive(Debug)]
pub struct Preview {
    file: NamedTempFile,
}

impl Preview {
    fn create(file: &SelectedFile) -> Result<Self, AppError> {
        let extension = Path::new(&file.filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e))
            .unwrap_or_default();

        let mut temp = tempfile::Builder::new()
            .prefix("gram-preview-")
            .suffix(&extension)
            .tempfile()?;
        temp.write_all(&file.data)?;
        temp.flush()?;
        Ok(Self { file: temp })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

/// The file attached to an open form together with its preview
#[derive(Debug)]
pub struct PendingUpload {
    file: SelectedFile,
    preview: Preview,
}

impl PendingUpload {
    pub fn new(file: SelectedFile) -> Result<Self, AppError> {
        let preview = Preview::create(&file)?;
        tracing::debug!(
            filename = %file.filename,
            size = file.size(),
            preview = %preview.path().display(),
            "Preview created"
        );
        Ok(Self { file, preview })
    }

    pub fn file(&self) -> &SelectedFile {
        &self.file
    }

    pub fn preview_path(&self) -> PathBuf {
        self.preview.path().to_path_buf()
    }
}
