//! Where survey bytes come from and where the finished PDF goes.
//!
//! The pipeline only sees the two traits below, so the CLI (local files) and
//! the upload handler (in-memory bytes) share every stage in between.

use crate::error::ReportError;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// A source of raw CSV bytes.
pub trait CsvSource {
    /// Read the whole survey export.
    fn read_csv(&self) -> Result<Vec<u8>, ReportError>;

    /// Short description for log lines.
    fn describe(&self) -> String;
}

/// A destination for the rendered PDF.
pub trait ReportSink {
    fn write_pdf(&mut self, pdf: &[u8]) -> Result<(), ReportError>;
}

/// CSV file on the local file system.
#[derive(Debug, Clone)]
pub struct LocalCsv {
    path: PathBuf,
}

impl LocalCsv {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CsvSource for LocalCsv {
    fn read_csv(&self) -> Result<Vec<u8>, ReportError> {
        let path = &self.path;
        if !path.exists() {
            return Err(ReportError::FileNotFound { path: path.clone() });
        }
        if path.is_dir() {
            return Err(ReportError::InputReadFailed {
                path: path.clone(),
                source: std::io::Error::new(ErrorKind::Other, "is a directory"),
            });
        }

        match std::fs::read(path) {
            Ok(bytes) => {
                debug!("Read {} bytes from {}", bytes.len(), path.display());
                Ok(bytes)
            }
            Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                Err(ReportError::PermissionDenied { path: path.clone() })
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(ReportError::FileNotFound { path: path.clone() })
            }
            Err(source) => Err(ReportError::InputReadFailed {
                path: path.clone(),
                source,
            }),
        }
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// CSV bytes already in memory, e.g. an uploaded file.
#[derive(Debug, Clone)]
pub struct InMemoryCsv {
    name: String,
    bytes: Vec<u8>,
}

impl InMemoryCsv {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

impl CsvSource for InMemoryCsv {
    fn read_csv(&self) -> Result<Vec<u8>, ReportError> {
        Ok(self.bytes.clone())
    }

    fn describe(&self) -> String {
        format!("{} ({} bytes)", self.name, self.bytes.len())
    }
}

/// Writes the PDF to a path atomically.
///
/// The bytes go to a temp file in the target directory, which is then
/// renamed over the target, so readers never see a half-written report.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_failed(&self, source: std::io::Error) -> ReportError {
        ReportError::OutputWriteFailed {
            path: self.path.clone(),
            source,
        }
    }
}

impl ReportSink for FileSink {
    fn write_pdf(&mut self, pdf: &[u8]) -> Result<(), ReportError> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(|e| self.write_failed(e))?;

        let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| self.write_failed(e))?;
        tmp.write_all(pdf).map_err(|e| self.write_failed(e))?;
        tmp.flush().map_err(|e| self.write_failed(e))?;
        tmp.persist(&self.path).map_err(|e| self.write_failed(e.error))?;

        debug!("Wrote {} bytes to {}", pdf.len(), self.path.display());
        Ok(())
    }
}

/// Collect the PDF in memory.
impl ReportSink for Vec<u8> {
    fn write_pdf(&mut self, pdf: &[u8]) -> Result<(), ReportError> {
        self.clear();
        self.extend_from_slice(pdf);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_file_not_found() {
        let err = LocalCsv::new("/definitely/not/here.csv").read_csv().unwrap_err();
        assert!(matches!(err, ReportError::FileNotFound { .. }));
    }

    #[test]
    fn directory_is_read_failure() {
        let dir = tempfile::tempdir().unwrap();
        let err = LocalCsv::new(dir.path()).read_csv().unwrap_err();
        assert!(matches!(err, ReportError::InputReadFailed { .. }));
    }

    #[test]
    fn reads_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("survey.csv");
        std::fs::write(&path, "a,b\n1,2\n").unwrap();
        assert_eq!(LocalCsv::new(&path).read_csv().unwrap(), b"a,b\n1,2\n");
    }

    #[test]
    fn in_memory_source_returns_its_bytes() {
        let src = InMemoryCsv::new("upload.csv", b"x\n1\n".to_vec());
        assert_eq!(src.read_csv().unwrap(), b"x\n1\n");
        assert_eq!(src.describe(), "upload.csv (4 bytes)");
    }

    #[test]
    fn file_sink_creates_parent_dirs_and_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/report.pdf");
        let mut sink = FileSink::new(&path);
        sink.write_pdf(b"first").unwrap();
        sink.write_pdf(b"second").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"second");
        // No temp files left behind.
        let entries = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn vec_sink_holds_last_write() {
        let mut sink: Vec<u8> = Vec::new();
        sink.write_pdf(b"abc").unwrap();
        sink.write_pdf(b"de").unwrap();
        assert_eq!(sink, b"de");
    }
}
