//! Struct archiving functionality
//!
//! To add archiving functionality to a struct implement the `Archived` trait.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use std::path::Path;
use std::fs::File;
use csv::WriterBuilder;
pub use csv::Writer;
use thiserror::Error;

// Internal imports
use crate::session::Session;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An object used to write CSV archive files.
///
/// Records must be flat structs, the csv crate cannot write nested fields.
#[derive(Default)]
pub struct Archiver {
    writer: Option<Writer<File>>
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur while archiving.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Could not open the archive file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not write the archive record: {0}")]
    Csv(#[from] csv::Error),

    #[error("The archiver has not been initialised with a file")]
    NotInit
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A trait which enables a struct to be archived as a csv.
///
/// To implement this trait, the struct shall have an `Archiver` member which shall be setup in an
/// `init_archive` or `new` function.
pub trait Archived {
    /// Write the archives for this struct
    fn write(&mut self) -> Result<(), ArchiveError>;
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Archiver {
    /// Create a new archiver from a paricular path relative to the session's
    /// archive root.
    pub fn from_path<P: AsRef<Path>>(
        session: &Session, path: P
    ) -> Result<Self, ArchiveError> {
        Self::from_file_path(session.arch_root.join(path))
    }

    /// Create a new archiver writing to an explicit file path, truncating any existing file.
    pub fn from_file_path<P: AsRef<Path>>(path: P) -> Result<Self, ArchiveError> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = File::create(path)?;

        let w = WriterBuilder::new()
            .has_headers(true)
            .from_writer(file);

        Ok(Self {
            writer: Some(w)
        })
    }

    /// Returns true if this archiver has a file to write to.
    pub fn is_init(&self) -> bool {
        self.writer.is_some()
    }

    /// Serialise a record into the archive.
    pub fn serialise<T: serde::Serialize>(
        &mut self, record: T
    ) -> Result<(), ArchiveError> {
        match self.writer {
            Some(ref mut w) => {
                w.serialize(record)?;
                w.flush()?
            },
            None => return Err(ArchiveError::NotInit)
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Row {
        time_s: f64,
        forward: f64,
        aligned: bool
    }

    #[test]
    fn test_archive_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("arch/rows.csv");

        let mut arch = Archiver::from_file_path(&path).unwrap();
        arch.serialise(Row { time_s: 0.0, forward: 0.5, aligned: false }).unwrap();
        arch.serialise(Row { time_s: 0.02, forward: 0.0, aligned: true }).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "time_s,forward,aligned");
        assert_eq!(lines.len(), 3);
        assert!(lines[2].ends_with("true"));
    }

    #[test]
    fn test_uninit_archiver() {
        let mut arch = Archiver::default();
        assert!(!arch.is_init());
        assert!(matches!(
            arch.serialise(Row { time_s: 0.0, forward: 0.0, aligned: false }),
            Err(ArchiveError::NotInit)
        ));
    }
}
