//! Session management

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use chrono::{DateTime, Utc};
use conquer_once::OnceCell;
use log::warn;
use serde::Serialize;
use std::fs;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use thiserror::Error;

// Internal imports
use crate::time;

// ---------------------------------------------------------------------------
// STATICS
// ---------------------------------------------------------------------------

static SESSION_EPOCH: OnceCell<DateTime<Utc>> = OnceCell::uninit();

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// A chrono format string which diplays a timestamp. See
/// https://docs.rs/chrono/0.4.11/chrono/format/strftime/index.html for more
/// information.
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A struct storing information about the current session
#[derive(Clone, Debug)]
pub struct Session {
    /// The root directory for this session
    pub session_root: PathBuf,

    /// The root directory for this session's archives
    pub arch_root: PathBuf,

    /// The path to the session's log file
    pub log_file_path: PathBuf,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors associated with the session module.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Cannot create the session directory: {0}")]
    CannotCreateDir(std::io::Error),

    #[error("Cannot get the epoch time, did you forget to initialise the session?")]
    CannotGetEpoch,

    #[error("Cannot write the session file {0:?}: {1}")]
    CannotWriteFile(PathBuf, std::io::Error),

    #[error("Cannot serialise data for the session file {0:?}: {1}")]
    CannotSerialise(PathBuf, serde_json::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Session {
    /// Start a new session inside the given sessions directory.
    ///
    /// This will create a new session directory named `{exec_name}_{timestamp}`
    pub fn new_in<P: AsRef<Path>>(sessions_dir: P, exec_name: &str) -> Result<Self, SessionError> {
        // Set the session epoch. A process may open more than one session (for example a test
        // binary), in which case they share the first epoch.
        let epoch = SESSION_EPOCH.get_or_init(Utc::now);

        // Sessions are named after their creation time, not the epoch, so that they are unique
        let timestamp = Utc::now().format(TIMESTAMP_FORMAT);

        let mut path = sessions_dir.as_ref().to_path_buf();
        path.push(format!("{}_{}", exec_name, timestamp));

        // Two sessions opened in the same second get a numeric suffix
        let mut unique = path.clone();
        let mut n = 1;
        while unique.exists() {
            unique = path.with_file_name(format!("{}_{}_{}", exec_name, timestamp, n));
            n += 1;
        }
        let path = unique;

        fs::create_dir_all(&path).map_err(SessionError::CannotCreateDir)?;

        // Create the archive dir
        let arch_path = path.join("arch");
        fs::create_dir_all(&arch_path).map_err(SessionError::CannotCreateDir)?;

        let log_file_path = path.join(format!("{}.log", exec_name));

        log::debug!("Session opened at {:?} (epoch {})", path, epoch);

        Ok(Session {
            session_root: path,
            arch_root: arch_path,
            log_file_path,
        })
    }

    /// Save the given data as pretty JSON into the given session-relative path.
    pub fn save_json<P: AsRef<Path>, T: Serialize>(
        &self, path: P, data: &T
    ) -> Result<PathBuf, SessionError> {
        let full_path = self.session_root.join(path);

        // Create the parent path if needed
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| SessionError::CannotWriteFile(full_path.clone(), e))?;
        }

        let file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .create(true)
            .open(&full_path)
            .map_err(|e| SessionError::CannotWriteFile(full_path.clone(), e))?;

        serde_json::to_writer_pretty(&file, data)
            .map_err(|e| SessionError::CannotSerialise(full_path.clone(), e))?;

        Ok(full_path)
    }

    /// Save the given data, logging rather than returning any failure.
    pub fn save<P: AsRef<Path>, T: Serialize>(&self, path: P, data: &T) {
        if let Err(e) = self.save_json(path, data) {
            warn!("{}", e)
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Get the number of seconds elapsed since the start of the session.
///
/// Returns `0.0` if no session has been started yet, so that logging before the session exists
/// is still possible.
pub fn get_elapsed_seconds() -> f64 {
    match SESSION_EPOCH.get() {
        Some(e) => {
            let elapsed = Utc::now() - *e;
            match time::duration_to_seconds(elapsed) {
                Some(s) => s,
                None => std::f64::NAN,
            }
        }
        None => 0.0,
    }
}

/// Return a reference to the session's epoch.
pub fn get_epoch() -> Result<&'static DateTime<Utc>, SessionError> {
    SESSION_EPOCH.get().ok_or(SessionError::CannotGetEpoch)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_session_layout() {
        let dir = tempfile::tempdir().unwrap();

        let a = Session::new_in(dir.path(), "align_exec").unwrap();
        let b = Session::new_in(dir.path(), "align_exec").unwrap();

        assert_ne!(a.session_root, b.session_root);
        assert!(a.arch_root.is_dir());
        assert!(a.log_file_path.starts_with(&a.session_root));
        assert!(get_epoch().is_ok());
        assert!(get_elapsed_seconds() >= 0.0);
    }

    #[test]
    fn test_save_json() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::new_in(dir.path(), "test").unwrap();

        let path = session.save_json("telem/snapshot.json", &vec![1, 2, 3]).unwrap();
        let read: Vec<i32> = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();

        assert_eq!(read, vec![1, 2, 3]);
    }
}
