//! This file contains the on-disk side of the bitmap. The file is shared with
//! every other fuzzer process pointed at the same path, so it is read once when
//! a map is created and rewritten in full every time something novel is found.
//! The layout is just the raw trace map followed by the raw context map, no
//! header, no checksum.
//!
//! Writers are not merged: whoever commits last wins. We do take an advisory
//! `flock` around each read and write so a reader never observes a half
//! written file from a cooperating process, but a lost update between two
//! processes is still possible and accepted.

use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::os::unix::io::{AsRawFd, RawFd};

use crate::err::BitmapErr;

/// Holds an advisory lock on a file descriptor for as long as it lives. The
/// descriptor must outlive the guard
struct FileLock {
    fd: RawFd,
    locked: bool,
}

impl FileLock {
    /// Best effort: if the filesystem doesn't support `flock` we carry on
    /// without it
    fn acquire(file: &File, exclusive: bool) -> Self {
        let fd = file.as_raw_fd();
        let op = if exclusive { libc::LOCK_EX } else { libc::LOCK_SH };
        let result = unsafe { libc::flock(fd, op) };

        FileLock {
            fd,
            locked: result == 0,
        }
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        if self.locked {
            unsafe {
                libc::flock(self.fd, libc::LOCK_UN);
            }
        }
    }
}

/// Read a persisted bitmap into `trace` and `context`. Anything short of a
/// full `trace.len() + context.len()` bytes is an error, and the contents of
/// both buffers are unspecified afterwards, callers are expected to reset them
pub fn import(path: &str, trace: &mut [u8], context: &mut [u8]) -> Result<(), BitmapErr> {
    let mut file = File::open(path).map_err(|e| {
        BitmapErr::from(&format!("Unable to open bitmap '{}', error: {}", path, e))
    })?;

    let _lock = FileLock::acquire(&file, false);

    file.read_exact(trace).map_err(|e| {
        BitmapErr::from(&format!("Unable to read trace map from '{}', error: {}", path, e))
    })?;

    file.read_exact(context).map_err(|e| {
        BitmapErr::from(&format!(
            "Unable to read context map from '{}', error: {}",
            path, e
        ))
    })?;

    Ok(())
}

/// Overwrite the file at `path` with `trace` followed by `context`
pub fn commit(path: &str, trace: &[u8], context: &[u8]) -> Result<(), BitmapErr> {
    // Don't truncate on open, another process may be holding the lock and
    // reading the file right now
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .map_err(|e| {
            BitmapErr::from(&format!(
                "Unable to open bitmap '{}' to commit, error: {}",
                path, e
            ))
        })?;

    let _lock = FileLock::acquire(&file, true);

    file.set_len(0)?;
    file.write_all(trace)?;
    file.write_all(context)?;
    file.flush()?;

    Ok(())
}
