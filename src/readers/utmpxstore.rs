// src/readers/utmpxstore.rs

//! Implements a [`UtmpxStore`], sequential reading of [`Utmpx`] entries
//! from a `wtmp` file and positioned rewriting of the entry last read.
//!
//! This replaces the process-global cursor of the libc functions
//! `utmpxname`, `getutxent`, `pututxline`, and `endutxent` with an explicit
//! handle. Like `pututxline` after `getutxent`, [`rewrite`] overwrites the
//! entry most recently returned by [`next_entry`].
//!
//! [`UtmpxStore`]: self::UtmpxStore
//! [`Utmpx`]: crate::data::utmpx::Utmpx
//! [`rewrite`]: self::UtmpxStore#method.rewrite
//! [`next_entry`]: self::UtmpxStore#method.next_entry

use crate::{de_err, de_wrn};
use crate::common::{
    Count,
    FPath,
    File,
    FileOffset,
    FileOpenOptions,
    FileSz,
    ResultS3,
};
use crate::data::utmpx::{
    Utmpx,
    UTMPX_SZ,
    UTMPX_SZ_FO,
};

use std::fmt;
use std::io::{Error, ErrorKind, Result};
use std::os::unix::fs::FileExt; // for `read_exact_at`, `write_all_at`

use ::more_asserts::debug_assert_le;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// [`UtmpxStore::next_entry`] result.
pub type ResultS3UtmpxFind = ResultS3<Utmpx, Error>;

/// How a [`UtmpxStore`] opens the file.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StoreMode {
    /// Only read entries.
    Read,
    /// Read entries and rewrite them.
    ReadWrite,
}

/// A handle to an open `wtmp` file.
///
/// The one read cursor is also the write cursor; only the entry last
/// returned by `next_entry` may be rewritten.
pub struct UtmpxStore {
    path: FPath,
    file: File,
    mode: StoreMode,
    /// file size at open
    filesz: FileSz,
    /// `FileOffset` of the next entry to read
    fileoffset_next: FileOffset,
    /// `FileOffset` of the entry last returned by `next_entry`
    fileoffset_last: Option<FileOffset>,
    /// `Count` of `Utmpx`s returned by `next_entry`.
    entries_processed: Count,
    /// `Count` of successful `rewrite`s.
    rewrite_ok: Count,
    /// `Count` of failed `rewrite`s.
    rewrite_errors: Count,
    /// `Count` of entries that could not be read and were skipped.
    entries_unreadable: Count,
    /// `Count` of trailing partial entries ignored, `0` or `1`.
    entries_partial: Count,
}

impl fmt::Debug for UtmpxStore {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        f.debug_struct("UtmpxStore")
            .field("Path", &self.path)
            .field("mode", &self.mode)
            .field("filesz", &self.filesz)
            .field("fileoffset_next", &self.fileoffset_next)
            .field("fileoffset_last", &self.fileoffset_last)
            .field("entries_processed", &self.entries_processed)
            .field("rewrite_ok", &self.rewrite_ok)
            .field("rewrite_errors", &self.rewrite_errors)
            .field("entries_unreadable", &self.entries_unreadable)
            .field("entries_partial", &self.entries_partial)
            .finish()
    }
}

/// Prepend the `path` to the message of `err`, keep the `ErrorKind`.
fn error_with_path(err: &Error, path: &FPath, what: &str) -> Error {
    Error::new(err.kind(), format!("{} {:?}: {}", what, path, err))
}

impl UtmpxStore {
    /// Open the `wtmp` file at `path`.
    ///
    /// Errors of kind `PermissionDenied` or `NotFound` are returned as-is
    /// with the path added to the message.
    pub fn open(
        path: &FPath,
        mode: StoreMode,
    ) -> Result<UtmpxStore> {
        defn!("({:?}, {:?})", path, mode);
        let mut open_options = FileOpenOptions::new();
        open_options.read(true);
        if mode == StoreMode::ReadWrite {
            open_options.write(true);
        }
        let file: File = match open_options.open(path) {
            Ok(val) => val,
            Err(err) => {
                defx!("open({:?}) error {}", path, err);
                return Err(error_with_path(&err, path, "cannot access the file"));
            }
        };
        let metadata = match file.metadata() {
            Ok(val) => val,
            Err(err) => {
                defx!("metadata({:?}) error {}", path, err);
                return Err(error_with_path(&err, path, "cannot get file status"));
            }
        };
        if metadata.is_dir() {
            defx!("{:?} is a directory", path);
            return Err(
                Error::new(
                    ErrorKind::InvalidInput,
                    format!("cannot access the file {:?}: is a directory", path),
                )
            );
        }
        let filesz: FileSz = metadata.len();
        if filesz % UTMPX_SZ_FO != 0 {
            de_wrn!("file {:?} size {} is not a multiple of {}", path, filesz, UTMPX_SZ);
        }
        defx!("filesz {}", filesz);

        Ok(
            UtmpxStore {
                path: path.clone(),
                file,
                mode,
                filesz,
                fileoffset_next: 0,
                fileoffset_last: None,
                entries_processed: 0,
                rewrite_ok: 0,
                rewrite_errors: 0,
                entries_unreadable: 0,
                entries_partial: 0,
            }
        )
    }

    pub const fn path(&self) -> &FPath {
        &self.path
    }

    pub const fn mode(&self) -> StoreMode {
        self.mode
    }

    pub const fn filesz(&self) -> FileSz {
        self.filesz
    }

    /// Count of whole entries in the file.
    pub const fn count_entries(&self) -> Count {
        self.filesz / UTMPX_SZ_FO
    }

    /// `Count` of `Utmpx`s returned by `next_entry`.
    pub const fn count_entries_processed(&self) -> Count {
        self.entries_processed
    }

    pub const fn count_rewrite_ok(&self) -> Count {
        self.rewrite_ok
    }

    pub const fn count_rewrite_errors(&self) -> Count {
        self.rewrite_errors
    }

    /// `Count` of entries skipped because they could not be read.
    pub const fn count_entries_unreadable(&self) -> Count {
        self.entries_unreadable
    }

    /// `Count` of trailing partial entries ignored.
    pub const fn count_entries_partial(&self) -> Count {
        self.entries_partial
    }

    /// Read the next [`Utmpx`].
    ///
    /// Returns `Done` at the end of the file. A partial entry at the end of
    /// the file is ignored, counted once, and also returns `Done`.
    /// An entry that cannot be read is counted and returns `Err`; the
    /// following call continues with the entry after it.
    ///
    /// [`Utmpx`]: crate::data::utmpx::Utmpx
    pub fn next_entry(&mut self) -> ResultS3UtmpxFind {
        let fileoffset: FileOffset = self.fileoffset_next;
        if fileoffset + UTMPX_SZ_FO > self.filesz {
            if fileoffset < self.filesz {
                de_wrn!(
                    "ignore partial entry of {} bytes at {} in {:?}",
                    self.filesz - fileoffset, fileoffset, self.path,
                );
                self.entries_partial += 1;
                self.fileoffset_next = self.filesz;
            }
            defñ!("@{}: Done", fileoffset);
            self.fileoffset_last = None;
            return ResultS3UtmpxFind::Done;
        }
        debug_assert_le!(fileoffset + UTMPX_SZ_FO, self.filesz);
        let mut buffer: [u8; UTMPX_SZ] = [0; UTMPX_SZ];
        match self.file.read_exact_at(&mut buffer, fileoffset) {
            Ok(_) => {}
            Err(err) if err.kind() == ErrorKind::UnexpectedEof => {
                // file was truncated since it was opened
                defñ!("@{}: UnexpectedEof; Done", fileoffset);
                self.fileoffset_last = None;
                return ResultS3UtmpxFind::Done;
            }
            Err(err) => {
                de_err!("read_exact_at({}) {:?} error {}", fileoffset, self.path, err);
                // skip the unreadable entry
                self.fileoffset_next = fileoffset + UTMPX_SZ_FO;
                self.fileoffset_last = None;
                self.entries_unreadable += 1;
                return ResultS3UtmpxFind::Err(error_with_path(&err, &self.path, "cannot read the file"));
            }
        }
        let entry: Utmpx = match Utmpx::from_buffer(fileoffset, &buffer) {
            Some(val) => val,
            None => {
                self.fileoffset_next = fileoffset + UTMPX_SZ_FO;
                self.fileoffset_last = None;
                self.entries_unreadable += 1;
                return ResultS3UtmpxFind::Err(
                    Error::new(
                        ErrorKind::InvalidData,
                        format!("bad entry at {} in {:?}", fileoffset, self.path),
                    )
                );
            }
        };
        self.fileoffset_next = entry.fileoffset_end();
        self.fileoffset_last = Some(fileoffset);
        self.entries_processed += 1;
        defñ!("@{}: Found {:?}", fileoffset, entry.ut_type());

        ResultS3UtmpxFind::Found(entry)
    }

    /// Overwrite the entry last returned by [`next_entry`] with `entry`.
    ///
    /// Returns `false` if the store is read-only, no entry has been
    /// returned, or the write fails. The read cursor is not moved.
    ///
    /// [`next_entry`]: self::UtmpxStore#method.next_entry
    pub fn rewrite(&mut self, entry: &Utmpx) -> bool {
        let fileoffset: FileOffset = match self.fileoffset_last {
            Some(val) => val,
            None => {
                de_err!("rewrite without a current entry in {:?}", self.path);
                self.rewrite_errors += 1;
                return false;
            }
        };
        debug_assert_eq!(
            fileoffset, entry.fileoffset_begin(),
            "rewrite of entry @{} but current entry is @{}", entry.fileoffset_begin(), fileoffset
        );
        if self.mode != StoreMode::ReadWrite {
            de_err!("rewrite of read-only {:?}", self.path);
            self.rewrite_errors += 1;
            return false;
        }
        let buffer: [u8; UTMPX_SZ] = entry.to_buffer();
        match self.file.write_all_at(&buffer, fileoffset) {
            Ok(_) => {
                defñ!("@{}: rewrote {} bytes", fileoffset, buffer.len());
                self.rewrite_ok += 1;

                true
            }
            Err(_err) => {
                de_err!("write_all_at({}) {:?} error {}", fileoffset, self.path, _err);
                self.rewrite_errors += 1;

                false
            }
        }
    }

    /// Close the file.
    pub fn close(self) {
        defñ!("{:?}", self);
    }

    /// Convert this store into an [`Iterator`] of the remaining entries.
    pub fn into_entries(self) -> UtmpxStoreEntries {
        UtmpxStoreEntries {
            store: self,
            done: false,
        }
    }
}

/// The entry reading and rewriting that editing and session
/// reconstruction need from a store of [`Utmpx`] entries.
///
/// [`Utmpx`]: crate::data::utmpx::Utmpx
pub trait EntryStore {
    /// See [`UtmpxStore::next_entry`].
    fn next_entry(&mut self) -> ResultS3UtmpxFind;
    /// See [`UtmpxStore::rewrite`].
    fn rewrite(&mut self, entry: &Utmpx) -> bool;
    /// `Count` of entries skipped because they could not be read.
    fn count_entries_unreadable(&self) -> Count;
}

impl EntryStore for UtmpxStore {
    fn next_entry(&mut self) -> ResultS3UtmpxFind {
        UtmpxStore::next_entry(self)
    }

    fn rewrite(&mut self, entry: &Utmpx) -> bool {
        UtmpxStore::rewrite(self, entry)
    }

    fn count_entries_unreadable(&self) -> Count {
        UtmpxStore::count_entries_unreadable(self)
    }
}

/// Single-pass [`Iterator`] over the entries of a [`UtmpxStore`].
///
/// An unreadable entry is an `Err` item; iteration continues after it.
pub struct UtmpxStoreEntries {
    store: UtmpxStore,
    done: bool,
}

impl UtmpxStoreEntries {
    pub const fn store(&self) -> &UtmpxStore {
        &self.store
    }
}

impl Iterator for UtmpxStoreEntries {
    type Item = Result<Utmpx>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.store.next_entry() {
            ResultS3::Found(entry) => Some(Ok(entry)),
            ResultS3::Done => {
                self.done = true;

                None
            }
            ResultS3::Err(err) => Some(Err(err)),
        }
    }
}
