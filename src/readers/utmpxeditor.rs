// src/readers/utmpxeditor.rs

//! Rewrites the `USER_PROCESS` [`Utmpx`] entries of one user within a
//! `wtmp` file, in place.
//!
//! A matching entry is either given to another user (the user name is
//! replaced) or deleted (changed to a `DEAD_PROCESS` entry, see
//! [`Utmpx::mark_dead`]). Entries are rewritten at the same offset with the
//! same size; the file never grows or shrinks.
//!
//! Rewriting changes the file modification and access times. The owner,
//! group, and both times are captured before and restored after editing.
//!
//! [`Utmpx`]: crate::data::utmpx::Utmpx
//! [`Utmpx::mark_dead`]: crate::data::utmpx::Utmpx#method.mark_dead

use crate::{de_err, de_wrn};
use crate::common::{Count, FPath, FileMetadata, ResultS3};
use crate::data::timepattern::TimePattern;
use crate::data::utmpx::{UtType, Utmpx};
use crate::readers::utmpxstore::{EntryStore, StoreMode, UtmpxStore};

use std::io::{Error, Result};
use std::os::unix::fs::MetadataExt; // for `uid`, `gid`

use ::filetime::{set_file_times, FileTime};
use ::nix::unistd::{access, chown, AccessFlags, Gid, Uid};
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// Warning message when the owner or group cannot be restored.
pub const WARN_OWNERSHIP: &str = "cannot preserve the ownership of the wtmp file";
/// Warning message when the access or modification time cannot be
/// restored.
pub const WARN_TIMES: &str = "cannot preserve access and modification times";

/// The file attributes that rewriting entries would disturb.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FileAttributes {
    pub uid: u32,
    pub gid: u32,
    pub atime: FileTime,
    pub mtime: FileTime,
}

impl FileAttributes {
    /// Get the attributes of the file at `path`.
    pub fn capture(path: &FPath) -> Result<FileAttributes> {
        let metadata: FileMetadata = match std::fs::metadata(path) {
            Ok(val) => val,
            Err(err) => {
                de_err!("metadata({:?}) error {}", path, err);
                return Err(Error::new(err.kind(), format!("cannot get file status {:?}: {}", path, err)));
            }
        };
        let attributes = FileAttributes {
            uid: metadata.uid(),
            gid: metadata.gid(),
            atime: FileTime::from_last_access_time(&metadata),
            mtime: FileTime::from_last_modification_time(&metadata),
        };
        defñ!("({:?}) {:?}", path, attributes);

        Ok(attributes)
    }

    /// Set the attributes of the file at `path` to these.
    ///
    /// Returns a warning message for each part that could not be set.
    /// The ownership is set before the times.
    pub fn restore(&self, path: &FPath) -> Vec<String> {
        defn!("({:?}) {:?}", path, self);
        let mut warnings: Vec<String> = Vec::with_capacity(2);
        if let Err(_err) = chown(
            path.as_str(),
            Some(Uid::from_raw(self.uid)),
            Some(Gid::from_raw(self.gid)),
        ) {
            de_wrn!("chown({:?}, {}, {}) error {}", path, self.uid, self.gid, _err);
            warnings.push(String::from(WARN_OWNERSHIP));
        }
        if let Err(_err) = set_file_times(path, self.atime, self.mtime) {
            de_wrn!("set_file_times({:?}) error {}", path, _err);
            warnings.push(String::from(WARN_TIMES));
        }
        defx!("{} warnings", warnings.len());

        warnings
    }
}

/// The result of a completed [`edit_records`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct EditOutcome {
    /// `Count` of entries rewritten.
    pub cleaned: Count,
    /// `Count` of entries that matched but failed to be rewritten.
    pub errors: Count,
    /// `Count` of entries skipped because they could not be read.
    pub unreadable: Count,
    /// Non-fatal problems, i.e. the file attributes were not restored.
    pub warnings: Vec<String>,
}

impl EditOutcome {
    /// `true` if every matched entry was rewritten.
    pub const fn is_ok(&self) -> bool {
        self.errors == 0
    }
}

/// Rewrite every `USER_PROCESS` entry of `user` whose time, formatted by
/// [`timetostr`], matches `timepattern`.
///
/// If `newuser` is `Some` then the user name of each entry is replaced,
/// else each entry is deleted by [`Utmpx::mark_dead`].
///
/// Failing to access the file, get its attributes, or compile
/// `timepattern` returns an `Error` before any entry is changed.
/// A failed rewrite is counted in [`EditOutcome::errors`], an unreadable
/// entry in [`EditOutcome::unreadable`], and editing continues.
/// There is no rollback.
///
/// [`timetostr`]: crate::data::datetime::timetostr
/// [`Utmpx::mark_dead`]: crate::data::utmpx::Utmpx#method.mark_dead
pub fn edit_records(
    path: &FPath,
    user: &str,
    newuser: Option<&str>,
    timepattern: &str,
) -> Result<EditOutcome> {
    edit_records_with(
        path,
        user,
        newuser,
        timepattern,
        |path_| UtmpxStore::open(path_, StoreMode::ReadWrite),
    )
}

/// [`edit_records`] with the [`EntryStore`] returned by `open_store`.
///
/// The file attributes are restored whether or not every entry was
/// rewritten.
pub fn edit_records_with<S, F>(
    path: &FPath,
    user: &str,
    newuser: Option<&str>,
    timepattern: &str,
    open_store: F,
) -> Result<EditOutcome>
where
    S: EntryStore,
    F: FnOnce(&FPath) -> Result<S>,
{
    defn!("({:?}, {:?}, {:?}, {:?})", path, user, newuser, timepattern);

    if let Err(errno) = access(path.as_str(), AccessFlags::R_OK | AccessFlags::W_OK) {
        let err = Error::from(errno);
        defx!("access({:?}) error {}", path, err);
        return Err(Error::new(err.kind(), format!("cannot access the file {:?}: {}", path, err)));
    }
    let attributes: FileAttributes = FileAttributes::capture(path)?;
    let pattern: TimePattern = TimePattern::new(timepattern)?;

    let mut store: S = open_store(path)?;
    let mut outcome: EditOutcome = edit_entries(&mut store, user, newuser, &pattern);
    drop(store);

    outcome.warnings = attributes.restore(path);
    defx!("return {:?}", outcome);

    Ok(outcome)
}

/// Rewrite the matching entries of `store`, see [`edit_records`].
/// `warnings` of the returned `EditOutcome` is empty.
fn edit_entries(
    store: &mut dyn EntryStore,
    user: &str,
    newuser: Option<&str>,
    pattern: &TimePattern,
) -> EditOutcome {
    let mut outcome = EditOutcome::default();
    loop {
        let mut entry: Utmpx = match store.next_entry() {
            ResultS3::Found(val) => val,
            ResultS3::Done => break,
            ResultS3::Err(_err) => {
                de_err!("{}", _err);
                continue;
            }
        };
        if entry.ut_type() != UtType::UserProcess
            || !entry.is_user(user)
            || !pattern.is_match_entry(&entry)
        {
            continue;
        }
        match newuser {
            Some(newuser_) => entry.set_ut_user(newuser_),
            None => entry.mark_dead(),
        }
        match store.rewrite(&entry) {
            true => {
                defo!("@{} rewrote", entry.fileoffset_begin());
                outcome.cleaned += 1;
            }
            false => {
                defo!("@{} rewrite failed", entry.fileoffset_begin());
                outcome.errors += 1;
            }
        }
    }
    outcome.unreadable = store.count_entries_unreadable();

    outcome
}
