// src/readers/sessionprocessor.rs

//! Implements a [`SessionProcessor`], the driver of deriving the
//! [`Session`s] of one user from the [`Utmpx`] entries of a `wtmp` file.
//!
//! Entries are processed in file order:
//! - a `RUN_LVL` entry for run level `0` (halt) or `6` (reboot) marks the
//!   system as going down; a `BOOT_TIME` entry marks it up again
//! - a `USER_PROCESS` entry of the user begins a new `Open` session
//! - a `DEAD_PROCESS` entry closes the most recent `Open` session on the
//!   same terminal line
//!
//! After the last entry, sessions still `Open` are resolved with a
//! [`ProcessProbe`].
//!
//! [`SessionProcessor`]: self::SessionProcessor
//! [`Session`s]: crate::data::session::Session
//! [`Utmpx`]: crate::data::utmpx::Utmpx
//! [`ProcessProbe`]: self::ProcessProbe

use crate::de_err;
use crate::common::{Count, FPath, ResultS3};
use crate::data::session::Session;
use crate::data::utmpx::{UtType, Utmpx};
use crate::readers::utmpxstore::{EntryStore, StoreMode, UtmpxStore};

use std::fmt;
use std::io::Result;

use ::nix::errno::Errno;
use ::nix::sys::signal::kill;
use ::nix::unistd::Pid;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ProcessProbe
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Answers "is this process currently alive?" for resolving sessions that
/// were never closed.
pub trait ProcessProbe {
    /// Return `false` only when process `pid` is known to not exist.
    fn is_alive(&self, pid: i32) -> bool;
}

/// A [`ProcessProbe`] that sends the null signal to the process.
///
/// A process owned by another user returns `EPERM`; it exists so it is
/// alive. Only `ESRCH` means the process is gone.
#[derive(Clone, Copy, Debug, Default)]
pub struct SignalProbe;

impl ProcessProbe for SignalProbe {
    fn is_alive(&self, pid: i32) -> bool {
        let ret = !matches!(kill(Pid::from_raw(pid), None), Err(Errno::ESRCH));
        defñ!("kill({}, 0) alive {}", pid, ret);

        ret
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// SessionProcessor
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Builds the [`Session`s] of one user from a stream of [`Utmpx`].
///
/// [`Session`s]: crate::data::session::Session
/// [`Utmpx`]: crate::data::utmpx::Utmpx
pub struct SessionProcessor {
    /// user name to match, compared as a bounded field
    user: String,
    /// the system is going down (shutdown or reboot run level seen)
    down: bool,
    /// sessions in order of discovery
    sessions: Vec<Session>,
    /// `Count` of `Utmpx`s processed.
    entries_processed: Count,
    /// `Count` of entries skipped because they could not be read.
    entries_unreadable: Count,
}

impl fmt::Debug for SessionProcessor {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        f.debug_struct("SessionProcessor")
            .field("user", &self.user)
            .field("down", &self.down)
            .field("sessions", &self.sessions.len())
            .field("entries_processed", &self.entries_processed)
            .field("entries_unreadable", &self.entries_unreadable)
            .finish()
    }
}

impl SessionProcessor {
    pub fn new(user: &str) -> SessionProcessor {
        defñ!("({:?})", user);
        SessionProcessor {
            user: String::from(user),
            down: false,
            sessions: Vec::new(),
            entries_processed: 0,
            entries_unreadable: 0,
        }
    }

    pub const fn is_down(&self) -> bool {
        self.down
    }

    pub fn sessions(&self) -> &[Session] {
        self.sessions.as_slice()
    }

    pub const fn count_entries_processed(&self) -> Count {
        self.entries_processed
    }

    pub const fn count_entries_unreadable(&self) -> Count {
        self.entries_unreadable
    }

    /// Process every remaining entry of `store`.
    /// An unreadable entry is counted and skipped.
    pub fn process_store(&mut self, store: &mut dyn EntryStore) {
        defn!("{:?}", self);
        loop {
            match store.next_entry() {
                ResultS3::Found(entry) => self.process_entry(&entry),
                ResultS3::Done => break,
                ResultS3::Err(_err) => {
                    de_err!("{}", _err);
                    self.entries_unreadable += 1;
                }
            }
        }
        defx!("{:?}", self);
    }

    /// Process one entry; the next in file order.
    pub fn process_entry(&mut self, entry: &Utmpx) {
        self.entries_processed += 1;
        match entry.ut_type() {
            UtType::RunLevel => {
                let runlevel: char = entry.runlevel();
                if runlevel == '0' || runlevel == '6' {
                    defñ!("@{} run level {:?}; down", entry.fileoffset_begin(), runlevel);
                    self.down = true;
                }
            }
            UtType::BootTime => {
                defñ!("@{} boot; up", entry.fileoffset_begin());
                self.down = false;
            }
            UtType::UserProcess => {
                if entry.is_user(self.user.as_str()) {
                    defñ!("@{} begin session {}", entry.fileoffset_begin(), self.sessions.len());
                    self.sessions.push(Session::new(*entry));
                }
            }
            UtType::DeadProcess => {
                self.close_session(entry);
            }
            _ => {}
        }
    }

    /// Close the most recent `Open` session on the line of `entry`.
    /// Only that one session is closed.
    fn close_session(&mut self, entry: &Utmpx) {
        let down: bool = self.down;
        match self
            .sessions
            .iter_mut()
            .rev()
            .find(|session| session.is_open() && session.entry().is_same_line(entry))
        {
            Some(session) => {
                session.close(entry.tv_sec(), down);
                defñ!(
                    "@{} closed session @{} {:?}",
                    entry.fileoffset_begin(), session.entry().fileoffset_begin(), session.close_reason(),
                );
            }
            None => {
                defñ!("@{} no open session on the line", entry.fileoffset_begin());
            }
        }
    }

    /// Resolve sessions still `Open` and return all sessions in order of
    /// discovery.
    ///
    /// An `Open` session with `ut_pid > 0` whose process is gone becomes
    /// `Phantom`, any other becomes `StillActive`.
    pub fn finalize(
        self,
        probe: &dyn ProcessProbe,
    ) -> Vec<Session> {
        defn!("{:?}", self);
        let mut sessions: Vec<Session> = self.sessions;
        for session in sessions
            .iter_mut()
            .filter(|session| session.is_open())
        {
            let pid: i32 = session.entry().ut_pid();
            let gone: bool = pid > 0 && !probe.is_alive(pid);
            session.finalize(gone);
            defo!("session @{} {:?}", session.entry().fileoffset_begin(), session.close_reason());
        }
        defx!("return {} sessions", sessions.len());

        sessions
    }
}

/// The result of a completed [`reconstruct_sessions`].
#[derive(Debug)]
pub struct Reconstruction {
    /// Sessions in order of discovery, none `Open`.
    pub sessions: Vec<Session>,
    /// `Count` of entries skipped because they could not be read.
    pub unreadable: Count,
}

/// Read the `wtmp` file at `path` and return the [`Session`s] of `user`.
///
/// Failing to open the file returns the `Error`. An unreadable entry is
/// counted in [`Reconstruction::unreadable`] and skipped; the remaining
/// entries are still processed.
///
/// [`Session`s]: crate::data::session::Session
pub fn reconstruct_sessions(
    path: &FPath,
    user: &str,
    probe: &dyn ProcessProbe,
) -> Result<Reconstruction> {
    defn!("({:?}, {:?})", path, user);
    let mut store: UtmpxStore = UtmpxStore::open(path, StoreMode::Read)?;
    let reconstruction = reconstruct_sessions_store(&mut store, user, probe);
    store.close();
    defx!("return {} sessions", reconstruction.sessions.len());

    Ok(reconstruction)
}

/// [`reconstruct_sessions`] from the entries of `store`.
pub fn reconstruct_sessions_store(
    store: &mut dyn EntryStore,
    user: &str,
    probe: &dyn ProcessProbe,
) -> Reconstruction {
    let mut processor = SessionProcessor::new(user);
    processor.process_store(store);
    let unreadable: Count = processor.count_entries_unreadable();

    Reconstruction {
        sessions: processor.finalize(probe),
        unreadable,
    }
}
