// src/data/session.rs

//! A [`Session`] is one login of a user reconstructed from a `wtmp` file;
//! a `USER_PROCESS` [`Utmpx`] paired with the way that login ended.
//!
//! Sessions are built by a [`SessionProcessor`] and are never written
//! back to the file.
//!
//! [`Utmpx`]: crate::data::utmpx::Utmpx
//! [`SessionProcessor`]: crate::readers::sessionprocessor::SessionProcessor

use crate::data::utmpx::{tv_sec_type, UtType, Utmpx};

use std::fmt;

/// Seconds in a day.
pub const SECINADAY: i64 = 24 * 60 * 60;

/// How a [`Session`] ended.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum CloseReason {
    /// No closing entry seen (yet).
    #[default]
    Open,
    /// Closed by a `DEAD_PROCESS` entry on the same line.
    NormalClose,
    /// Closed by a `DEAD_PROCESS` entry after the system run level went to
    /// halt (`0`) or reboot (`6`).
    SystemDown,
    /// Never closed and the session process is still running.
    StillActive,
    /// Never closed and the session process no longer exists; a stale
    /// entry, i.e. the login program crashed.
    Phantom,
    /// A reboot entry.
    Reboot,
}

/// One reconstructed login session.
#[derive(Clone)]
pub struct Session {
    /// The `USER_PROCESS` entry that began the session.
    entry: Utmpx,
    /// Time of the closing entry, `0` if not closed.
    end_of_session: tv_sec_type,
    /// Seconds between the begin and the close.
    duration: i64,
    close_reason: CloseReason,
}

impl fmt::Debug for Session {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        f.debug_struct("Session")
            .field("entry", &self.entry)
            .field("end_of_session", &self.end_of_session)
            .field("duration", &self.duration)
            .field("close_reason", &self.close_reason)
            .finish()
    }
}

impl Session {
    /// Create a new `Open` `Session` beginning with `entry`.
    pub fn new(entry: Utmpx) -> Session {
        debug_assert_eq!(entry.ut_type(), UtType::UserProcess, "Session entry must be a USER_PROCESS");
        Session {
            entry,
            end_of_session: 0,
            duration: 0,
            close_reason: CloseReason::Open,
        }
    }

    pub const fn entry(&self) -> &Utmpx {
        &self.entry
    }

    pub const fn end_of_session(&self) -> tv_sec_type {
        self.end_of_session
    }

    /// Seconds the session lasted. `0` for sessions never closed.
    pub const fn duration(&self) -> i64 {
        self.duration
    }

    pub const fn close_reason(&self) -> CloseReason {
        self.close_reason
    }

    pub fn is_open(&self) -> bool {
        self.close_reason == CloseReason::Open
    }

    /// Close this session at time `end`.
    /// `down` is the system shutdown state at the time of the close.
    pub fn close(
        &mut self,
        end: tv_sec_type,
        down: bool,
    ) {
        self.end_of_session = end;
        self.duration = end - self.entry.tv_sec();
        self.close_reason = match down {
            true => CloseReason::SystemDown,
            false => CloseReason::NormalClose,
        };
    }

    /// Resolve a session left `Open` after all entries were processed.
    /// `gone` is `true` when the session process no longer exists.
    pub fn finalize(
        &mut self,
        gone: bool,
    ) {
        if !self.is_open() {
            return;
        }
        self.close_reason = match gone {
            true => CloseReason::Phantom,
            false => CloseReason::StillActive,
        };
    }

    /// The duration as `"(D+HH:MM)"` if it lasted a day or longer,
    /// else `" (HH:MM)"`.
    pub fn duration_string(&self) -> String {
        let mins = (self.duration / 60) % 60;
        let hours = (self.duration / 3600) % 24;
        let days = self.duration / SECINADAY;
        match days {
            0 => format!(" ({:02}:{:02})", hours, mins),
            _ => format!("({}+{:02}:{:02})", days, hours, mins),
        }
    }
}
