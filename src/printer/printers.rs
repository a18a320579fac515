// src/printer/printers.rs

//! Helper functions for printing [`Session`s] and [`Utmpx`s].
//!
//! A [`Session`] prints as one line of a login listing, similar to the
//! `last` program:
//!
//! ```text
//! alice    tty1         10.0.0.1         Sat Sep  6 2008 14:30 - 14:38  (00:08)
//! ```
//!
//! A [`Utmpx`] prints as one line of a raw dump, every field bracketed:
//!
//! ```text
//! alice    [01234] [tty1        ] [1   ] [10.0.0.1           ] [10.0.0.1       ] [2008.09.06 14:30:00]
//! ```
//!
//! [`Session`]: crate::data::session::Session
//! [`Session`s]: crate::data::session::Session
//! [`Utmpx`]: crate::data::utmpx::Utmpx
//! [`Utmpx`s]: crate::data::utmpx::Utmpx

use crate::de_err;
use crate::common::{Count, FPath, NLu8};
use crate::data::datetime::{time_hhmm, time_login, timetostr};
use crate::data::session::{CloseReason, Session};
use crate::data::utmpx::{bounded_to_str, UtType, Utmpx};
use crate::readers::utmpxstore::{StoreMode, UtmpxStore};

use std::borrow::Cow;
use std::io::{
    Result,
    Write, // for `std::io::Stdout.flush`
};

#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Session
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Format the [`Session`] as one line of a login listing, without a
/// trailing newline.
///
/// User, line, and host are truncated and padded to 8, 12, and 16
/// characters, followed by the login time, then how the session ended.
///
/// [`Session`]: crate::data::session::Session
pub fn format_session(session: &Session) -> String {
    let entry: &Utmpx = session.entry();
    let mut buf: String = format!(
        "{:<8.8} {:<12.12} {:<16.16} {} ",
        bounded_to_str(entry.ut_user()),
        bounded_to_str(entry.ut_line()),
        bounded_to_str(entry.ut_host()),
        time_login(entry.tv_sec()),
    );
    match session.close_reason() {
        CloseReason::Reboot => {
            buf.push(' ');
        }
        CloseReason::SystemDown => {
            buf.push_str("- down  ");
            buf.push_str(session.duration_string().as_str());
        }
        CloseReason::StillActive => {
            buf.push_str("- still logged in");
        }
        CloseReason::Phantom => {
            buf.push_str("   gone - no logout");
        }
        CloseReason::NormalClose | CloseReason::Open => {
            buf.push_str(format!("- {:>5.5} ", time_hhmm(session.end_of_session())).as_str());
            buf.push_str(session.duration_string().as_str());
        }
    }

    buf
}

/// Print each [`Session`] on its own line to stdout.
///
/// [`Session`]: crate::data::session::Session
pub fn print_sessions(sessions: &[Session]) {
    defn!("({} sessions)", sessions.len());
    for session in sessions.iter() {
        let mut line: String = format_session(session);
        line.push(NLu8 as char);
        write_stdout(line.as_bytes());
    }
    defx!();
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Utmpx
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The label printed first in a raw dump line; the user name for a
/// `USER_PROCESS` entry, else a name of the `ut_type`.
fn raw_label(entry: &Utmpx) -> Cow<'_, str> {
    match entry.ut_type() {
        UtType::RunLevel => Cow::Borrowed("RUNLEVEL"),
        UtType::BootTime => Cow::Borrowed("REBOOT"),
        UtType::NewTime | UtType::OldTime => Cow::Borrowed(""),
        UtType::InitProcess => Cow::Borrowed("INIT"),
        UtType::LoginProcess => Cow::Borrowed("LOGIN"),
        UtType::UserProcess => bounded_to_str(entry.ut_user()),
        UtType::DeadProcess => Cow::Borrowed("DEAD"),
        UtType::Accounting => Cow::Borrowed("ACCOUNT"),
        UtType::Empty | UtType::Unknown(_) => Cow::Borrowed("NONE"),
    }
}

/// Format the [`Utmpx`] as one line of a raw dump, without a trailing
/// newline.
///
/// Clock change entries (`NEW_TIME`, `OLD_TIME`) have no label.
/// A `ut_pid` of `0` prints as `-`.
///
/// [`Utmpx`]: crate::data::utmpx::Utmpx
pub fn format_raw(entry: &Utmpx) -> String {
    let mut buf: String = String::with_capacity(128);
    match entry.ut_type() {
        UtType::NewTime | UtType::OldTime => {}
        _ => buf.push_str(format!("{:<9}", raw_label(entry)).as_str()),
    }
    match entry.ut_pid() {
        0 => buf.push_str("[    -]"),
        pid => buf.push_str(format!("[{:05}]", pid).as_str()),
    }
    buf.push_str(
        format!(
            " [{:<12}] [{:<4}] [{:<19}] [{:<15.15}] [{:<19.19}]",
            bounded_to_str(entry.ut_line()),
            bounded_to_str(entry.ut_id()),
            bounded_to_str(entry.ut_host()),
            entry.ut_addr().to_string(),
            timetostr(entry.tv_sec()),
        ).as_str()
    );

    buf
}

/// The result of a completed [`dump_raw`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RawDump {
    /// `Count` of entries printed.
    pub printed: Count,
    /// `Count` of entries skipped because they could not be read.
    pub unreadable: Count,
}

/// Print every [`Utmpx`] of the `wtmp` file at `path` to stdout, or only
/// those of `user` if `Some`.
///
/// An unreadable entry is skipped and counted in [`RawDump::unreadable`].
///
/// [`Utmpx`]: crate::data::utmpx::Utmpx
pub fn dump_raw(
    path: &FPath,
    user: Option<&str>,
) -> Result<RawDump> {
    defn!("({:?}, {:?})", path, user);
    let store: UtmpxStore = UtmpxStore::open(path, StoreMode::Read)?;
    let mut dump = RawDump::default();
    let mut entries = store.into_entries();
    for result in entries.by_ref() {
        let entry: Utmpx = match result {
            Ok(val) => val,
            Err(_err) => {
                de_err!("{}", _err);
                continue;
            }
        };
        if let Some(user_) = user {
            if !entry.is_user(user_) {
                continue;
            }
        }
        let mut line: String = format_raw(&entry);
        line.push(NLu8 as char);
        write_stdout(line.as_bytes());
        dump.printed += 1;
    }
    dump.unreadable = entries.store().count_entries_unreadable();
    defx!("return {:?}", dump);

    Ok(dump)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// helper functions
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Safely write the `buffer` to stdout with help of [`StdoutLock`].
///
/// [`StdoutLock`]: std::io::StdoutLock
pub fn write_stdout(buffer: &[u8]) {
    let stdout = std::io::stdout();
    let mut stdout_lock = stdout.lock();
    let _stderr_lock = std::io::stderr().lock();
    match stdout_lock.write_all(buffer) {
        Ok(_) => {}
        Err(_err) => {
            // XXX: this will print when this program stdout is truncated, like to due to `head`
            //          Broken pipe (os error 32)
            de_err!("stdout_lock.write_all(buffer@{:p} (len {})) error {}", buffer, buffer.len(), _err);
        }
    }
    match stdout_lock.flush() {
        Ok(_) => {}
        Err(_err) => {
            de_err!("stdout_lock.flush() error {}", _err);
        }
    }
}
