// src/data/datetime.rs

//! Functions to transform the `tv_sec` epoch seconds of a [`Utmpx`] into
//! the strings printed and matched by _wtmpclean_.
//!
//! All conversions use the local system timezone.
//!
//! The most relevant document to understand this file is the
//! `chrono` crate [`strftime`] format.
//!
//! [`Utmpx`]: crate::data::utmpx::Utmpx
//! [`strftime`]: https://docs.rs/chrono/0.4.21/chrono/format/strftime/index.html

#![allow(non_camel_case_types)]

use crate::data::utmpx::tv_sec_type;

#[doc(hidden)]
pub use ::chrono::{
    DateTime,
    Local,
    LocalResult,
    TimeZone,
};
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// A chrono [`DateTime`] type used in _wtmplib_.
///
/// [`DateTime`]: https://docs.rs/chrono/0.4.21/chrono/struct.DateTime.html
pub type DateTimeL = DateTime<Local>;
pub type DateTimeLOpt = Option<DateTimeL>;

/// Crate `chrono` [`strftime`] formatting pattern.
///
/// [`strftime`]: https://docs.rs/chrono/0.4.21/chrono/format/strftime/index.html
pub type DateTimePattern_str = str;

/// The canonical time string of an entry, matched by a [`TimePattern`].
/// Always [`TIMETOSTR_LEN`] characters, e.g. `"2008.09.06 14:30:00"`.
///
/// [`TimePattern`]: crate::data::timepattern::TimePattern
pub const TIMETOSTR_FORMAT: &DateTimePattern_str = "%Y.%m.%d %H:%M:%S";

/// Length of a string formatted with [`TIMETOSTR_FORMAT`].
pub const TIMETOSTR_LEN: usize = 19;

/// Login time printed in a session listing, e.g. `"Sat Sep  6 2008 14:30"`.
pub const TIME_LOGIN_FORMAT: &DateTimePattern_str = "%a %b %e %Y %H:%M";

/// Logout time printed in a session listing, e.g. `"14:30"`.
pub const TIME_HHMM_FORMAT: &DateTimePattern_str = "%H:%M";

/// Convert epoch seconds to a [`DateTimeL`] in the local timezone.
///
/// An ambiguous local time (i.e. during a daylight savings transition)
/// resolves to the earlier datetime.
/// Return `None` if the conversion fails.
pub fn tv_sec_to_datetime(tv_sec: tv_sec_type) -> DateTimeLOpt {
    match Local.timestamp_opt(tv_sec, 0) {
        LocalResult::None => {
            defñ!("Local.timestamp_opt({}, 0) is None", tv_sec);
            None
        }
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(dt, _) => Some(dt),
    }
}

/// Format epoch seconds with the passed `format`.
///
/// A failed conversion returns an empty `String`.
fn tv_sec_format(
    tv_sec: tv_sec_type,
    format: &DateTimePattern_str,
) -> String {
    match tv_sec_to_datetime(tv_sec) {
        Some(dt) => dt.format(format).to_string(),
        None => String::new(),
    }
}

/// Format epoch seconds as `"YYYY.MM.DD HH:MM:SS"` in the local timezone.
///
/// `0` is the "unknown time" value and returns an empty `String`.
pub fn timetostr(tv_sec: tv_sec_type) -> String {
    if tv_sec == 0 {
        return String::new();
    }
    tv_sec_format(tv_sec, TIMETOSTR_FORMAT)
}

/// Format epoch seconds as a login time, `"Www Mmm dd YYYY HH:MM"`.
/// `0` is formatted like any other time, the epoch.
pub fn time_login(tv_sec: tv_sec_type) -> String {
    tv_sec_format(tv_sec, TIME_LOGIN_FORMAT)
}

/// Format epoch seconds as `"HH:MM"`.
/// `0` is formatted like any other time, the epoch.
pub fn time_hhmm(tv_sec: tv_sec_type) -> String {
    tv_sec_format(tv_sec, TIME_HHMM_FORMAT)
}
