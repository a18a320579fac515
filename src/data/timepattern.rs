// src/data/timepattern.rs

//! A [`TimePattern`] selects [`Utmpx`] entries by matching a user-passed
//! regular expression against the entry time formatted by [`timetostr`].
//!
//! The match is purely textual. Because the formatted time has a fixed
//! width, a pattern like `"2013\.12\... 23:.*"` selects every day of a
//! month at one hour without any date interpretation.
//!
//! [`Utmpx`]: crate::data::utmpx::Utmpx
//! [`timetostr`]: crate::data::datetime::timetostr

use crate::data::datetime::timetostr;
use crate::data::utmpx::Utmpx;

use std::fmt;
use std::io::{Error, ErrorKind, Result};

use ::regex::Regex;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// The default pattern; matches every time.
pub const TIMEPATTERN_DEFAULT: &str = ".*";

/// A compiled time pattern, match-only (no capture groups are used).
pub struct TimePattern {
    regex: Regex,
}

impl fmt::Debug for TimePattern {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        f.debug_struct("TimePattern")
            .field("pattern", &self.regex.as_str())
            .finish()
    }
}

impl TimePattern {
    /// Compile `pattern`.
    ///
    /// A bad pattern returns an `Error` of kind `InvalidInput` carrying the
    /// regex compiler message.
    pub fn new(pattern: &str) -> Result<TimePattern> {
        defn!("({:?})", pattern);
        let regex: Regex = match Regex::new(pattern) {
            Ok(val) => val,
            Err(err) => {
                defx!("Regex::new({:?}) failed {}", pattern, err);
                return Err(
                    Error::new(
                        ErrorKind::InvalidInput,
                        format!("bad time pattern {:?}: {}", pattern, err),
                    )
                );
            }
        };
        defx!();

        Ok(TimePattern { regex })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Does the pattern match anywhere within `text`?
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Does the pattern match the formatted time of `entry`?
    pub fn is_match_entry(&self, entry: &Utmpx) -> bool {
        let s: String = timetostr(entry.tv_sec());
        let ret = self.is_match(s.as_str());
        defñ!("({:?}) {}", s, ret);

        ret
    }
}
