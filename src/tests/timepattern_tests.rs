// src/tests/timepattern_tests.rs

//! tests for `timepattern.rs`

#![allow(non_snake_case)]

use crate::data::timepattern::{TimePattern, TIMEPATTERN_DEFAULT};
use crate::data::utmpx::tv_sec_type;
use crate::tests::common::{local_tv_sec, new_login, USER_ALICE};

use std::io::ErrorKind;

use ::test_case::test_case;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test_case("2008.09.06 14:30:00")]
#[test_case("")]
#[test_case("anything")]
fn test_TimePattern_default(text: &str) {
    let pattern = TimePattern::new(TIMEPATTERN_DEFAULT).unwrap();
    assert!(pattern.is_match(text));
    assert_eq!(pattern.as_str(), ".*");
}

#[test_case(r"2008\.09\.06 14:30:00", "2008.09.06 14:30:00", true; "exact")]
#[test_case(r"2008\.09\.06 14:30:00", "2008.09.06 14:30:01", false; "exact other second")]
#[test_case(r"14:30", "2008.09.06 14:30:00", true; "unanchored")]
#[test_case(r"^14:30", "2008.09.06 14:30:00", false; "anchored")]
#[test_case(r"2013\.12\... 23:.*", "2013.12.01 23:10:00", true; "any day hour 23")]
#[test_case(r"2013\.12\... 23:.*", "2013.12.02 10:00:00", false; "any day hour 10")]
#[test_case(r"2013\.12\.(0[1-9]|1[0-5]) ", "2013.12.09 10:00:00", true; "day range in")]
#[test_case(r"2013\.12\.(0[1-9]|1[0-5]) ", "2013.12.16 10:00:00", false; "day range out")]
#[test_case(r"2013\.12\.?? 23:.*", "2013.12.01 23:10:00", false; "optional dot is not a wildcard")]
fn test_TimePattern_is_match(pattern: &str, text: &str, expect: bool) {
    let timepattern = TimePattern::new(pattern).unwrap();
    assert_eq!(timepattern.is_match(text), expect, "pattern {:?} text {:?}", pattern, text);
}

#[test_case("("; "open group")]
#[test_case("[a-"; "open class")]
#[test_case("a{2,1}"; "bad repetition")]
fn test_TimePattern_bad(pattern: &str) {
    match TimePattern::new(pattern) {
        Ok(val) => panic!("expected Err for {:?}, got {:?}", pattern, val),
        Err(err) => {
            assert_eq!(err.kind(), ErrorKind::InvalidInput);
            assert!(err.to_string().contains("bad time pattern"), "{}", err);
        }
    }
}

#[test]
fn test_TimePattern_is_match_entry() {
    let tv_sec: tv_sec_type = local_tv_sec(2013, 12, 1, 23, 10, 0);
    let entry = new_login(1, "tty1", USER_ALICE, tv_sec);
    let pattern = TimePattern::new(r"^2013\.12\.01 23:10:00$").unwrap();
    assert!(pattern.is_match_entry(&entry));
    let pattern = TimePattern::new(r"^2013\.12\.01 23:10:01$").unwrap();
    assert!(!pattern.is_match_entry(&entry));
}

#[test]
fn test_TimePattern_is_match_entry_zero_time() {
    let entry = new_login(1, "tty1", USER_ALICE, 0);
    assert!(TimePattern::new(TIMEPATTERN_DEFAULT).unwrap().is_match_entry(&entry));
    assert!(!TimePattern::new("1970").unwrap().is_match_entry(&entry));
}
