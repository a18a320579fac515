// src/tests/utmpx_tests.rs

//! tests for `utmpx.rs`

#![allow(non_snake_case)]

use crate::data::utmpx::{
    bounded_bytes,
    bounded_eq,
    bounded_set,
    bounded_to_str,
    buffer_to_utmpx,
    utmpx,
    UtType,
    Utmpx,
    UT_IDSIZE,
    UT_LINESIZE,
    UT_NAMESIZE,
    UTMPX_SZ,
    UTMPX_SZ_FO,
};
use crate::tests::common::{
    new_login,
    new_runlevel,
    new_utmpx,
    USER_32,
    USER_ALICE,
};

use std::net::Ipv4Addr;

use ::test_case::test_case;
#[allow(unused_imports)]
use ::more_asserts::{
    assert_ge,
    assert_gt,
    assert_le,
    assert_lt,
};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test]
fn test_UTMPX_SZ() {
    assert_eq!(UTMPX_SZ, 384);
    assert_eq!(UTMPX_SZ_FO, 384);
}

/// a `ut_user` field holding `value`
fn field_user(value: &str) -> [u8; UT_NAMESIZE] {
    let mut field = [0; UT_NAMESIZE];
    bounded_set(&mut field, value.as_bytes());

    field
}

#[test_case("alice", "alice", true; "same")]
#[test_case("alice", "alic", false; "shorter")]
#[test_case("alice", "alicex", false; "longer")]
#[test_case("alice", "bob", false; "different")]
#[test_case("", "", true; "empty")]
#[test_case(USER_32, USER_32, true; "full capacity no NUL")]
#[test_case(USER_32, "abcdefghijklmnopqrstuvwxyz0123456789", true; "compared up to capacity")]
#[test_case(USER_32, "abcdefghijklmnopqrstuvwxyz01234", false; "one short of capacity")]
fn test_bounded_eq(field: &str, other: &str, expect: bool) {
    let field_ = field_user(field);
    assert_eq!(bounded_eq(&field_, other.as_bytes()), expect, "field {:?} other {:?}", field, other);
}

#[test]
fn test_bounded_eq_small_field() {
    let field: [u8; UT_IDSIZE] = *b"tty1";
    assert!(bounded_eq(&field, b"tty1"));
    assert!(bounded_eq(&field, b"tty12"));
    assert!(!bounded_eq(&field, b"tty"));
}

#[test]
fn test_bounded_set_pads_with_nul() {
    let mut field: [u8; UT_NAMESIZE] = [b'x'; UT_NAMESIZE];
    bounded_set(&mut field, b"bob");
    assert_eq!(&field[..3], b"bob");
    assert!(field[3..].iter().all(|b| *b == 0), "field not NUL padded {:?}", field);
}

#[test]
fn test_bounded_set_truncates() {
    let mut field: [u8; UT_IDSIZE] = [0; UT_IDSIZE];
    bounded_set(&mut field, b"pts/10");
    assert_eq!(&field, b"pts/");
    assert_eq!(bounded_bytes(&field), b"pts/");
}

#[test]
fn test_bounded_set_stops_at_nul() {
    let mut field: [u8; UT_IDSIZE] = [0; UT_IDSIZE];
    bounded_set(&mut field, b"a\0bc");
    assert_eq!(&field, b"a\0\0\0");
}

#[test]
fn test_bounded_to_str() {
    assert_eq!(bounded_to_str(&field_user(USER_ALICE)), USER_ALICE);
    assert_eq!(bounded_to_str(&field_user(USER_32)), USER_32);
    assert_eq!(bounded_to_str(&[0xFF, b'a', 0]), "\u{FFFD}a");
}

#[test]
fn test_buffer_to_utmpx_zero() {
    let entry: utmpx = buffer_to_utmpx(&[0; UTMPX_SZ]).unwrap();
    assert_eq!(entry, utmpx::zeroed());
}

#[test]
fn test_buffer_to_utmpx_toosmall() {
    assert!(buffer_to_utmpx(&[0; UTMPX_SZ - 1]).is_none());
}

#[test]
fn test_Utmpx_field_offsets() {
    let mut entry = new_login(0x01020304, "pts/7", USER_ALICE, 0x11223344);
    entry.set_ut_addr(Ipv4Addr::new(192, 168, 1, 2));
    let buffer = entry.to_buffer();
    assert_eq!(i16::from_ne_bytes([buffer[0], buffer[1]]), 7);
    assert_eq!(i32::from_ne_bytes(buffer[4..8].try_into().unwrap()), 0x01020304);
    assert_eq!(&buffer[8..13], b"pts/7");
    assert_eq!(buffer[13], 0);
    assert_eq!(&buffer[40..44], b"ts/7");
    assert_eq!(&buffer[44..49], USER_ALICE.as_bytes());
    assert_eq!(&buffer[76..84], b"10.0.0.1");
    assert_eq!(i32::from_ne_bytes(buffer[340..344].try_into().unwrap()), 0x11223344);
    assert_eq!(&buffer[348..352], &[192, 168, 1, 2]);
}

#[test]
fn test_Utmpx_from_buffer_to_buffer() {
    let mut buffer: [u8; UTMPX_SZ] = [0; UTMPX_SZ];
    for (at, b) in buffer.iter_mut().enumerate() {
        *b = (at % 251) as u8;
    }
    let entry = Utmpx::from_buffer(UTMPX_SZ_FO * 2, &buffer).unwrap();
    assert_eq!(entry.fileoffset_begin(), UTMPX_SZ_FO * 2);
    assert_eq!(entry.fileoffset_end(), UTMPX_SZ_FO * 3);
    // every byte, including padding and reserved bytes, is kept
    assert_eq!(entry.to_buffer(), buffer);
}

#[test]
fn test_UtType_from_i16() {
    assert_eq!(UtType::from(0), UtType::Empty);
    assert_eq!(UtType::from(1), UtType::RunLevel);
    assert_eq!(UtType::from(2), UtType::BootTime);
    assert_eq!(UtType::from(3), UtType::NewTime);
    assert_eq!(UtType::from(4), UtType::OldTime);
    assert_eq!(UtType::from(7), UtType::UserProcess);
    assert_eq!(UtType::from(8), UtType::DeadProcess);
    assert_eq!(UtType::from(42), UtType::Unknown(42));
    assert_eq!(UtType::Unknown(42).as_i16(), 42);
    assert_eq!(UtType::Accounting.as_i16(), 9);
}

#[test_case('0', 'N'; "halt")]
#[test_case('6', '5'; "reboot")]
#[test_case('3', 'S'; "multiuser")]
fn test_Utmpx_runlevel(level: char, previous: char) {
    let entry = new_runlevel(level, previous, 1);
    assert_eq!(entry.runlevel(), level);
}

#[test]
fn test_Utmpx_is_user() {
    let entry = new_login(1, "tty1", USER_ALICE, 1);
    assert!(entry.is_user(USER_ALICE));
    assert!(!entry.is_user("alic"));
    assert!(!entry.is_user("alice2"));
    let entry32 = new_login(1, "tty1", USER_32, 1);
    assert!(entry32.is_user(USER_32));
}

#[test]
fn test_Utmpx_is_same_line() {
    let a = new_login(1, "pts/1", USER_ALICE, 1);
    let b = new_utmpx(UtType::DeadProcess, 1, "pts/1", "", "", 2);
    let c = new_utmpx(UtType::DeadProcess, 1, "pts/10", "", "", 2);
    assert!(a.is_same_line(&b));
    assert!(!a.is_same_line(&c));
}

#[test]
fn test_Utmpx_set_ut_user_truncates() {
    let mut entry = new_login(1, "tty1", USER_ALICE, 1);
    let long_name: String = "z".repeat(UT_NAMESIZE + 8);
    entry.set_ut_user(long_name.as_str());
    assert_eq!(entry.ut_user(), &[b'z'; UT_NAMESIZE]);
    entry.set_ut_user("bob");
    assert_eq!(bounded_bytes(entry.ut_user()), b"bob");
    assert!(entry.ut_user()[3..].iter().all(|b| *b == 0));
}

#[test]
fn test_Utmpx_mark_dead() {
    let mut entry = new_login(4321, "pts/3", USER_ALICE, 1234567);
    entry.entry.ut_addr_v6 = [1, 2, 3, 4];
    entry.entry.ut_session = 99;
    let before = entry;
    entry.mark_dead();
    assert_eq!(entry.ut_type(), UtType::DeadProcess);
    assert_eq!(entry.ut_pid(), 4321);
    assert_eq!(entry.ut_line(), before.ut_line());
    assert_eq!(entry.tv_sec(), 1234567);
    assert_eq!(entry.entry.ut_session, 99);
    assert_eq!(entry.ut_user(), &[0; UT_NAMESIZE]);
    assert_eq!(entry.ut_id(), &[0; UT_IDSIZE]);
    assert!(entry.ut_host().iter().all(|b| *b == 0));
    assert_eq!(entry.entry.ut_addr_v6, [0; 4]);
    assert_eq!(entry.ut_addr(), Ipv4Addr::UNSPECIFIED);
    assert_eq!(entry.fileoffset_begin(), before.fileoffset_begin());
}

#[test]
fn test_Utmpx_mark_dead_twice() {
    let mut entry = new_login(1, "tty1", USER_ALICE, 1);
    entry.mark_dead();
    let once = entry;
    entry.mark_dead();
    assert_eq!(entry, once);
}

#[test]
fn test_Utmpx_to_String_noraw() {
    let entry = new_login(1, "tty1", USER_ALICE, 1);
    let s = entry.to_String_noraw();
    assert!(s.contains("ut_user 'alice␀"), "{:?}", s);
    assert!(s.contains("ut_pid 1 "), "{:?}", s);
    assert_lt!(UT_LINESIZE, s.len());
}
