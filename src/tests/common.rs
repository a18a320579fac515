// src/tests/common.rs

//! common data and helpers for tests

#![allow(non_upper_case_globals)]

use crate::common::{Count, FPath, FileOffset, ResultS3};
use crate::data::utmpx::{tv_sec_type, utmpx, UtType, Utmpx, UTMPX_SZ, UTMPX_SZ_FO};
use crate::debug::helpers::{create_temp_file_bytes, NamedTempFile};
use crate::readers::sessionprocessor::ProcessProbe;
use crate::readers::utmpxstore::{EntryStore, ResultS3UtmpxFind, StoreMode, UtmpxStore};

use std::io::{Error, ErrorKind, Result};
use std::net::Ipv4Addr;

use ::chrono::{Local, TimeZone};
use ::lazy_static::lazy_static;

pub const USER_ALICE: &str = "alice";
pub const USER_BOB: &str = "bob";
pub const USER_HIDE: &str = "hide";

/// A user name filling the whole `ut_user` capacity, no NUL.
pub const USER_32: &str = "abcdefghijklmnopqrstuvwxyz012345";

/// Create a `Utmpx` with the passed fields; all other bytes zero.
/// The file offset is `0`.
pub fn new_utmpx(
    ut_type: UtType,
    pid: i32,
    line: &str,
    user: &str,
    host: &str,
    tv_sec: tv_sec_type,
) -> Utmpx {
    let mut entry = Utmpx::new(0, utmpx::zeroed());
    entry.set_ut_type(ut_type);
    entry.set_ut_pid(pid);
    entry.set_ut_line(line);
    entry.set_ut_user(user);
    entry.set_ut_host(host);
    entry.set_tv(tv_sec, 0);

    entry
}

/// A `USER_PROCESS` login entry with an id, a host and an address.
pub fn new_login(
    pid: i32,
    line: &str,
    user: &str,
    tv_sec: tv_sec_type,
) -> Utmpx {
    let mut entry = new_utmpx(UtType::UserProcess, pid, line, user, "10.0.0.1", tv_sec);
    entry.set_ut_id(&line[line.len().saturating_sub(4)..]);
    entry.set_ut_addr(Ipv4Addr::new(10, 0, 0, 1));

    entry
}

/// A `DEAD_PROCESS` logout entry.
pub fn new_logout(
    pid: i32,
    line: &str,
    tv_sec: tv_sec_type,
) -> Utmpx {
    new_utmpx(UtType::DeadProcess, pid, line, "", "", tv_sec)
}

/// A `BOOT_TIME` entry, written as user `reboot`.
pub fn new_boot(tv_sec: tv_sec_type) -> Utmpx {
    new_utmpx(UtType::BootTime, 0, "~", "reboot", "", tv_sec)
}

/// A `RUN_LVL` entry for changing from run level `previous` to `level`.
/// `init` stores both in `ut_pid`.
pub fn new_runlevel(
    level: char,
    previous: char,
    tv_sec: tv_sec_type,
) -> Utmpx {
    let pid: i32 = (previous as i32) * 256 + (level as i32);
    new_utmpx(UtType::RunLevel, pid, "~", "runlevel", "", tv_sec)
}

/// The on-disk bytes of `entries`, in order.
pub fn entries_to_bytes(entries: &[Utmpx]) -> Vec<u8> {
    let mut data: Vec<u8> = Vec::with_capacity(entries.len() * UTMPX_SZ);
    for entry in entries.iter() {
        data.extend_from_slice(&entry.to_buffer());
    }

    data
}

/// Write `entries` to a new temporary wtmp file.
pub fn create_temp_wtmp(entries: &[Utmpx]) -> NamedTempFile {
    create_temp_file_bytes(&entries_to_bytes(entries))
}

/// Read all entries of the wtmp file at `path`, without the library
/// readers.
pub fn read_entries(path: &FPath) -> Vec<Utmpx> {
    let data: Vec<u8> = std::fs::read(path).unwrap();
    assert_eq!(data.len() % UTMPX_SZ, 0, "file {:?} size {} is not a multiple of {}", path, data.len(), UTMPX_SZ);
    data.chunks(UTMPX_SZ)
        .enumerate()
        .map(|(at, chunk)| Utmpx::from_buffer(at as u64 * UTMPX_SZ_FO, chunk).unwrap())
        .collect()
}

/// Epoch seconds of the passed local time.
pub fn local_tv_sec(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    min: u32,
    sec: u32,
) -> tv_sec_type {
    Local
        .with_ymd_and_hms(year, month, day, hour, min, sec)
        .earliest()
        .unwrap()
        .timestamp()
}

/// A `ProcessProbe` that knows a fixed set of live processes.
pub struct StubProbe {
    pub alive: Vec<i32>,
}

impl ProcessProbe for StubProbe {
    fn is_alive(&self, pid: i32) -> bool {
        self.alive.contains(&pid)
    }
}

/// A `ProcessProbe` for which every process is gone.
pub const PROBE_NONE_ALIVE: StubProbe = StubProbe { alive: Vec::new() };

/// An `EntryStore` over a `UtmpxStore` where chosen entries cannot be
/// read or cannot be rewritten.
pub struct FaultyStore {
    store: UtmpxStore,
    /// `FileOffset`s of entries returned as `Err`
    unreadable_at: Vec<FileOffset>,
    /// `FileOffset`s of entries whose `rewrite` fails
    rewrite_fails_at: Vec<FileOffset>,
    /// `Count` of `Err` returned for `unreadable_at`
    unreadable: Count,
}

impl FaultyStore {
    pub fn open(
        path: &FPath,
        mode: StoreMode,
        unreadable_at: Vec<FileOffset>,
        rewrite_fails_at: Vec<FileOffset>,
    ) -> Result<FaultyStore> {
        Ok(FaultyStore {
            store: UtmpxStore::open(path, mode)?,
            unreadable_at,
            rewrite_fails_at,
            unreadable: 0,
        })
    }
}

impl EntryStore for FaultyStore {
    fn next_entry(&mut self) -> ResultS3UtmpxFind {
        match self.store.next_entry() {
            ResultS3::Found(entry) if self.unreadable_at.contains(&entry.fileoffset_begin()) => {
                self.unreadable += 1;
                ResultS3::Err(Error::new(
                    ErrorKind::Other,
                    format!("unreadable entry at {}", entry.fileoffset_begin()),
                ))
            }
            result => result,
        }
    }

    fn rewrite(&mut self, entry: &Utmpx) -> bool {
        if self.rewrite_fails_at.contains(&entry.fileoffset_begin()) {
            return false;
        }
        self.store.rewrite(entry)
    }

    fn count_entries_unreadable(&self) -> Count {
        self.unreadable + self.store.count_entries_unreadable()
    }
}

lazy_static! {
    /// Login time of the first session of `ENTRIES_DAY`.
    pub static ref TV_DAY: tv_sec_type = local_tv_sec(2008, 9, 6, 14, 30, 0);

    /// A small day of logins.
    ///
    /// ```text
    /// 0 BOOT_TIME
    /// 1 alice tty1 login          pid 1001
    /// 2 bob   pts/0 login         pid 1002
    /// 3 tty1 logout               (closes alice after 500 seconds)
    /// 4 alice pts/1 login         pid 1003
    /// 5 pts/0 logout              (closes bob)
    /// ```
    ///
    /// alice on `pts/1` is never closed.
    pub static ref ENTRIES_DAY: Vec<Utmpx> = {
        let tv: tv_sec_type = *TV_DAY;
        vec![
            new_boot(tv - 60),
            new_login(1001, "tty1", USER_ALICE, tv),
            new_login(1002, "pts/0", USER_BOB, tv + 100),
            new_logout(1001, "tty1", tv + 500),
            new_login(1003, "pts/1", USER_ALICE, tv + 600),
            new_logout(1002, "pts/0", tv + 700),
        ]
    };
}
