// src/data/utmpx.rs

//! Implement [`Utmpx`] for the [`utmpx`] C struct, the fixed-size record
//! of a `wtmp` login accounting file (sometimes referred to
//! as the older [`utmp`] C struct).
//!
//! The text fields of a `utmpx` are fixed-capacity byte arrays that are
//! _not_ required to end with a NUL byte (glibc marks them
//! `__attribute_nonstring__`). All comparisons and assignments of those
//! fields are done by the `bounded_*` functions which never read past the
//! capacity of a field.
//!
//! [`Utmpx`]: self::Utmpx
//! [`utmpx`]: https://man7.org/linux/man-pages/man5/utmpx.5.html
//! [`utmp`]: https://elixir.bootlin.com/glibc/glibc-2.37/source/bits/utmp.h#L57

#[doc(hidden)]
use crate::de_err;
use crate::common::FileOffset;
#[cfg(any(debug_assertions, test))]
use crate::debug::printers::buffer_to_String_noraw;

use std::borrow::Cow;
use std::fmt;
use std::net::Ipv4Addr;

use ::bstr::ByteSlice;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// C struct definitions
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The `utmpx` record found on Linux glibc, x86_64 and the "compat32"
/// 64-bit platforms. The `ut_session` and `ut_tv` fields are 32 bits wide
/// so the same file may be shared by 32-bit and 64-bit programs.
#[allow(non_camel_case_types)]
pub mod linux_gnu {
    use crate::common::FileOffset;
    use std::mem::size_of;
    use ::const_format::assertcp_eq;
    use ::memoffset::offset_of;

    pub const UT_LINESIZE: usize = 32;
    pub const UT_IDSIZE: usize = 4;
    pub const UT_NAMESIZE: usize = 32;
    pub const UT_HOSTSIZE: usize = 256;

    /// ```text
    /// __timeval               sizeof   8
    /// __timeval.tv_sec   @  0 sizeof   4
    /// __timeval.tv_usec  @  4 sizeof   4
    /// ```
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    #[repr(C, align(4))]
    pub struct __timeval {
        pub tv_sec: i32,
        pub tv_usec: i32,
    }

    assertcp_eq!(size_of::<__timeval>(), 8);
    assertcp_eq!(offset_of!(__timeval, tv_sec), 0);
    assertcp_eq!(offset_of!(__timeval, tv_usec), 4);

    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    #[repr(C, align(2))]
    pub struct __exit_status {
        pub e_termination: i16,
        pub e_exit: i16,
    }

    assertcp_eq!(size_of::<__exit_status>(), 4);

    /// The [`utmpx` struct].
    ///
    /// The two bytes of alignment padding after `ut_type` are declared as
    /// field `__ut_pad` so that every byte of a record read from a file is
    /// carried into the record written back.
    ///
    /// ```text
    /// utmpx                   sizeof 384
    /// utmpx.ut_type      @  0 sizeof   2
    /// utmpx.ut_pid       @  4 sizeof   4
    /// utmpx.ut_line      @  8 sizeof  32
    /// utmpx.ut_id        @ 40 sizeof   4
    /// utmpx.ut_user      @ 44 sizeof  32
    /// utmpx.ut_host      @ 76 sizeof 256
    /// utmpx.ut_exit      @332 sizeof   4
    /// utmpx.ut_session   @336 sizeof   4
    /// utmpx.ut_tv        @340 sizeof   8
    /// utmpx.ut_tv.tv_sec @340 sizeof   4
    /// utmpx.ut_tv.tv_usec@344 sizeof   4
    /// utmpx.ut_addr      @348 sizeof   4
    /// utmpx.ut_addr_v6   @348 sizeof  16
    /// ```
    ///
    /// [`utmpx` struct]: https://elixir.bootlin.com/glibc/latest/source/sysdeps/gnu/bits/utmpx.h
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    #[repr(C, align(4))]
    pub struct utmpx {
        pub ut_type: i16,
        pub __ut_pad: [u8; 2],
        pub ut_pid: i32,
        pub ut_line: [u8; UT_LINESIZE],
        pub ut_id: [u8; UT_IDSIZE],
        pub ut_user: [u8; UT_NAMESIZE],
        pub ut_host: [u8; UT_HOSTSIZE],
        pub ut_exit: __exit_status,
        pub ut_session: i32,
        pub ut_tv: __timeval,
        pub ut_addr_v6: [i32; 4],
        /* private fields */
        pub __glibc_reserved: [u8; 20],
    }

    impl utmpx {
        /// A `utmpx` with all bytes zero (an `EMPTY` record).
        pub const fn zeroed() -> utmpx {
            utmpx {
                ut_type: 0,
                __ut_pad: [0; 2],
                ut_pid: 0,
                ut_line: [0; UT_LINESIZE],
                ut_id: [0; UT_IDSIZE],
                ut_user: [0; UT_NAMESIZE],
                ut_host: [0; UT_HOSTSIZE],
                ut_exit: __exit_status {
                    e_termination: 0,
                    e_exit: 0,
                },
                ut_session: 0,
                ut_tv: __timeval {
                    tv_sec: 0,
                    tv_usec: 0,
                },
                ut_addr_v6: [0; 4],
                __glibc_reserved: [0; 20],
            }
        }
    }

    /// [`size_of::<utmpx>`].
    ///
    /// [`size_of::<utmpx>`]: std::mem::size_of
    pub const UTMPX_SZ: usize = size_of::<utmpx>();

    /// [`UTMPX_SZ`] as a [`FileOffset`].
    ///
    /// [`FileOffset`]: crate::common::FileOffset
    pub const UTMPX_SZ_FO: FileOffset = UTMPX_SZ as FileOffset;

    assertcp_eq!(UTMPX_SZ, 384);
    assertcp_eq!(offset_of!(utmpx, ut_type), 0);
    assertcp_eq!(offset_of!(utmpx, __ut_pad), 2);
    assertcp_eq!(offset_of!(utmpx, ut_pid), 4);
    assertcp_eq!(offset_of!(utmpx, ut_line), 8);
    assertcp_eq!(offset_of!(utmpx, ut_id), 40);
    assertcp_eq!(offset_of!(utmpx, ut_user), 44);
    assertcp_eq!(offset_of!(utmpx, ut_host), 76);
    assertcp_eq!(offset_of!(utmpx, ut_exit), 332);
    assertcp_eq!(offset_of!(utmpx, ut_session), 336);
    assertcp_eq!(offset_of!(utmpx, ut_tv), 340);
    assertcp_eq!(offset_of!(utmpx, ut_addr_v6), 348);
    assertcp_eq!(offset_of!(utmpx, __glibc_reserved), 364);
}

cfg_if::cfg_if! {
    if #[cfg(target_os = "linux")] {
        pub use linux_gnu::{
            utmpx,
            UT_HOSTSIZE,
            UT_IDSIZE,
            UT_LINESIZE,
            UT_NAMESIZE,
            UTMPX_SZ,
            UTMPX_SZ_FO,
        };
    } else {
        compile_error!("only the Linux wtmp record layout is implemented");
    }
}

#[allow(non_camel_case_types)]
pub type tv_sec_type = i64;
#[allow(non_camel_case_types)]
pub type tv_usec_type = i64;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ut_type
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The [`.ut_type`] of a record.
///
/// ```C
/// #define EMPTY         0 /* Record does not contain valid info (formerly known as UT_UNKNOWN on Linux) */
/// #define RUN_LVL       1 /* Change in system run-level (see init(8)) */
/// #define BOOT_TIME     2 /* Time of system boot (in ut_tv) */
/// #define NEW_TIME      3 /* Time after system clock change (in ut_tv) */
/// #define OLD_TIME      4 /* Time before system clock change (in ut_tv) */
/// #define INIT_PROCESS  5 /* Process spawned by init(8) */
/// #define LOGIN_PROCESS 6 /* Session leader process for user login */
/// #define USER_PROCESS  7 /* Normal process */
/// #define DEAD_PROCESS  8 /* Terminated process */
/// #define ACCOUNTING    9 /* Not implemented */
/// ```
///
/// A value outside of those is kept as `Unknown` so it is never mistaken
/// for a known type and is written back unchanged.
///
/// [`.ut_type`]: https://man7.org/linux/man-pages/man5/utmp.5.html
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum UtType {
    Empty,
    RunLevel,
    BootTime,
    NewTime,
    OldTime,
    InitProcess,
    LoginProcess,
    UserProcess,
    DeadProcess,
    Accounting,
    Unknown(i16),
}

impl UtType {
    pub const fn as_i16(self) -> i16 {
        match self {
            UtType::Empty => 0,
            UtType::RunLevel => 1,
            UtType::BootTime => 2,
            UtType::NewTime => 3,
            UtType::OldTime => 4,
            UtType::InitProcess => 5,
            UtType::LoginProcess => 6,
            UtType::UserProcess => 7,
            UtType::DeadProcess => 8,
            UtType::Accounting => 9,
            UtType::Unknown(val) => val,
        }
    }
}

impl From<i16> for UtType {
    fn from(val: i16) -> Self {
        match val {
            0 => UtType::Empty,
            1 => UtType::RunLevel,
            2 => UtType::BootTime,
            3 => UtType::NewTime,
            4 => UtType::OldTime,
            5 => UtType::InitProcess,
            6 => UtType::LoginProcess,
            7 => UtType::UserProcess,
            8 => UtType::DeadProcess,
            9 => UtType::Accounting,
            _ => UtType::Unknown(val),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// bounded fields
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Compare a fixed-capacity `field` to `other` the way
/// `strncmp(field, other, sizeof field) == 0` does.
///
/// At most `field.len()` bytes are compared. Bytes past the end of `other`
/// are treated as NUL. Comparison stops early when both sides hold a NUL.
/// A value that fills the whole capacity without a terminating NUL
/// still compares equal.
pub fn bounded_eq(field: &[u8], other: &[u8]) -> bool {
    for (at, a) in field.iter().enumerate() {
        let b: u8 = match other.get(at) {
            Some(b_) => *b_,
            None => 0,
        };
        if *a != b {
            return false;
        }
        if *a == 0 {
            return true;
        }
    }

    true
}

/// Copy `value` into the fixed-capacity `field` the way
/// `strncpy(field, value, sizeof field)` does.
///
/// `value` is truncated to the capacity (no NUL terminator is guaranteed),
/// a shorter `value` is followed by NUL bytes up to the capacity.
/// Copying stops at the first NUL byte within `value`.
pub fn bounded_set(field: &mut [u8], value: &[u8]) {
    let value_len: usize = match value.iter().position(|b| *b == 0) {
        Some(at) => at,
        None => value.len(),
    };
    let len: usize = std::cmp::min(field.len(), value_len);
    field[..len].copy_from_slice(&value[..len]);
    field[len..].fill(0);
}

/// The bytes of the fixed-capacity `field` up to the first NUL byte or
/// the capacity.
pub fn bounded_bytes(field: &[u8]) -> &[u8] {
    match field.iter().position(|b| *b == 0) {
        Some(at) => &field[..at],
        None => field,
    }
}

/// Lossy UTF-8 text of the fixed-capacity `field`, for display.
pub fn bounded_to_str(field: &[u8]) -> Cow<'_, str> {
    bounded_bytes(field).to_str_lossy()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Utmpx
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Convert `[u8]` bytes to a [`utmpx`].
///
/// Returns `None` if the buffer is too small.
///
/// unsafe.
pub fn buffer_to_utmpx(buffer: &[u8]) -> Option<utmpx> {
    defn!("(buffer len {:?})", buffer.len());
    if buffer.len() < UTMPX_SZ {
        de_err!("buffer too small; {}, require {}", buffer.len(), UTMPX_SZ);
        defx!("return None");
        return None;
    }
    let slice_ = &buffer[..UTMPX_SZ];
    // SAFETY: `utmpx` is `repr(C)`, has no implicit padding, and every bit
    //         pattern is a valid value for each of its fields.
    let entry: utmpx = unsafe {
        std::ptr::read_unaligned(slice_.as_ptr().cast::<utmpx>())
    };
    defx!("return utmpx (size {})", UTMPX_SZ);

    Some(entry)
}

/// Convert a [`utmpx`] to the bytes of its on-disk form.
///
/// unsafe.
pub fn utmpx_to_buffer(entry: &utmpx) -> [u8; UTMPX_SZ] {
    let mut buffer: [u8; UTMPX_SZ] = [0; UTMPX_SZ];
    // SAFETY: `buffer` is exactly `size_of::<utmpx>()` bytes and `utmpx`
    //         has no implicit padding.
    unsafe {
        std::ptr::write_unaligned(buffer.as_mut_ptr().cast::<utmpx>(), *entry);
    }

    buffer
}

/// A [`Utmpx`] manages a [C struct `utmpx`] and it's [`FileOffset`]
/// within the wtmp file.
///
/// [`Utmpx`]: self::Utmpx
/// [C struct `utmpx`]: https://man7.org/linux/man-pages/man5/utmpx.5.html
/// [`FileOffset`]: crate::common::FileOffset
#[derive(Clone, Copy, Eq, PartialEq)]
pub struct Utmpx {
    /// The [`utmpx`] entry data.
    pub entry: utmpx,
    /// The byte offset into the file where the `entry` data begins.
    pub fileoffset: FileOffset,
}

impl fmt::Debug for Utmpx {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        f.debug_struct("Utmpx")
            .field("fileoffset", &self.fileoffset)
            .field("ut_type", &self.ut_type())
            .field("ut_pid", &self.ut_pid())
            .field("ut_line", &bounded_to_str(self.ut_line()))
            .field("ut_id", &bounded_to_str(self.ut_id()))
            .field("ut_user", &bounded_to_str(self.ut_user()))
            .field("ut_host", &bounded_to_str(self.ut_host()))
            .field("ut_addr", &self.ut_addr())
            .field("tv_sec", &self.tv_sec())
            .field("tv_usec", &self.tv_usec())
            .finish()
    }
}

impl Utmpx {
    /// Create a new `Utmpx`.
    pub const fn new(
        fileoffset: FileOffset,
        entry: utmpx,
    ) -> Utmpx {
        Utmpx {
            entry,
            fileoffset,
        }
    }

    /// Create a new `Utmpx` from the on-disk bytes in `entry_buffer`.
    ///
    /// Returns `None` if the `entry_buffer` is too small.
    pub fn from_buffer(
        fileoffset: FileOffset,
        entry_buffer: &[u8],
    ) -> Option<Utmpx> {
        let entry: utmpx = buffer_to_utmpx(entry_buffer)?;
        defñ!("@{} {:?}", fileoffset, entry.ut_type);

        Some(Utmpx::new(fileoffset, entry))
    }

    /// The on-disk bytes of this `Utmpx`.
    pub fn to_buffer(&self) -> [u8; UTMPX_SZ] {
        utmpx_to_buffer(&self.entry)
    }

    pub const fn len(&self) -> usize {
        UTMPX_SZ
    }

    /// Clippy recommends `fn is_empty` since there is a `len()`.
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// [`FileOffset`] at beginning of the `Utmpx` (inclusive).
    ///
    /// [`FileOffset`]: crate::common::FileOffset
    pub const fn fileoffset_begin(&self) -> FileOffset {
        self.fileoffset
    }

    /// [`FileOffset`] at one byte past ending of the `Utmpx` (exclusive).
    ///
    /// [`FileOffset`]: crate::common::FileOffset
    pub const fn fileoffset_end(&self) -> FileOffset {
        self.fileoffset + UTMPX_SZ_FO
    }

    pub fn ut_type(&self) -> UtType {
        UtType::from(self.entry.ut_type)
    }

    pub fn set_ut_type(&mut self, ut_type: UtType) {
        self.entry.ut_type = ut_type.as_i16();
    }

    pub const fn ut_pid(&self) -> i32 {
        self.entry.ut_pid
    }

    pub fn set_ut_pid(&mut self, pid: i32) {
        self.entry.ut_pid = pid;
    }

    pub const fn ut_line(&self) -> &[u8; UT_LINESIZE] {
        &self.entry.ut_line
    }

    pub fn set_ut_line(&mut self, line: &str) {
        bounded_set(&mut self.entry.ut_line, line.as_bytes());
    }

    pub const fn ut_id(&self) -> &[u8; UT_IDSIZE] {
        &self.entry.ut_id
    }

    pub fn set_ut_id(&mut self, id: &str) {
        bounded_set(&mut self.entry.ut_id, id.as_bytes());
    }

    pub const fn ut_user(&self) -> &[u8; UT_NAMESIZE] {
        &self.entry.ut_user
    }

    /// Overwrite the user name, truncated or NUL-padded to
    /// [`UT_NAMESIZE`].
    pub fn set_ut_user(&mut self, user: &str) {
        bounded_set(&mut self.entry.ut_user, user.as_bytes());
    }

    pub const fn ut_host(&self) -> &[u8; UT_HOSTSIZE] {
        &self.entry.ut_host
    }

    pub fn set_ut_host(&mut self, host: &str) {
        bounded_set(&mut self.entry.ut_host, host.as_bytes());
    }

    /// The legacy IPv4 address `ut_addr`, the first word of `ut_addr_v6`.
    /// Stored in network byte order.
    ///
    /// Only this 32-bit address is supported.
    pub fn ut_addr(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.entry.ut_addr_v6[0].to_ne_bytes())
    }

    pub fn set_ut_addr(&mut self, addr: Ipv4Addr) {
        self.entry.ut_addr_v6[0] = i32::from_ne_bytes(addr.octets());
    }

    pub const fn tv_sec(&self) -> tv_sec_type {
        self.entry.ut_tv.tv_sec as tv_sec_type
    }

    pub const fn tv_usec(&self) -> tv_usec_type {
        self.entry.ut_tv.tv_usec as tv_usec_type
    }

    /// Set the entry time.
    ///
    /// The on-disk `tv_sec` is 32 bits; larger values are truncated.
    pub fn set_tv(&mut self, tv_sec: tv_sec_type, tv_usec: tv_usec_type) {
        self.entry.ut_tv.tv_sec = tv_sec as i32;
        self.entry.ut_tv.tv_usec = tv_usec as i32;
    }

    /// The run level of a `RUN_LVL` entry, stored by `init` in the low
    /// byte of `ut_pid`.
    pub const fn runlevel(&self) -> char {
        (self.entry.ut_pid % 256) as u8 as char
    }

    /// Is the user name of this entry `user`?
    /// Compared up to [`UT_NAMESIZE`] bytes.
    pub fn is_user(&self, user: &str) -> bool {
        bounded_eq(&self.entry.ut_user, user.as_bytes())
    }

    /// Is the terminal line of this entry the same as the line of `other`?
    /// Compared up to [`UT_LINESIZE`] bytes.
    pub fn is_same_line(&self, other: &Utmpx) -> bool {
        bounded_eq(&self.entry.ut_line, &other.entry.ut_line)
    }

    /// Change this entry to the `DEAD_PROCESS` entry that `init` writes when
    /// the session process exits.
    ///
    /// `ut_pid`, `ut_line` and `ut_tv` are kept. `ut_user`, `ut_id`,
    /// `ut_host` and the whole `ut_addr_v6` are set to zero bytes.
    ///
    /// ```text
    /// root [11735] [pts/0] [ts/0] [10.0.0.1] [10.0.0.1] [Mon Jan 12 17:31:24 2009 CET]
    /// DEAD [11735] [pts/0] [    ] [        ] [0.0.0.0 ] [Mon Jan 12 17:31:24 2009 CET]
    /// ```
    pub fn mark_dead(&mut self) {
        self.set_ut_type(UtType::DeadProcess);
        self.entry.ut_user.fill(0);
        self.entry.ut_id.fill(0);
        self.entry.ut_host.fill(0);
        self.entry.ut_addr_v6 = [0; 4];
    }

    /// `Utmpx` to `String` using printable chars for
    /// non-printable and/or formatting characters.
    ///
    /// Each bounded field is printed at its full capacity.
    ///
    /// XXX: only intended to help humans visually inspect stderr output.
    #[doc(hidden)]
    #[allow(non_snake_case)]
    #[cfg(any(debug_assertions, test))]
    pub fn to_String_noraw(&self) -> String {
        let mut buf: String = String::with_capacity(UTMPX_SZ * 2);
        buf.push_str(format!("ut_type {:?} ", self.ut_type()).as_str());
        buf.push_str(format!("ut_pid {} ", self.ut_pid()).as_str());
        buf.push_str("ut_line '");
        buf.push_str(buffer_to_String_noraw(self.ut_line()).as_str());
        buf.push_str("' ut_id '");
        buf.push_str(buffer_to_String_noraw(self.ut_id()).as_str());
        buf.push_str("' ut_user '");
        buf.push_str(buffer_to_String_noraw(self.ut_user()).as_str());
        buf.push_str("' ut_host[…] '");
        buf.push_str(buffer_to_String_noraw(bounded_bytes(self.ut_host())).as_str());
        buf.push_str(format!("' ut_addr {} ", self.ut_addr()).as_str());
        buf.push_str(format!("tv_sec {} tv_usec {}", self.tv_sec(), self.tv_usec()).as_str());

        buf
    }
}
