// src/bin/wtmpclean.rs

//! Driver program _wtmpclean_ drives the [_wtmplib_].
//!
//! Processes user-passed command-line arguments, then runs one of three
//! modes on one `wtmp` file:
//!
//! * `--list`: reconstruct and print the login sessions of a user using a
//!   [`SessionProcessor`].
//! * `--raw`: print every entry, or every entry of a user.
//! * otherwise: delete the entries of a user, or give them to a fake user,
//!   using [`edit_records`]. Optionally only entries at times matching
//!   `--time`.
//!
//! [_wtmplib_]: wtmplib
//! [`SessionProcessor`]: wtmplib::readers::sessionprocessor::SessionProcessor
//! [`edit_records`]: wtmplib::readers::utmpxeditor::edit_records

#![allow(non_camel_case_types)]

use std::process::ExitCode;

use ::clap::Parser;
use ::const_format::concatcp;
use ::nix::unistd::User;
#[allow(unused_imports)]
use ::si_trace_print::{
    defn,
    defo,
    defx,
    defñ,
    stack::stack_offset_set,
};

use ::wtmplib::common::{
    Count,
    FPath,
    ENV_WTMP_FILE,
    WTMP_FILE_DEFAULT,
};
use ::wtmplib::data::timepattern::TIMEPATTERN_DEFAULT;
use ::wtmplib::debug::printers::{e_err, e_wrn};
use ::wtmplib::printer::printers::{dump_raw, print_sessions, write_stdout};
use ::wtmplib::readers::sessionprocessor::{reconstruct_sessions, Reconstruction, SignalProbe};
use ::wtmplib::readers::utmpxeditor::{edit_records, EditOutcome};

// --------------------
// command-line parsing

/// `--help` _afterword_ message.
const CLI_HELP_AFTER: &str = concatcp!(
    "\
Without --list or --raw, every login record of <user> is deleted, or given to
user <fake> if passed. Both users must exist.

The --time PATTERN is a regular expression matched against the time of each
record formatted as \"YYYY.MM.DD HH:MM:SS\" in the local timezone.

Examples:
  wtmpclean --raw -f ", WTMP_FILE_DEFAULT, ".1 root
  wtmpclean -t \"2008.09.06 14:30:00\" jekyll hide
  wtmpclean -t \"2013\\.12\\... 23:.*\" hide
  wtmpclean -f ", WTMP_FILE_DEFAULT, ".1 jekyll
"
);

/// clap command-line arguments build-time definitions.
//
// Note:
// * the `about` is taken from `Cargo.toml:[package]:description`.
#[derive(Parser, Debug)]
#[clap(
    about = env!("CARGO_PKG_DESCRIPTION"),
    author = env!("CARGO_PKG_AUTHORS"),
    name = "wtmpclean",
    // write expanded information for the `--version` output
    version = concatcp!(
        "\n",
        "Version: ",
        env!("CARGO_PKG_VERSION_MAJOR"), ".",
        env!("CARGO_PKG_VERSION_MINOR"), ".",
        env!("CARGO_PKG_VERSION_PATCH"), "\n",
        "MSRV: ", env!("CARGO_PKG_RUST_VERSION"), "\n",
        "License: ", env!("CARGO_PKG_LICENSE"), "\n",
        "Author: ", env!("CARGO_PKG_AUTHORS"), "\n",
    ),
    after_help = CLI_HELP_AFTER,
    verbatim_doc_comment,
    override_usage = "wtmpclean [-l|-r] [-t PATTERN] [-f FILE] <USER> [FAKE]",
)]
struct CLI_Args {
    /// User whose login records are listed or changed.
    /// Optional for --raw.
    #[clap(
        required_unless_present = "raw",
        verbatim_doc_comment,
    )]
    user: Option<String>,

    /// Give the login records of USER to this user instead of deleting
    /// them.
    #[clap(
        verbatim_doc_comment,
    )]
    fake: Option<String>,

    /// The wtmp file.
    #[clap(
        short = 'f',
        long,
        verbatim_doc_comment,
        env = ENV_WTMP_FILE,
        default_value = WTMP_FILE_DEFAULT,
    )]
    file: FPath,

    /// Show a listing of the login sessions of USER.
    #[clap(
        short = 'l',
        long,
        verbatim_doc_comment,
        conflicts_with = "raw",
    )]
    list: bool,

    /// Show the raw content of the wtmp file, only records of USER if
    /// passed.
    #[clap(
        short = 'r',
        long,
        verbatim_doc_comment,
    )]
    raw: bool,

    /// Only change login records at a time matching this regular
    /// expression.
    #[clap(
        short = 't',
        long,
        verbatim_doc_comment,
        default_value = TIMEPATTERN_DEFAULT,
    )]
    time: String,
}

/// Does `name` exist in the user database?
fn user_exists(name: &str) -> bool {
    let ret = matches!(User::from_name(name), Ok(Some(_)));
    defñ!("({:?}) {}", name, ret);

    ret
}

/// Warn of entries that were skipped because they could not be read.
fn warn_unreadable(
    path: &FPath,
    unreadable: Count,
) {
    if unreadable != 0 {
        e_wrn!("{}: skipped {} unreadable block(s)", path, unreadable);
    }
}

/// `--list` mode.
fn run_list(
    path: &FPath,
    user: &str,
) -> ExitCode {
    defn!("({:?}, {:?})", path, user);
    let reconstruction: Reconstruction = match reconstruct_sessions(path, user, &SignalProbe) {
        Ok(val) => val,
        Err(err) => {
            e_err!("{}", err);
            defx!("reconstruct_sessions error");
            return ExitCode::FAILURE;
        }
    };
    print_sessions(&reconstruction.sessions);
    warn_unreadable(path, reconstruction.unreadable);
    defx!();

    ExitCode::SUCCESS
}

/// `--raw` mode.
fn run_raw(
    path: &FPath,
    user: Option<&str>,
) -> ExitCode {
    defn!("({:?}, {:?})", path, user);
    match dump_raw(path, user) {
        Ok(dump) => {
            warn_unreadable(path, dump.unreadable);
            defx!("printed {}", dump.printed);

            ExitCode::SUCCESS
        }
        Err(err) => {
            e_err!("{}", err);
            defx!("dump_raw error");

            ExitCode::FAILURE
        }
    }
}

/// Default mode; delete or rename the records of `user`.
fn run_edit(
    path: &FPath,
    user: &str,
    fake: Option<&str>,
    timepattern: &str,
) -> ExitCode {
    defn!("({:?}, {:?}, {:?}, {:?})", path, user, fake, timepattern);
    let outcome: EditOutcome = match edit_records(path, user, fake, timepattern) {
        Ok(val) => val,
        Err(err) => {
            e_err!("{}", err);
            defx!("edit_records error");
            return ExitCode::FAILURE;
        }
    };
    for warning in outcome.warnings.iter() {
        e_wrn!("{}", warning);
    }
    warn_unreadable(path, outcome.unreadable);
    if !outcome.is_ok() {
        e_err!("cannot clean up {}", path);
        defx!("{} errors", outcome.errors);
        return ExitCode::FAILURE;
    }
    let summary: String = match fake {
        Some(fake_) => format!(
            "{}: {} block(s) logging user `{}' now belong to user `{}'.\n",
            path, outcome.cleaned, user, fake_,
        ),
        None => format!(
            "{}: patched {} block(s) logging user `{}'.\n",
            path, outcome.cleaned, user,
        ),
    };
    write_stdout(summary.as_bytes());
    defx!("cleaned {}", outcome.cleaned);

    ExitCode::SUCCESS
}

/// Process the user-passed command-line arguments.
/// Run the chosen mode.
/// Determine a process return code.
pub fn main() -> ExitCode {
    if cfg!(debug_assertions) {
        stack_offset_set(Some(0));
    }
    defn!();

    let args = CLI_Args::parse();
    defo!("{:?}", args);

    if let Some(fake) = args.fake.as_deref() {
        if !user_exists(fake) {
            e_err!("unknown/bad user `{}'", fake);
            defx!("unknown fake user");
            return ExitCode::FAILURE;
        }
    }

    let exitcode: ExitCode = match (args.list, args.raw, args.user.as_deref()) {
        (_, true, user) => run_raw(&args.file, user),
        (true, false, Some(user)) => run_list(&args.file, user),
        (false, false, Some(user)) => {
            if !user_exists(user) {
                e_err!("unknown/bad user `{}'", user);
                defx!("unknown user");
                return ExitCode::FAILURE;
            }
            run_edit(&args.file, user, args.fake.as_deref(), args.time.as_str())
        }
        (_, false, None) => {
            // clap requires USER unless --raw
            e_err!("missing <USER>");
            ExitCode::FAILURE
        }
    };
    defx!("exitcode {:?}", exitcode);

    exitcode
}
