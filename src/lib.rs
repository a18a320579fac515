// src/lib.rs

//! _wtmplib_ reads and patches `wtmp` login accounting files.
//!
//! * [`data`] holds the [`Utmpx`] record and the reconstructed [`Session`].
//! * [`readers`] reads entries, reconstructs sessions, and rewrites entries.
//! * [`printer`] formats sessions and entries for the user.
//!
//! The _wtmpclean_ binary program drives this library.
//!
//! [`Utmpx`]: crate::data::utmpx::Utmpx
//! [`Session`]: crate::data::session::Session

pub mod common;
pub mod data;
pub mod debug;
pub mod printer;
pub mod readers;
#[cfg(test)]
pub mod tests;
