// src/data/mod.rs

//! The `data` module is specialized data containers; the [`Utmpx`] record,
//! the reconstructed [`Session`], and the datetime helpers used to print
//! and select them.
//!
//! [`Utmpx`]: crate::data::utmpx::Utmpx
//! [`Session`]: crate::data::session::Session

pub mod datetime;
pub mod session;
pub mod timepattern;
pub mod utmpx;
