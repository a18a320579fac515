// src/printer/mod.rs

//! The `printer` module is for printing user-facing output;
//! the login listing of [`Session`s] and the raw dump of [`Utmpx`s].
//!
//! [`Session`s]: crate::data::session::Session
//! [`Utmpx`s]: crate::data::utmpx::Utmpx

pub mod printers;
