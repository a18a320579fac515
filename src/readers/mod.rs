// src/readers/mod.rs

//! "Readers" for _wtmplib_.
//!
//! ## Overview of readers
//!
//! * A [`UtmpxStore`] reads [`Utmpx`s] from a `wtmp` file, one at a time,
//!   and may rewrite the entry last read.
//! * A [`SessionProcessor`] drives a `UtmpxStore` to derive the
//!   [`Session`s] of one user.
//! * [`edit_records`] drives a `UtmpxStore` to rename or delete the
//!   entries of one user.
//!
//! <br/>
//!
//! _These are not rust "Readers"; these structs do not implement the trait
//! [`Read`]. These are "readers" in an informal sense._
//!
//! [`Read`]: std::io::Read
//! [`Utmpx`s]: crate::data::utmpx::Utmpx
//! [`Session`s]: crate::data::session::Session
//! [`UtmpxStore`]: crate::readers::utmpxstore::UtmpxStore
//! [`SessionProcessor`]: crate::readers::sessionprocessor::SessionProcessor
//! [`edit_records`]: crate::readers::utmpxeditor::edit_records

pub mod sessionprocessor;
pub mod utmpxeditor;
pub mod utmpxstore;
