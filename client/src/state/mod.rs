//! Shared client-side state modules.
//!
//! DESIGN
//! ======
//! State is split by domain so components depend on small focused models:
//! `auth` is the status model, `session` drives it through an identity client,
//! and `review` holds the form the user is editing.

pub mod auth;
pub mod review;
pub mod session;
