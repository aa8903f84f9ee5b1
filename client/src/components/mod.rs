//! Reusable UI component modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Components render the review page's pieces from props and callbacks; the
//! page owns the state and the session.

pub mod notice_banner;
pub mod review_form;
pub mod session_bar;
