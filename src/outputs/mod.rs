//! Digest renderers.
//!
//! - [`text`]: the plain-text body and the subject line
//! - [`html`]: the HTML alternative sent alongside the text body
//!
//! Both are pure functions of the items, the digest title and the date.

pub mod html;
pub mod text;
