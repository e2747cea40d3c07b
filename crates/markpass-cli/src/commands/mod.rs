//! Command handlers grouped by concern.

pub(crate) mod enroll;
pub(crate) mod kiosk;
pub(crate) mod scan;
