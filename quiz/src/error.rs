//! Error shim: the quiz engine reports failures via the shared
//! [`CoreError`] taxonomy directly.

pub use studyforge_core::error::{CoreError, Result};
