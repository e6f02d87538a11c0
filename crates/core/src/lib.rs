#![forbid(unsafe_code)]

pub mod error;
pub mod model;
pub mod status;
pub mod time;

pub use error::Error;
pub use status::{QuestionStatus, derive_status};
pub use time::Clock;
