mod client;
pub mod encoding;
mod error;

pub use client::HttpHelper;
pub use error::{HttpError, HttpErrorKind};
