pub mod clipboard;
pub mod http;

pub use clipboard::{Clipboard, ClipboardError};
pub use http::{HttpError, HttpErrorKind, HttpHelper};
