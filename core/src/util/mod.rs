mod re_string;

pub use re_string::{ReMatch, ReString};
