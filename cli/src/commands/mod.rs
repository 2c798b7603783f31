pub mod cli;
pub mod clip;
pub mod http;
pub mod watch;
