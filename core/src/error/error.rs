use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("observer failed: {0}")]
    Observer(#[from] ObserverError),
    #[error("command failed: {0}")]
    Command(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

#[derive(Error, Debug)]
pub enum ObserverError {
    #[error("observer is already running `{0}`")]
    AlreadyRunning(String),
    #[error("spawn failed for `{command}`: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },
    #[error("{0} was not piped")]
    MissingPipe(&'static str),
    #[error("stream io error: {stream} {source}")]
    StreamIo {
        stream: &'static str,
        source: std::io::Error,
    },
}
