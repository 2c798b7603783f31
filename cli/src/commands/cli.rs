use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "nekobend", version, about = "Watch process output, make HTTP calls, use the clipboard")]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a command and print its stdout/stderr lines as they arrive.
    Watch(WatchArgs),
    /// Issue an HTTP request and print the response body.
    #[command(subcommand)]
    Http(HttpCommand),
    /// Copy to or paste from the system clipboard.
    #[command(subcommand)]
    Clip(ClipCommand),
}

#[derive(ClapArgs, Debug, Clone)]
pub struct WatchArgs {
    /// Poll timeout in milliseconds (overrides config).
    #[arg(long)]
    pub poll_ms: Option<u64>,

    /// Run the joined command line through the platform shell.
    #[arg(long)]
    pub shell: bool,

    /// Print records as JSON lines.
    #[arg(long)]
    pub json: bool,

    /// Program and arguments.
    #[arg(trailing_var_arg = true, required = true, num_args = 1..)]
    pub command: Vec<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum HttpCommand {
    Get {
        url: String,
        /// Request header as `Name: value`. Can be specified multiple times.
        #[arg(short = 'H', long = "header", action = clap::ArgAction::Append)]
        headers: Vec<String>,
    },
    Post {
        url: String,
        #[arg(short = 'H', long = "header", action = clap::ArgAction::Append)]
        headers: Vec<String>,
        /// JSON body.
        #[arg(long, default_value = "{}")]
        body: String,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ClipCommand {
    Copy { text: String },
    Paste,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watch_takes_trailing_command() {
        let args = Args::parse_from(["nekobend", "watch", "--shell", "--", "ls", "-la"]);
        let Commands::Watch(w) = args.command else {
            panic!("expected watch");
        };
        assert!(w.shell);
        assert_eq!(w.command, vec!["ls", "-la"]);
    }

    #[test]
    fn http_headers_repeat() {
        let args = Args::parse_from([
            "nekobend", "http", "get", "http://x", "-H", "A: 1", "-H", "B: 2",
        ]);
        let Commands::Http(HttpCommand::Get { headers, .. }) = args.command else {
            panic!("expected http get");
        };
        assert_eq!(headers, vec!["A: 1", "B: 2"]);
    }
}
