use std::time::Duration;

use nekobend_core::config::AppConfig;
use nekobend_core::error::CliError;
use nekobend_core::{CommandSpec, Observer, OutputRecord};

use super::cli::WatchArgs;

pub fn command_spec(args: &WatchArgs) -> Option<CommandSpec> {
    if args.shell {
        Some(CommandSpec::shell(args.command.join(" ")))
    } else {
        CommandSpec::from_argv(args.command.iter().cloned())
    }
}

fn print_record(rec: &OutputRecord, json: bool) {
    if json {
        match serde_json::to_string(rec) {
            Ok(line) => println!("{line}"),
            Err(e) => tracing::warn!(error = %e, "record not serializable"),
        }
    } else {
        println!("{rec}");
    }
}

/// Runs until the child exits and its output is drained, or Ctrl-C.
pub async fn run_watch(args: WatchArgs, cfg: &AppConfig) -> Result<i32, CliError> {
    let spec = command_spec(&args).ok_or_else(|| CliError::Command("empty command".into()))?;
    let mut observer_cfg = cfg.observer.clone();
    if let Some(ms) = args.poll_ms {
        observer_cfg.poll_timeout_ms = ms;
    }
    let poll = observer_cfg.poll_timeout();

    let mut observer = Observer::with_config(spec, observer_cfg);
    observer.start()?;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        let rec = tokio::select! {
            _ = &mut ctrl_c => {
                tracing::info!("interrupted, stopping");
                break;
            }
            rec = observer.get(poll) => rec,
        };
        match rec {
            Some(rec) => print_record(&rec, args.json),
            None if observer.is_finished() => break,
            None => {}
        }
    }

    observer.stop().await;
    for rec in observer.sink().drain() {
        print_record(&rec, args.json);
    }
    Ok(observer.exit_code().unwrap_or(130))
}
