use nekobend_core::error::CliError;
use nekobend_plugins::Clipboard;

use super::cli::ClipCommand;

pub fn run_clip(cmd: ClipCommand) -> Result<i32, CliError> {
    match cmd {
        ClipCommand::Copy { text } => {
            Clipboard::copy(&text).map_err(|e| CliError::Command(e.to_string()))?;
        }
        ClipCommand::Paste => {
            let text = Clipboard::paste().map_err(|e| CliError::Command(e.to_string()))?;
            print!("{text}");
        }
    }
    Ok(0)
}
