//! Operator commands read from stdin.

use crate::error::{DesktopError, Result as DesktopResult};

use palm_supervisor::ServiceSupervisor;

use std::ops::ControlFlow;
use std::str::FromStr;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
    Toggle,
    Status,
    Quit,
}

impl FromStr for Command {
    type Err = DesktopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "start" => Ok(Command::Start),
            "stop" => Ok(Command::Stop),
            "toggle" => Ok(Command::Toggle),
            "status" => Ok(Command::Status),
            "quit" | "exit" => Ok(Command::Quit),
            _ => Err(DesktopError::UnknownCommand {
                input: s.trim().to_string(),
            }),
        }
    }
}

/// Apply one command. `Break` means the operator asked to quit.
pub fn execute(command: Command, supervisor: &ServiceSupervisor) -> DesktopResult<ControlFlow<()>> {
    debug!("Executing {command:?}");

    match command {
        Command::Start => supervisor.start(),
        Command::Stop => supervisor.stop(),
        Command::Toggle => {
            let state = supervisor.toggle();
            info!("Service toggled, now {}", state.as_str());
        }
        Command::Status => report_status(supervisor)?,
        Command::Quit => return Ok(ControlFlow::Break(())),
    }

    Ok(ControlFlow::Continue(()))
}

fn report_status(supervisor: &ServiceSupervisor) -> DesktopResult<()> {
    let sink = supervisor.sink();
    sink.log(format!("Service is {}", supervisor.state().as_str()))?;

    // Copy out so the watch lock is not held while writing.
    let latest = *supervisor.subscribe_status().borrow();
    match latest {
        Some(report) => {
            for line in report.lines() {
                sink.write(line)?;
            }
        }
        None => sink.log("No upstream status yet")?,
    }

    Ok(())
}

/// Read commands line by line until `quit` or end of input.
///
/// Blank lines are ignored and unknown commands are reported to the operator.
pub async fn run<R>(input: R, supervisor: &ServiceSupervisor) -> DesktopResult<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();

    while let Some(line) = lines.next_line().await.map_err(|source| DesktopError::Io {
        what: "operator commands",
        source,
    })? {
        if line.trim().is_empty() {
            continue;
        }

        let flow = match line.parse::<Command>() {
            Ok(command) => execute(command, supervisor)?,
            Err(e) => {
                supervisor.sink().log(e.to_string())?;
                ControlFlow::Continue(())
            }
        };

        if flow.is_break() {
            info!("Quit requested");
            return Ok(());
        }
    }

    info!("Command input closed");
    Ok(())
}
