//! Console command module
//!
//! This module reads timer commands line by line and answers each one with a
//! JSON line. Input is read on a plain thread and handed over through a
//! channel, so a pending blocking read never holds up runtime shutdown.

pub mod handlers;
pub mod responses;

use std::{io::BufRead, str::FromStr, thread};

use tokio::{
    io::{AsyncWrite, AsyncWriteExt},
    sync::mpsc,
};
use tracing::{debug, info, warn};

use crate::{state::AppState, timer::TimerConfiguration};
use handlers::*;
use responses::ConsoleOutput;

/// A parsed console command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Set(TimerConfiguration),
    Start,
    Stop,
    Toggle,
    Reset,
    Status,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let verb = words.next().ok_or_else(|| "Empty command".to_string())?;

        let command = match verb.to_lowercase().as_str() {
            "set" => {
                let time = words
                    .next()
                    .ok_or_else(|| "Usage: set HH:MM:SS".to_string())?;
                let configuration = time.parse().map_err(|e| format!("{}", e))?;
                Command::Set(configuration)
            }
            "start" => Command::Start,
            "stop" => Command::Stop,
            "toggle" => Command::Toggle,
            "reset" | "cancel" => Command::Reset,
            "status" => Command::Status,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(format!("Unknown command: {}", other)),
        };

        if let Some(extra) = words.next() {
            return Err(format!("Unexpected argument: {}", extra));
        }
        Ok(command)
    }
}

/// Execute a single command against the application state
pub fn dispatch(state: &AppState, command: Command) -> ConsoleOutput {
    match command {
        Command::Set(configuration) => set_handler(state, configuration),
        Command::Start => start_handler(state),
        Command::Stop => stop_handler(state),
        Command::Toggle => toggle_handler(state),
        Command::Reset => reset_handler(state),
        Command::Status | Command::Quit => status_handler(state),
        Command::Help => help_handler(),
    }
}

/// Read lines from a blocking reader on a detached thread.
///
/// The thread exits at end of input, on a read error, or once the receiver
/// is dropped.
pub fn spawn_line_reader<R>(reader: R) -> mpsc::Receiver<String>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel(16);

    thread::spawn(move || {
        for line in reader.lines() {
            match line {
                Ok(line) => {
                    if tx.blocking_send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("Failed to read console input: {}", e);
                    break;
                }
            }
        }
        debug!("Console reader finished");
    });

    rx
}

/// Handle commands until `quit` or end of input
pub async fn run_console<W>(
    state: &AppState,
    mut input: mpsc::Receiver<String>,
    mut output: W,
) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(line) = input.recv().await {
        if line.trim().is_empty() {
            continue;
        }
        debug!("Console input: {}", line.trim());

        let (response, quit) = match line.parse::<Command>() {
            Ok(command) => {
                let quit = command == Command::Quit;
                (dispatch(state, command), quit)
            }
            Err(e) => (invalid_handler(state, e), false),
        };

        output.write_all(response.to_line().as_bytes()).await?;
        output.write_all(b"\n").await?;
        output.flush().await?;

        if quit {
            info!("Quit requested");
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{io::Cursor, sync::Arc, time::Duration};

    use crate::{
        accessory::BlinkingBulb,
        timer::{ManualScheduler, TimerEngine},
    };

    fn app_state() -> (AppState, ManualScheduler) {
        let scheduler = ManualScheduler::new();
        let engine = TimerEngine::new(Arc::new(scheduler.clone()));
        let bulb = BlinkingBulb::new("Bulb".to_string(), Duration::from_millis(500));
        (
            AppState::new(engine, Arc::new(bulb), "Laundry".to_string()),
            scheduler,
        )
    }

    #[test]
    fn parses_commands() {
        assert_eq!(
            "set 00:01:00".parse::<Command>(),
            Ok(Command::Set(TimerConfiguration::unchecked(0, 1, 0)))
        );
        assert_eq!("  START ".parse::<Command>(), Ok(Command::Start));
        assert_eq!("cancel".parse::<Command>(), Ok(Command::Reset));
        assert_eq!("exit".parse::<Command>(), Ok(Command::Quit));
    }

    #[test]
    fn rejects_bad_commands() {
        assert!("".parse::<Command>().is_err());
        assert!("set".parse::<Command>().is_err());
        assert!("set 25:00:00".parse::<Command>().is_err());
        assert!("start now".parse::<Command>().is_err());
        assert!("blink".parse::<Command>().is_err());
    }

    #[tokio::test]
    async fn console_runs_commands_until_quit() {
        let (state, scheduler) = app_state();
        let input = spawn_line_reader(Cursor::new("set 00:00:03\nstart\nbogus\nquit\nstart\n"));
        let mut output = Vec::new();

        run_console(&state, input, &mut output).await.unwrap();

        let text = String::from_utf8(output).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0]["status"], "idle");
        assert_eq!(lines[1]["status"], "running");
        assert_eq!(lines[1]["timer"]["display_time"], "00:00:03");
        assert_eq!(lines[2]["status"], "error");
        assert_eq!(lines[3]["title"], "Laundry");
        assert_eq!(scheduler.subscribe_count(), 1);
    }

    #[tokio::test]
    async fn console_ends_when_input_closes() {
        let (state, _) = app_state();
        let (tx, rx) = mpsc::channel(4);
        tx.send("start".to_string()).await.unwrap();
        drop(tx);

        let mut output = Vec::new();
        run_console(&state, rx, &mut output).await.unwrap();
        assert_eq!(String::from_utf8(output).unwrap().lines().count(), 1);
        assert!(state.engine.is_running());
    }

    #[test]
    fn runtime_shuts_down_while_reader_is_blocked() {
        // A reader that never yields a line, like an idle terminal
        struct Stalled;
        impl std::io::Read for Stalled {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                thread::sleep(Duration::from_secs(3600));
                Ok(0)
            }
        }

        let (state, _) = app_state();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .unwrap();

        let started = std::time::Instant::now();
        runtime.block_on(async {
            let input = spawn_line_reader(std::io::BufReader::new(Stalled));
            tokio::select! {
                _ = run_console(&state, input, Vec::new()) => panic!("console ended without input"),
                _ = tokio::time::sleep(Duration::from_millis(50)) => {}
            }
        });
        drop(runtime);

        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
