//! Console command handlers

use tracing::{error, info};

use crate::{
    state::AppState,
    timer::{TimerConfiguration, TimerSnapshot},
};
use super::responses::{CommandResponse, ConsoleOutput, StatusResponse};

/// Handle `set HH:MM:SS` - Configure the next run
pub fn set_handler(state: &AppState, configuration: TimerConfiguration) -> ConsoleOutput {
    respond(
        state,
        state.set_time(configuration),
        format!("Timer set to {}", configuration),
    )
}

/// Handle `start` - Begin a fresh run
pub fn start_handler(state: &AppState) -> ConsoleOutput {
    let result = state.start();
    let message = match &result {
        Ok(timer) => format!("Timer started for {}", timer.display_time),
        Err(_) => String::new(),
    };
    respond(state, result, message)
}

/// Handle `stop` - Stop ticking
pub fn stop_handler(state: &AppState) -> ConsoleOutput {
    respond(state, state.stop(), "Timer stopped".to_string())
}

/// Handle `toggle` - Stop if running, otherwise start
pub fn toggle_handler(state: &AppState) -> ConsoleOutput {
    let result = state.toggle();
    let message = match &result {
        Ok(timer) if timer.is_running => "Timer running".to_string(),
        _ => "Timer stopped".to_string(),
    };
    respond(state, result, message)
}

/// Handle `reset` - Restore the full duration without starting
pub fn reset_handler(state: &AppState) -> ConsoleOutput {
    respond(state, state.reset(), "Timer reset".to_string())
}

/// Handle `status` - Report timer and application state
pub fn status_handler(state: &AppState) -> ConsoleOutput {
    let (last_action, last_action_time) = state.get_last_action();

    ConsoleOutput::Status(StatusResponse {
        title: state.title.clone(),
        accessory: state.accessory.name().to_string(),
        blinking: state.accessory.is_blinking(),
        timer: state.get_timer_state(),
        uptime: state.get_uptime(),
        last_action,
        last_action_time,
    })
}

/// Handle `help` - List available commands
pub fn help_handler() -> ConsoleOutput {
    ConsoleOutput::Help {
        commands: vec![
            "set HH:MM:SS - configure the countdown".to_string(),
            "start        - start a fresh countdown".to_string(),
            "stop         - stop the countdown".to_string(),
            "toggle       - stop if running, otherwise start".to_string(),
            "reset        - restore the full duration".to_string(),
            "status       - show timer status".to_string(),
            "quit         - stop everything and exit".to_string(),
        ],
    }
}

/// Report an input that could not be understood
pub fn invalid_handler(state: &AppState, message: String) -> ConsoleOutput {
    ConsoleOutput::Command(CommandResponse::error(message, state.get_timer_state()))
}

fn respond(
    state: &AppState,
    result: Result<TimerSnapshot, String>,
    message: String,
) -> ConsoleOutput {
    match result {
        Ok(timer) => {
            info!("{}", message);
            ConsoleOutput::Command(CommandResponse::from_snapshot(message, timer))
        }
        Err(e) => {
            error!("{}", e);
            ConsoleOutput::Command(CommandResponse::error(e, state.get_timer_state()))
        }
    }
}
