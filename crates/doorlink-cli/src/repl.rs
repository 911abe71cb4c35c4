//! Interactive session with a connected door.

use anyhow::Result;
use doorlink_link::{ConnectionEvent, DoorLink, LinkEvent, LinkEvents};
use doorlink_protocol::Command;
use tokio::io::{AsyncBufReadExt, BufReader};

/// One line of user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Send(Command),
    ToggleHold,
    ToggleLock,
    Status,
    Help,
    Quit,
}

impl Input {
    pub fn parse(line: &str) -> Option<Self> {
        let word = line.trim().to_ascii_lowercase();
        match word.as_str() {
            "toggle-hold" => Some(Input::ToggleHold),
            "toggle-lock" => Some(Input::ToggleLock),
            "status" | "s" => Some(Input::Status),
            "help" | "?" => Some(Input::Help),
            "quit" | "exit" | "q" => Some(Input::Quit),
            other => Command::parse(other).map(Input::Send),
        }
    }
}

const HELP: &str = "commands: open, hold, close, lock, unlock, noop, toggle-hold, toggle-lock, status, quit";

/// Drive the link from stdin until the user quits, stdin closes, or the
/// session ends.
pub async fn run(link: &DoorLink, events: &mut LinkEvents) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{HELP}");

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(event) => {
                    print_event(&event);
                    if matches!(event, LinkEvent::Connection(ConnectionEvent::Disconnected { .. })) {
                        return Ok(());
                    }
                }
                None => return Ok(()),
            },

            line = lines.next_line() => {
                let Some(line) = line? else {
                    return Ok(());
                };
                if line.trim().is_empty() {
                    continue;
                }
                match Input::parse(&line) {
                    Some(Input::Quit) => return Ok(()),
                    Some(input) => handle(link, input).await,
                    None => println!("unknown command '{}'; {HELP}", line.trim()),
                }
            }
        }
    }
}

async fn handle(link: &DoorLink, input: Input) {
    let result = match input {
        Input::Send(command) => {
            let door = link.door_state();
            if !door.allows(command) {
                println!("note: door is {door}, it may ignore {command}");
            }
            link.write(command).await.map(|()| command)
        }
        Input::ToggleHold => link.toggle_hold().await,
        Input::ToggleLock => link.toggle_lock().await,
        Input::Status => {
            let state = link.connection_state();
            let door = link.door_state();
            let available: Vec<&str> = door.available_commands().iter().map(|c| c.as_str()).collect();
            println!(
                "link: {}  door: {}  available: {}",
                state,
                door,
                if !state.is_connected() || available.is_empty() {
                    "-".to_string()
                } else {
                    available.join(", ")
                }
            );
            return;
        }
        Input::Help => {
            println!("{HELP}");
            return;
        }
        Input::Quit => return,
    };

    match result {
        Ok(command) => println!("sent {command}"),
        Err(e) => println!("error: {e}"),
    }
}

fn print_event(event: &LinkEvent) {
    match event {
        LinkEvent::State(state) => println!("door: {state}"),
        LinkEvent::Connection(ConnectionEvent::Succeeded { identifier }) => {
            println!("connected to {identifier}");
        }
        LinkEvent::Connection(ConnectionEvent::Failed { identifier, reason }) => {
            println!("connection to {identifier} failed: {reason}");
        }
        LinkEvent::Connection(ConnectionEvent::Disconnected { reason }) => {
            println!("disconnected: {reason}");
        }
        other => println!("{other:?}"),
    }
}
