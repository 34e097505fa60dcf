//! Interactive REPL: mode switching, dot-commands, and the nested
//! interactive-assembly sub-mode.
//!
//! The dispatcher is single-threaded and cooperative: it never issues a
//! second command before the previous one's reply (and any events observed
//! before it) has been consumed. All state lives in one [`ReplState`]
//! value threaded through each input line.

use std::io::BufRead;
use std::io::Write;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use attic_common::Colors;
use attic_ipc::AtticClient;
use attic_protocol::Event;
use attic_protocol::PING_TIMEOUT;

use crate::help;
use crate::translate::translate;
use crate::translate::Mode;

/// Payload prefix that opens an interactive assembly session.
const ASSEMBLY_SENTINEL: &str = "ASM $";

/// Dispatcher state. `Normal` carries the active mode and the current DOS
/// drive; `Assembly` additionally tracks the next instruction address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplState {
    Normal { mode: Mode, drive: u8 },
    Assembly { mode: Mode, drive: u8, cursor: u16 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Repl<'a> {
    client: &'a AtticClient,
    state: ReplState,
}

impl<'a> Repl<'a> {
    pub fn new(client: &'a AtticClient) -> Self {
        Self {
            client,
            state: ReplState::Normal {
                mode: Mode::Basic { turbo: false },
                drive: 1,
            },
        }
    }

    pub fn state(&self) -> ReplState {
        self.state
    }

    pub fn mode(&self) -> Mode {
        match self.state {
            ReplState::Normal { mode, .. } | ReplState::Assembly { mode, .. } => mode,
        }
    }

    pub fn current_drive(&self) -> u8 {
        match self.state {
            ReplState::Normal { drive, .. } | ReplState::Assembly { drive, .. } => drive,
        }
    }

    pub fn in_assembly(&self) -> bool {
        matches!(self.state, ReplState::Assembly { .. })
    }

    fn set_mode(&mut self, new_mode: Mode) {
        match &mut self.state {
            ReplState::Normal { mode, .. } | ReplState::Assembly { mode, .. } => *mode = new_mode,
        }
    }

    fn set_drive(&mut self, new_drive: u8) {
        match &mut self.state {
            ReplState::Normal { drive, .. } | ReplState::Assembly { drive, .. } => {
                *drive = new_drive
            }
        }
    }

    pub fn prompt(&self) -> String {
        match self.state {
            ReplState::Assembly { cursor, .. } => {
                format!("{}: ", Colors::bold(&format!("${cursor:04X}")))
            }
            ReplState::Normal { mode, drive } => match mode {
                Mode::Dos => format!(
                    "{} {}",
                    Colors::dim("[dos]"),
                    Colors::bold(&format!("D{drive}:> "))
                ),
                other => format!(
                    "{} {}",
                    Colors::dim(&format!("[{}]", other.name())),
                    Colors::bold("> ")
                ),
            },
        }
    }

    /// Read input lines until end-of-input or a quit command.
    pub fn run(&mut self) -> std::io::Result<()> {
        let interrupted = Arc::new(AtomicBool::new(false));
        signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&interrupted))?;

        let stdin = std::io::stdin();
        let mut line = String::new();
        loop {
            print!("{}", self.prompt());
            std::io::stdout().flush()?;

            line.clear();
            match stdin.lock().read_line(&mut line) {
                Ok(0) => {
                    // End of input: an open assembly session is closed first
                    // so the server is not left with a dangling session.
                    if self.in_assembly() {
                        self.end_assembly();
                    }
                    println!();
                    println!("Goodbye");
                    return Ok(());
                }
                Ok(_) => {
                    if interrupted.swap(false, Ordering::SeqCst) {
                        // Ctrl-C during entry: discard the partial line.
                        continue;
                    }
                    if let Flow::Quit = self.handle_line(&line) {
                        println!("Goodbye");
                        return Ok(());
                    }
                }
                Err(err) if err.kind() == std::io::ErrorKind::Interrupted => {
                    interrupted.store(false, Ordering::SeqCst);
                    println!();
                    continue;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Process one line of user input.
    pub fn handle_line(&mut self, line: &str) -> Flow {
        let trimmed = line.trim();

        if self.in_assembly() {
            self.handle_assembly_line(trimmed);
            self.drain_and_render_events();
            return Flow::Continue;
        }

        if trimmed.is_empty() {
            return Flow::Continue;
        }

        if trimmed.starts_with('.') {
            let flow = self.handle_dot_command(trimmed);
            self.drain_and_render_events();
            return flow;
        }

        match translate(self.mode(), trimmed) {
            Ok(commands) => self.run_batch(&commands),
            Err(err) => println!("{} {err}", Colors::error("Error:")),
        }
        self.drain_and_render_events();
        Flow::Continue
    }

    /// Send a batch of translated commands in order.
    ///
    /// A transport error aborts the remainder of the batch; an `ERR:` reply
    /// is rendered and the batch continues. Neither changes dispatcher
    /// state beyond what the replies themselves dictate.
    fn run_batch(&mut self, commands: &[String]) {
        for command in commands {
            match self.client.send(command) {
                Ok(reply) if reply.success => {
                    if let Some(addr) = reply.payload.strip_prefix(ASSEMBLY_SENTINEL) {
                        let cursor = u16::from_str_radix(addr.trim(), 16).unwrap_or(0);
                        let ReplState::Normal { mode, drive } = self.state else {
                            unreachable!("batches only run in normal state");
                        };
                        self.state = ReplState::Assembly {
                            mode,
                            drive,
                            cursor,
                        };
                        println!(
                            "{}",
                            Colors::dim(&format!(
                                "Entering assembly mode at ${cursor:04X}. Type '.' or an empty line to exit."
                            ))
                        );
                        // The session swallows the rest of the batch.
                        return;
                    }

                    self.track_drive(command, &reply.payload);
                    self.render_payload(&reply.payload);
                }
                Ok(reply) => {
                    println!("{} {}", Colors::error("Error:"), reply.payload);
                }
                Err(err) => {
                    println!("{} {err}", Colors::error("Error:"));
                    break;
                }
            }
        }
    }

    /// Drive-tracking side effects, applied before rendering.
    fn track_drive(&mut self, command: &str, payload: &str) {
        if command.starts_with("dos cd ") && payload.starts_with('D') {
            if let Some(colon) = payload.find(':') {
                if let Ok(drive) = payload[1..colon].parse::<u8>() {
                    self.set_drive(drive);
                }
            }
        }

        if let Some(rest) = command.strip_prefix("unmount ") {
            if let Some(token) = rest.split_whitespace().next() {
                if let Ok(drive) = token.parse::<u8>() {
                    if drive == self.current_drive() {
                        self.set_drive(1);
                    }
                }
            }
        }
    }

    fn handle_assembly_line(&mut self, trimmed: &str) {
        if trimmed.is_empty() || trimmed == "." {
            self.end_assembly();
            return;
        }

        match self.client.send(&format!("assemble input {trimmed}")) {
            Ok(reply) if reply.success => {
                // Payload format: "<assembled line>\x1E$XXXX" where the tail
                // is the next address.
                match reply.payload.rsplit_once(attic_protocol::MULTI_LINE_SEP) {
                    Some((echoed, next)) => {
                        println!("{echoed}");
                        let digits = next.trim().trim_start_matches('$');
                        if let Ok(cursor) = u16::from_str_radix(digits, 16) {
                            if let ReplState::Assembly { cursor: current, .. } = &mut self.state {
                                *current = cursor;
                            }
                        }
                    }
                    None => println!("{}", reply.payload),
                }
            }
            Ok(reply) => println!("{} {}", Colors::error("Error:"), reply.payload),
            Err(err) => println!("{} {err}", Colors::error("Error:")),
        }
    }

    /// End the assembly session. Attempted even after errors so the server
    /// is not left in a dangling session.
    fn end_assembly(&mut self) {
        match self.client.send("assemble end") {
            Ok(reply) if reply.success => {
                if !reply.payload.is_empty() {
                    self.render_payload(&reply.payload);
                }
            }
            Ok(reply) => println!("{} {}", Colors::error("Error:"), reply.payload),
            Err(err) => println!("{} {err}", Colors::error("Error:")),
        }

        let ReplState::Assembly { mode, drive, .. } = self.state else {
            return;
        };
        self.state = ReplState::Normal { mode, drive };
    }

    fn handle_dot_command(&mut self, line: &str) -> Flow {
        let lower = line.to_ascii_lowercase();

        // Mode switches are pure client-side transitions.
        match lower.as_str() {
            ".monitor" => {
                self.set_mode(Mode::Monitor);
                println!("Switched to monitor mode");
                return Flow::Continue;
            }
            ".basic" | ".basic atari" => {
                self.set_mode(Mode::Basic { turbo: false });
                println!("Switched to BASIC mode");
                return Flow::Continue;
            }
            ".basic turbo" => {
                self.set_mode(Mode::Basic { turbo: true });
                println!("Switched to Turbo BASIC mode");
                return Flow::Continue;
            }
            ".dos" => {
                self.set_mode(Mode::Dos);
                println!("Switched to DOS mode");
                return Flow::Continue;
            }
            ".help" => {
                println!("{}", help::overview(self.mode()));
                return Flow::Continue;
            }
            ".quit" => {
                let _ = self.client.send_with_timeout("quit", PING_TIMEOUT);
                return Flow::Quit;
            }
            ".shutdown" => {
                let _ = self.client.send_with_timeout("shutdown", PING_TIMEOUT);
                return Flow::Quit;
            }
            ".status" => {
                self.send_and_render("status");
                return Flow::Continue;
            }
            ".screen" => {
                self.send_and_render("screen");
                return Flow::Continue;
            }
            ".reset" => {
                self.send_and_render("reset cold");
                return Flow::Continue;
            }
            ".warmstart" => {
                self.send_and_render("reset warm");
                return Flow::Continue;
            }
            _ => {}
        }

        let (command, args) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command.to_ascii_lowercase(), rest.trim()),
            None => (lower, ""),
        };

        match command.as_str() {
            ".help" => match help::topic(self.mode(), args) {
                Some(text) => println!("{text}"),
                None => println!("{} No help for {args:?}", Colors::error("Error:")),
            },
            ".screenshot" => {
                if args.is_empty() {
                    self.send_and_render("screenshot");
                } else {
                    self.send_and_render(&format!("screenshot {args}"));
                }
            }
            ".boot" => {
                if args.is_empty() {
                    println!("{} Usage: .boot <path>", Colors::error("Error:"));
                } else {
                    self.send_and_render(&format!("boot {args}"));
                }
            }
            ".state" => self.handle_state(args),
            _ => println!("{} Unknown command: {line}", Colors::error("Error:")),
        }
        Flow::Continue
    }

    fn handle_state(&mut self, args: &str) {
        let (subcommand, path) = match args.split_once(char::is_whitespace) {
            Some((sub, rest)) => (sub.to_ascii_lowercase(), rest.trim()),
            None => (args.to_ascii_lowercase(), ""),
        };

        match subcommand.as_str() {
            "save" | "load" if !path.is_empty() => {
                self.send_and_render(&format!("state {subcommand} {path}"));
            }
            "save" | "load" => {
                println!(
                    "{} Usage: .state {subcommand} <path>",
                    Colors::error("Error:")
                );
            }
            _ => println!(
                "{} Usage: .state save|load <path>",
                Colors::error("Error:")
            ),
        }
    }

    fn send_and_render(&mut self, command: &str) {
        match self.client.send(command) {
            Ok(reply) if reply.success => self.render_payload(&reply.payload),
            Ok(reply) => println!("{} {}", Colors::error("Error:"), reply.payload),
            Err(err) => println!("{} {err}", Colors::error("Error:")),
        }
    }

    fn render_payload(&self, payload: &str) {
        if payload.is_empty() {
            return;
        }
        if payload.contains(attic_protocol::MULTI_LINE_SEP) {
            for part in payload.split(attic_protocol::MULTI_LINE_SEP) {
                println!("{part}");
            }
        } else {
            println!("{payload}");
        }
    }

    fn drain_and_render_events(&self) {
        for event in self.client.drain_events() {
            render_event(&event);
        }
    }
}

/// Display one async event. Unknown kinds render generically.
pub fn render_event(event: &Event) {
    match event.kind.as_str() {
        "breakpoint" => println!(
            "{} {}",
            Colors::warning("Breakpoint hit:"),
            Colors::address(&event.data)
        ),
        "stopped" => println!(
            "{}",
            Colors::warning(&format!("Program stopped at {}", event.data))
        ),
        "error" => println!("{} {}", Colors::error("Server error:"), event.data),
        _ => println!(
            "{}",
            Colors::dim(&format!("Event: {} {}", event.kind, event.data))
        ),
    }
}
