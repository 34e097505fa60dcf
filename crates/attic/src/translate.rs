//! Command-to-protocol translation.
//!
//! Maps user input in each REPL mode to the wire-format commands that
//! AtticServer understands. Each mode's vocabulary is a closed enum with a
//! passthrough fallback, so the full command surface is visible here. Some
//! user commands expand to multiple protocol commands.

use attic_protocol::escape_for_inject;
use attic_protocol::parse_hex_bytes;
use attic_protocol::ProtocolError;

/// The mutually exclusive top-level command vocabularies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Monitor,
    Basic { turbo: bool },
    Dos,
}

impl Mode {
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Monitor => "monitor",
            Mode::Basic { turbo: false } => "basic",
            Mode::Basic { turbo: true } => "basic:turbo",
            Mode::Dos => "dos",
        }
    }
}

/// First whitespace-delimited token and the remainder of the line.
fn split_first(line: &str) -> (&str, &str) {
    let trimmed = line.trim();
    match trimmed.split_once(char::is_whitespace) {
        Some((token, rest)) => (token, rest.trim_start()),
        None => (trimmed, ""),
    }
}

/// Translate one input line for the given mode.
pub fn translate(mode: Mode, line: &str) -> Result<Vec<String>, ProtocolError> {
    match mode {
        Mode::Monitor => translate_monitor(line),
        Mode::Basic { .. } => Ok(translate_basic(line, true)),
        Mode::Dos => Ok(translate_dos(line)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MonitorCommand {
    Go,
    Step,
    Pause,
    Until,
    Registers,
    Memory,
    Write,
    Fill,
    Disassemble,
    Assemble,
    Breakpoint,
    BreakpointClear,
    BreakpointList,
}

impl MonitorCommand {
    fn parse(token: &str) -> Option<Self> {
        Some(match token {
            "g" => Self::Go,
            "s" => Self::Step,
            "p" | "pause" => Self::Pause,
            "until" => Self::Until,
            "r" => Self::Registers,
            "m" => Self::Memory,
            ">" => Self::Write,
            "f" => Self::Fill,
            "d" => Self::Disassemble,
            "a" => Self::Assemble,
            "b" | "bp" => Self::Breakpoint,
            "bc" => Self::BreakpointClear,
            "bl" => Self::BreakpointList,
            _ => return None,
        })
    }
}

/// Monitor (debugger) mode. Unrecognized commands pass through verbatim.
pub fn translate_monitor(line: &str) -> Result<Vec<String>, ProtocolError> {
    let (token, args) = split_first(line);
    let Some(command) = MonitorCommand::parse(&token.to_ascii_lowercase()) else {
        return Ok(vec![line.trim().to_string()]);
    };

    let commands = match command {
        MonitorCommand::Go => {
            if args.is_empty() {
                vec!["resume".to_string()]
            } else {
                // Go to address: set PC, then resume, in that order.
                vec![format!("registers pc={args}"), "resume".to_string()]
            }
        }
        MonitorCommand::Step => optional_args("step", args),
        MonitorCommand::Pause => vec!["pause".to_string()],
        MonitorCommand::Until => optional_args("run_until", args),
        MonitorCommand::Registers => optional_args("registers", args),
        MonitorCommand::Memory => optional_args("read", args),
        MonitorCommand::Write => {
            // Byte values are validated before anything is sent.
            let (_, data) = split_first(args);
            if !data.is_empty() {
                parse_hex_bytes(data)?;
            }
            optional_args("write", args)
        }
        MonitorCommand::Fill => optional_args("fill", args),
        MonitorCommand::Disassemble => optional_args("disassemble", args),
        MonitorCommand::Assemble => optional_args("assemble", args),
        MonitorCommand::Breakpoint => {
            if args.is_empty() {
                vec!["breakpoint list".to_string()]
            } else {
                vec![format!("breakpoint set {args}")]
            }
        }
        MonitorCommand::BreakpointClear => {
            if args == "*" {
                vec!["breakpoint clearall".to_string()]
            } else if args.is_empty() {
                vec!["breakpoint list".to_string()]
            } else {
                vec![format!("breakpoint clear {args}")]
            }
        }
        MonitorCommand::BreakpointList => vec!["breakpoint list".to_string()],
    };
    Ok(commands)
}

fn optional_args(command: &str, args: &str) -> Vec<String> {
    if args.is_empty() {
        vec![command.to_string()]
    } else {
        vec![format!("{command} {args}")]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BasicCommand {
    List,
    Del,
    Stop,
    Cont,
    Vars,
    Var,
    Info,
    Export,
    Import,
    Dir,
    Renum,
    Save,
    Load,
}

impl BasicCommand {
    fn parse(token: &str) -> Option<Self> {
        Some(match token {
            "LIST" => Self::List,
            "DEL" => Self::Del,
            "STOP" => Self::Stop,
            "CONT" => Self::Cont,
            "VARS" => Self::Vars,
            "VAR" => Self::Var,
            "INFO" => Self::Info,
            "EXPORT" => Self::Export,
            "IMPORT" => Self::Import,
            "DIR" => Self::Dir,
            "RENUM" => Self::Renum,
            "SAVE" => Self::Save,
            "LOAD" => Self::Load,
            _ => return None,
        })
    }
}

/// BASIC mode. Anything unrecognized (numbered lines, NEW, RUN, ...) is
/// injected as keystrokes with an appended Return.
pub fn translate_basic(line: &str, atascii: bool) -> Vec<String> {
    let (token, args) = split_first(line);
    let Some(command) = BasicCommand::parse(&token.to_ascii_uppercase()) else {
        let escaped = escape_for_inject(line.trim());
        return vec![format!("inject keys {escaped}\\n")];
    };

    match command {
        BasicCommand::List => {
            let suffix = if atascii { " atascii" } else { "" };
            if args.is_empty() {
                vec![format!("basic list{suffix}")]
            } else {
                vec![format!("basic list {args}{suffix}")]
            }
        }
        BasicCommand::Del => optional_args("basic del", args),
        BasicCommand::Stop => vec!["basic stop".to_string()],
        BasicCommand::Cont => vec!["basic cont".to_string()],
        BasicCommand::Vars => vec!["basic vars".to_string()],
        BasicCommand::Var => {
            if args.is_empty() {
                vec!["basic vars".to_string()]
            } else {
                vec![format!("basic var {args}")]
            }
        }
        BasicCommand::Info => vec!["basic info".to_string()],
        BasicCommand::Export => optional_args("basic export", args),
        BasicCommand::Import => optional_args("basic import", args),
        BasicCommand::Dir => optional_args("basic dir", args),
        BasicCommand::Renum => optional_args("basic renum", args),
        BasicCommand::Save => optional_args("basic save", args),
        BasicCommand::Load => optional_args("basic load", args),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DosCommand {
    Mount,
    Unmount,
    Drives,
    Cd,
    Dir,
    Info,
    Type,
    Dump,
    Copy,
    Rename,
    Delete,
    Lock,
    Unlock,
    Export,
    Import,
    NewDisk,
    Format,
}

impl DosCommand {
    fn parse(token: &str) -> Option<Self> {
        Some(match token {
            "mount" => Self::Mount,
            "unmount" | "umount" => Self::Unmount,
            "drives" => Self::Drives,
            "cd" => Self::Cd,
            "dir" => Self::Dir,
            "info" => Self::Info,
            "type" => Self::Type,
            "dump" => Self::Dump,
            "copy" | "cp" => Self::Copy,
            "rename" | "ren" => Self::Rename,
            "delete" | "del" => Self::Delete,
            "lock" => Self::Lock,
            "unlock" => Self::Unlock,
            "export" => Self::Export,
            "import" => Self::Import,
            "newdisk" => Self::NewDisk,
            "format" => Self::Format,
            _ => return None,
        })
    }
}

/// DOS (disk management) mode. Unrecognized commands pass through verbatim.
pub fn translate_dos(line: &str) -> Vec<String> {
    let (token, args) = split_first(line);
    let Some(command) = DosCommand::parse(&token.to_ascii_lowercase()) else {
        return vec![line.trim().to_string()];
    };

    match command {
        DosCommand::Mount => optional_args("mount", args),
        DosCommand::Unmount => optional_args("unmount", args),
        DosCommand::Drives => vec!["drives".to_string()],
        DosCommand::Cd => optional_args("dos cd", args),
        DosCommand::Dir => optional_args("dos dir", args),
        DosCommand::Info => optional_args("dos info", args),
        DosCommand::Type => optional_args("dos type", args),
        DosCommand::Dump => optional_args("dos dump", args),
        DosCommand::Copy => optional_args("dos copy", args),
        DosCommand::Rename => optional_args("dos rename", args),
        DosCommand::Delete => optional_args("dos delete", args),
        DosCommand::Lock => optional_args("dos lock", args),
        DosCommand::Unlock => optional_args("dos unlock", args),
        DosCommand::Export => optional_args("dos export", args),
        DosCommand::Import => optional_args("dos import", args),
        DosCommand::NewDisk => optional_args("dos newdisk", args),
        DosCommand::Format => vec!["dos format".to_string()],
    }
}
