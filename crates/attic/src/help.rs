//! Help text for the REPL: global dot-commands plus per-mode topics.

use attic_common::Colors;

use crate::translate::Mode;

pub const GLOBAL_HELP: &[(&str, &str)] = &[
    ("monitor", "Switch to monitor (debugger) mode."),
    (
        "basic",
        "Switch to BASIC mode.\n  .basic         - Standard Atari BASIC\n  .basic turbo   - Turbo BASIC XL",
    ),
    ("dos", "Switch to DOS (disk management) mode."),
    (
        "help",
        "Show help for commands.\n  .help          - Overview of available commands\n  .help <topic>  - Detailed help for one command",
    ),
    (
        "status",
        "Show emulator status (running state, PC, mounted disks, breakpoints).",
    ),
    ("screen", "Read the text displayed on the GRAPHICS 0 screen."),
    ("reset", "Cold reset the emulator (reinitializes hardware, clears memory)."),
    (
        "warmstart",
        "Warm reset the emulator (like pressing RESET, preserves memory).",
    ),
    (
        "screenshot",
        "Capture the emulator display as a PNG image.\n  .screenshot           - Save to the default location\n  .screenshot <path>    - Save to a specific path",
    ),
    (
        "boot",
        "Load and boot a file into the emulator.\n  .boot <path>   - Supports ATR, XEX, BAS, CAS, ROM files",
    ),
    (
        "state",
        "Save or load emulator state.\n  .state save <path>    - Save complete emulator state\n  .state load <path>    - Restore previously saved state",
    ),
    ("quit", "Disconnect from the server and exit (server keeps running)."),
    ("shutdown", "Disconnect, stop the server, and exit."),
];

pub const MONITOR_HELP: &[(&str, &str)] = &[
    (
        "g",
        "Resume execution (go).\n  g              - Resume from current PC\n  g $E000        - Set PC to $E000 and resume",
    ),
    (
        "s",
        "Step one or more instructions.\n  s              - Step one instruction\n  s 10           - Step 10 instructions",
    ),
    ("p", "Pause emulator execution."),
    ("pause", "Pause emulator execution."),
    (
        "until",
        "Run until the PC reaches an address.\n  until $0600    - Run until PC == $0600",
    ),
    (
        "r",
        "Display or set CPU registers.\n  r              - Display all registers\n  r a=$42        - Set accumulator\n  r pc=$E000     - Set program counter\n  r a=$FF x=$00  - Set multiple registers",
    ),
    (
        "m",
        "Display memory contents (hex dump).\n  m $0600        - Dump 16 bytes at $0600\n  m $0600 32     - Dump 32 bytes at $0600",
    ),
    (
        ">",
        "Write bytes to memory.\n  > $0600 A9,00,8D  - Write three bytes at $0600",
    ),
    (
        "f",
        "Fill a memory range with a byte value.\n  f $0600 $06FF 00  - Zero the range",
    ),
    (
        "d",
        "Disassemble memory.\n  d              - Disassemble at PC\n  d $E000 20     - 20 lines at $E000",
    ),
    (
        "a",
        "Assemble 6502 instructions.\n  a $0600            - Start interactive assembly at $0600\n  a $0600 LDA #$01   - Assemble one instruction",
    ),
    (
        "b",
        "Set a breakpoint, or list them.\n  b $0600        - Break at $0600\n  b              - List breakpoints",
    ),
    ("bp", "Alias for b."),
    (
        "bc",
        "Clear breakpoints.\n  bc $0600       - Clear one\n  bc *           - Clear all",
    ),
    ("bl", "List breakpoints."),
];

pub const BASIC_HELP: &[(&str, &str)] = &[
    (
        "list",
        "List the program.\n  LIST           - Whole program\n  LIST 10-50     - A line range",
    ),
    ("del", "Delete a line or range: DEL 10 or DEL 10-50."),
    ("run", "Run the program (injected as keystrokes)."),
    ("new", "Erase the program (injected as keystrokes)."),
    ("stop", "Stop the running program."),
    ("cont", "Continue a stopped program."),
    ("vars", "List all variables and their values."),
    ("var", "Show one variable: VAR X."),
    ("info", "Show program size and variable counts."),
    ("renum", "Renumber lines: RENUM [start [step]]."),
    ("save", "Save to disk: SAVE D1:PROG.BAS."),
    ("load", "Load from disk: LOAD D1:PROG.BAS."),
    ("export", "Export the program to a host file."),
    ("import", "Import a program from a host file."),
    ("dir", "List files on a drive: DIR [n]."),
];

pub const DOS_HELP: &[(&str, &str)] = &[
    ("mount", "Mount a disk image: mount <drive> <path>."),
    ("unmount", "Unmount a drive: unmount <drive>."),
    ("drives", "List mounted drives."),
    ("cd", "Change the current drive: cd <drive>."),
    ("dir", "List the directory of the current drive."),
    ("info", "Show file details: info <file>."),
    ("type", "Print a file as text: type <file>."),
    ("dump", "Hex dump a file: dump <file>."),
    ("copy", "Copy a file: copy <src> <dst>."),
    ("rename", "Rename a file: rename <old> <new>."),
    ("delete", "Delete a file: delete <file>."),
    ("lock", "Write-protect a file: lock <file>."),
    ("unlock", "Remove write protection: unlock <file>."),
    ("export", "Copy a file out to the host: export <file> <host-path>."),
    ("import", "Copy a host file in: import <host-path> <file>."),
    ("newdisk", "Create a blank disk image: newdisk <path> [sd|ed|dd]."),
    ("format", "Format the current drive."),
];

pub fn topics_for_mode(mode: Mode) -> &'static [(&'static str, &'static str)] {
    match mode {
        Mode::Monitor => MONITOR_HELP,
        Mode::Basic { .. } => BASIC_HELP,
        Mode::Dos => DOS_HELP,
    }
}

/// Overview shown by `.help`: global dot-commands plus the active mode's
/// command table, first line of each entry only.
pub fn overview(mode: Mode) -> String {
    let mut out = String::new();
    out.push_str(&Colors::bold("Global commands:"));
    out.push('\n');
    for (name, text) in GLOBAL_HELP {
        push_summary(&mut out, &format!(".{name}"), text);
    }
    out.push('\n');
    out.push_str(&Colors::bold(&format!("{} commands:", mode.name())));
    out.push('\n');
    for (name, text) in topics_for_mode(mode) {
        push_summary(&mut out, name, text);
    }
    out.push_str(&Colors::dim("Use .help <topic> for details."));
    out
}

fn push_summary(out: &mut String, name: &str, text: &str) {
    let summary = text.lines().next().unwrap_or("");
    out.push_str(&format!("  {:<12} {summary}\n", Colors::info(name)));
}

/// Detailed help for one topic: the active mode's table first, then the
/// global table (with or without a leading dot).
pub fn topic(mode: Mode, name: &str) -> Option<&'static str> {
    let wanted = name.trim().trim_start_matches('.').to_ascii_lowercase();
    topics_for_mode(mode)
        .iter()
        .chain(GLOBAL_HELP.iter())
        .find(|(topic, _)| *topic == wanted)
        .map(|(_, text)| *text)
}
