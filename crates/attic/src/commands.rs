use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
pub use clap_complete::Shell;

const LONG_ABOUT: &str = r#"attic drives the AtticServer Atari emulator over its control socket.

Run with no subcommand for the interactive REPL. The REPL has three modes
with their own command vocabularies:

    .monitor    6502 debugger (registers, memory, breakpoints, assembly)
    .basic      BASIC program editing (lines are typed straight in)
    .dos        Disk management (mount, dir, copy, ...)

An already-running server is discovered via its socket in /tmp; if none is
found, one is launched.

EXAMPLES:
    attic
    attic --silent
    attic exec status
    attic exec read '$0600' 16
    attic tools < requests.jsonl"#;

#[derive(Parser)]
#[command(name = "attic")]
#[command(author, version)]
#[command(about = "Interactive CLI for the AtticServer emulator")]
#[command(long_about = LONG_ABOUT)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Connect to a specific server socket instead of discovering one
    #[arg(long, global = true, value_name = "PATH")]
    pub socket: Option<PathBuf>,

    /// Launch the server with audio disabled
    #[arg(long, global = true)]
    pub silent: bool,

    /// ROM directory handed to a newly launched server
    #[arg(long, global = true, value_name = "DIR")]
    pub rom_path: Option<PathBuf>,

    /// Disable colored output (also respects NO_COLOR env var)
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Serve the line-delimited JSON-RPC tool adapter on stdio
    #[command(long_about = r#"Serve the line-delimited JSON-RPC tool adapter on stdio.

One request per line in, one response per line out. Methods:

    command   {"mode": "monitor|basic|basic_turbo|dos", "line": "..."}
    raw       {"command": "..."}
    events    drain queued async events
    status    connection status"#)]
    Tools,

    /// Send one raw protocol command and print the reply
    Exec {
        /// Protocol command text, e.g. 'status' or 'read $0600 16'
        #[arg(required = true, trailing_var_arg = true)]
        line: Vec<String>,
    },

    /// Generate shell completion scripts
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}
