use clap::CommandFactory;
use clap::Parser;
use clap_complete::generate;

use attic::commands::Cli;
use attic::commands::Commands;
use attic::repl::Repl;
use attic::tools;
use attic_common::color_init;
use attic_common::Colors;
use attic_ipc::ensure_server_running;
use attic_ipc::AtticClient;
use attic_ipc::ClientError;
use attic_ipc::Endpoint;
use attic_ipc::LaunchError;
use attic_ipc::LaunchOptions;
use attic_protocol::pid_from_socket_name;

fn main() {
    if let Err(e) = run() {
        if let Some(client_error) = e.downcast_ref::<ClientError>() {
            eprintln!("{} {}", Colors::error("Error:"), client_error);
            std::process::exit(exit_code_for_client_error(client_error));
        } else if let Some(launch_error) = e.downcast_ref::<LaunchError>() {
            eprintln!("{} {}", Colors::error("Error:"), launch_error);
            std::process::exit(69); // EX_UNAVAILABLE
        } else {
            eprintln!("{} {}", Colors::error("Error:"), e);
            std::process::exit(1);
        }
    }
}

fn exit_code_for_client_error(error: &ClientError) -> i32 {
    match error {
        ClientError::Timeout => 75, // EX_TEMPFAIL
        ClientError::ConnectFailed(_) | ClientError::HandshakeFailed(_) => 69, // EX_UNAVAILABLE
        ClientError::ConnectionClosed | ClientError::ConnectionLost(_) => 74, // EX_IOERR
        _ => 1,
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    color_init(cli.no_color);
    init_tracing();

    if let Some(Commands::Completions { shell }) = &cli.command {
        let mut cmd = Cli::command();
        generate(*shell, &mut cmd, "attic", &mut std::io::stdout());
        return Ok(());
    }

    let endpoint = resolve_endpoint(&cli)?;
    tracing::debug!(socket = %endpoint.path.display(), "using endpoint");
    let client = AtticClient::new();
    client.connect(&endpoint)?;

    let result = match &cli.command {
        None => run_repl(&client, &endpoint),
        Some(Commands::Tools) => tools::run(&client).map_err(Into::into),
        Some(Commands::Exec { line }) => run_exec(&client, &line.join(" ")),
        Some(Commands::Completions { .. }) => unreachable!(),
    };

    client.disconnect();
    result
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("ATTIC_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_endpoint(cli: &Cli) -> Result<Endpoint, LaunchError> {
    if let Some(path) = &cli.socket {
        let pid = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(pid_from_socket_name)
            .unwrap_or(0);
        return Ok(Endpoint::new(path.clone(), pid));
    }

    let opts = LaunchOptions {
        silent: cli.silent,
        rom_path: cli.rom_path.clone(),
    };
    ensure_server_running(&opts)
}

fn run_repl(
    client: &AtticClient,
    endpoint: &Endpoint,
) -> Result<(), Box<dyn std::error::Error>> {
    println!(
        "{}",
        Colors::dim(&format!(
            "Connected to AtticServer (pid {}). Type .help for commands.",
            endpoint.pid
        ))
    );
    let mut repl = Repl::new(client);
    repl.run()?;
    Ok(())
}

fn run_exec(client: &AtticClient, line: &str) -> Result<(), Box<dyn std::error::Error>> {
    let reply = client.send(line)?;
    if reply.success {
        for part in reply.lines() {
            println!("{part}");
        }
        Ok(())
    } else {
        eprintln!("{} {}", Colors::error("Error:"), reply.payload);
        std::process::exit(1);
    }
}
