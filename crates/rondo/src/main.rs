use clap::{Parser, Subcommand};
use relm4::prelude::*;
use rondo::config;
use rondo::gui::app::AppModel;
use rondo::gui::wheel::State;
use rondo::sys::runtime;
use rondo::sys::server::SOCKET_PATH;
use std::io::Write;
use std::os::unix::net::UnixStream;

#[derive(Parser, Debug)]
#[command(name = "rondo", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Show the wheel.
    Show,
    /// Hide the wheel.
    Hide,
    /// Toggle the wheel.
    Toggle,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Show) => send_command("show"),
        Some(Commands::Hide) => send_command("hide"),
        Some(Commands::Toggle) => send_command("toggle"),
        None => {
            run_daemon();
            Ok(())
        }
    }
}

fn run_daemon() {
    let config = config::load_or_setup();
    let state = State::new(&config);

    let (tx, rx) = async_channel::bounded(32);

    // Start Background Services
    runtime::start_background_services(tx.clone());

    let app = RelmApp::new("org.rondo.Rondo");

    app.run::<AppModel>((state, rx));
}

fn send_command(cmd: &str) -> anyhow::Result<()> {
    let mut stream = UnixStream::connect(SOCKET_PATH).map_err(|e| {
        anyhow::anyhow!(
            "Failed to connect to rondo daemon at {}: {}. Is rondo running?",
            SOCKET_PATH,
            e
        )
    })?;

    writeln!(stream, "{}", cmd)?;
    Ok(())
}
