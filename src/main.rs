use clap::Parser;
use habits::cli::commands::Cli;
use habits::cli::handlers;

fn main() {
    let cli = Cli::parse();
    if let Err(e) = handlers::dispatch(cli) {
        log::error!("event=command_failed module=main status=error error={}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
