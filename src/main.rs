use anyhow::Result;
use namecolor::cli::{self, CliResult};
use namecolor::console::{self, ConsoleServer};
use namecolor::plugin::NameColorPlugin;
use namecolor_store::{TaskScheduler, TokioScheduler};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;

fn main() -> Result<()> {
    // Background flushes run on the runtime's blocking pool.
    let runtime = Runtime::new()?;
    let scheduler: Arc<dyn TaskScheduler> = Arc::new(TokioScheduler::new(runtime.handle().clone()));

    // Parses arguments, installs logging, and runs one-shot data commands.
    let options = match cli::process_cli(Arc::clone(&scheduler)) {
        CliResult::Exit(code) => {
            runtime.shutdown_timeout(Duration::from_secs(2));
            if code == 0 {
                return Ok(());
            }
            std::process::exit(code);
        }
        CliResult::Console(options) => options,
    };

    log::info!("Starting namecolor console in {}", options.data_folder.display());

    let mut server = ConsoleServer::new();
    let mut plugin = NameColorPlugin::enable(&options.data_folder, scheduler, &mut server);
    println!("Type 'help' for console commands.");

    let result = console::run_console(
        &mut plugin,
        &mut server,
        std::io::stdin().lock(),
        std::io::stdout(),
        options.ansi,
    );

    // Always save, even if the console loop failed on I/O.
    if let Err(e) = plugin.disable() {
        eprintln!("namecolor: error: failed to save player data: {e}");
    }

    log::info!("Console exited, shutting down runtime");
    runtime.shutdown_timeout(Duration::from_secs(2));
    result
}
