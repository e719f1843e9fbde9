mod cli;

use colored::Colorize;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "tf_schema_ir=info",
        1 => "tf_schema_ir=debug",
        _ => "tf_schema_ir=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let command_line_interface = cli::CommandLineInterface::load();
    init_tracing(command_line_interface.verbose);
    if let Err(error) = command_line_interface.run() {
        let code = error
            .downcast_ref::<tf_schema_ir::Error>()
            .map(|err| err.kind().exit_code())
            .unwrap_or(1);
        eprintln!("{} {error:#}", "error:".red().bold());
        std::process::exit(code);
    }
}
