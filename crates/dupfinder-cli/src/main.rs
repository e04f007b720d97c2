// dupfinder CLI entry point

use clap::Parser;
use dupfinder_cli::{app, logging, output, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.quiet);

    if let Err(e) = app::run(&cli).await {
        if cli.verbose {
            output::print_error_verbose(&e.user_message(), &e.technical_details());
        } else {
            output::print_error(&e.user_message());
        }
        std::process::exit(1);
    }
}
