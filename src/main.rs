use clap::Parser;
use pkgfetch::cli::Cli;
use pkgfetch::logging;

fn main() {
    let cli = Cli::parse();

    logging::init(cli.verbose).expect("failed to initialize logging");

    if let Err(err) = cli.run() {
        log::error!("{:#}", err);
        eprintln!("pkgfetch error: {:#}", err);
        std::process::exit(1);
    }
}
