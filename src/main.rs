mod args;
mod inspect;
mod patient;
mod run;
mod table;

use tracing::Level;

fn main() -> Result<(), String> {
    let args: args::TopLevel = argh::from_env();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if args.verbose {
            Level::DEBUG
        } else {
            Level::WARN
        })
        .init();
    run::run(args.invocation)
}
