use clap::Parser;

use suiteql_helper::{adapters, cli::Args, error::AppResult, logging};

fn main() -> AppResult<()> {
    let args = Args::parse();
    logging::init(&args.log_level);

    if args.window_size > args.row_ceiling {
        tracing::warn!(
            window_size = args.window_size,
            row_ceiling = args.row_ceiling,
            "window size exceeds the host row ceiling; capping windows at the ceiling"
        );
    }

    adapters::bridge::run(args)
}
