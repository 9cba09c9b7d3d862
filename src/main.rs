use clap::Parser;

use trackload::app;
use trackload::args::HarnessArgs;
use trackload::error::AppResult;
use trackload::logger::init_logging;

#[tokio::main]
async fn main() -> AppResult<()> {
    let args = HarnessArgs::parse();
    init_logging(args.verbose);
    app::run(args).await
}
