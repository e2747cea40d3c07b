//! Thin entrypoint delegating to the library `run()`.

#![forbid(unsafe_code)]

use std::process;

#[tokio::main]
async fn main() {
    let exit_code = markpass_cli::run().await;
    if exit_code != 0 {
        process::exit(exit_code);
    }
}
