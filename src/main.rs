// src/main.rs

use std::process::ExitCode;

use critpath::errors::CritpathError;
use critpath::{cli, logging, run};

/// Unusable task data (cycles, dangling references) exits with 2 so scripts
/// can tell it apart from IO or startup failures.
const EXIT_BAD_DATA: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::parse();
    if let Err(err) = logging::init_logging(args.log_level) {
        eprintln!("critpath: could not initialise logging: {err:?}");
        return ExitCode::FAILURE;
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("critpath error: {err:?}");
            let bad_data = err
                .chain()
                .filter_map(|cause| cause.downcast_ref::<CritpathError>())
                .any(CritpathError::is_data_error);
            if bad_data {
                ExitCode::from(EXIT_BAD_DATA)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
