use std::process::ExitCode;

use twirl::{AppConfig, window};

fn main() -> ExitCode {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("error"));

    match window::run(AppConfig::default()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            println!("{err:#}");
            log::error!("{err:?}");
            ExitCode::FAILURE
        }
    }
}
