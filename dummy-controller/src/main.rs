use std::process::exit;

use clap::Parser;
use cli::{Cli, LogLevel};
use dummy_controller_core::config::ControllerConfig;
use env_logger::Target;
use kube::Client;
use log::{warn, LevelFilter};

use crate::controller::main_controller;

mod cli;
mod controller;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    configure_logger(&cli.get_log_level());

    let config = get_controller_config();
    let client = create_client().await;

    main_controller(client, config, cli.namespace).await;

    Ok(())
}

async fn create_client() -> Client {
    match Client::try_default().await {
        Ok(client) => client,
        Err(error) => {
            log::error!("Couldn't create client! {error:?}");
            exit(6)
        }
    }
}

fn get_controller_config() -> ControllerConfig {
    match ControllerConfig::from_env() {
        Ok(config) => {
            if config.pod_image.is_none() {
                warn!("POD_IMAGE is not set, pods can't be created until it is!");
            }

            config
        }
        Err(error) => {
            log::error!("Couldn't retrieve controller configuration! {error:?}");
            exit(7)
        }
    }
}

fn configure_logger(log_level: &LogLevel) {
    let mut logger = env_logger::builder();

    logger
        .format_module_path(matches!(log_level, LogLevel::Trace))
        .target(Target::Stderr);

    match log_level {
        LogLevel::Normal => {
            logger
                .filter(Some("dummy_controller"), LevelFilter::Info)
                .filter(Some("dummy_controller_core"), LevelFilter::Info);
        }
        LogLevel::Verbose => {
            logger
                .filter(Some("dummy_controller"), LevelFilter::Debug)
                .filter(Some("dummy_controller_core"), LevelFilter::Debug);
        }
        LogLevel::Trace => {
            logger.filter(None, LevelFilter::Debug);
        }
    }

    logger.init();
}
