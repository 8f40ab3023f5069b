use anyhow::Context;
use env_logger::Env;
use sei_harvester::{configuration::get_configuration, startup::run};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let configuration = get_configuration().context("Failed to read configuration.")?;
    let report = run(configuration).await?;

    log::info!(
        "Finished: {} found, {} downloaded, {} skipped, {} failed",
        report.found,
        report.downloaded.len(),
        report.skipped,
        report.failed
    );

    Ok(())
}
