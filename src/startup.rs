use anyhow::Context;

use crate::{
    configuration::Settings,
    domain::artifact::HarvestReport,
    services::{BrowserSession, Droid, PdfDownloader, SearchExecutor},
};

/// Launches the browser, runs one harvest and always shuts the browser down.
pub async fn run(settings: Settings) -> anyhow::Result<HarvestReport> {
    let droid = Droid::launch(&settings.browser)
        .await
        .context("Failed to start the browser session")?;

    let result = harvest(&droid, &settings).await;

    if let Err(e) = droid.quit().await {
        log::error!("Failed to shut down the browser: {:#}", e);
    }

    result
}

pub async fn harvest(
    session: &dyn BrowserSession,
    settings: &Settings,
) -> anyhow::Result<HarvestReport> {
    let criteria = settings.search.criteria();
    let poll_interval = settings.browser.poll_interval();

    log::info!("Searching for SEI filings for {}...", criteria);
    let records = SearchExecutor::new(session, &settings.search, poll_interval)
        .search(&criteria)
        .await?;

    if records.is_empty() {
        log::info!("No results found.");
        return Ok(HarvestReport::default());
    }
    log::info!("Found {} results.", records.len());

    let downloader = PdfDownloader::new(session, &settings.download, poll_interval)
        .context("Failed to build the download client")?;

    Ok(downloader.download_all(&records).await)
}
