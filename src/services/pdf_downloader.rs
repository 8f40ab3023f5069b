use std::{collections::HashSet, sync::Arc, time::Duration};

use reqwest::{cookie::Jar, Client, StatusCode, Url};
use thiserror::Error;

use crate::{
    configuration::DownloadSettings,
    dal::pdf_store,
    domain::{
        artifact::{DownloadedArtifact, HarvestReport},
        result_record::{ResultRecord, RetrievalTrigger},
    },
};

use super::{wait_for, BrowserSession, WaitTimeout};

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("no window opened for the filing: {0}")]
    NoPopup(#[source] WaitTimeout),
    #[error("filing window never navigated to a document: {0}")]
    NoDocument(#[source] WaitTimeout),
    #[error("filing window shows an invalid url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("{url} answered with status {status}")]
    Status { url: String, status: StatusCode },
    #[error("browser error: {0:#}")]
    Browser(anyhow::Error),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("failed to write pdf: {0}")]
    Io(#[from] std::io::Error),
}

/// Opens each record's filing in a new window and saves the PDF behind it.
pub struct PdfDownloader<'a> {
    session: &'a dyn BrowserSession,
    settings: &'a DownloadSettings,
    client: Client,
    /// Holds browser cookies copied over for the download requests.
    /// Only present when `replay_browser_cookies` is on.
    cookie_jar: Option<Arc<Jar>>,
    poll_interval: Duration,
}

impl<'a> PdfDownloader<'a> {
    pub fn new(
        session: &'a dyn BrowserSession,
        settings: &'a DownloadSettings,
        poll_interval: Duration,
    ) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder().timeout(settings.request_timeout());

        let cookie_jar = match settings.replay_browser_cookies {
            true => {
                let jar = Arc::new(Jar::default());
                builder = builder.cookie_provider(Arc::clone(&jar));
                Some(jar)
            }
            false => None,
        };

        Ok(PdfDownloader {
            session,
            settings,
            client: builder.build()?,
            cookie_jar,
            poll_interval,
        })
    }

    /// Processes records one at a time. A failing record is logged and counted,
    /// and never stops the records after it.
    pub async fn download_all(&self, records: &[ResultRecord]) -> HarvestReport {
        let mut report = HarvestReport {
            found: records.len(),
            ..HarvestReport::default()
        };

        let results_window = match self.session.current_window().await {
            Ok(handle) => handle,
            Err(e) => {
                log::error!("Cannot locate the results window: {:#}", e);
                let with_trigger = records.iter().filter(|r| r.trigger().is_some()).count();
                report.failed = with_trigger;
                report.skipped = records.len() - with_trigger;
                return report;
            }
        };
        let known_windows: HashSet<String> = match self.session.window_handles().await {
            Ok(handles) => handles.into_iter().collect(),
            Err(e) => {
                log::warn!("Failed to list open windows: {:#}", e);
                HashSet::from([results_window.clone()])
            }
        };

        for record in records {
            let Some(trigger) = record.trigger() else {
                log::warn!("No SEI link for {}, skipping", record.name);
                report.skipped += 1;
                continue;
            };

            if let Err(e) = self.reset_windows(&results_window, &known_windows).await {
                log::warn!("Failed to reset windows before {}: {:#}", record.name, e);
            }

            match self.download(record, &trigger, &results_window).await {
                Ok(artifact) => {
                    log::info!("Downloaded: {}", artifact.path.display());
                    report.downloaded.push(artifact);
                }
                Err(e) => {
                    log::error!("Error downloading SEI for {}: {}", record.name, e);
                    report.failed += 1;
                }
            }
        }

        if let Err(e) = self.reset_windows(&results_window, &known_windows).await {
            log::warn!("Failed to close leftover windows: {:#}", e);
        }

        report
    }

    async fn download(
        &self,
        record: &ResultRecord,
        trigger: &RetrievalTrigger,
        results_window: &str,
    ) -> Result<DownloadedArtifact, DownloadError> {
        let before: HashSet<String> = self
            .session
            .window_handles()
            .await
            .map_err(DownloadError::Browser)?
            .into_iter()
            .collect();

        self.session
            .execute_script(&trigger.script())
            .await
            .map_err(DownloadError::Browser)?;

        let popup = self.wait_for_new_window(&before).await?;
        self.session
            .switch_to_window(&popup)
            .await
            .map_err(DownloadError::Browser)?;

        let result = self.fetch_document(record).await;

        if let Err(e) = self.close_popup(results_window).await {
            log::error!("Failed to close the filing window: {:#}", e);
        }

        result
    }

    async fn wait_for_new_window(&self, before: &HashSet<String>) -> Result<String, DownloadError> {
        let session = self.session;
        wait_for(
            "a new browser window",
            self.settings.popup_timeout(),
            self.poll_interval,
            move || async move {
                session
                    .window_handles()
                    .await
                    .ok()?
                    .into_iter()
                    .find(|handle| !before.contains(handle))
            },
        )
        .await
        .map_err(DownloadError::NoPopup)
    }

    async fn fetch_document(&self, record: &ResultRecord) -> Result<DownloadedArtifact, DownloadError> {
        let session = self.session;
        let pdf_url = wait_for(
            "the filing url",
            self.settings.popup_timeout(),
            self.poll_interval,
            move || async move {
                let url = session.current_url().await.ok()?;
                match url.is_empty() || url == "about:blank" {
                    true => None,
                    false => Some(url),
                }
            },
        )
        .await
        .map_err(DownloadError::NoDocument)?;
        log::debug!("Fetching {} for {}", pdf_url, record.name);

        let url = Url::parse(&pdf_url).map_err(|e| DownloadError::InvalidUrl {
            url: pdf_url.clone(),
            reason: e.to_string(),
        })?;

        if let Some(jar) = &self.cookie_jar {
            let cookies = self
                .session
                .cookies()
                .await
                .map_err(DownloadError::Browser)?;
            for (name, value) in cookies {
                jar.add_cookie_str(&format!("{}={}", name, value), &url);
            }
        }

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Status {
                url: pdf_url,
                status,
            });
        }

        let body = response.bytes().await?;
        let path = pdf_store::save_pdf(&self.settings.output_dir, &record.file_name(), &body).await?;

        Ok(DownloadedArtifact {
            record_name: record.name.clone(),
            path,
            bytes: body.len(),
        })
    }

    /// Closes the filing window and always tries to switch back, even when the
    /// window was already gone.
    async fn close_popup(&self, results_window: &str) -> anyhow::Result<()> {
        let closed = self.session.close_window().await;
        self.session.switch_to_window(results_window).await?;
        closed
    }

    /// Closes windows that are neither the results window nor open before the
    /// run started (late popups), then focuses the results window.
    async fn reset_windows(
        &self,
        results_window: &str,
        known_windows: &HashSet<String>,
    ) -> anyhow::Result<()> {
        let strays: Vec<String> = self
            .session
            .window_handles()
            .await?
            .into_iter()
            .filter(|handle| handle != results_window && !known_windows.contains(handle))
            .collect();

        for stray in &strays {
            log::warn!("Closing leftover window {}", stray);
            self.session.switch_to_window(stray).await?;
            if let Err(e) = self.session.close_window().await {
                log::warn!("Failed to close window {}: {:#}", stray, e);
            }
        }

        self.session.switch_to_window(results_window).await
    }
}
