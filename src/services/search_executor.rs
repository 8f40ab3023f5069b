use std::time::Duration;

use thiserror::Error;

use crate::{
    configuration::SearchSettings,
    domain::{result_record::ResultRecord, search_criteria::SearchCriteria},
};

use super::{
    parse_results, resolve_first, wait_until, BrowserSession, FormControl, Locator, WaitTimeout,
    RESULTS_TABLE_SELECTOR,
};

pub const PAGE_LOAD_SCREENSHOT: &str = "debug_screenshot.png";
pub const FORM_ERROR_SCREENSHOT: &str = "form_error_screenshot.png";

const PAGE_READY_MARKER: Locator = Locator::Css("input[type='text']");
const RESULTS_TABLE: Locator = Locator::Css(RESULTS_TABLE_SELECTOR);

pub const FIRST_NAME_FIELD: FormControl = FormControl {
    label: "first name field",
    locators: &[
        Locator::Id("ctl00_MainContentPlaceHolder_txtFirstName"),
        Locator::Css("input[id*='FirstName']"),
    ],
};

pub const LAST_NAME_FIELD: FormControl = FormControl {
    label: "last name field",
    locators: &[
        Locator::Id("ctl00_MainContentPlaceHolder_txtLastName"),
        Locator::Css("input[id*='LastName']"),
    ],
};

pub const POSITION_FIELD: FormControl = FormControl {
    label: "position field",
    locators: &[
        Locator::Id("ctl00_MainContentPlaceHolder_txtPosition"),
        Locator::Css("input[id*='Position']"),
    ],
};

pub const ENTITY_TYPE_FIELD: FormControl = FormControl {
    label: "entity type list",
    locators: &[
        Locator::Id("ctl00_MainContentPlaceHolder_ddlEntityType"),
        Locator::Css("select[id*='EntityType']"),
    ],
};

pub const SEARCH_BUTTON: FormControl = FormControl {
    label: "search button",
    locators: &[
        Locator::Id("ctl00_MainContentPlaceHolder_btnSearchSEI"),
        Locator::Css("input[value='Search SEI']"),
    ],
};

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search page did not load: {0}")]
    PageLoad(#[source] WaitTimeout),
    #[error("failed to fill out the search form: {0:#}")]
    Form(anyhow::Error),
    #[error("browser error during search: {0:#}")]
    Browser(anyhow::Error),
}

/// Submits the SEI search form and collects the listed filings.
pub struct SearchExecutor<'a> {
    session: &'a dyn BrowserSession,
    settings: &'a SearchSettings,
    poll_interval: Duration,
}

impl<'a> SearchExecutor<'a> {
    pub fn new(
        session: &'a dyn BrowserSession,
        settings: &'a SearchSettings,
        poll_interval: Duration,
    ) -> Self {
        SearchExecutor {
            session,
            settings,
            poll_interval,
        }
    }

    /// Returns the records on the results page, or an empty list when the
    /// results table never shows up.
    pub async fn search(&self, criteria: &SearchCriteria) -> Result<Vec<ResultRecord>, SearchError> {
        if criteria.is_empty() {
            log::warn!("Submitting the search form without any criteria");
        }

        self.session
            .goto(&self.settings.url)
            .await
            .map_err(SearchError::Browser)?;

        log::info!("Waiting for page to load...");
        if let Err(e) = self
            .wait_for(PAGE_READY_MARKER, "the search form", self.settings.page_load_timeout())
            .await
        {
            log::error!("Error waiting for page to load: {}", e);
            self.capture_screenshot(PAGE_LOAD_SCREENSHOT).await;
            return Err(SearchError::PageLoad(e));
        }
        log::info!("Page loaded successfully");

        log::info!("Filling out search form...");
        if let Err(e) = self.fill_form(criteria).await {
            log::error!("Error filling out form: {:#}", e);
            self.capture_screenshot(FORM_ERROR_SCREENSHOT).await;
            return Err(SearchError::Form(e));
        }

        log::info!("Waiting for results...");
        if self
            .wait_for(RESULTS_TABLE, "the results table", self.settings.results_timeout())
            .await
            .is_err()
        {
            log::info!("No results table on the page");
            return Ok(vec![]);
        }

        let page_source = self
            .session
            .page_source()
            .await
            .map_err(SearchError::Browser)?;

        Ok(parse_results(&page_source))
    }

    async fn fill_form(&self, criteria: &SearchCriteria) -> anyhow::Result<()> {
        if let Some(first_name) = &criteria.first_name {
            self.type_into(&FIRST_NAME_FIELD, first_name).await?;
            log::info!("Entered first name: {}", first_name);
        }

        if let Some(last_name) = &criteria.last_name {
            self.type_into(&LAST_NAME_FIELD, last_name).await?;
            log::info!("Entered last name: {}", last_name);
        }

        if let Some(position) = &criteria.position {
            self.type_into(&POSITION_FIELD, position).await?;
            log::info!("Entered position: {}", position);
        }

        if let Some(entity_type) = &criteria.entity_type {
            let locator = resolve_first(self.session, &ENTITY_TYPE_FIELD).await?;
            self.session.select_option(locator, entity_type).await?;
            log::info!("Selected entity type: {}", entity_type);
        }

        let button = resolve_first(self.session, &SEARCH_BUTTON).await?;
        self.session.click(button).await?;
        log::info!("Clicked search button");

        Ok(())
    }

    async fn type_into(&self, control: &FormControl, text: &str) -> anyhow::Result<()> {
        let locator = resolve_first(self.session, control).await?;
        self.session.type_into(locator, text).await
    }

    async fn wait_for(
        &self,
        locator: Locator,
        what: &str,
        timeout: Duration,
    ) -> Result<(), WaitTimeout> {
        let session = self.session;
        wait_until(what, timeout, self.poll_interval, move || async move {
            session.is_present(locator).await.unwrap_or(false)
        })
        .await
    }

    async fn capture_screenshot(&self, file_name: &str) {
        let path = self.settings.diagnostics_dir.join(file_name);
        match self.session.save_screenshot(&path).await {
            Ok(()) => log::info!("Saved screenshot to {}", path.display()),
            Err(e) => log::error!("Failed to save screenshot {}: {:#}", path.display(), e),
        }
    }
}
