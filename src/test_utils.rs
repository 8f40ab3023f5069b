use std::{
    collections::{HashMap, HashSet},
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::{
    configuration::{DownloadSettings, SearchSettings},
    services::{BrowserSession, Locator},
};

pub const MAIN_WINDOW: &str = "main";
pub const SEARCH_URL: &str = "https://www.ethics.webapps.ms.gov/SearchSEIForm.aspx";

/// Search settings with zero timeouts, so every wait probes exactly once.
pub fn search_settings() -> SearchSettings {
    SearchSettings {
        url: SEARCH_URL.to_string(),
        first_name: Some("John".to_string()),
        last_name: Some("Smith".to_string()),
        entity_type: None,
        position: None,
        page_load_timeout_secs: 0,
        results_timeout_secs: 0,
        diagnostics_dir: PathBuf::from("diagnostics"),
    }
}

pub fn download_settings(output_dir: &Path) -> DownloadSettings {
    DownloadSettings {
        output_dir: output_dir.to_path_buf(),
        popup_timeout_secs: 0,
        request_timeout_secs: 5,
        replay_browser_cookies: false,
    }
}

#[derive(Default)]
pub struct FakeState {
    pub present: HashSet<Locator>,
    /// Page shown once anything is clicked; also makes the results table present.
    pub results_page: Option<String>,
    pub page_source: String,
    /// Open windows in creation order as (handle, url).
    pub windows: Vec<(String, String)>,
    pub current: String,
    /// Script text mapped to the url of the window it opens.
    pub popups: HashMap<String, String>,
    pub cookies: Vec<(String, String)>,
    pub opened: usize,
    /// Next `close_window` still closes the window but then reports an error.
    pub close_fails_once: bool,
    /// Handle left out of the next N `window_handles` answers.
    pub hidden: HashMap<String, usize>,

    pub visited: Vec<String>,
    pub typed: Vec<(Locator, String)>,
    pub selected: Vec<(Locator, String)>,
    pub clicked: Vec<Locator>,
    pub scripts: Vec<String>,
    pub screenshots: Vec<PathBuf>,
}

impl FakeState {
    pub fn window_ids(&self) -> Vec<String> {
        self.windows.iter().map(|(handle, _)| handle.clone()).collect()
    }
}

/// In-memory stand-in for a WebDriver session.
pub struct FakeBrowser {
    state: Mutex<FakeState>,
}

impl FakeBrowser {
    pub fn new() -> Self {
        let state = FakeState {
            windows: vec![(MAIN_WINDOW.to_string(), "about:blank".to_string())],
            current: MAIN_WINDOW.to_string(),
            ..FakeState::default()
        };

        FakeBrowser {
            state: Mutex::new(state),
        }
    }

    pub fn with_element(self, locator: Locator) -> Self {
        self.state().present.insert(locator);
        self
    }

    pub fn with_results_after_click(self, html: &str) -> Self {
        self.state().results_page = Some(html.to_string());
        self
    }

    pub fn with_popup(self, script: &str, url: &str) -> Self {
        self.state()
            .popups
            .insert(script.to_string(), url.to_string());
        self
    }

    pub fn with_window(self, handle: &str, url: &str) -> Self {
        self.state()
            .windows
            .push((handle.to_string(), url.to_string()));
        self
    }

    pub fn with_cookie(self, name: &str, value: &str) -> Self {
        self.state()
            .cookies
            .push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_failing_close(self) -> Self {
        self.state().close_fails_once = true;
        self
    }

    /// Keeps `handle` out of the first `calls` window listings, like a popup that opens late.
    pub fn with_late_window(self, handle: &str, calls: usize) -> Self {
        self.state().hidden.insert(handle.to_string(), calls);
        self
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }
}

impl Default for FakeBrowser {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BrowserSession for FakeBrowser {
    async fn goto(&self, url: &str) -> Result<()> {
        let mut state = self.state();
        state.visited.push(url.to_string());
        let current = state.current.clone();
        match state.windows.iter_mut().find(|(handle, _)| *handle == current) {
            Some(window) => window.1 = url.to_string(),
            None => return Err(anyhow!("no such window: {}", current)),
        }
        Ok(())
    }

    async fn is_present(&self, locator: Locator) -> Result<bool> {
        Ok(self.state().present.contains(&locator))
    }

    async fn type_into(&self, locator: Locator, text: &str) -> Result<()> {
        let mut state = self.state();
        if !state.present.contains(&locator) {
            return Err(anyhow!("no such element: {}", locator));
        }
        state.typed.push((locator, text.to_string()));
        Ok(())
    }

    async fn select_option(&self, locator: Locator, text: &str) -> Result<()> {
        let mut state = self.state();
        if !state.present.contains(&locator) {
            return Err(anyhow!("no such element: {}", locator));
        }
        state.selected.push((locator, text.to_string()));
        Ok(())
    }

    async fn click(&self, locator: Locator) -> Result<()> {
        let mut state = self.state();
        if !state.present.contains(&locator) {
            return Err(anyhow!("no such element: {}", locator));
        }
        state.clicked.push(locator);
        if let Some(html) = state.results_page.take() {
            state.page_source = html;
            state.present.insert(Locator::Css("table.GridView"));
        }
        Ok(())
    }

    async fn page_source(&self) -> Result<String> {
        Ok(self.state().page_source.clone())
    }

    async fn execute_script(&self, script: &str) -> Result<()> {
        let mut state = self.state();
        state.scripts.push(script.to_string());
        if let Some(url) = state.popups.get(script).cloned() {
            state.opened += 1;
            let handle = format!("popup-{}", state.opened);
            state.windows.push((handle, url));
        }
        Ok(())
    }

    async fn current_window(&self) -> Result<String> {
        let state = self.state();
        match state.current.is_empty() {
            true => Err(anyhow!("no current window")),
            false => Ok(state.current.clone()),
        }
    }

    async fn window_handles(&self) -> Result<Vec<String>> {
        let mut state = self.state();
        let mut handles = state.window_ids();
        for (handle, calls) in state.hidden.iter_mut() {
            if *calls > 0 {
                *calls -= 1;
                handles.retain(|h| h != handle);
            }
        }
        Ok(handles)
    }

    async fn switch_to_window(&self, handle: &str) -> Result<()> {
        let mut state = self.state();
        if !state.windows.iter().any(|(h, _)| h == handle) {
            return Err(anyhow!("no such window: {}", handle));
        }
        state.current = handle.to_string();
        Ok(())
    }

    async fn close_window(&self) -> Result<()> {
        let mut state = self.state();
        let current = std::mem::take(&mut state.current);
        state.windows.retain(|(handle, _)| *handle != current);
        if std::mem::take(&mut state.close_fails_once) {
            return Err(anyhow!("no such window"));
        }
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        let state = self.state();
        state
            .windows
            .iter()
            .find(|(handle, _)| *handle == state.current)
            .map(|(_, url)| url.clone())
            .ok_or_else(|| anyhow!("no current window"))
    }

    async fn cookies(&self) -> Result<Vec<(String, String)>> {
        Ok(self.state().cookies.clone())
    }

    async fn save_screenshot(&self, path: &Path) -> Result<()> {
        self.state().screenshots.push(path.to_path_buf());
        Ok(())
    }
}
