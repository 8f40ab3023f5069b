use std::path::Path;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use thirtyfour::{
    components::SelectElement, ChromiumLikeCapabilities, DesiredCapabilities, WebDriver,
};

use crate::configuration::BrowserSettings;

use super::Locator;

/// The browser operations the search and download steps rely on.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    async fn goto(&self, url: &str) -> Result<()>;
    async fn is_present(&self, locator: Locator) -> Result<bool>;
    async fn type_into(&self, locator: Locator, text: &str) -> Result<()>;
    /// Picks the `<option>` whose visible text is `text`.
    async fn select_option(&self, locator: Locator, text: &str) -> Result<()>;
    async fn click(&self, locator: Locator) -> Result<()>;
    async fn page_source(&self) -> Result<String>;
    async fn execute_script(&self, script: &str) -> Result<()>;
    async fn current_window(&self) -> Result<String>;
    async fn window_handles(&self) -> Result<Vec<String>>;
    async fn switch_to_window(&self, handle: &str) -> Result<()>;
    /// Closes the current window. The caller must switch to another handle afterwards.
    async fn close_window(&self) -> Result<()>;
    async fn current_url(&self) -> Result<String>;
    /// Name/value pairs of the cookies visible to the current document.
    async fn cookies(&self) -> Result<Vec<(String, String)>>;
    async fn save_screenshot(&self, path: &Path) -> Result<()>;
}

/// Chrome driven over WebDriver.
pub struct Droid {
    pub driver: WebDriver,
}

impl Droid {
    pub async fn launch(settings: &BrowserSettings) -> Result<Self> {
        let mut caps = DesiredCapabilities::chrome();
        caps.add_arg(&format!(
            "--window-size={},{}",
            settings.window_width, settings.window_height
        ))?;
        if settings.headless {
            caps.set_headless()?;
        }

        log::info!("Connecting to WebDriver at {}", settings.webdriver_url);
        let driver = WebDriver::new(settings.webdriver_url.as_str(), caps).await?;

        Ok(Droid { driver })
    }

    pub async fn quit(self) -> Result<()> {
        self.driver.quit().await?;
        Ok(())
    }
}

#[async_trait]
impl BrowserSession for Droid {
    async fn goto(&self, url: &str) -> Result<()> {
        self.driver.goto(url).await?;
        Ok(())
    }

    async fn is_present(&self, locator: Locator) -> Result<bool> {
        let elements = self.driver.find_all(locator.to_by()).await?;
        Ok(!elements.is_empty())
    }

    async fn type_into(&self, locator: Locator, text: &str) -> Result<()> {
        let element = self.driver.find(locator.to_by()).await?;
        element.send_keys(text).await?;
        Ok(())
    }

    async fn select_option(&self, locator: Locator, text: &str) -> Result<()> {
        let element = self.driver.find(locator.to_by()).await?;
        SelectElement::new(&element)
            .await?
            .select_by_visible_text(text)
            .await?;
        Ok(())
    }

    async fn click(&self, locator: Locator) -> Result<()> {
        self.driver.find(locator.to_by()).await?.click().await?;
        Ok(())
    }

    async fn page_source(&self) -> Result<String> {
        Ok(self.driver.source().await?)
    }

    async fn execute_script(&self, script: &str) -> Result<()> {
        self.driver.execute(script, Vec::new()).await?;
        Ok(())
    }

    async fn current_window(&self) -> Result<String> {
        Ok(self.driver.window().await?.to_string())
    }

    async fn window_handles(&self) -> Result<Vec<String>> {
        let handles = self.driver.windows().await?;
        Ok(handles.into_iter().map(|h| h.to_string()).collect())
    }

    async fn switch_to_window(&self, handle: &str) -> Result<()> {
        let target = self
            .driver
            .windows()
            .await?
            .into_iter()
            .find(|h| h.to_string() == handle)
            .ok_or_else(|| anyhow!("no such window: {}", handle))?;
        self.driver.switch_to_window(target).await?;
        Ok(())
    }

    async fn close_window(&self) -> Result<()> {
        self.driver.close_window().await?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.driver.current_url().await?.to_string())
    }

    async fn cookies(&self) -> Result<Vec<(String, String)>> {
        let cookies = self.driver.get_all_cookies().await?;
        Ok(cookies.into_iter().map(|c| (c.name, c.value)).collect())
    }

    async fn save_screenshot(&self, path: &Path) -> Result<()> {
        self.driver.screenshot(path).await?;
        Ok(())
    }
}
