use std::fmt;

use itertools::Itertools;
use thirtyfour::By;
use thiserror::Error;

use super::BrowserSession;

/// A way of finding an element on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locator {
    Id(&'static str),
    Css(&'static str),
}

impl Locator {
    pub fn to_by(self) -> By {
        match self {
            Locator::Id(id) => By::Id(id),
            Locator::Css(selector) => By::Css(selector),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Id(id) => write!(f, "id={}", id),
            Locator::Css(selector) => write!(f, "css={}", selector),
        }
    }
}

/// A form control together with the locators to try for it, in order.
#[derive(Debug, Clone, Copy)]
pub struct FormControl {
    pub label: &'static str,
    pub locators: &'static [Locator],
}

#[derive(Debug, Error)]
pub enum LocatorError {
    #[error("no element found for {target} (tried {})", .tried.iter().join(", "))]
    NoMatch {
        target: &'static str,
        tried: Vec<Locator>,
    },
}

/// Returns the first locator of `control` that matches an element on the current page.
pub async fn resolve_first(
    session: &dyn BrowserSession,
    control: &FormControl,
) -> Result<Locator, LocatorError> {
    for locator in control.locators {
        match session.is_present(*locator).await {
            Ok(true) => {
                log::debug!("Resolved {} with {}", control.label, locator);
                return Ok(*locator);
            }
            Ok(false) => {}
            Err(e) => log::debug!("Lookup of {} with {} failed: {:#}", control.label, locator, e),
        }
    }

    Err(LocatorError::NoMatch {
        target: control.label,
        tried: control.locators.to_vec(),
    })
}
