use super::artifact::pdf_file_name;

const SCRIPT_PREFIX: &str = "javascript:";

/// One row of the SEI results table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRecord {
    pub name: String,
    pub position: String,
    /// Raw `href` of the row's view link, if the row had one.
    pub retrieval_trigger: Option<String>,
}

impl ResultRecord {
    pub fn trigger(&self) -> Option<RetrievalTrigger> {
        self.retrieval_trigger
            .as_deref()
            .and_then(RetrievalTrigger::parse)
    }

    pub fn file_name(&self) -> String {
        pdf_file_name(&self.name, &self.position)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetrievalTrigger {
    /// Expression to run in the page, e.g. `viewSEI('123')`.
    Script(String),
    /// Plain link, opened in a new window.
    Link(String),
}

impl RetrievalTrigger {
    pub fn parse(href: &str) -> Option<Self> {
        let href = href.trim();
        if href.is_empty() {
            return None;
        }

        match href.get(..SCRIPT_PREFIX.len()) {
            Some(prefix) if prefix.eq_ignore_ascii_case(SCRIPT_PREFIX) => {
                let expression = href[SCRIPT_PREFIX.len()..].trim();
                match expression.is_empty() {
                    true => None,
                    false => Some(RetrievalTrigger::Script(expression.to_string())),
                }
            }
            _ => Some(RetrievalTrigger::Link(href.to_string())),
        }
    }

    /// Script that fires the trigger inside the browser.
    pub fn script(&self) -> String {
        match self {
            RetrievalTrigger::Script(expression) => expression.clone(),
            RetrievalTrigger::Link(href) => {
                let quoted = serde_json::Value::String(href.clone()).to_string();
                format!("window.open({}, '_blank');", quoted)
            }
        }
    }
}
