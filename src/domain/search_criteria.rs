use std::fmt;

use itertools::Itertools;

/// Fields submitted to the SEI search form. Blank values count as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchCriteria {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub entity_type: Option<String>,
    pub position: Option<String>,
}

impl SearchCriteria {
    pub fn new(
        first_name: Option<String>,
        last_name: Option<String>,
        entity_type: Option<String>,
        position: Option<String>,
    ) -> Self {
        SearchCriteria {
            first_name: non_blank(first_name),
            last_name: non_blank(last_name),
            entity_type: non_blank(entity_type),
            position: non_blank(position),
        }
    }

    pub fn by_name(first_name: &str, last_name: &str) -> Self {
        SearchCriteria::new(
            Some(first_name.to_string()),
            Some(last_name.to_string()),
            None,
            None,
        )
    }

    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.entity_type.is_none()
            && self.position.is_none()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl fmt::Display for SearchCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "<no criteria>");
        }

        let name = [&self.first_name, &self.last_name]
            .into_iter()
            .flatten()
            .join(" ");
        let qualifiers = [&self.entity_type, &self.position]
            .into_iter()
            .flatten()
            .join(", ");

        match (name.is_empty(), qualifiers.is_empty()) {
            (false, true) => write!(f, "{}", name),
            (true, false) => write!(f, "({})", qualifiers),
            _ => write!(f, "{} ({})", name, qualifiers),
        }
    }
}
