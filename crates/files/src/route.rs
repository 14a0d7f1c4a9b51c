//! The public download route that stands in for a record's on-disk location.

use crate::constants::ROUTE_ID_PLACEHOLDER;
use crate::FilesError;
use hub_types::RecordId;

/// Builds and recognises download routes from a template such as `/api/files/{id}/download`.
///
/// Routes are presentational only. They are what callers see in a record's `path`, and a
/// route sent back in an update must never be mistaken for a real storage path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRoutes {
    /// Template text before the id placeholder
    prefix: String,

    /// Template text after the id placeholder
    suffix: String,
}

impl DownloadRoutes {
    /// Parses a route template.
    ///
    /// # Errors
    ///
    /// Returns `FilesError::InvalidRouteTemplate` unless the template contains exactly one
    /// `{id}` placeholder surrounded by some literal text.
    pub fn new(template: &str) -> Result<Self, FilesError> {
        let template = template.trim();

        let placeholders = template.matches(ROUTE_ID_PLACEHOLDER).count();
        if placeholders != 1 {
            return Err(FilesError::InvalidRouteTemplate(format!(
                "expected exactly one {} placeholder in '{}', found {}",
                ROUTE_ID_PLACEHOLDER, template, placeholders
            )));
        }

        let (prefix, suffix) = template
            .split_once(ROUTE_ID_PLACEHOLDER)
            .ok_or_else(|| FilesError::InvalidRouteTemplate(template.to_owned()))?;

        if prefix.is_empty() && suffix.is_empty() {
            return Err(FilesError::InvalidRouteTemplate(
                "template must contain text besides the id placeholder".into(),
            ));
        }

        Ok(Self {
            prefix: prefix.to_owned(),
            suffix: suffix.to_owned(),
        })
    }

    /// Returns the route for `id`, or `None` for a record that has not been saved yet.
    #[must_use]
    pub fn encode(&self, id: Option<RecordId>) -> Option<String> {
        id.map(|id| format!("{}{}{}", self.prefix, id, self.suffix))
    }

    /// Extracts the record id from something that looks like a route.
    ///
    /// The route may be embedded in a longer string, such as an absolute URL carrying a
    /// scheme and host, as long as it ends with the template's suffix.
    #[must_use]
    pub fn decode(&self, candidate: &str) -> Option<RecordId> {
        let head = candidate.trim().strip_suffix(self.suffix.as_str())?;

        let id_text = if self.prefix.is_empty() {
            head
        } else {
            let start = head.rfind(self.prefix.as_str())?;
            &head[start + self.prefix.len()..]
        };

        let unsigned = id_text.strip_prefix('-').unwrap_or(id_text);
        if unsigned.is_empty() || !unsigned.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        id_text.parse().ok()
    }

    /// Whether `candidate` is a download route rather than a storage path.
    #[must_use]
    pub fn looks_like_route(&self, candidate: &str) -> bool {
        self.decode(candidate).is_some()
    }
}
