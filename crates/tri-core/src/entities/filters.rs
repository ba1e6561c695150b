use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Optional caller-supplied constraints for one request.
///
/// Filters carry no identity beyond the request. Blank values count as absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Filters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub athlete: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organizer: Option<String>,
}

impl Filters {
    /// `(column, value)` pairs for every filter that is set, in a fixed order.
    ///
    /// Keys are the warehouse column names the filter constrains.
    #[must_use]
    pub fn annotations(&self) -> Vec<(&'static str, &str)> {
        [
            ("athlete_name", self.athlete.as_deref()),
            ("race_distance", self.distance.as_deref()),
            ("athlete_gender", self.gender.as_deref()),
            ("organizer", self.organizer.as_deref()),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            let value = value?.trim();
            (!value.is_empty()).then_some((key, value))
        })
        .collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.annotations().is_empty()
    }
}
