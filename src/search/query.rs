//! Per-request query values and boundary parsing.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Result, SearchError};
use crate::geo::{Coordinates, RadiusBuckets};
use crate::index::UserId;
use crate::rerank::RankingMode;

/// A validated query. Built per request and never stored by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub origin: Coordinates,
    pub prompt: Option<String>,
    pub user: Option<UserId>,
    /// Eligibility threshold in degrees
    pub radius: f64,
    pub mode: RankingMode,
}

impl Query {
    pub fn new(origin: Coordinates, radius: f64, mode: RankingMode) -> Self {
        Self {
            origin,
            prompt: None,
            user: None,
            radius,
            mode,
        }
    }

    /// Attach a prompt; blank text counts as no prompt.
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        let prompt = prompt.into();
        let trimmed = prompt.trim();
        self.prompt = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    pub fn with_user(mut self, user: Option<UserId>) -> Self {
        self.user = user;
        self
    }

    /// Check the radius and the inputs the ranking mode needs.
    pub fn validate(&self) -> Result<()> {
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(SearchError::InvalidRadius(self.radius.to_string()));
        }
        self.mode.check(self.prompt.as_deref(), self.user)
    }
}

/// Search form fields exactly as a caller submits them.
///
/// Numbers may arrive as JSON numbers or strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawQuery {
    #[serde(default, deserialize_with = "lenient_text")]
    pub lat: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub lng: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default)]
    pub radius: Option<String>,
}

impl RawQuery {
    /// Validate the form into a [`Query`].
    ///
    /// Checks run in a fixed order: coordinates, sort mode, radius, then
    /// what the mode requires (requester before prompt).
    pub fn parse(&self, buckets: &RadiusBuckets) -> Result<Query> {
        let origin = Coordinates::parse(
            self.lat.as_deref().unwrap_or_default(),
            self.lng.as_deref().unwrap_or_default(),
        )?;

        let mode: RankingMode = self
            .sort
            .as_deref()
            .ok_or_else(|| SearchError::InvalidMode(String::new()))?
            .parse()?;

        let radius = buckets.resolve(self.radius.as_deref().unwrap_or_default())?;

        let query = Query::new(origin, radius, mode)
            .with_prompt(self.prompt.clone().unwrap_or_default())
            .with_user(self.user());
        query.validate()?;

        Ok(query)
    }

    /// Requester identity; unparseable input and the sentinel mean none.
    pub fn user(&self) -> Option<UserId> {
        self.user_id
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .and_then(UserId::from_raw)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrNumber {
    Int(i64),
    Float(f64),
    Text(String),
}

fn lenient_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<TextOrNumber>::deserialize(deserializer)?.map(|value| match value {
            TextOrNumber::Int(n) => n.to_string(),
            TextOrNumber::Float(n) => n.to_string(),
            TextOrNumber::Text(s) => s,
        }),
    )
}
