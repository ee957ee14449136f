use serde::Deserialize;
use std::fmt;

/// Opaque station identifier, unique within a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct StationId(String);

impl StationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A named live audio source plus the metadata shown in the selector and
/// the playback panel.  Deserialized straight from a `[[station]]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Station {
    pub id: StationId,
    pub name: String,
    #[serde(default)]
    pub slogan: String,
    /// Played directly by the player (Icecast/Shoutcast style HTTP stream).
    pub stream_url: String,
    #[serde(default)]
    pub logo_url: String,
}
