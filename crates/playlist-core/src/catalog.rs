//! Station catalog: the fixed, ordered list of stations compiled into the
//! binary.

use std::collections::HashSet;

use thiserror::Error;

use crate::station::{Station, StationId};

/// The catalog that ships with the application.
const BUILTIN_STATIONS_TOML: &str = include_str!("../data/stations.toml");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to parse station catalog: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("station #{0} has an empty id")]
    EmptyId(usize),
    #[error("duplicate station id '{0}'")]
    DuplicateId(StationId),
}

/// Matches the TOML `[[station]]` table layout.
#[derive(Debug, serde::Deserialize)]
struct TomlStationFile {
    #[serde(default)]
    station: Vec<Station>,
}

/// Immutable, ordered station list.  There are no mutating methods: the
/// catalog is fixed for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct Catalog {
    stations: Vec<Station>,
}

impl Catalog {
    /// Parse the embedded catalog.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_toml_str(BUILTIN_STATIONS_TOML)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, CatalogError> {
        let file: TomlStationFile = toml::from_str(content)?;
        let stations = file
            .station
            .into_iter()
            .map(|s| Station {
                id: StationId::new(s.id.as_str().trim()),
                ..s
            })
            .collect();
        Self::from_stations(stations)
    }

    /// Build a catalog from records, enforcing non-empty unique ids.
    pub fn from_stations(stations: Vec<Station>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(stations.len());
        for (i, station) in stations.iter().enumerate() {
            if station.id.as_str().is_empty() {
                return Err(CatalogError::EmptyId(i));
            }
            if !seen.insert(station.id.clone()) {
                return Err(CatalogError::DuplicateId(station.id.clone()));
            }
        }
        tracing::debug!("catalog: {} stations", stations.len());
        Ok(Self { stations })
    }

    pub fn get(&self, id: &StationId) -> Option<&Station> {
        self.stations.iter().find(|s| &s.id == id)
    }

    /// Index of a station in catalog order.
    pub fn position(&self, id: &StationId) -> Option<usize> {
        self.stations.iter().position(|s| &s.id == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Station> {
        self.stations.iter()
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Station;
    type IntoIter = std::slice::Iter<'a, Station>;

    fn into_iter(self) -> Self::IntoIter {
        self.stations.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.len(), 1);
        let station = catalog.get(&StationId::from("cool-playlist")).unwrap();
        assert_eq!(station.name, "Cool - Playlist Group");
        assert_eq!(station.slogan, "La Música de Verdad");
        assert_eq!(station.stream_url, "https://stream.zeno.fm/7tjjwkmvexqvv");
        assert!(station.logo_url.ends_with(".png"));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let toml = r#"
            [[station]]
            id = "a"
            name = "A"
            stream_url = "http://a"

            [[station]]
            id = "a"
            name = "A again"
            stream_url = "http://a2"
        "#;
        match Catalog::from_toml_str(toml) {
            Err(CatalogError::DuplicateId(id)) => assert_eq!(id.as_str(), "a"),
            other => panic!("expected DuplicateId, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_id_rejected() {
        let toml = r#"
            [[station]]
            id = "  "
            name = "Blank"
            stream_url = "http://blank"
        "#;
        assert!(matches!(
            Catalog::from_toml_str(toml),
            Err(CatalogError::EmptyId(0))
        ));
    }

    #[test]
    fn test_order_preserved() {
        let toml = r#"
            [[station]]
            id = "b"
            name = "B"
            stream_url = "http://b"

            [[station]]
            id = "a"
            name = "A"
            stream_url = "http://a"
        "#;
        let catalog = Catalog::from_toml_str(toml).unwrap();
        let ids: Vec<&str> = catalog.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["b", "a"]);
        assert_eq!(catalog.position(&StationId::from("a")), Some(1));
        assert!(catalog.get(&StationId::from("zzz")).is_none());
    }

    #[test]
    fn test_missing_stream_url_is_parse_error() {
        let toml = r#"
            [[station]]
            id = "x"
            name = "X"
        "#;
        assert!(matches!(
            Catalog::from_toml_str(toml),
            Err(CatalogError::Parse(_))
        ));
    }

    #[test]
    fn test_station_table_defaults_and_trimmed_id() {
        let toml = r#"
            [[station]]
            id = " padded "
            name = "Padded"
            stream_url = "http://padded/stream"
        "#;
        let catalog = Catalog::from_toml_str(toml).unwrap();
        let station = catalog.get(&StationId::from("padded")).unwrap();
        assert_eq!(station.name, "Padded");
        assert!(station.slogan.is_empty());
        assert!(station.logo_url.is_empty());
    }
}
