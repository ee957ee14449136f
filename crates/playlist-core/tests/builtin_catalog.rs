use playlist_core::catalog::{Catalog, CatalogError};
use playlist_core::config::Config;
use playlist_core::station::{Station, StationId};

#[test]
fn builtin_catalog_ids_are_unique_and_urls_present() {
    let catalog = Catalog::builtin().expect("embedded catalog parses");
    assert!(!catalog.is_empty());

    let mut ids: Vec<&str> = catalog.iter().map(|s| s.id.as_str()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), catalog.len());

    for station in &catalog {
        assert!(!station.name.is_empty(), "{} has no name", station.id);
        assert!(
            station.stream_url.starts_with("http://") || station.stream_url.starts_with("https://"),
            "{} has a non-http stream url",
            station.id
        );
    }
}

#[test]
fn builtin_catalog_first_station() {
    let catalog = Catalog::builtin().unwrap();
    let first = &catalog.stations()[0];
    assert_eq!(first.id, StationId::from("cool-playlist"));
    assert_eq!(catalog.position(&first.id), Some(0));
}

#[test]
fn from_stations_rejects_duplicates() {
    let station = |id: &str| Station {
        id: StationId::from(id),
        name: id.to_uppercase(),
        slogan: String::new(),
        stream_url: format!("http://{}/stream", id),
        logo_url: String::new(),
    };
    assert!(Catalog::from_stations(vec![station("x"), station("y")]).is_ok());
    assert!(matches!(
        Catalog::from_stations(vec![station("x"), station("x")]),
        Err(CatalogError::DuplicateId(_))
    ));
}

#[test]
fn config_parses_player_and_log_sections() {
    let config = Config::from_toml_str(
        r#"
        [player]
        extra_args = ["--audio-device=pulse", "--cache=yes"]

        [log]
        filter = "debug,playlist_tui=trace"
        "#,
    )
    .unwrap();
    assert_eq!(config.player.extra_args.len(), 2);
    assert_eq!(config.log.filter, "debug,playlist_tui=trace");
    assert!(config.player.mpv_binary.as_os_str().is_empty());
}
