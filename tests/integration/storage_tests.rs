//! Integration tests for listing persistence
//!
//! These tests write snapshots into temporary directories and read them
//! back through the public storage API.

use avito_monitor::config::StorageConfig;
use avito_monitor::storage::{
    CsvStorage, LoadSelector, SqliteStorage, Storage, StorageBackend, StorageError, StorageKind,
};
use avito_monitor::{generate_summary, ListingRecord};
use tempfile::TempDir;

fn create_storage_config(dir: &TempDir) -> StorageConfig {
    StorageConfig {
        csv_directory: dir.path().join("csv"),
        csv_filename_template: "avito_data_{date}.csv".to_string(),
        database_path: dir.path().join("db").join("avito.db"),
    }
}

fn sample_listings() -> Vec<ListingRecord> {
    vec![
        ListingRecord {
            id: "3141592653".to_string(),
            title: "Диван угловой \"Лондон\"".to_string(),
            url: "https://www.avito.ru/moskva/mebel/divan_3141592653".to_string(),
            price: 15000.0,
            date: "2 часа назад".to_string(),
            location: "Москва, Тверская".to_string(),
            error: None,
        },
        ListingRecord {
            id: "2718281828".to_string(),
            title: "Кресло".to_string(),
            url: "https://www.avito.ru/moskva/mebel/kreslo_2718281828".to_string(),
            price: 4999.5,
            date: "вчера".to_string(),
            location: "Москва".to_string(),
            error: None,
        },
        ListingRecord {
            id: "1414213562".to_string(),
            title: "Отдам даром".to_string(),
            url: String::new(),
            price: 0.0,
            date: String::new(),
            location: "Not specified".to_string(),
            error: None,
        },
    ]
}

#[test]
fn test_csv_roundtrip() {
    let dir = TempDir::new().unwrap();
    let mut storage = CsvStorage::new(&create_storage_config(&dir));
    let records = sample_listings();

    storage.save(&records).unwrap();
    let loaded = storage.load(&LoadSelector::latest()).unwrap();

    assert_eq!(loaded, records);
}

#[test]
fn test_csv_reads_dot_and_comma_prices() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("manual.csv");
    std::fs::write(
        &path,
        "\u{feff}id,title,price,date,location,url\n\
         1,Стол,\"1500,5\",сегодня,Тула,https://www.avito.ru/tula/stol_1\n\
         2,Стул,750.25,сегодня,Тула,https://www.avito.ru/tula/stul_2\n\
         3,Шкаф,,сегодня,Тула,\n",
    )
    .unwrap();

    let loaded = CsvStorage::read_file(&path).unwrap();
    let prices: Vec<f64> = loaded.iter().map(|r| r.price).collect();
    assert_eq!(prices, vec![1500.5, 750.25, 0.0]);
    assert_eq!(loaded[0].title, "Стол");
}

#[test]
fn test_csv_latest_file_is_greatest_name() {
    let dir = TempDir::new().unwrap();
    let config = create_storage_config(&dir);
    let storage = CsvStorage::new(&config);
    let records = sample_listings();

    storage
        .save_as(&records[..1], "avito_data_2024-01-01_10-00-00.csv")
        .unwrap();
    storage
        .save_as(&records[1..], "avito_data_2024-03-15_08-30-00.csv")
        .unwrap();
    storage
        .save_as(&records[..1], "avito_data_2024-02-10_12-00-00.csv")
        .unwrap();
    std::fs::write(config.csv_directory.join("zz_notes.txt"), "not a snapshot").unwrap();

    let loaded = storage.load(&LoadSelector::latest()).unwrap();
    assert_eq!(loaded, records[1..].to_vec());

    let named = storage
        .load(&LoadSelector::file("avito_data_2024-01-01_10-00-00.csv"))
        .unwrap();
    assert_eq!(named, records[..1].to_vec());
}

#[test]
fn test_csv_named_snapshot_resolves_inside_directory() {
    let dir = TempDir::new().unwrap();
    let config = create_storage_config(&dir);
    let storage = CsvStorage::new(&config);
    let records = sample_listings();

    storage
        .save_as(&records, "avito_data_2024-05-01_09-00-00.csv")
        .unwrap();
    std::fs::write(dir.path().join("outside.csv"), "id,title,price,date,location,url\n").unwrap();

    let loaded = storage
        .load(&LoadSelector::file("avito_data_2024-05-01_09-00-00.csv"))
        .unwrap();
    assert_eq!(loaded, records);

    // a bare name never falls back to the working or parent directory
    let missing = storage.load(&LoadSelector::file("outside.csv"));
    assert!(matches!(missing, Err(StorageError::FileNotFound(_))));
}

#[test]
fn test_csv_empty_directory_loads_nothing() {
    let dir = TempDir::new().unwrap();
    let config = create_storage_config(&dir);
    std::fs::create_dir_all(&config.csv_directory).unwrap();

    let storage = CsvStorage::new(&config);
    assert!(storage.load(&LoadSelector::latest()).unwrap().is_empty());
}

#[test]
fn test_sqlite_upsert_by_id() {
    let dir = TempDir::new().unwrap();
    let config = create_storage_config(&dir);
    let mut storage = SqliteStorage::new(&config.database_path).unwrap();
    let mut records = sample_listings();

    storage.save(&records).unwrap();

    records[0].price = 13500.0;
    records[0].title = "Диван угловой, скидка".to_string();
    storage.save(&records[..1]).unwrap();

    assert_eq!(storage.count().unwrap(), 3);

    let loaded = storage.load(&LoadSelector::latest()).unwrap();
    let updated = loaded.iter().find(|r| r.id == "3141592653").unwrap();
    assert_eq!(updated.price, 13500.0);
    assert_eq!(updated.title, "Диван угловой, скидка");
}

#[test]
fn test_sqlite_persists_across_connections() {
    let dir = TempDir::new().unwrap();
    let config = create_storage_config(&dir);

    {
        let mut storage = SqliteStorage::new(&config.database_path).unwrap();
        storage.save(&sample_listings()).unwrap();
    }

    let storage = SqliteStorage::new(&config.database_path).unwrap();
    let loaded = storage.load(&LoadSelector::latest()).unwrap();
    assert_eq!(loaded.len(), 3);
}

#[test]
fn test_backend_selection_and_summary_of_stored_data() {
    let dir = TempDir::new().unwrap();
    let config = create_storage_config(&dir);

    for kind in ["csv", "sqlite"] {
        let kind: StorageKind = kind.parse().unwrap();
        let mut backend = StorageBackend::open(kind, &config).unwrap();

        assert!(backend.save(&sample_listings()));

        let loaded = backend.load(&LoadSelector::latest()).unwrap();
        let summary = generate_summary(&loaded, None);
        assert!(summary.contains("Total listings: 3"), "{kind}: {summary}");
        assert!(summary.contains("Listings without price: 1"), "{kind}: {summary}");
    }
}
