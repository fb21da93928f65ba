use quotebook::db::Database;
use quotebook::ids::{FixedPicker, SequentialIds};
use quotebook::models::*;
use quotebook::presentation::RecordingPresenter;
use quotebook::storage::{KeyValueStore, MemoryStore, QUOTES_KEY};
use quotebook::QuoteStore;
use speculate2::speculate;

fn open_store(db: &Database) -> QuoteStore {
    QuoteStore::builder(db.clone(), MemoryStore::new(), RecordingPresenter::new())
        .id_generator(SequentialIds::default())
        .picker(FixedPicker(0))
        .load()
}

speculate! {
    before {
        let db = Database::open_memory().expect("Failed to create in-memory database");
        db.migrate().expect("Failed to run migrations");
    }

    describe "key_value" {
        it "returns None for a missing key" {
            assert!(db.get(QUOTES_KEY).expect("Query failed").is_none());
        }

        it "stores and overwrites values" {
            db.set("lastSelectedFilter", "Work").expect("Write failed");
            db.set("lastSelectedFilter", "Life").expect("Write failed");

            assert_eq!(db.get("lastSelectedFilter").expect("Query failed"), Some("Life".to_string()));
        }

        it "keeps keys independent" {
            db.set("a", "1").expect("Write failed");
            db.set("b", "2").expect("Write failed");

            assert_eq!(db.get_value("a").expect("Query failed"), Some("1".to_string()));
            assert_eq!(db.get_value("b").expect("Query failed"), Some("2".to_string()));
        }
    }

    describe "sync_log" {
        it "records completed and failed passes newest first" {
            db.record_sync(&SyncOutcome::Completed(SyncReport { merged: 0, added: 5, total: 8 }))
                .expect("Write failed");
            db.record_sync(&SyncOutcome::Failed("Server response not OK (Status: 500)".to_string()))
                .expect("Write failed");

            let entries = db.recent_syncs(10).expect("Query failed");
            assert_eq!(entries.len(), 2);
            assert_eq!(entries[0].outcome, "failed");
            assert!(entries[0].message.contains("Status: 500"));
            assert_eq!(entries[1].outcome, "completed");
            assert_eq!(entries[1].added, 5);
            assert_eq!(entries[1].total, 8);
            assert_eq!(entries[1].message, "Quotes synced with server! Added 5 new quotes.");
        }

        it "does not record skipped passes" {
            db.record_sync(&SyncOutcome::Skipped).expect("Write failed");
            assert!(db.recent_syncs(10).expect("Query failed").is_empty());
        }

        it "honours the limit" {
            for total in 0..5 {
                db.record_sync(&SyncOutcome::Completed(SyncReport { merged: 0, added: 0, total }))
                    .expect("Write failed");
            }

            let entries = db.recent_syncs(2).expect("Query failed");
            assert_eq!(entries.len(), 2);
            assert_eq!(entries[0].total, 4);
        }
    }

    describe "as quote storage" {
        it "persists added quotes for the next load" {
            let mut store = open_store(&db);
            store.add_quote("Measure twice", "Craft").expect("Add failed");

            let reloaded = open_store(&db);
            assert_eq!(reloaded.len(), 4);
            assert_eq!(reloaded.quotes()[3], Quote::new("local-1000", "Measure twice", "Craft"));
        }

        it "remembers the filter across loads" {
            let mut store = open_store(&db);
            store.filter_and_pick("Value");

            let reloaded = open_store(&db);
            assert_eq!(reloaded.filter(), "Value");
        }
    }

    describe "on disk" {
        it "survives reopening the file" {
            let dir = tempfile::tempdir().expect("Failed to create temp dir");
            let path = dir.path().join("nested").join("quotebook.db");

            {
                let db = Database::open(path.clone()).expect("Failed to open");
                db.migrate().expect("Failed to migrate");
                db.set(QUOTES_KEY, "[]").expect("Write failed");
            }

            let db = Database::open(path).expect("Failed to reopen");
            db.migrate().expect("Failed to migrate");
            assert_eq!(db.get(QUOTES_KEY).expect("Query failed"), Some("[]".to_string()));
        }
    }
}
