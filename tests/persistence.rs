use std::fs;
use std::path::Path;

use msgdesk::{Desk, DeskConfig, StorageBackend};
use tempfile::tempdir;

fn open(dir: &Path) -> Desk {
    let mut config = DeskConfig::default();
    config.storage.backend = StorageBackend::Files;
    config.storage.data_dir = dir.to_path_buf();
    Desk::open(&config).expect("open desk")
}

fn read(dir: &Path, name: &str) -> String {
    fs::read_to_string(dir.join(name)).unwrap_or_else(|err| panic!("read {name}: {err}"))
}

#[test]
fn files_written_in_legacy_formats() {
    let dir = tempdir().expect("tempdir");
    let desk = open(dir.path());

    desk.submit("T000000001", "@desk\n#deals at @shop #Deals")
        .expect("tweet");
    desk.submit(
        "E000000002",
        "jane@napier.ac.uk\nSIR 01/01/23\n11-22-33\nATM Theft\nSee http://cctv.example/clip",
    )
    .expect("sir");

    assert_eq!(read(dir.path(), "Hashtags.csv"), "#deals,2\n");
    assert_eq!(read(dir.path(), "MentionsList.csv"), "@shop\n");
    assert_eq!(read(dir.path(), "SIRList.csv"), "11-22-33,ATM Theft\n");
    assert_eq!(
        read(dir.path(), "URLQuarantineList.csv"),
        "http://cctv.example/clip\n"
    );

    let stored: serde_json::Value =
        serde_json::from_str(&read(dir.path(), "StoredMessages.json")).expect("json");
    let stored = stored.as_array().expect("array");
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0]["Header"], "T000000001");
    assert_eq!(stored[0]["Sender"], "@desk");
    assert_eq!(stored[1]["Subject"], "SIR 01/01/23");
    assert_eq!(
        stored[1]["MessageText"],
        "11-22-33\nATM Theft\nSee <URL Quarantined>"
    );
}

#[test]
fn state_survives_restart() {
    let dir = tempdir().expect("tempdir");
    {
        let desk = open(dir.path());
        desk.submit("T000000001", "@desk\n#rust and #deals").expect("tweet");
        desk.submit("T000000002", "@desk\n#deals again").expect("tweet");
        desk.submit("E000000003", "jane@napier.ac.uk\nHi\nhttps://x.example")
            .expect("email");
    }

    let desk = open(dir.path());
    assert_eq!(
        desk.snapshot_trending(),
        vec![("deals".to_string(), 2), ("rust".to_string(), 1)]
    );
    assert_eq!(desk.snapshot_quarantine(), vec!["https://x.example".to_string()]);
    assert_eq!(desk.snapshot_messages().len(), 3);

    // Reloaded log still suppresses duplicates.
    let again = desk
        .submit("T000000002", "@desk\n#deals again")
        .expect("duplicate");
    assert!(!again.appended);
    assert_eq!(desk.snapshot_messages().len(), 3);
}

#[test]
fn quarantine_file_is_appended_not_rewritten() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("URLQuarantineList.csv"), "https://old.example\n").expect("seed");

    let desk = open(dir.path());
    desk.submit("E000000001", "jane@napier.ac.uk\nHi\nhttps://new.example")
        .expect("email");

    assert_eq!(
        read(dir.path(), "URLQuarantineList.csv"),
        "https://old.example\nhttps://new.example\n"
    );
    assert_eq!(desk.snapshot_quarantine().len(), 2);
}

#[test]
fn abbreviations_loaded_from_textwords() {
    let dir = tempdir().expect("tempdir");
    fs::write(
        dir.path().join("textwords.csv"),
        "AAP,Always a pleasure\nbroken line\nLOL,Laughing out loud\n",
    )
    .expect("seed");

    let desk = open(dir.path());
    assert_eq!(desk.abbreviations().len(), 2);

    let submission = desk
        .submit("S123456789", "07911 123456\naap see you lol")
        .expect("sms");
    assert_eq!(
        submission.message.body,
        "aap <Always a pleasure> see you lol <Laughing out loud>"
    );
}

#[test]
fn yaml_config_opens_file_desk() {
    let dir = tempdir().expect("tempdir");
    let yaml = format!(
        "version: \"1.0\"\nstorage:\n  backend: files\n  data_dir: {:?}\n  layout:\n    messages: log.json\n",
        dir.path().display().to_string()
    );
    let config = DeskConfig::from_yaml(&yaml).expect("config");
    let desk = Desk::open(&config).expect("open");

    desk.submit("S123456789", "+447911123456\nHello").expect("sms");
    assert!(dir.path().join("log.json").exists());
    assert!(!dir.path().join("StoredMessages.json").exists());
}
