use crate::sources::{Source, Store};
use std::fs;
use std::path::PathBuf;

fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
}

/// Fresh data dir under the system temp dir, seeded with the committed
/// fixtures, so tests that materialize artifacts never touch the repo tree
pub fn scratch_data_dir(label: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("colbench-{}-{label}", std::process::id()));
    if dir.exists() {
        fs::remove_dir_all(&dir).unwrap();
    }
    fs::create_dir_all(&dir).unwrap();

    for name in ["nyctaxi_sample.csv", "fanniemae_sample.csv"] {
        fs::copy(fixture_dir().join(name), dir.join(name)).unwrap();
    }

    dir
}

pub fn store(label: &str) -> Store {
    Store::with_data_dir(scratch_data_dir(label))
}

pub fn nyctaxi(label: &str) -> Source {
    store(label).get("nyctaxi_sample").unwrap()
}
