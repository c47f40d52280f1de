use serde::Serialize;
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write `value` as pretty-printed JSON, creating parent directories.
pub fn write_serialized<T: Serialize + ?Sized>(path: &Path, value: &T) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            create_dir_all(parent)?;
        }
    }

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn writes_json_into_new_directory() {
        let dir = std::env::temp_dir().join(format!("voter_stats_util_{}", std::process::id()));
        let path = dir.join("nested").join("out.json");

        let mut value = BTreeMap::new();
        value.insert("districts", 36);
        write_serialized(&path, &value).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let parsed: BTreeMap<String, u32> = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["districts"], 36);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
