
use anyhow::Context;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::parsing::table_io::{open_input, OutputHandle};

/// Loads a JSON file into some type, decompressing if the file ends in .gz
/// # Arguments
/// * `filename` - the file path to open and parse
/// # Errors
/// * if the file does not open properly
/// * if the deserialization throws errors
pub fn load_json<T: serde::de::DeserializeOwned>(filename: &Path) -> anyhow::Result<T> {
    let reader = BufReader::new(open_input(filename)?);
    let result: T = serde_json::from_reader(reader)
        .with_context(|| format!("Error while deserializing {filename:?}:"))?;
    Ok(result)
}

/// Saves a serializable value as pretty JSON, used for the run summaries.
/// # Arguments
/// * `data` - the data in memory
/// * `out_filename` - path to write to, compressed if it ends in .gz
/// # Errors
/// * if opening or writing to the file throw errors
/// * if JSON serialization throws errors
pub fn save_json<T: serde::Serialize>(data: &T, out_filename: &Path) -> anyhow::Result<()> {
    let mut writer = BufWriter::new(OutputHandle::create(out_filename)?);
    serde_json::to_writer_pretty(&mut writer, data)
        .with_context(|| format!("Error while serializing {out_filename:?}:"))?;
    writer.flush()
        .with_context(|| format!("Error while flushing output to {out_filename:?}:"))?;
    let handle = writer.into_inner()
        .map_err(|e| e.into_error())
        .with_context(|| format!("Error while closing {out_filename:?}:"))?;
    handle.finish()
        .with_context(|| format!("Error while finalizing {out_filename:?}:"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_json_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let mut data: BTreeMap<String, u64> = Default::default();
        data.insert("total_rows".to_string(), 10);
        data.insert("matched_rows".to_string(), 7);
        for name in ["summary.json", "summary.json.gz"] {
            let filename = tmp.path().join(name);
            save_json(&data, &filename).unwrap();
            let reloaded: BTreeMap<String, u64> = load_json(&filename).unwrap();
            assert_eq!(reloaded, data);
        }
    }
}
