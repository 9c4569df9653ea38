
use anyhow::Context;
use std::io::Write;
use std::path::Path;

use crate::parsing::table_io::OutputHandle;

/// Writes one identifier per line with no header, returning the number of lines written.
/// # Arguments
/// * `filename` - output path, gzipped if it ends in .gz
/// * `identifiers` - the values to write, in order
pub fn write_id_list<I, S>(filename: &Path, identifiers: I) -> anyhow::Result<u64>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>
{
    let mut handle = OutputHandle::create(filename)?;
    let mut count = 0;
    for id in identifiers {
        writeln!(handle, "{}", id.as_ref())
            .with_context(|| format!("Error while writing to {filename:?}:"))?;
        count += 1;
    }
    handle.finish()
        .with_context(|| format!("Error while finalizing {filename:?}:"))?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_id_list() {
        let tmp = tempfile::tempdir().unwrap();
        let filename = tmp.path().join("ids.txt");
        assert_eq!(write_id_list(&filename, ["rs1", "rs2"]).unwrap(), 2);
        assert_eq!(std::fs::read_to_string(&filename).unwrap(), "rs1\nrs2\n");

        let empty: Vec<String> = vec![];
        assert_eq!(write_id_list(&filename, empty).unwrap(), 0);
        assert_eq!(std::fs::read_to_string(&filename).unwrap(), "");
    }
}
