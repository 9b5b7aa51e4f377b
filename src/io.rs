/// Opening plain or bgzip-compressed tabular inputs
use anyhow::{bail, Context, Result};
use noodles::bgzf;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek};
use std::path::Path;

/// Fixed gzip header plus the `BC` extra subfield every BGZF block starts with
const BGZF_HEADER_LEN: usize = 18;
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const FLAG_EXTRA: u8 = 0x04;

fn is_compressed(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext == "gz" || ext == "bgz")
        .unwrap_or(false)
}

/// Reject anything that is not a BGZF block before handing it to the decoder
///
/// An empty stream is accepted and reads as zero lines.
fn check_bgzf_header<R: Read>(reader: &mut R) -> Result<()> {
    let mut header = Vec::with_capacity(BGZF_HEADER_LEN);
    reader
        .by_ref()
        .take(BGZF_HEADER_LEN as u64)
        .read_to_end(&mut header)?;

    if header.is_empty() {
        return Ok(());
    }
    if !header.starts_with(&GZIP_MAGIC) {
        bail!("not gzip data");
    }
    let is_bgzf = header.len() == BGZF_HEADER_LEN
        && header[3] & FLAG_EXTRA != 0
        && header[12..14] == *b"BC";
    if !is_bgzf {
        bail!("plain gzip member without a BGZF block header");
    }
    Ok(())
}

/// Open a file and auto-detect bgzip compression, returning a boxed BufRead
///
/// `.gz` and `.bgz` files must be BGZF; plain gzip is reported with the
/// path and a hint to recompress with `bgzip`.
pub fn open_input<P: AsRef<Path>>(path: P) -> Result<Box<dyn BufRead>> {
    let path = path.as_ref();
    let mut file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;

    if !is_compressed(path) {
        return Ok(Box::new(BufReader::new(file)));
    }

    check_bgzf_header(&mut file).with_context(|| {
        format!(
            "Failed to read {}: expected BGZF (bgzip) compression",
            path.display()
        )
    })?;
    file.rewind()
        .with_context(|| format!("Failed to rewind {}", path.display()))?;
    Ok(Box::new(BufReader::new(bgzf::io::reader::Reader::new(file))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::TempDir;

    const TABLE: &str = "Q1\tapis\nQ2\tvespa\n";

    fn read_lines(path: &Path) -> Result<Vec<String>> {
        Ok(open_input(path)?.lines().collect::<std::io::Result<_>>()?)
    }

    #[test]
    fn test_plain_file() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("map.tsv");
        std::fs::write(&path, TABLE)?;
        assert_eq!(read_lines(&path)?, vec!["Q1\tapis", "Q2\tvespa"]);
        Ok(())
    }

    #[test]
    fn test_bgzf_file() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("map.tsv.gz");
        {
            let mut writer = bgzf::io::Writer::new(File::create(&path)?);
            writer.write_all(TABLE.as_bytes())?;
        }
        assert_eq!(read_lines(&path)?, vec!["Q1\tapis", "Q2\tvespa"]);
        Ok(())
    }

    #[test]
    fn test_plain_gzip_rejected_with_path() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("map.tsv.gz");
        let mut encoder = GzEncoder::new(File::create(&path)?, Compression::default());
        encoder.write_all(TABLE.as_bytes())?;
        encoder.finish()?;

        let err = open_input(&path).err().expect("plain gzip must be rejected");
        let message = format!("{err:#}");
        assert!(message.contains("map.tsv.gz"));
        assert!(message.contains("expected BGZF (bgzip) compression"));
        assert!(message.contains("plain gzip"));
        Ok(())
    }

    #[test]
    fn test_uncompressed_data_with_gz_extension() {
        let mut data: &[u8] = b"Q1\tapis\n";
        let err = check_bgzf_header(&mut data).unwrap_err();
        assert!(err.to_string().contains("not gzip"));
    }

    #[test]
    fn test_empty_compressed_file_reads_nothing() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("empty.tsv.gz");
        std::fs::write(&path, "")?;
        assert!(read_lines(&path)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_missing_file_names_path() {
        let err = open_input("/nonexistent/hits.tsv").err().expect("missing file");
        assert!(err.to_string().contains("/nonexistent/hits.tsv"));
    }
}
