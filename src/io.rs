// io.rs
// Saving and loading run results under a base name

use std::ffi::OsString;
use std::io::{BufWriter, Cursor, Read, Write};
use std::path::{Path, PathBuf};

use flate2::{read::GzDecoder, write::GzEncoder, Compression};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::profile_scope;

/// On-disk encoding of a results file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveFormat {
    #[default]
    Json,
    JsonGz,
    Binary,
    BinaryGz,
}

impl SaveFormat {
    pub fn extension(self) -> &'static str {
        match self {
            SaveFormat::Json => "json",
            SaveFormat::JsonGz => "json.gz",
            SaveFormat::Binary => "bin",
            SaveFormat::BinaryGz => "bin.gz",
        }
    }

    pub fn is_compressed(self) -> bool {
        matches!(self, SaveFormat::JsonGz | SaveFormat::BinaryGz)
    }
}

/// `base` with the format's extension appended (`runs/std` → `runs/std.json`).
pub fn output_path(base: &Path, format: SaveFormat) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(".");
    name.push(format.extension());
    PathBuf::from(name)
}

/// Write `results` next to `base` and return the file written.
///
/// The data goes to a `.tmp` sibling first and is renamed into place, so an
/// interrupted save never leaves a truncated file behind.
pub fn save_results<T: Serialize>(results: &T, base: &Path, format: SaveFormat) -> SimResult<PathBuf> {
    profile_scope!("save_results");
    let path = output_path(base, format);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let tmp_path = {
        let mut os = path.as_os_str().to_os_string();
        os.push(".tmp");
        PathBuf::from(os)
    };
    {
        let file = std::fs::File::create(&tmp_path)?;
        let writer = BufWriter::new(file);
        match format {
            SaveFormat::Json => {
                serde_json::to_writer(writer, results)?;
            }
            SaveFormat::JsonGz => {
                let mut encoder = GzEncoder::new(writer, Compression::fast());
                serde_json::to_writer(&mut encoder, results)?;
                let mut writer = encoder.finish()?;
                writer.flush()?;
            }
            SaveFormat::Binary => {
                bincode::serialize_into(writer, results)?;
            }
            SaveFormat::BinaryGz => {
                let mut encoder = GzEncoder::new(writer, Compression::fast());
                bincode::serialize_into(&mut encoder, results)?;
                let mut writer = encoder.finish()?;
                writer.flush()?;
            }
        }
    }
    std::fs::rename(&tmp_path, &path)?;
    log::info!("saved results to {}", path.display());
    Ok(path)
}

/// Read a results file written by [`save_results`] in any format.
pub fn load_results<T: DeserializeOwned>(path: &Path) -> SimResult<T> {
    profile_scope!("load_results");
    let data = std::fs::read(path)?;
    match maybe_decompress_gzip(&data)? {
        Some(decoded) => parse_results_bytes(&decoded),
        None => parse_results_bytes(&data),
    }
}

fn parse_results_bytes<T: DeserializeOwned>(bytes: &[u8]) -> SimResult<T> {
    let json_err = match serde_json::from_slice::<T>(bytes) {
        Ok(results) => return Ok(results),
        Err(e) => e,
    };
    if let Ok(results) = bincode::deserialize::<T>(bytes) {
        return Ok(results);
    }
    Err(SimError::Json(json_err))
}

fn maybe_decompress_gzip(data: &[u8]) -> SimResult<Option<Vec<u8>>> {
    if data.len() < 2 || data[0] != 0x1f || data[1] != 0x8b {
        return Ok(None);
    }
    let mut decoder = GzDecoder::new(Cursor::new(data));
    let mut decoded = Vec::new();
    decoder.read_to_end(&mut decoded)?;
    Ok(Some(decoded))
}
