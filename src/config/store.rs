//! Per-instance widget config persistence
//!
//! One JSON document per widget instance. Content is stored base64-encoded
//! so arbitrary note text survives the JSON layer untouched. Writes go
//! through a temp file and a rename so an interrupted write can only ever
//! affect the file being written.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

use crate::constants::{paths, widget};
use crate::error::{StoreError, StoreResult};
use crate::types::Position;

/// Persisted state of one widget instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetConfig {
    pub position: Position,

    #[serde(default = "default_draggable")]
    pub draggable: bool,

    /// Raw note text (base64 of UTF-8 on disk)
    #[serde(with = "base64_text")]
    pub content: String,

    /// Free-form presentation override, empty means default presentation
    #[serde(default)]
    pub style: String,
}

fn default_draggable() -> bool {
    true
}

impl WidgetConfig {
    /// Config for a freshly created instance
    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            position: Position::new(widget::DEFAULT_X, widget::DEFAULT_Y),
            draggable: true,
            content: content.into(),
            style: String::new(),
        }
    }
}

mod base64_text {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(text: &str, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(text.as_bytes()))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = String::deserialize(deserializer)?;
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| serde::de::Error::custom(format!("content is not valid base64: {e}")))?;
        String::from_utf8(bytes)
            .map_err(|e| serde::de::Error::custom(format!("content is not valid UTF-8: {e}")))
    }
}

/// Load one instance config
pub fn load(path: &Path) -> StoreResult<WidgetConfig> {
    read_json(path)
}

/// Persist one instance config
pub fn save(path: &Path, config: &WidgetConfig) -> StoreResult<()> {
    write_json(path, config)
}

/// Read and parse any JSON document, mapping failures onto the store taxonomy
pub fn read_json<T: DeserializeOwned>(path: &Path) -> StoreResult<T> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(StoreError::Missing { path: path.to_path_buf() });
        }
        Err(e) if e.kind() == ErrorKind::InvalidData => {
            return Err(StoreError::Corrupt {
                path: path.to_path_buf(),
                reason: e.to_string(),
            });
        }
        Err(source) => {
            return Err(StoreError::Io { path: path.to_path_buf(), source });
        }
    };

    serde_json::from_str(&contents).map_err(|e| StoreError::Corrupt {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Serialize to 4-space indented JSON and replace `path` atomically
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> StoreResult<()> {
    let write_err = |source: std::io::Error| StoreError::Write { path: path.to_path_buf(), source };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }

    let tmp_path = temp_path(path);
    {
        let file = File::create(&tmp_path).map_err(write_err)?;
        let mut writer = BufWriter::new(file);
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
        value
            .serialize(&mut serializer)
            .map_err(|e| write_err(std::io::Error::other(e)))?;
        writer.flush().map_err(write_err)?;
        writer.get_ref().sync_all().map_err(write_err)?;
    }

    fs::rename(&tmp_path, path).map_err(write_err)?;
    debug!(path = %path.display(), "wrote config");
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    tmp.set_extension(paths::TEMP_EXTENSION);
    tmp
}

/// All instance configs in `dir`, sorted by file name
///
/// Creates the directory when it does not exist yet.
pub fn list_configs(dir: &Path) -> StoreResult<Vec<PathBuf>> {
    fs::create_dir_all(dir).map_err(|source| StoreError::Io { path: dir.to_path_buf(), source })?;

    let entries = fs::read_dir(dir).map_err(|source| StoreError::Io { path: dir.to_path_buf(), source })?;

    let mut configs = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| StoreError::Io { path: dir.to_path_buf(), source })?;
        let path = entry.path();
        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        if is_file && is_instance_config(&path) {
            configs.push(path);
        }
    }
    configs.sort();
    Ok(configs)
}

fn is_instance_config(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some(paths::CONFIG_EXTENSION)
}

/// Fresh collision-free path for a new instance in `dir`
pub fn new_instance_path(dir: &Path) -> PathBuf {
    dir.join(format!("{}.{}", Uuid::new_v4(), paths::CONFIG_EXTENSION))
}

/// First-run seeding keyed on the directory's existence
///
/// When `dir` is absent it is created and exactly one config holding
/// `seed_content` is written; returns whether seeding happened.
pub fn ensure_bootstrapped(dir: &Path, seed_content: &str) -> StoreResult<bool> {
    if dir.exists() {
        return Ok(false);
    }

    fs::create_dir_all(dir).map_err(|source| StoreError::Write { path: dir.to_path_buf(), source })?;
    let path = new_instance_path(dir);
    save(&path, &WidgetConfig::with_content(seed_content))?;
    info!(dir = %dir.display(), path = %path.display(), "Seeded example widget");
    Ok(true)
}

/// Remove an instance file; an already-missing file is not an error
pub fn remove(path: &Path) -> StoreResult<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(source) => Err(StoreError::Write { path: path.to_path_buf(), source }),
    }
}
