use std::fmt;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::io::ExportOptions;
use crate::trie::{Trie, TrieBlobBuilder, TrieOptions};

const GZ_EXTENSION: &str = "gz";
const TEXT_EXTENSION: &str = "trie";
const BINARY_EXTENSION: &str = "trieb";

/// On-disk dictionary formats, chosen by file extension. Any of them may be
/// gzip compressed with an extra `.gz`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DictionaryFormat {
    /// One entry per line; blank lines and `#` comments are skipped.
    WordList,
    /// `.trie`: the text serialization.
    TrieText,
    /// `.trieb`: the binary blob.
    TrieBinary,
}

impl DictionaryFormat {
    pub fn from_path(path: &Path) -> Self {
        let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
        let name = name
            .strip_suffix(GZ_EXTENSION)
            .and_then(|n| n.strip_suffix('.'))
            .unwrap_or(name);
        match Path::new(name).extension().and_then(|s| s.to_str()) {
            Some(TEXT_EXTENSION) => DictionaryFormat::TrieText,
            Some(BINARY_EXTENSION) => DictionaryFormat::TrieBinary,
            _ => DictionaryFormat::WordList,
        }
    }
}

impl fmt::Display for DictionaryFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DictionaryFormat::WordList => write!(f, "word list"),
            DictionaryFormat::TrieText => write!(f, "trie (text)"),
            DictionaryFormat::TrieBinary => write!(f, "trie (binary)"),
        }
    }
}

fn is_gzip(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some(GZ_EXTENSION)
}

/// Reads a file, decompressing it if the name ends in `.gz`.
pub fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    let raw = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    if !is_gzip(path) {
        return Ok(raw);
    }
    let mut bytes = Vec::new();
    GzDecoder::new(raw.as_slice())
        .read_to_end(&mut bytes)
        .with_context(|| format!("Failed to decompress {}", path.display()))?;
    Ok(bytes)
}

fn read_text(path: &Path) -> Result<String> {
    String::from_utf8(read_bytes(path)?)
        .with_context(|| format!("{} is not valid UTF-8", path.display()))
}

/// The entries of a word list.
pub fn word_list_entries(content: &str) -> impl Iterator<Item = &str> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
}

pub fn load_dictionary(path: &Path, options: &TrieOptions) -> Result<Trie> {
    let format = DictionaryFormat::from_path(path);
    log::debug!("loading {} as {}", path.display(), format);
    let trie = match format {
        DictionaryFormat::WordList => {
            let content = read_text(path)?;
            Trie::from_words_with_options(word_list_entries(&content), options.clone())
        }
        DictionaryFormat::TrieText => Trie::import_with_options(&read_text(path)?, options.clone())
            .with_context(|| format!("Failed to parse {}", path.display()))?,
        DictionaryFormat::TrieBinary => Trie::from_bytes(&read_bytes(path)?)
            .with_context(|| format!("Failed to decode {}", path.display()))?,
    };
    Ok(trie)
}

/// Finds a dictionary by path, or by name in the data directory.
pub fn resolve_dictionary(name: &Path) -> Option<PathBuf> {
    if name.exists() {
        return Some(name.to_path_buf());
    }
    let data_dir = crate::config::Config::data_dir()?;
    let candidates = [
        name.to_path_buf(),
        name.with_extension(TEXT_EXTENSION),
        name.with_extension(format!("{TEXT_EXTENSION}.{GZ_EXTENSION}")),
        name.with_extension(BINARY_EXTENSION),
    ];
    candidates
        .iter()
        .map(|c| data_dir.join(c))
        .find(|p| p.exists())
}

/// Merges every input, whatever its format, into one dictionary.
pub fn build_dictionary(
    inputs: &[PathBuf],
    options: &TrieOptions,
    show_progress: bool,
) -> Result<Trie> {
    let pb = if show_progress {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb
    } else {
        ProgressBar::hidden()
    };

    let mut builder = TrieBlobBuilder::new(options.clone());
    for input in inputs {
        pb.set_message(format!("Reading {}", input.display()));
        match DictionaryFormat::from_path(input) {
            DictionaryFormat::WordList => {
                builder.insert_words(word_list_entries(&read_text(input)?))
            }
            _ => {
                let trie = load_dictionary(input, options)?;
                builder.insert_words(trie.words());
            }
        }
        pb.tick();
    }

    pb.set_message("Compacting...");
    let trie = Trie::from_blob(builder.build());
    pb.finish_and_clear();
    log::info!("built dictionary: {} nodes", trie.size());
    Ok(trie)
}

/// Writes `trie` in the format given by the file name; returns the bytes written.
pub fn save_dictionary(trie: &Trie, path: &Path, export: &ExportOptions) -> Result<u64> {
    let data = match DictionaryFormat::from_path(path) {
        DictionaryFormat::TrieBinary => trie.to_bytes(),
        DictionaryFormat::TrieText => trie.export(export).into_bytes(),
        DictionaryFormat::WordList => {
            let mut text = String::new();
            for word in trie.words() {
                text.push_str(&word);
                text.push('\n');
            }
            text.into_bytes()
        }
    };

    let data = if is_gzip(path) {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
        encoder.write_all(&data)?;
        encoder.finish()?
    } else {
        data
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, &data).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(data.len() as u64)
}

#[derive(Debug, Clone, Serialize)]
pub struct DictionaryInfo {
    pub path: PathBuf,
    pub format: DictionaryFormat,
    pub compressed: bool,
    pub size_bytes: u64,
    pub word_count: usize,
    pub node_count: usize,
    pub edge_count: usize,
}

pub fn dictionary_info(path: &Path, options: &TrieOptions) -> Result<DictionaryInfo> {
    let metadata =
        fs::metadata(path).with_context(|| format!("Failed to stat {}", path.display()))?;
    let trie = load_dictionary(path, options)?;
    Ok(DictionaryInfo {
        path: path.to_path_buf(),
        format: DictionaryFormat::from_path(path),
        compressed: is_gzip(path),
        size_bytes: metadata.len(),
        word_count: trie.num_words(),
        node_count: trie.size(),
        edge_count: trie.blob().num_edges(),
    })
}
