//! Reader for WordNet 3.x database files (`index.*`, `data.*`)
//!
//! Index files are parsed into a map on first open. Data files are kept as
//! raw bytes and synsets are decoded on demand from their byte offset, which
//! is how WordNet addresses them.

use super::{
    normalize_lemma, IndexEntry, Lexicon, LexiconError, OpenCount, PointerKind, Synset, SynsetId,
    WordClass,
};
use log::{debug, info};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// WordNet dictionary directory (the one containing `index.noun`)
#[derive(Debug)]
pub struct WordNetLexicon {
    dir: PathBuf,
    data: OnceLock<WordNetData>,
    opened: OpenCount,
}

#[derive(Debug)]
struct WordNetData {
    index: HashMap<(WordClass, String), Vec<SynsetId>>,
    data: HashMap<WordClass, Vec<u8>>,
}

impl WordNetLexicon {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            data: OnceLock::new(),
            opened: OpenCount::default(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn loaded(&self) -> Option<&WordNetData> {
        if !self.opened.is_open() {
            return None;
        }
        self.data.get()
    }
}

impl Lexicon for WordNetLexicon {
    fn open(&self) -> Result<(), LexiconError> {
        if self.data.get().is_none() {
            let loaded = WordNetData::load(&self.dir)?;
            // A concurrent open may have won the race; both loads are identical.
            let _ = self.data.set(loaded);
        }
        self.opened.acquire();
        Ok(())
    }

    fn close(&self) {
        self.opened.release();
    }

    fn is_open(&self) -> bool {
        self.opened.is_open()
    }

    fn lookup(&self, lemma: &str, class: WordClass) -> Option<IndexEntry> {
        let data = self.loaded()?;
        let key = normalize_lemma(lemma);
        data.index.get(&(class, key.clone())).map(|senses| IndexEntry {
            lemma: key,
            class,
            senses: senses.clone(),
        })
    }

    fn synset(&self, id: SynsetId) -> Option<Synset> {
        let data = self.loaded()?;
        let bytes = data.data.get(&id.class)?;
        let start = id.offset as usize;
        if start >= bytes.len() {
            return None;
        }
        let end = bytes[start..]
            .iter()
            .position(|&b| b == b'\n')
            .map_or(bytes.len(), |p| start + p);
        let line = std::str::from_utf8(&bytes[start..end]).ok()?;
        match parse_data_line(line) {
            Ok(synset) if synset.id.offset == id.offset => Some(synset),
            Ok(_) => {
                debug!("offset {} does not start a synset record", id);
                None
            }
            Err(reason) => {
                debug!("unreadable synset {}: {}", id, reason);
                None
            }
        }
    }
}

impl WordNetData {
    fn load(dir: &Path) -> Result<Self, LexiconError> {
        let mut index = HashMap::new();
        let mut data = HashMap::new();

        for class in WordClass::ALL {
            let index_path = dir.join(format!("index.{}", class.file_suffix()));
            let data_path = dir.join(format!("data.{}", class.file_suffix()));
            let text = read(&index_path)?;
            let file = index_path.display().to_string();
            for (n, line) in text.lines().enumerate() {
                if line.starts_with("  ") || line.trim().is_empty() {
                    continue;
                }
                let (lemma, entry_class, senses) =
                    parse_index_line(line).map_err(|reason| LexiconError::Malformed {
                        file: file.clone(),
                        line: n + 1,
                        reason,
                    })?;
                index.insert((entry_class, lemma), senses);
            }
            data.insert(class, read(&data_path)?.into_bytes());
        }

        info!(
            "loaded WordNet from {} ({} index entries)",
            dir.display(),
            index.len()
        );
        Ok(Self { index, data })
    }
}

fn read(path: &Path) -> Result<String, LexiconError> {
    if !path.exists() {
        return Err(LexiconError::MissingFile(path.to_path_buf()));
    }
    fs::read_to_string(path).map_err(|source| LexiconError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// `lemma pos synset_cnt p_cnt [ptr_symbol...] sense_cnt tagsense_cnt synset_offset...`
fn parse_index_line(line: &str) -> Result<(String, WordClass, Vec<SynsetId>), String> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let field = |i: usize| fields.get(i).copied().ok_or("truncated index line");

    let lemma = field(0)?.to_string();
    let class = WordClass::from_letter(field(1)?).ok_or("unknown part of speech")?;
    let synset_cnt: usize = field(2)?.parse().map_err(|_| "bad synset count")?;
    let p_cnt: usize = field(3)?.parse().map_err(|_| "bad pointer count")?;
    let first_offset = 4 + p_cnt + 2;

    let senses = (0..synset_cnt)
        .map(|i| {
            field(first_offset + i)?
                .parse::<u32>()
                .map(|offset| SynsetId { class, offset })
                .map_err(|_| "bad synset offset")
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok((lemma, class, senses))
}

/// `offset lex_filenum ss_type w_cnt (word lex_id)... p_cnt (sym offset pos src/tgt)... | gloss`
fn parse_data_line(line: &str) -> Result<Synset, String> {
    let (body, gloss) = line.split_once(" | ").unwrap_or((line, ""));
    let fields: Vec<&str> = body.split_whitespace().collect();
    let field = |i: usize| fields.get(i).copied().ok_or("truncated data line");

    let offset: u32 = field(0)?.parse().map_err(|_| "bad offset")?;
    let class = WordClass::from_letter(field(2)?).ok_or("unknown synset type")?;
    let w_cnt = usize::from_str_radix(field(3)?, 16).map_err(|_| "bad word count")?;

    let mut synset = Synset::new(SynsetId { class, offset });
    synset.gloss = gloss.trim().to_string();
    let mut i = 4;
    for _ in 0..w_cnt {
        synset.words.push(field(i)?.replace('_', " "));
        i += 2;
    }

    let p_cnt: usize = field(i)?.parse().map_err(|_| "bad pointer count")?;
    i += 1;
    for _ in 0..p_cnt {
        let kind = PointerKind::from_symbol(field(i)?);
        let target: u32 = field(i + 1)?.parse().map_err(|_| "bad pointer offset")?;
        let target_class = WordClass::from_letter(field(i + 2)?).ok_or("bad pointer pos")?;
        synset.pointers.push((
            kind,
            SynsetId {
                class: target_class,
                offset: target,
            },
        ));
        i += 4;
    }
    Ok(synset)
}
