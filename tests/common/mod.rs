//! Shared fixtures: a tiny WordNet database written with real byte offsets.

#![allow(dead_code)]

use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub const GOOD_ESSAY: &str = "test-essays/good.json";
pub const FLAWED_ESSAY: &str = "test-essays/flawed.json";
pub const ESSAY_DIR: &str = "test-essays";

const HEADER: &str = "  1 This software and database is being provided to you\n";

/// (words, indices of hypernym synsets within the same list)
type SynsetSpec<'a> = (&'a [&'a str], &'a [usize]);

/// entity > living_thing > animal > {dog, cat}; living_thing > plant > tree;
/// location > park
const NOUNS: &[SynsetSpec] = &[
    (&["entity"], &[]),
    (&["living_thing"], &[0]),
    (&["animal"], &[1]),
    (&["dog"], &[2]),
    (&["cat"], &[2]),
    (&["plant"], &[1]),
    (&["tree"], &[5]),
    (&["location"], &[]),
    (&["park"], &[7]),
];

const VERBS: &[SynsetSpec] = &[
    (&["chase"], &[]),
    (&["climb"], &[]),
    (&["bark"], &[]),
    (&["run"], &[]),
];

const ADVERBS: &[SynsetSpec] = &[(&["loudly"], &[]), (&["fast"], &[])];

fn data_line(offset: usize, letter: char, words: &[&str], parents: &[usize]) -> String {
    let mut line = format!("{:08} 03 {} {:02x}", offset, letter, words.len());
    for word in words {
        line.push_str(&format!(" {} 0", word));
    }
    line.push_str(&format!(" {:03}", parents.len()));
    for parent in parents {
        line.push_str(&format!(" @ {:08} {} 0000", parent, letter));
    }
    line.push_str(" | fixture gloss\n");
    line
}

fn write_class(dir: &Path, suffix: &str, letter: char, synsets: &[SynsetSpec]) {
    // offsets are fixed width, so line lengths do not depend on them
    let mut offsets = Vec::with_capacity(synsets.len());
    let mut next = HEADER.len();
    for (words, parents) in synsets {
        offsets.push(next);
        next += data_line(0, letter, words, &vec![0; parents.len()]).len();
    }

    let mut data = HEADER.to_string();
    let mut index = HEADER.to_string();
    for (i, (words, parents)) in synsets.iter().enumerate() {
        let parent_offsets: Vec<usize> = parents.iter().map(|&p| offsets[p]).collect();
        data.push_str(&data_line(offsets[i], letter, words, &parent_offsets));
        for word in *words {
            index.push_str(&format!("{} {} 1 0 1 0 {:08}\n", word, letter, offsets[i]));
        }
    }
    fs::write(dir.join(format!("data.{}", suffix)), data).unwrap();
    fs::write(dir.join(format!("index.{}", suffix)), index).unwrap();
}

/// Write the fixture database into a fresh temporary directory
pub fn wordnet_fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_class(dir.path(), "noun", 'n', NOUNS);
    write_class(dir.path(), "verb", 'v', VERBS);
    write_class(dir.path(), "adj", 'a', &[]);
    write_class(dir.path(), "adv", 'r', ADVERBS);
    dir
}
