//! # Corpus Reader
//!
//! Enumerates the annotation files of a directory and turns each into
//! sentence records, lazily and one file at a time.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Result, TaggingError};
use crate::reader::assembler::{SentenceAssembler, SentenceRecord};
use crate::reader::chunk::ChunkParser;
use crate::reader::config::{ReaderConfig, SentenceBoundary};
use crate::reader::tokenizer::CharTokenizer;

/// Whether `line` separates two sentences in blank-line mode.
pub fn is_divider(line: &str) -> bool {
    line.trim().is_empty()
}

/// Decode UTF-8, dropping invalid byte sequences instead of replacing them.
pub fn decode_lossy(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
    }
    text
}

/// Split `text` into blocks of consecutive non-divider lines.
///
/// Lines keep their terminators, so a block ends the way a whole file would.
fn blank_line_blocks(text: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current = String::new();
    for line in text.split_inclusive('\n') {
        if is_divider(line) {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push_str(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

/// Reads BEST2010-style annotation files into [`SentenceRecord`]s.
///
/// # Examples
/// ```
/// use thaitag_core::reader::{CorpusReader, ReaderConfig};
///
/// let reader = CorpusReader::new(ReaderConfig::default()).unwrap();
/// let records = reader.parse_text("แมว/NN/O|กิน/VB/O|ปลา/NN/O");
///
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].word_len, vec![3, 2, 3]);
/// ```
#[derive(Debug, Clone)]
pub struct CorpusReader {
    config: ReaderConfig,
    parser: ChunkParser,
    assembler: SentenceAssembler,
}

impl CorpusReader {
    /// Build a reader from `config`.
    ///
    /// # Errors
    ///
    /// Returns `TaggingError::Config` for an invalid configuration and
    /// `TaggingError::Regex` for an invalid cleaning rule.
    pub fn new(config: ReaderConfig) -> Result<Self> {
        config.validate()?;
        let parser = ChunkParser::new(&config)?;
        let assembler = SentenceAssembler::new(
            CharTokenizer::new(config.char_unit),
            config.character_view,
            config.labels,
        );
        Ok(Self {
            config,
            parser,
            assembler,
        })
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Parse one sentence worth of delimited chunks.
    pub fn parse_sentence(&self, text: &str) -> SentenceRecord {
        self.assembler.assemble(
            text.split(self.config.delimiter)
                .map(|chunk| self.parser.parse(chunk)),
        )
    }

    /// Parse the full contents of one file according to the sentence boundary setting.
    pub fn parse_text(&self, text: &str) -> Vec<SentenceRecord> {
        match self.config.sentence_boundary {
            SentenceBoundary::File => vec![self.parse_sentence(text)],
            SentenceBoundary::BlankLine => blank_line_blocks(text)
                .iter()
                .map(|block| self.parse_sentence(block))
                .collect(),
        }
    }

    /// Read and parse one file.
    ///
    /// # Errors
    ///
    /// Returns `TaggingError::Io` if the file cannot be read. Invalid UTF-8 is
    /// not an error.
    pub fn read_file(&self, path: impl AsRef<Path>) -> Result<Vec<SentenceRecord>> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| TaggingError::io(path, e))?;
        Ok(self.parse_text(&decode_lossy(&bytes)))
    }

    /// Files in `dir` (not its subdirectories) carrying the configured extension, sorted.
    pub fn discover_files(&self, dir: impl AsRef<Path>) -> Vec<PathBuf> {
        let dir = dir.as_ref();
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("cannot list corpus directory {}: {}", dir.display(), e);
                return Vec::new();
            }
        };

        let extension = self.config.file_extension();
        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file())
            .filter(|path| path.extension().is_some_and(|ext| ext == extension))
            .collect();
        files.sort();

        if files.is_empty() {
            warn!("no *.{} files found in {}", extension, dir.display());
        }
        debug!(?files, "discovered corpus files");
        files
    }

    /// A restartable view over every record in `dir`.
    pub fn corpus(&self, dir: impl Into<PathBuf>) -> Corpus<'_> {
        Corpus {
            reader: self,
            dir: dir.into(),
        }
    }
}

/// The records of one corpus directory.
///
/// Each call to [`Corpus::iter`] lists the directory again and re-reads the
/// files, so the sequence can be consumed any number of times.
#[derive(Debug, Clone)]
pub struct Corpus<'a> {
    reader: &'a CorpusReader,
    dir: PathBuf,
}

impl<'a> Corpus<'a> {
    pub fn iter(&self) -> Records<'a> {
        Records {
            reader: self.reader,
            files: self.reader.discover_files(&self.dir).into_iter(),
            pending: VecDeque::new(),
        }
    }
}

impl<'a> IntoIterator for &Corpus<'a> {
    type Item = SentenceRecord;
    type IntoIter = Records<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazy record iterator; holds at most the records of the current file.
#[derive(Debug)]
pub struct Records<'a> {
    reader: &'a CorpusReader,
    files: std::vec::IntoIter<PathBuf>,
    pending: VecDeque<SentenceRecord>,
}

impl Iterator for Records<'_> {
    type Item = SentenceRecord;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.pending.pop_front() {
                return Some(record);
            }
            let path = self.files.next()?;
            match self.reader.read_file(&path) {
                Ok(records) => {
                    debug!("parsed {} record(s) from {}", records.len(), path.display());
                    self.pending.extend(records);
                }
                Err(e) => warn!("skipping unreadable corpus file: {}", e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::config::ReaderVariant;

    fn reader() -> CorpusReader {
        CorpusReader::new(ReaderConfig::default()).unwrap()
    }

    #[test]
    fn test_end_to_end_sentence() {
        let records = reader().parse_text("แมว/NN/O|กิน/VB/O|ปลา/NN/O");
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.words().collect::<Vec<_>>(), vec!["แมว", "กิน", "ปลา"]);
        assert_eq!(record.pos_tags.as_deref().unwrap(), ["NN", "VB", "NN"]);
        assert_eq!(record.ne_tags.as_deref().unwrap(), ["O", "O", "O"]);
        assert_eq!(record.word_len, vec![3, 2, 3]);
        let labels: Vec<String> = record
            .chars
            .as_ref()
            .unwrap()
            .char_label
            .iter()
            .map(|l| l.to_string())
            .collect();
        assert_eq!(labels, ["B", "I", "I", "B", "I", "B", "I", "I"]);
    }

    #[test]
    fn test_double_delimiter_inserts_space() {
        let record = reader().parse_sentence("a/NN/O||b/VB/O");
        assert_eq!(record.words().collect::<Vec<_>>(), vec!["a", " ", "b"]);
        assert_eq!(record.ne_tags.as_deref().unwrap()[1], "O");
        assert_eq!(record.pos_tags.as_deref().unwrap()[1], "space");
        assert!(record.check_alignment().is_ok());
    }

    #[test]
    fn test_span_labels_are_normalized() {
        let record = reader().parse_sentence("สม/NR/PER_B|ชาย/NR/PER_I|ไป/VV/O");
        assert_eq!(record.ne_tags.as_deref().unwrap(), ["B-PER", "I-PER", "O"]);
        let chars = record.chars.as_ref().unwrap();
        assert_eq!(chars.char_ne_tags.as_ref().unwrap()[0], "B-PER");
    }

    #[test]
    fn test_legacy_variant_keeps_space_tags() {
        let reader =
            CorpusReader::new(ReaderConfig::new().with_variant(ReaderVariant::Legacy)).unwrap();
        let record = reader.parse_sentence("สม/NR/PER_B|\n\n|ไป/VV/O");
        assert_eq!(record.tokens[1].text, "\n");
        assert_eq!(record.ne_tags.as_deref().unwrap(), ["PER_B", "space", "O"]);
    }

    #[test]
    fn test_trailing_newline_becomes_placeholder() {
        let record = reader().parse_sentence("แมว/NN/O|\n");
        assert_eq!(record.len(), 2);
        assert_eq!(record.tokens[1].text, "\n");
        assert_eq!(record.pos_tags.as_deref().unwrap()[1], "space");
    }

    #[test]
    fn test_blank_line_sentences() {
        let reader = CorpusReader::new(
            ReaderConfig::new().with_sentence_boundary(SentenceBoundary::BlankLine),
        )
        .unwrap();
        let records = reader.parse_text("แมว/NN/O|กิน/VB/O\n\n  \nปลา/NN/O|\n");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].words().collect::<Vec<_>>(), vec!["แมว", "กิน"]);
        assert_eq!(records[1].words().collect::<Vec<_>>(), vec!["ปลา", "\n"]);
    }

    #[test]
    fn test_blank_line_blocks_end_like_files() {
        let blank_line = CorpusReader::new(
            ReaderConfig::new().with_sentence_boundary(SentenceBoundary::BlankLine),
        )
        .unwrap();
        let records = blank_line.parse_text("แมว/NN/O|กิน/VB/O|\n\nปลา/NN/O|ว่าย/VV/O|\n");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].words().collect::<Vec<_>>(), vec!["แมว", "กิน", "\n"]);
        assert_eq!(records[1].words().collect::<Vec<_>>(), vec!["ปลา", "ว่าย", "\n"]);
        assert_eq!(records[0].pos_tags.as_deref().unwrap(), ["NN", "VB", "space"]);

        let whole = reader().parse_text("แมว/NN/O|กิน/VB/O|\n");
        assert_eq!(records[0], whole[0]);
    }

    #[test]
    fn test_blank_line_blocks_keep_terminators() {
        assert_eq!(
            blank_line_blocks("a|\nb|\n \n\nc|"),
            vec!["a|\nb|\n".to_string(), "c|".to_string()]
        );
    }

    #[test]
    fn test_whole_file_is_one_sentence_by_default() {
        let records = reader().parse_text("แมว/NN/O\n\nปลา/NN/O");
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_decode_lossy_drops_invalid_bytes() {
        let mut bytes = "แมว/NN/O".as_bytes().to_vec();
        bytes.insert(3, 0xC0);
        bytes.push(0xFF);
        assert_eq!(decode_lossy(&bytes), "แมว/NN/O");
    }

    #[test]
    fn test_is_divider() {
        assert!(is_divider(""));
        assert!(is_divider(" \t\r"));
        assert!(!is_divider("แมว/NN/O"));
    }

    #[test]
    fn test_missing_directory_yields_nothing() {
        let reader = reader();
        let corpus = reader.corpus("/nonexistent/thaitag/corpus");
        assert_eq!(corpus.iter().count(), 0);
    }
}
