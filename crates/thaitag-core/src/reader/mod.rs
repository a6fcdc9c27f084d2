pub mod assembler;
pub mod chunk;
pub mod cleaner;
pub mod config;
pub mod corpus;
pub mod tokenizer;

pub use assembler::{CharView, SentenceAssembler, SentenceRecord};
pub use chunk::{ChunkParser, RawAnnotatedWord};
pub use cleaner::{CleaningRule, RuleSet, TextCleaner, load_rules};
pub use config::{ReaderConfig, ReaderVariant, SentenceBoundary};
pub use corpus::{Corpus, CorpusReader, Records, decode_lossy, is_divider};
pub use tokenizer::{CharTokenizer, CharUnit, Token};
