//! Rendering vocabs into tab-separated import files

use crate::config::ExportStyle;
use crate::pinyin::to_tone_marks;
use crate::simptrad::SimpleTradMap;
use crate::vocab::{Vocab, WritingStyle};
use regex::Regex;
use std::fmt::Write as _;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Header of an Anki "Chinese-Basic" import file
pub const HEADER: &str = "#separator:Tab\n#columns:Traditional\tSimplified\tPinyin\tEnglish\n#notetype:Chinese-Basic\n";

/// Replacement for line breaks inside a definition
pub const DEFINITION_NEWLINE_REPLACEMENT: &str = "; ";

#[allow(clippy::expect_used)]
static SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(" +").expect("Invalid spaces regex"));

#[allow(clippy::expect_used)]
static VOCAB_ID_WRITING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^zh-(.*)-[0-9]").expect("Invalid vocab id regex"));

/// Renders a list of vocabs in one of the supported import styles
#[derive(Debug)]
pub struct Exporter<'a> {
    vocabs: &'a [Vocab],
    table: Option<&'a SimpleTradMap>,
}

impl<'a> Exporter<'a> {
    /// Exporter without a conversion table; characters are left unconverted
    pub fn new(vocabs: &'a [Vocab]) -> Self {
        Self { vocabs, table: None }
    }

    /// Exporter converting characters with the given table
    pub fn with_table(table: &'a SimpleTradMap, vocabs: &'a [Vocab]) -> Self {
        Self {
            vocabs,
            table: Some(table),
        }
    }

    /// Render every vocab, one line each
    pub fn export(&self, style: ExportStyle) -> String {
        debug!(?style, count = self.vocabs.len(), "exporting vocabs");

        let mut output = String::new();
        if style == ExportStyle::Anki {
            output.push_str(HEADER);
        }

        for vocab in self.vocabs {
            self.write_line(&mut output, vocab, style);
        }
        output
    }

    fn write_line(&self, output: &mut String, vocab: &Vocab, style: ExportStyle) {
        let definition = clean_definition(vocab);
        let (traditional, simplified) = self.character_forms(vocab);
        let traditional = traditional.replace(' ', "");
        let simplified = simplified.replace(' ', "");

        // writing to a String cannot fail
        let _ = match style {
            ExportStyle::Anki => writeln!(
                output,
                "{}\t{}\t{}\t{}",
                traditional,
                simplified,
                to_tone_marks(&vocab.reading),
                definition
            ),
            ExportStyle::Skritter => writeln!(
                output,
                "{}\t{}\t{}\t{}",
                if simplified.is_empty() { vocab.writing.as_str() } else { simplified.as_str() },
                traditional,
                vocab.reading,
                definition
            ),
        };
    }

    /// Traditional and simplified columns; simplified is empty when it would repeat the traditional
    fn character_forms(&self, vocab: &Vocab) -> (String, String) {
        match vocab.writing_style {
            WritingStyle::Simplified => {
                let simplified = vocab.writing.clone();
                let traditional = self
                    .table
                    .map_or_else(|| simplified.clone(), |t| t.to_traditional(&simplified));
                if simplified == traditional {
                    warn!(vocab = %vocab, "simplified == traditional");
                    (traditional, String::new())
                } else {
                    (traditional, simplified)
                }
            }
            WritingStyle::Traditional => {
                let traditional = vocab.writing.clone();
                let mut simplified = self
                    .table
                    .map_or_else(|| traditional.clone(), |t| t.to_simplified(&traditional));
                if simplified == traditional {
                    simplified = VOCAB_ID_WRITING.replace(&vocab.id, "$1").into_owned();
                    if simplified == traditional {
                        simplified.clear();
                    } else {
                        warn!(vocab = %vocab, vocab_id = %vocab.id, "traditional == simplified, using vocab id instead");
                    }
                }
                (traditional, simplified)
            }
            WritingStyle::Both => (vocab.writing.clone(), String::new()),
        }
    }
}

/// Definition text on a single line with collapsed spaces
fn clean_definition(vocab: &Vocab) -> String {
    let Some(definition) = vocab.preferred_definition() else {
        warn!(vocab_id = %vocab.id, "vocab has no definition");
        return String::new();
    };
    let single_line = definition.replace('\n', DEFINITION_NEWLINE_REPLACEMENT);
    SPACES
        .replace_all(&single_line, " ")
        .trim_matches(' ')
        .to_string()
}
