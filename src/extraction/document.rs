//! Structure and text analysis of consolidated instrument documents.
//!
//! A consolidated document is an `Element` tree whose optional `Body`
//! holds `Section` elements; a section may carry `HistoricalNote`
//! elements whose `HistoricalNoteSubItem` children cite the instruments
//! that amended it.

use crate::types::{DocumentNode, Element};

const BODY: &str = "Body";
const SECTION: &str = "Section";
const HISTORICAL_NOTE: &str = "HistoricalNote";
const HISTORICAL_NOTE_SUB_ITEM: &str = "HistoricalNoteSubItem";

/// What the assembler needs from one consolidated document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocumentAnalysis {
    /// Words in all visible text of the document, body or not.
    pub word_count: u64,
    /// `Section` elements directly under `Body`; 0 when there is no body.
    pub section_count: u64,
    /// Text of every historical-note sub-item, in document order.
    pub notes: Vec<String>,
}

/// Analyzes a consolidated document.
///
/// A document without a `Body` is not an error: it yields a section
/// count of 0 and no notes, while its word count still covers whatever
/// text it has.
pub fn analyze(root: &Element) -> DocumentAnalysis {
    let word_count = count_words(&collect_text(root));

    let Some(body) = root.child(BODY) else {
        return DocumentAnalysis {
            word_count,
            ..DocumentAnalysis::default()
        };
    };

    let mut section_count = 0;
    let mut notes = Vec::new();
    for section in body.children_named(SECTION) {
        section_count += 1;
        for note in section.children_named(HISTORICAL_NOTE) {
            for item in note.children_named(HISTORICAL_NOTE_SUB_ITEM) {
                notes.push(collect_text(item));
            }
        }
    }

    DocumentAnalysis {
        word_count,
        section_count,
        notes,
    }
}

/// Joins the trimmed, non-empty text runs under an element with single
/// spaces, in document order.
pub fn collect_text(element: &Element) -> String {
    let mut out = String::new();
    push_text(element, &mut out);
    out
}

fn push_text(element: &Element, out: &mut String) {
    for child in &element.children {
        match child {
            DocumentNode::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    continue;
                }
                if !out.is_empty() {
                    out.push(' ');
                }
                out.push_str(text);
            }
            DocumentNode::Element(el) => push_text(el, out),
        }
    }
}

/// Counts the words of a text, splitting on runs of non-word characters.
///
/// Word characters are ASCII letters, digits and `_`, so an accented
/// letter splits a word: `Québec` counts as two.
pub fn count_words(text: &str) -> u64 {
    text.split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|token| !token.is_empty())
        .count() as u64
}
