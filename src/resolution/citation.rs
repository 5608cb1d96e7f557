use crate::resolution::InstrumentRegistry;
use crate::types::{CanonicalId, Reference};

/// Marks a chapter citation, e.g. `2019, c. 29`.
const CHAPTER_MARKER: &str = ", c. ";
/// Marks a single-section citation, e.g. `SOR/92-100, s. 2`.
const SECTION_MARKER: &str = ", s. ";
/// Marks a multi-section citation, e.g. `SOR/92-100, ss. 2, 3`.
const SECTIONS_MARKER: &str = ", ss. ";

/// Trailing qualifier split off a citation item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Qualifier {
    Chapter(String),
    Section(String),
    Sections(Vec<String>),
    None,
}

/// Splits one citation item into its instrument prefix and qualifier.
///
/// Markers are tried in a fixed priority order (chapter, section, section
/// list) and the first one present wins, wherever it sits in the text. A
/// chapter qualifier stops at the next comma, so `F-7, s. 4` yields `F-7`.
pub fn split_citation(item: &str) -> (&str, Qualifier) {
    if let Some(idx) = item.find(CHAPTER_MARKER) {
        let rest = item[idx + CHAPTER_MARKER.len()..].trim();
        let chapter = match rest.find(',') {
            Some(comma) => rest[..comma].trim(),
            None => rest,
        };
        return (item[..idx].trim(), Qualifier::Chapter(chapter.to_string()));
    }
    if let Some(idx) = item.find(SECTION_MARKER) {
        let section = item[idx + SECTION_MARKER.len()..].trim();
        return (item[..idx].trim(), Qualifier::Section(section.to_string()));
    }
    if let Some(idx) = item.find(SECTIONS_MARKER) {
        let sections = split_section_list(&item[idx + SECTIONS_MARKER.len()..]);
        return (item[..idx].trim(), Qualifier::Sections(sections));
    }
    (item.trim(), Qualifier::None)
}

/// Splits `2, 3 and 5` into `["2", "3", "5"]`.
fn split_section_list(list: &str) -> Vec<String> {
    list.split(',')
        .flat_map(|part| part.split(" and "))
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .collect()
}

/// `true` for a bare four-digit year such as `2019`.
fn is_year(s: &str) -> bool {
    s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit())
}

fn is_number(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Parses historical-note text into typed references, resolving each
/// against the instruments registered so far.
///
/// Never fails: anything it cannot match becomes [`Reference::Unresolved`]
/// carrying the original text.
pub struct CitationParser<'a> {
    registry: &'a InstrumentRegistry,
}

impl<'a> CitationParser<'a> {
    pub fn new(registry: &'a InstrumentRegistry) -> Self {
        Self { registry }
    }

    /// Splits note text on `;` and parses every non-empty item.
    pub fn parse_references(&self, note: &str) -> Vec<Reference> {
        note.split(';')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(|item| self.parse_item(item))
            .collect()
    }

    /// Parses a single citation item.
    ///
    /// Resolution order:
    /// 1. **Annual statute** -- a chapter citation whose prefix is a bare
    ///    year and whose chapter is numeric resolves to `S.C._<year>,c._<chapter>`
    ///    without consulting the registry.
    /// 2. **Registry lookup** -- the normalized prefix must already be
    ///    registered.
    pub fn parse_item(&self, item: &str) -> Reference {
        let item = item.trim();
        let (prefix, qualifier) = split_citation(item);

        if let Qualifier::Chapter(chapter) = &qualifier {
            if is_year(prefix) && is_number(chapter) {
                return Reference::Chapter {
                    year: prefix.to_string(),
                    chapter: chapter.clone(),
                    target: CanonicalId::annual_statute(prefix, chapter),
                };
            }
        }

        let target = CanonicalId::new(prefix);
        if !self.registry.contains(&target) {
            return Reference::Unresolved {
                citation: prefix.to_string(),
                text: item.to_string(),
            };
        }

        match qualifier {
            Qualifier::Section(section) => Reference::Section { target, section },
            Qualifier::Sections(sections) => Reference::SectionList { target, sections },
            Qualifier::Chapter(_) | Qualifier::None => Reference::Instrument { target },
        }
    }
}
