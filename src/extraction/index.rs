use crate::types::{CanonicalId, IndexEntry};

/// Marks where a consolidated-regulations citation starts in a listing.
const CRC_MARKER: &str = "C.R.C.,";

/// Identifier prefixes that denote a real instrument in the index.
const INSTRUMENT_PREFIXES: &[&str] = &["C.R.C.", "R.S.C._", "R.S._", "S.C._", "SI-", "SOR-"];

/// An instrument identified from one index entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexListing {
    pub id: CanonicalId,
    pub name: String,
    /// Whether the entry confirms the instrument exists, making it
    /// resolvable from later historical notes.
    pub registers: bool,
}

/// Parses an index entry into the instrument it names.
///
/// Returns `None` when the text carries no recognizable identifier.
pub fn parse_index_entry(entry: &IndexEntry) -> Option<IndexListing> {
    match entry {
        IndexEntry::Heading { text } => parse_heading(text),
        IndexEntry::Ordered { category, text } => {
            let (id, name) = split_listing(text)?;
            Some(IndexListing {
                id,
                name: format!("{} {}", category.trim(), name).trim().to_string(),
                registers: false,
            })
        }
        IndexEntry::Regulation { text } => {
            let (id, name) = split_listing(text)?;
            Some(IndexListing {
                id,
                name,
                registers: true,
            })
        }
    }
}

/// `Some Order [SI/2000-1]` → (`SI-2000-1`, `Some Order`).
fn parse_heading(text: &str) -> Option<IndexListing> {
    let open = text.find('[')?;
    let close = open + text[open..].find(']')?;
    let id = CanonicalId::new(&text[open + 1..close]);
    if id.is_empty() {
        return None;
    }
    let name = collapse_whitespace(&format!("{} {}", &text[..open], &text[close + 1..]));
    Some(IndexListing {
        id,
        name,
        registers: false,
    })
}

/// Splits `Name, citation` at the last `C.R.C.,` or, failing that, at the
/// last comma.
fn split_listing(text: &str) -> Option<(CanonicalId, String)> {
    let (name, citation) = if let Some(idx) = text.rfind(CRC_MARKER) {
        (&text[..idx], &text[idx..])
    } else {
        let idx = text.rfind(',')?;
        (&text[..idx], &text[idx + 1..])
    };
    let id = CanonicalId::new(citation);
    if id.is_empty() {
        return None;
    }
    Some((id, collapse_whitespace(name)))
}

/// Whether an identifier has one of the prefixes real instruments carry.
pub fn is_instrument_id(id: &CanonicalId) -> bool {
    INSTRUMENT_PREFIXES
        .iter()
        .any(|prefix| id.as_str().starts_with(prefix))
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_drops_bracketed_identifier_from_name() {
        let listing = parse_index_entry(&IndexEntry::Heading {
            text: "Access to  Information Order [SI/2000-1]".to_string(),
        })
        .unwrap();
        assert_eq!(listing.id.as_str(), "SI-2000-1");
        assert_eq!(listing.name, "Access to Information Order");
        assert!(!listing.registers);
    }

    #[test]
    fn crc_listing_splits_at_marker() {
        let listing = parse_index_entry(&IndexEntry::Regulation {
            text: "Food and Drug Regulations, C.R.C., c. 870".to_string(),
        })
        .unwrap();
        assert_eq!(listing.id.as_str(), "C.R.C.,_c._870");
        assert_eq!(listing.name, "Food and Drug Regulations,");
        assert!(listing.registers);
    }
}
