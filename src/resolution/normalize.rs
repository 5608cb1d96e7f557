//! Identifier normalization for legal citations.
//!
//! Maps a raw citation such as `SOR/2020-123` or `R.S.C., c. F-7` onto a
//! URL- and path-safe canonical identifier. Two citations that differ only
//! in separators, surrounding whitespace, dash style, or one of the known
//! data-entry slips of the published feeds map to the same identifier.

/// Separator rewrites, applied in order after trimming.
const SEPARATOR_RULES: &[(&str, &str)] = &[("/", "-"), (" ", "_")];

/// En and em dashes that survive as `_–_` once spaces became underscores.
const DASH_RULES: &[(&str, &str)] = &[("_\u{2013}_", "-"), ("_\u{2014}_", "-")];

/// Literal corrections for malformed citations seen in the source feeds.
/// These expect separators to be normalized already.
const CORRECTION_RULES: &[(&str, &str)] = &[
    ("S.C.2020", "S.C._2020"),
    ("S._C._", "S.C._"),
    ("R.S.C.,", "R.S.C."),
];

/// Normalizes a raw citation into its canonical identifier.
///
/// Total and deterministic: any input yields a best-effort cleaned string.
/// The rule table is applied until the string stops changing, so the
/// result is a fixed point and `normalize(&normalize(x)) == normalize(x)`.
pub fn normalize(raw: &str) -> String {
    let mut current = apply_rules(raw);
    loop {
        let next = apply_rules(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

/// One pass of the ordered rule table.
fn apply_rules(input: &str) -> String {
    let mut out = input.trim().to_string();
    for (from, to) in SEPARATOR_RULES
        .iter()
        .chain(DASH_RULES)
        .chain(CORRECTION_RULES)
    {
        if out.contains(from) {
            out = out.replace(from, to);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slash_becomes_hyphen() {
        assert_eq!(normalize("SOR/2020-123"), "SOR-2020-123");
    }

    #[test]
    fn repeated_correction_reaches_fixed_point() {
        // One pass leaves `R.S.C.,`, which the next pass removes.
        assert_eq!(normalize("R.S.C.,,"), "R.S.C.");
        assert_eq!(normalize("R.S.C.,2020"), "R.S.C._2020");
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(normalize("   "), "");
    }
}
