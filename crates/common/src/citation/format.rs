//! Pure citation formatting
//!
//! One formatting rule per style, driven by the closed [`CitationStyle`]
//! enum. Given identical inputs the output is byte-identical; nothing here
//! touches the clock, locale, or store.

use super::style::CitationStyle;
use crate::db::models::Note;

/// Placeholder used when no author information is available
const UNKNOWN_AUTHOR: &str = "Unknown";

/// Placeholder year for undated sources
const NO_DATE: &str = "n.d.";

/// Extract the lead author's surname from a free-text authors field.
///
/// Takes the text before the first comma, splits on whitespace, and keeps
/// the last token, so "Smith, J." and "John Smith" both yield "Smith".
pub fn surname(authors: Option<&str>) -> String {
    let raw = match authors {
        Some(a) if !a.trim().is_empty() => a,
        _ => return UNKNOWN_AUTHOR.to_string(),
    };

    let before_comma = raw.split(',').next().unwrap_or(raw).trim();
    before_comma
        .split_whitespace()
        .last()
        .unwrap_or(UNKNOWN_AUTHOR)
        .to_string()
}

/// Split a free-text authors field into individual names.
///
/// Tolerates JSON-ish input such as `["Ada Lovelace", "Alan Turing"]` left
/// over from older clients; brackets and quotes are stripped before the
/// comma split.
pub fn parse_authors(raw: Option<&str>) -> Vec<String> {
    let raw = match raw {
        Some(r) => r.replace(['[', ']', '"'], ""),
        None => return Vec::new(),
    };

    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Format an author list for a bibliography line.
///
/// Zero authors -> "Unknown"; one -> as-is; two -> "A & B";
/// three or more -> "A et al.".
pub fn format_authors(authors: &[String]) -> String {
    match authors {
        [] => UNKNOWN_AUTHOR.to_string(),
        [only] => only.clone(),
        [first, second] => format!("{} & {}", first, second),
        [first, ..] => format!("{} et al.", first),
    }
}

fn year_str(note: &Note) -> String {
    note.publication_year
        .map(|y| y.to_string())
        .unwrap_or_else(|| NO_DATE.to_string())
}

fn bibtex_key(note: &Note) -> &str {
    note.citation_key.as_deref().unwrap_or(&note.public_id)
}

/// Format the inline label for a citation, e.g. `(Smith, 2021)` or `[3]`.
pub fn inline_label(note: &Note, style: CitationStyle, ordinal: usize) -> String {
    let sur = surname(note.authors.as_deref());
    let year = year_str(note);

    match style {
        CitationStyle::Apa | CitationStyle::Harvard => format!("({}, {})", sur, year),
        CitationStyle::Mla => format!("({})", sur),
        CitationStyle::Ieee | CitationStyle::Vancouver => format!("[{}]", ordinal),
        CitationStyle::Chicago => format!("({} {})", sur, year),
        CitationStyle::Bibtex => format!("@{}", bibtex_key(note)),
    }
}

/// Format the full bibliography entry for a citation.
pub fn full_reference(note: &Note, style: CitationStyle, ordinal: usize) -> String {
    let authors = format_authors(&parse_authors(note.authors.as_deref()));
    let title = note.title.as_str();
    let year = year_str(note);
    let publisher = note.publisher.as_deref();

    match style {
        CitationStyle::Apa => {
            let mut out = format!("{} ({}). {}.", authors, year, title);
            if let Some(p) = publisher {
                out.push_str(&format!(" {}.", p));
            }
            out
        }
        CitationStyle::Mla => {
            let mut out = format!("{}. \"{}.\"", authors, title);
            if let Some(p) = publisher {
                out.push_str(&format!(" {},", p));
            }
            out.push_str(&format!(" {}.", year));
            out
        }
        CitationStyle::Ieee => {
            let mut out = format!("[{}] {}, \"{},\"", ordinal, authors, title);
            if let Some(p) = publisher {
                out.push_str(&format!(" {},", p));
            }
            out.push_str(&format!(" {}.", year));
            out
        }
        CitationStyle::Chicago => {
            let mut out = format!("{}. {}.", authors, title);
            if let Some(p) = publisher {
                out.push_str(&format!(" {},", p));
            }
            out.push_str(&format!(" {}.", year));
            out
        }
        CitationStyle::Harvard => {
            let mut out = format!("{} ({}) {}.", authors, year, title);
            if let Some(p) = publisher {
                out.push_str(&format!(" {}.", p));
            }
            out
        }
        CitationStyle::Vancouver => {
            let mut out = format!("{}. {}. {}.", ordinal, authors, title);
            if let Some(p) = publisher {
                out.push_str(&format!(" {};", p));
            }
            out.push_str(&format!(" {}.", year));
            out
        }
        CitationStyle::Bibtex => bibtex_entry(note),
    }
}

/// Render a complete BibTeX entry block for a note.
pub fn bibtex_entry(note: &Note) -> String {
    let entry_type = match note.note_type.as_deref().map(str::to_ascii_lowercase) {
        Some(ref t) if t == "paper" || t == "article" => "article",
        Some(ref t) if t == "research" => "techreport",
        _ => "misc",
    };

    let mut out = String::new();
    out.push_str(&format!("@{}{{{},\n", entry_type, bibtex_key(note)));
    out.push_str(&format!("  title = {{{}}},\n", note.title));
    if let Some(ref authors) = note.authors {
        out.push_str(&format!("  author = {{{}}},\n", authors));
    }
    if let Some(year) = note.publication_year {
        out.push_str(&format!("  year = {{{}}},\n", year));
    }
    if let Some(ref publisher) = note.publisher {
        out.push_str(&format!("  publisher = {{{}}},\n", publisher));
    }
    if let Some(ref url) = note.url {
        out.push_str(&format!("  url = {{{}}},\n", url));
    }
    out.push('}');
    out
}
