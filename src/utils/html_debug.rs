// src/utils/html_debug.rs
use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::utils::error::StorageError;

// Labels the field extractors key on, grouped by the field they feed.
static LABEL_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"(?i)fund\s+size", "aum"),
        (r"Expense Ratio", "expense"),
        (r"Exit load", "expense"),
        (r"Fund benchmark", "benchmark"),
        (r"Category average|Rank with in category|Fund returns", "returns"),
        (r"P/E Ratio|P/B Ratio|Alpha|Beta|Sharpe|Sortino", "ratios"),
    ]
    .iter()
    .filter_map(|(pat, kind)| Regex::new(pat).ok().map(|re| (re, *kind)))
    .collect()
});

static TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<[^>]*>").expect("Failed to compile TAG_RE")
});

/// Wraps every label match in text content in a coloured span so a heuristic
/// miss can be spotted by opening the page in a browser. Tags and their
/// attributes are copied untouched.
pub fn annotate_labels(html: &str) -> String {
    let mut out = String::from("<!DOCTYPE html>\n<html>\n<head>\n<style>\n");
    out.push_str(".hl-aum { background-color: #FFFF00; }\n");
    out.push_str(".hl-expense { background-color: #FFA500; }\n");
    out.push_str(".hl-benchmark { background-color: #90EE90; }\n");
    out.push_str(".hl-returns { background-color: #ADD8E6; }\n");
    out.push_str(".hl-ratios { background-color: #FFC0CB; }\n");
    out.push_str("</style>\n</head>\n<body>\n");

    let mut last_pos = 0;
    for tag in TAG_RE.find_iter(html) {
        highlight_text(&html[last_pos..tag.start()], &mut out);
        out.push_str(tag.as_str());
        last_pos = tag.end();
    }
    highlight_text(&html[last_pos..], &mut out);
    out.push_str("\n</body>\n</html>");
    out
}

fn highlight_text(text: &str, out: &mut String) {
    let mut highlights: Vec<(usize, usize, &str)> = Vec::new();
    for (re, kind) in LABEL_PATTERNS.iter() {
        for mat in re.find_iter(text) {
            highlights.push((mat.start(), mat.end(), *kind));
        }
    }
    highlights.sort_by_key(|h| h.0); // Sort by position

    let mut last_pos = 0;
    for (start, end, kind) in highlights {
        if start < last_pos {
            continue; // overlaps the previous highlight
        }
        out.push_str(&text[last_pos..start]);
        out.push_str(&format!("<span class=\"hl-{}\" title=\"{}\">", kind, kind));
        out.push_str(&text[start..end]);
        out.push_str("</span>");
        last_pos = end;
    }
    out.push_str(&text[last_pos..]);
}

/// File stem for a page URL: its last path segment, reduced to `[A-Za-z0-9_-]`.
pub fn debug_file_stem(url: &str) -> String {
    let segment = url
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();
    let stem: String = segment
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if stem.is_empty() { "page".to_string() } else { stem }
}

/// Saves an annotated copy of a failed page under `debug_dir`.
pub fn save_annotated_page(html: &str, url: &str, debug_dir: &Path) -> Result<PathBuf, StorageError> {
    fs::create_dir_all(debug_dir)?;
    let path = debug_dir.join(format!("{}_annotated.html", debug_file_stem(url)));
    fs::write(&path, annotate_labels(html))?;

    tracing::info!("Saved debug HTML to {}", path.display());
    Ok(path)
}
