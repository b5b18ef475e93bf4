//! Label-to-slug normalization for building category page URLs.

/// Convert a human-readable category label into a URL-safe slug.
///
/// Lowercases, turns spaces and pipes into hyphens, drops apostrophes,
/// strips everything else outside `[a-z0-9-]`, then collapses hyphen runs
/// and trims edge hyphens. Applying it to an already-valid slug is a no-op.
pub fn slugify(label: &str) -> String {
    let mut slug = String::with_capacity(label.len());

    for ch in label.to_lowercase().chars() {
        match ch {
            ' ' | '|' => slug.push('-'),
            '\'' => {}
            'a'..='z' | '0'..='9' | '-' => slug.push(ch),
            _ => {}
        }
    }

    // Collapse hyphen runs left by multi-character separators like " | ".
    let mut out = String::with_capacity(slug.len());
    for ch in slug.chars() {
        if ch == '-' && out.ends_with('-') {
            continue;
        }
        out.push(ch);
    }

    out.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_apostrophe() {
        assert_eq!(slugify("Auto's"), "autos");
    }

    #[test]
    fn test_slugify_pipe_separator() {
        assert_eq!(slugify("Kleding | Dames"), "kleding-dames");
    }

    #[test]
    fn test_slugify_spaces() {
        assert_eq!(slugify("Computers en Software"), "computers-en-software");
    }

    #[test]
    fn test_slugify_strips_unicode_and_punctuation() {
        assert_eq!(slugify("Audio, Tv en Foto"), "audio-tv-en-foto");
        assert_eq!(slugify("Caravans & Kamperen"), "caravans-kamperen");
    }

    #[test]
    fn test_slugify_idempotent_on_valid_slug() {
        assert_eq!(slugify("kleding-dames"), "kleding-dames");
        assert_eq!(slugify(&slugify("Kleding | Dames")), "kleding-dames");
    }

    #[test]
    fn test_slugify_trims_edge_hyphens() {
        assert_eq!(slugify(" Auto's "), "autos");
    }

    #[test]
    fn test_slugify_empty() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("???"), "");
    }
}
