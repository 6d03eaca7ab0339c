//! Search keyword normalization

use std::sync::OnceLock;

use regex_lite::Regex;

/// Characters outside ASCII word characters, whitespace and Cyrillic letters.
fn strip_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^A-Za-z0-9_\sа-яА-ЯёЁ]").expect("valid title pattern"))
}

/// Normalize a display title into a lookup keyword.
///
/// Strips everything except ASCII letters, digits, underscore, whitespace and
/// Cyrillic letters, then trims surrounding whitespace.
///
/// # Examples
/// ```
/// use voiceplay_core::parser::normalize_title;
///
/// assert_eq!(normalize_title("Spider-Man: No Way Home"), "SpiderMan No Way Home");
/// assert_eq!(normalize_title("Ёлки 2!"), "Ёлки 2");
/// assert_eq!(normalize_title(" ?! "), "");
/// ```
pub fn normalize_title(title: &str) -> String {
    strip_pattern().replace_all(title, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_keeps_cyrillic() {
        assert_eq!(normalize_title("Брат 2 (2000)"), "Брат 2 2000");
        assert_eq!(normalize_title("Иван Васильевич меняет профессию."), "Иван Васильевич меняет профессию");
    }

    #[test]
    fn test_normalize_strips_punctuation_and_accents() {
        assert_eq!(normalize_title("Amélie"), "Amlie");
        assert_eq!(normalize_title("Alien³"), "Alien");
        assert_eq!(normalize_title("Mission: Impossible – Fallout"), "Mission Impossible  Fallout");
    }

    #[test]
    fn test_normalize_keeps_underscore() {
        assert_eq!(normalize_title("snake_case"), "snake_case");
    }

    proptest! {
        #[test]
        fn prop_normalized_title_has_only_allowed_chars(title in "\\PC{0,40}") {
            let normalized = normalize_title(&title);
            for c in normalized.chars() {
                let allowed = c.is_ascii_alphanumeric()
                    || c == '_'
                    || c.is_whitespace()
                    || ('а'..='я').contains(&c)
                    || ('А'..='Я').contains(&c)
                    || c == 'ё'
                    || c == 'Ё';
                prop_assert!(allowed, "unexpected char {:?} in {:?}", c, normalized);
            }
        }

        #[test]
        fn prop_normalize_is_idempotent(title in "\\PC{0,40}") {
            let once = normalize_title(&title);
            prop_assert_eq!(normalize_title(&once), once.clone());
        }
    }
}
