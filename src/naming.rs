//! Slugs and display names for tools.
//!
//! Every tool is identified on disk and in URLs by a slug derived from its
//! display name. The mapping is a pure function so the same name always lands
//! in the same cache file and output directory:
//!
//! - `"Word Counter"` → `word-counter`
//! - `"JSON → YAML (beta)"` → `json-yaml-beta`
//! - `"  --  "` → `""` (no alphanumerics, empty slug)
//!
//! Only ASCII letters and digits survive; every other run of characters
//! collapses to a single dash, and dashes at either end are stripped.

/// Convert a display name to a URL- and filesystem-safe slug.
///
/// The result matches `[a-z0-9]+(-[a-z0-9]+)*`, or is empty when the input
/// has no ASCII alphanumerics. Applying it twice gives the same result as
/// applying it once.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Recover a display name from a slug (used when rebuilding the tool list
/// from output directories).
///
/// Dashes become spaces and each word is capitalized:
/// `word-counter` → `Word Counter`.
pub fn display_name_from_slug(slug: &str) -> String {
    slug.split('-')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn simple_two_words() {
        assert_eq!(slugify("Word Counter"), "word-counter");
    }

    #[test]
    fn punctuation_is_dropped() {
        assert_eq!(slugify("My Tool!"), "my-tool");
    }

    #[test]
    fn case_insensitive() {
        assert_eq!(slugify("MY TOOL"), slugify("my tool"));
    }

    #[test]
    fn runs_collapse_to_single_dash() {
        assert_eq!(slugify("JSON  --> YAML"), "json-yaml");
    }

    #[test]
    fn leading_and_trailing_separators_stripped() {
        assert_eq!(slugify("  (Base64) Encoder..."), "base64-encoder");
    }

    #[test]
    fn digits_survive() {
        assert_eq!(slugify("MD5 Hash Generator 2"), "md5-hash-generator-2");
    }

    #[test]
    fn non_ascii_letters_are_separators() {
        assert_eq!(slugify("Café Timer"), "caf-timer");
    }

    #[test]
    fn no_alphanumerics_gives_empty() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify(" -- !! "), "");
    }

    #[test]
    fn idempotent() {
        for name in [
            "Word Counter",
            "  (Base64) Encoder...",
            "JSON  --> YAML",
            "already-a-slug",
            "Café Timer",
            "",
            "---",
        ] {
            let once = slugify(name);
            assert_eq!(slugify(&once), once, "not idempotent for {name:?}");
        }
    }

    #[test]
    fn output_matches_slug_pattern() {
        let slug = slugify("  A  b__C 1 2 3 ?? ");
        assert_eq!(slug, "a-b-c-1-2-3");
        assert!(!slug.starts_with('-') && !slug.ends_with('-'));
        assert!(!slug.contains("--"));
    }

    #[test]
    fn display_name_title_cases_words() {
        assert_eq!(display_name_from_slug("word-counter"), "Word Counter");
    }

    #[test]
    fn display_name_single_word() {
        assert_eq!(display_name_from_slug("stopwatch"), "Stopwatch");
    }

    #[test]
    fn display_name_roundtrips_through_slugify() {
        let slug = "md5-hash-generator";
        assert_eq!(slugify(&display_name_from_slug(slug)), slug);
    }

    // =========================================================================
    // Properties
    // =========================================================================

    fn is_slug(s: &str) -> bool {
        s.is_empty()
            || (s.split('-').all(|part| {
                !part.is_empty()
                    && part
                        .chars()
                        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
            }))
    }

    proptest! {
        #[test]
        fn slugify_is_idempotent(name in any::<String>()) {
            let once = slugify(&name);
            prop_assert_eq!(slugify(&once), once);
        }

        #[test]
        fn slugify_output_is_always_a_slug(name in any::<String>()) {
            let slug = slugify(&name);
            prop_assert!(is_slug(&slug), "{:?} -> {:?}", name, slug);
        }

        #[test]
        fn display_name_roundtrips_for_any_slug(slug in "[a-z0-9]{1,8}(-[a-z0-9]{1,8}){0,4}") {
            prop_assert_eq!(slugify(&display_name_from_slug(&slug)), slug);
        }
    }
}
