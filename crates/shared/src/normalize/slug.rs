/// Derives the URL identifier for an event title.
///
/// Lowercases and trims, drops everything except ASCII letters, digits,
/// whitespace and `-`, turns whitespace runs into a single hyphen, folds
/// repeated hyphens and strips them from both ends. A title made only of
/// punctuation yields an empty slug; callers reject that as a missing title.
pub fn normalize_slug(title: &str) -> String {
    let lowered = title.to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut pending_hyphen = false;

    for c in lowered.trim().chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else if c.is_whitespace() || c == '-' {
            pending_hyphen = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn basic_titles() {
        assert_eq!(normalize_slug("Tech Summit 2025"), "tech-summit-2025");
        assert_eq!(normalize_slug("  AI & Machine Learning Future "), "ai-machine-learning-future");
        assert_eq!(normalize_slug("Cloud -- Native   Kubernetes"), "cloud-native-kubernetes");
        assert_eq!(normalize_slug("--Rust--"), "rust");
    }

    #[test]
    fn punctuation_only_title_is_empty() {
        assert_eq!(normalize_slug("!!! ??? ..."), "");
        assert_eq!(normalize_slug("&&"), "");
    }

    #[test]
    fn non_ascii_letters_are_dropped() {
        assert_eq!(normalize_slug("São Paulo Meetup"), "so-paulo-meetup");
        assert_eq!(normalize_slug("snake_case talk"), "snakecase-talk");
    }

    #[test]
    fn removed_character_does_not_split_words() {
        assert_eq!(normalize_slug("C#/.NET Day"), "cnet-day");
    }

    proptest! {
        #[test]
        fn idempotent(title in ".{0,64}") {
            let once = normalize_slug(&title);
            prop_assert_eq!(normalize_slug(&once), once.clone());
        }

        #[test]
        fn output_is_url_safe(title in ".{0,64}") {
            let slug = normalize_slug(&title);
            prop_assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
            prop_assert!(!slug.starts_with('-') && !slug.ends_with('-'));
            prop_assert!(!slug.contains("--"));
        }
    }
}
