/// Page depth used when the page input is missing or not a positive integer.
pub const DEFAULT_MAX_PAGES: u32 = 3;

/// A crawl job as entered in the form, ready to be sent to the task API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSubmission {
    pub keywords: Vec<String>,
    pub max_pages: u32,
    pub persist: bool,
}

impl TaskSubmission {
    pub fn from_form(raw_keywords: &str, raw_max_pages: &str, persist: bool) -> Self {
        Self {
            keywords: parse_keywords(raw_keywords),
            max_pages: parse_max_pages(raw_max_pages),
            persist,
        }
    }
}

/// Splits raw keyword text on newlines, ASCII commas and full-width commas.
/// Entries are trimmed; empty ones are dropped. Order is kept, duplicates too.
pub fn parse_keywords(raw: &str) -> Vec<String> {
    raw.split(['\n', ',', '，'])
        .map(str::trim)
        .filter(|keyword| !keyword.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

/// Reads the leading integer of the page input; anything that is not a
/// positive number falls back to [`DEFAULT_MAX_PAGES`].
pub fn parse_max_pages(raw: &str) -> u32 {
    let trimmed = raw.trim();
    let digits_end = trimmed
        .char_indices()
        .find(|(_, ch)| !ch.is_ascii_digit())
        .map_or(trimmed.len(), |(idx, _)| idx);
    match trimmed[..digits_end].parse::<u32>() {
        Ok(pages) if pages > 0 => pages,
        _ => DEFAULT_MAX_PAGES,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_split_on_all_delimiters() {
        assert_eq!(
            parse_keywords("a, b\nc，d"),
            vec!["a", "b", "c", "d"]
        );
    }

    #[test]
    fn blank_keyword_input_is_empty() {
        assert!(parse_keywords("").is_empty());
        assert!(parse_keywords("  \n , ，\r\n").is_empty());
    }

    #[test]
    fn duplicate_keywords_are_kept_in_order() {
        assert_eq!(parse_keywords("calc\nalgebra\ncalc"), vec!["calc", "algebra", "calc"]);
    }

    #[test]
    fn max_pages_defaults_when_invalid() {
        assert_eq!(parse_max_pages(""), 3);
        assert_eq!(parse_max_pages("abc"), 3);
        assert_eq!(parse_max_pages("0"), 3);
        assert_eq!(parse_max_pages("-2"), 3);
    }

    #[test]
    fn max_pages_reads_leading_integer() {
        assert_eq!(parse_max_pages("5"), 5);
        assert_eq!(parse_max_pages(" 7 "), 7);
        assert_eq!(parse_max_pages("12pages"), 12);
    }

    #[test]
    fn form_fields_are_parsed_together() {
        let submission = TaskSubmission::from_form("drone, fpv", "5", true);
        assert_eq!(submission.keywords, vec!["drone", "fpv"]);
        assert_eq!(submission.max_pages, 5);
        assert!(submission.persist);
    }
}
