//! Discipline attribution for combined multi-discipline sources.
//!
//! A combined source lists several disciplines one after another, each
//! introduced by a header line such as "5. Общая психология экзамен". Header
//! lines are recognized by matching them against a registry of known
//! discipline names.
//!
//! Matching is exact first, then by substring containment in either
//! direction. Containment is only trusted for lines that look like headers
//! (leading digit, or an exam/credit suffix), and can still pick the wrong
//! discipline when one normalized name is contained in another.

use crate::error::Result;
use crate::normalize::{char_len, normalize_for_comparison};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Leading numbering such as "5. " or "1) 2. ".
static LEADING_NUMBERING_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:\d+\s*[.)]\s*)+").unwrap());

/// Trailing assessment suffix: "экзамен", "зачет" or "зачёт".
static ASSESSMENT_SUFFIX_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[.\s]*(?:экзамен|зачет|зачёт)\s*$").unwrap());

/// Lines longer than this without a header signal are never headers.
const MAX_UNSIGNALED_HEADER_CHARS: usize = 60;

/// A subject area from the external discipline registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discipline {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl Discipline {
    /// Create a new discipline.
    pub fn new(id: impl Into<String>, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Read-only lookup table of known disciplines, keyed by normalized name.
#[derive(Debug, Clone, Default)]
pub struct DisciplineRegistry {
    /// (normalized name, discipline) in registry order.
    entries: Vec<(String, Discipline)>,
}

impl DisciplineRegistry {
    /// Build a registry. A later discipline with the same normalized name
    /// replaces the earlier one in place.
    pub fn new(disciplines: impl IntoIterator<Item = Discipline>) -> Self {
        let mut entries: Vec<(String, Discipline)> = Vec::new();

        for discipline in disciplines {
            let key = normalize_for_comparison(&discipline.name);
            match entries.iter_mut().find(|(existing, _)| *existing == key) {
                Some(entry) => entry.1 = discipline,
                None => entries.push((key, discipline)),
            }
        }

        Self { entries }
    }

    /// Parse a registry from a JSON array of disciplines.
    pub fn from_json(json: &str) -> Result<Self> {
        let disciplines: Vec<Discipline> = serde_json::from_str(json)?;
        Ok(Self::new(disciplines))
    }

    /// Number of disciplines.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Disciplines in registry order.
    pub fn iter(&self) -> impl Iterator<Item = &Discipline> {
        self.entries.iter().map(|(_, discipline)| discipline)
    }

    /// Look up a discipline by id.
    pub fn get(&self, id: &str) -> Option<&Discipline> {
        self.iter().find(|discipline| discipline.id == id)
    }

    /// Look up a discipline by (loosely matching) name.
    pub fn find_by_name(&self, name: &str) -> Option<&Discipline> {
        let key = normalize_for_comparison(name);
        if key.is_empty() {
            return None;
        }

        self.exact(&key).or_else(|| {
            self.entries
                .iter()
                .find(|(existing, _)| key.contains(existing.as_str()) || existing.contains(&key))
                .map(|(_, discipline)| discipline)
        })
    }

    /// Decide whether a source line is a discipline header, and for which
    /// discipline.
    pub fn detect_header(&self, line: &str) -> Option<&Discipline> {
        let original = line.trim();
        if original.is_empty() {
            return None;
        }

        let has_signal = has_header_signal(original);
        let candidate = header_candidate(original);
        let key = normalize_for_comparison(&candidate);

        if key.is_empty() {
            return None;
        }
        if !has_signal && char_len(&key) > MAX_UNSIGNALED_HEADER_CHARS {
            return None;
        }

        if let Some(discipline) = self.exact(&key) {
            return Some(discipline);
        }
        if !has_signal {
            return None;
        }

        self.entries
            .iter()
            .filter(|(existing, _)| !existing.is_empty())
            .find(|(existing, _)| key.contains(existing.as_str()) || existing.contains(&key))
            .map(|(_, discipline)| discipline)
    }

    fn exact(&self, key: &str) -> Option<&Discipline> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, discipline)| discipline)
    }
}

/// A line "looks like" a header when it starts with a digit or mentions an
/// exam or credit.
fn has_header_signal(line: &str) -> bool {
    let normalized = normalize_for_comparison(line);
    line.starts_with(|c: char| c.is_ascii_digit())
        || normalized.contains("экзамен")
        || normalized.contains("зачет")
}

/// Strip numbering and the assessment suffix from a header line.
fn header_candidate(line: &str) -> String {
    let without_numbering = LEADING_NUMBERING_REGEX.replace(line, "");
    let without_suffix = ASSESSMENT_SUFFIX_REGEX.replace(without_numbering.trim(), "");
    let trimmed = without_suffix.trim();
    trimmed.strip_suffix('.').unwrap_or(trimmed).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> DisciplineRegistry {
        DisciplineRegistry::new([
            Discipline::new("pedagogy", "Общие основы педагогики", "Основы"),
            Discipline::new("general-psychology", "Общая психология", ""),
            Discipline::new("ethnopedagogy", "Этнопедагогика", ""),
        ])
    }

    #[test]
    fn test_exact_match_without_signal() {
        let registry = registry();
        assert_eq!(
            registry.detect_header("Общая психология").map(|d| d.id.as_str()),
            Some("general-psychology")
        );
        assert_eq!(
            registry.detect_header("  общая   ПСИХОЛОГИЯ ").map(|d| d.id.as_str()),
            Some("general-psychology")
        );
    }

    #[test]
    fn test_numbering_and_suffix_are_stripped() {
        let registry = registry();
        assert_eq!(
            registry.detect_header("5. Общая психология экзамен").map(|d| d.id.as_str()),
            Some("general-psychology")
        );
        assert_eq!(
            registry.detect_header("1) Общие основы педагогики. Зачёт").map(|d| d.id.as_str()),
            Some("pedagogy")
        );
    }

    #[test]
    fn test_containment_requires_signal() {
        let registry = registry();
        assert_eq!(
            registry.detect_header("3. Этнопедагогика и народная культура").map(|d| d.id.as_str()),
            Some("ethnopedagogy")
        );
        assert_eq!(registry.detect_header("Этнопедагогика и народная культура"), None);
    }

    #[test]
    fn test_ordinary_lines_are_not_headers() {
        let registry = registry();
        assert_eq!(registry.detect_header(""), None);
        assert_eq!(registry.detect_header("Тема 1. Введение"), None);
        assert_eq!(registry.detect_header("Психология изучает психику человека."), None);
        assert_eq!(registry.detect_header("1."), None);
    }

    #[test]
    fn test_long_unsignaled_line_is_rejected() {
        let registry = DisciplineRegistry::new([Discipline::new(
            "long",
            "Очень длинное название дисциплины которое превышает шестьдесят символов",
            "",
        )]);
        assert_eq!(
            registry.detect_header(
                "Очень длинное название дисциплины которое превышает шестьдесят символов"
            ),
            None
        );
        assert!(registry
            .detect_header("2. Очень длинное название дисциплины которое превышает шестьдесят символов")
            .is_some());
    }

    #[test]
    fn test_known_substring_false_positive() {
        // A numbered body line mentioning a discipline name switches context.
        let registry = registry();
        assert_eq!(
            registry.detect_header("2. Общая психология как наука").map(|d| d.id.as_str()),
            Some("general-psychology")
        );
    }

    #[test]
    fn test_from_json_and_lookup() {
        let registry = DisciplineRegistry::from_json(
            r#"[{"id": "a", "name": "Педагогика"}, {"id": "b", "name": "Психология", "description": "d"}]"#,
        )
        .unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("b").map(|d| d.description.as_str()), Some("d"));
        assert_eq!(registry.get("a").map(|d| d.description.as_str()), Some(""));
        assert_eq!(registry.find_by_name("педагогика").map(|d| d.id.as_str()), Some("a"));
        assert_eq!(registry.find_by_name("Психология развития").map(|d| d.id.as_str()), Some("b"));
        assert_eq!(registry.find_by_name(""), None);
    }

    #[test]
    fn test_duplicate_names_replace_in_place() {
        let registry = DisciplineRegistry::new([
            Discipline::new("old", "Педагогика", ""),
            Discipline::new("other", "Психология", ""),
            Discipline::new("new", "педагогика", ""),
        ]);

        assert_eq!(registry.len(), 2);
        let ids: Vec<&str> = registry.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "other"]);
    }
}
