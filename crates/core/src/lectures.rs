//! The lecture variant: one HTML reading document per topic, grouped by
//! discipline.
//!
//! Topic numbers are parsed as integers, so ids and titles carry the
//! normalised number: "Тема 01" becomes `tema-1` titled "Тема 1. ...".

use crate::discipline::{Discipline, DisciplineRegistry};
use crate::normalize::{escape_html, normalize_for_comparison, TextNormalizer};
use crate::topics::{BodyMode, TopicSplitter};
use crate::types::{DisciplineLectures, Lecture, LectureMap, Topic};
use sha1::{Digest, Sha1};
use std::collections::{BTreeMap, HashSet};

/// Marker substituted for the `?` placeholder in lecture bodies.
const LECTURE_BULLET_MARKER: &str = "- ";

/// Hex digits of the content hash kept in the dedup key.
const HASH_PREFIX_LEN: usize = 12;

/// Allocate a lecture id for a topic number, suffixing `-2`, `-3`, ... on
/// collision with ids already used in the same discipline.
pub fn make_lecture_id(number: u32, used: &mut HashSet<String>) -> String {
    let base = format!("tema-{}", number);
    if used.insert(base.clone()) {
        return base;
    }

    let mut suffix = 2;
    loop {
        let candidate = format!("{}-{}", base, suffix);
        if used.insert(candidate.clone()) {
            return candidate;
        }
        suffix += 1;
    }
}

/// Key identifying the same lecture extracted twice: the normalized title
/// plus a truncated SHA-1 of the normalized title and body.
pub fn dedup_key(title: &str, body: &str) -> String {
    let digest = Sha1::digest(normalize_for_comparison(&format!("{}\n{}", title, body)).as_bytes());
    let hex: String = digest.iter().map(|byte| format!("{:02x}", byte)).collect();
    format!("{}|{}", normalize_for_comparison(title), &hex[..HASH_PREFIX_LEN])
}

/// Wrap a lecture body in a whitespace-preserving HTML block.
pub fn render_lecture_html(body: &str) -> String {
    format!(
        "<pre style=\"white-space: pre-wrap;\">{}</pre>",
        escape_html(body)
    )
}

/// Lectures being collected for one discipline.
#[derive(Debug)]
struct LectureBucket {
    discipline: Discipline,
    lectures: Vec<Lecture>,
    used_ids: HashSet<String>,
    seen_keys: HashSet<String>,
}

impl LectureBucket {
    fn new(discipline: Discipline) -> Self {
        Self {
            discipline,
            lectures: Vec::new(),
            used_ids: HashSet::new(),
            seen_keys: HashSet::new(),
        }
    }

    fn add_topic(&mut self, topic: Topic) {
        // Ids are allocated before dedup so duplicates still consume theirs.
        let id = make_lecture_id(topic.number, &mut self.used_ids);
        let title = topic.heading();

        if !self.seen_keys.insert(dedup_key(&title, &topic.body)) {
            log::debug!(
                "Dropping duplicate lecture '{}' in {}",
                title,
                self.discipline.id
            );
            return;
        }

        self.lectures.push(Lecture {
            id,
            title,
            content: render_lecture_html(&topic.body),
        });
    }

    fn finish(self) -> DisciplineLectures {
        DisciplineLectures {
            id: self.discipline.id,
            name: self.discipline.name,
            description: self.discipline.description,
            lectures: self.lectures,
        }
    }
}

/// Builds lecture documents from source text.
#[derive(Debug, Clone)]
pub struct LectureExtractor {
    normalizer: TextNormalizer,
}

impl Default for LectureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl LectureExtractor {
    /// Create an extractor that repairs placeholders with "- ".
    pub fn new() -> Self {
        Self {
            normalizer: TextNormalizer::new().with_bullet_marker(LECTURE_BULLET_MARKER),
        }
    }

    /// Use a custom normalizer for body lines.
    pub fn with_normalizer(mut self, normalizer: TextNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    fn splitter(&self) -> TopicSplitter {
        TopicSplitter::new()
            .with_body_mode(BodyMode::Raw)
            .with_legacy_prefix(true)
            .with_normalizer(self.normalizer.clone())
    }

    /// Extract lectures from a combined source that lists several
    /// disciplines, each introduced by a header line.
    ///
    /// Topics that appear before any discipline header are dropped. Only
    /// disciplines whose header was seen appear in the result.
    pub fn extract(&self, text: &str, registry: &DisciplineRegistry) -> LectureMap {
        let mut buckets: BTreeMap<String, LectureBucket> = BTreeMap::new();
        let mut current: Option<String> = None;
        let mut splitter = self.splitter();

        for line in text.lines() {
            if let Some(discipline) = registry.detect_header(line) {
                if let Some(topic) = splitter.flush() {
                    attach(&mut buckets, current.as_deref(), topic);
                }
                log::debug!("Discipline header: {} ({})", discipline.name, discipline.id);

                buckets
                    .entry(discipline.id.clone())
                    .or_insert_with(|| LectureBucket::new(discipline.clone()));
                current = Some(discipline.id.clone());
                continue;
            }

            if let Some(topic) = splitter.push_line(line) {
                attach(&mut buckets, current.as_deref(), topic);
            }
        }
        if let Some(topic) = splitter.flush() {
            attach(&mut buckets, current.as_deref(), topic);
        }

        buckets
            .into_iter()
            .map(|(id, bucket)| (id, bucket.finish()))
            .collect()
    }

    /// Extract lectures from a source dedicated to a single discipline.
    pub fn extract_single(&self, text: &str, discipline: &Discipline) -> DisciplineLectures {
        let mut bucket = LectureBucket::new(discipline.clone());
        for topic in self.splitter().split(text) {
            bucket.add_topic(topic);
        }
        bucket.finish()
    }
}

fn attach(buckets: &mut BTreeMap<String, LectureBucket>, current: Option<&str>, topic: Topic) {
    match current.and_then(|id| buckets.get_mut(id)) {
        Some(bucket) => bucket.add_topic(topic),
        None => log::debug!("Dropping topic {} outside any discipline", topic.number),
    }
}

/// Extract lectures from a combined multi-discipline source.
pub fn extract_lectures(text: &str, registry: &DisciplineRegistry) -> LectureMap {
    LectureExtractor::new().extract(text, registry)
}

/// Extract lectures from a single-discipline source.
pub fn extract_discipline_lectures(text: &str, discipline: &Discipline) -> DisciplineLectures {
    LectureExtractor::new().extract_single(text, discipline)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> DisciplineRegistry {
        DisciplineRegistry::new([
            Discipline::new("ethnopedagogy", "Этнопедагогика", "Народная педагогика"),
            Discipline::new("psychology", "Общая психология", ""),
        ])
    }

    #[test]
    fn test_make_lecture_id() {
        let mut used = HashSet::new();
        assert_eq!(make_lecture_id(1, &mut used), "tema-1");
        assert_eq!(make_lecture_id(2, &mut used), "tema-2");
        assert_eq!(make_lecture_id(1, &mut used), "tema-1-2");
        assert_eq!(make_lecture_id(1, &mut used), "tema-1-3");
    }

    #[test]
    fn test_leading_zeros_are_normalised() {
        let text = "Этнопедагогика\nТема 01. Введение\nтекст\nТема 1. Введение\nдругой текст\n";
        let map = extract_lectures(text, &registry());
        let lectures = &map["ethnopedagogy"].lectures;

        assert_eq!(lectures[0].id, "tema-1");
        assert_eq!(lectures[0].title, "Тема 1. Введение");
        assert_eq!(lectures[1].id, "tema-1-2");
    }

    #[test]
    fn test_dedup_key_ignores_case_and_spacing() {
        let a = dedup_key("Тема 1. Введение", "Текст  лекции");
        let b = dedup_key("тема 1.  введение", "текст лекции");
        assert_eq!(a, b);
        assert!(a.starts_with("тема 1. введение|"));
        assert_eq!(a.split('|').nth(1).map(str::len), Some(12));

        assert_ne!(a, dedup_key("Тема 1. Введение", "Другой текст"));
    }

    #[test]
    fn test_render_lecture_html() {
        assert_eq!(
            render_lecture_html("a < b\nи c"),
            "<pre style=\"white-space: pre-wrap;\">a &lt; b\nи c</pre>"
        );
    }

    #[test]
    fn test_extract_groups_by_discipline() {
        let text = "\
1. Этнопедагогика экзамен
Тема 1. Введение
Первая строка
  вторая строка с отступом
Тема 2: Традиции
?народные игры
патч
2. Общая психология зачет
Тема 1 Психика
Текст о психике
";
        let map = extract_lectures(text, &registry());
        assert_eq!(map.len(), 2);

        let ethno = &map["ethnopedagogy"];
        assert_eq!(ethno.name, "Этнопедагогика");
        assert_eq!(ethno.description, "Народная педагогика");
        assert_eq!(ethno.lectures.len(), 2);
        assert_eq!(ethno.lectures[0].id, "tema-1");
        assert_eq!(ethno.lectures[0].title, "Тема 1. Введение");
        assert_eq!(
            ethno.lectures[0].content,
            "<pre style=\"white-space: pre-wrap;\">Первая строка\n  вторая строка с отступом</pre>"
        );
        assert_eq!(ethno.lectures[1].title, "Тема 2. Традиции");
        assert_eq!(
            ethno.lectures[1].content,
            "<pre style=\"white-space: pre-wrap;\">- народные игры</pre>"
        );

        let psychology = &map["psychology"];
        assert_eq!(psychology.lectures.len(), 1);
        assert_eq!(psychology.lectures[0].title, "Тема 1. Психика");
    }

    #[test]
    fn test_map_is_ordered_by_discipline_id() {
        let text = "2. Общая психология\nТема 1. А\nтекст\n1. Этнопедагогика\nТема 1. Б\nтекст\n";
        let map = extract_lectures(text, &registry());
        let ids: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(ids, vec!["ethnopedagogy", "psychology"]);
    }

    #[test]
    fn test_topics_before_first_discipline_are_dropped() {
        let text = "Тема 1. Сиротская\nтекст\nЭтнопедагогика\nТема 2. Своя\nтекст\n";
        let map = extract_lectures(text, &registry());

        let lectures = &map["ethnopedagogy"].lectures;
        assert_eq!(lectures.len(), 1);
        assert_eq!(lectures[0].id, "tema-2");
    }

    #[test]
    fn test_duplicates_dropped_but_ids_consumed() {
        let text = "\
Этнопедагогика
Тема 1. Введение
Одинаковый текст
Тема 1. Введение
Одинаковый   текст
Тема 1. Введение
Другой текст
";
        let map = extract_lectures(text, &registry());
        let lectures = &map["ethnopedagogy"].lectures;

        let ids: Vec<&str> = lectures.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["tema-1", "tema-1-3"]);
    }

    #[test]
    fn test_legacy_prefix_and_escaping() {
        let text = "Этнопедагогика\nСтарая) Тема 3. Прежняя версия\n<b>жирный</b> & прочее\n";
        let map = extract_lectures(text, &registry());
        let lecture = &map["ethnopedagogy"].lectures[0];

        assert_eq!(lecture.id, "tema-3");
        assert_eq!(lecture.title, "Тема 3. Прежняя версия");
        assert!(lecture.content.contains("&lt;b&gt;жирный&lt;/b&gt; &amp; прочее"));
    }

    #[test]
    fn test_discipline_header_closes_open_topic() {
        let text = "Этнопедагогика\nТема 1. А\nтело\nОбщая психология\nпотерянная строка\nТема 1. Б\nтело б\n";
        let map = extract_lectures(text, &registry());

        assert_eq!(map["ethnopedagogy"].lectures.len(), 1);
        let psychology = &map["psychology"].lectures;
        assert_eq!(psychology.len(), 1);
        assert!(!psychology[0].content.contains("потерянная"));
    }

    #[test]
    fn test_extract_discipline_lectures() {
        let discipline = Discipline::new("pedagogy", "Педагогика", "");
        let text = "Тема 1. Первая\nтекст\nТема 1. Первая\nтекст\nТема 2. Вторая\n";
        let lectures = extract_discipline_lectures(text, &discipline);

        assert_eq!(lectures.id, "pedagogy");
        let titles: Vec<&str> = lectures.lectures.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["Тема 1. Первая", "Тема 2. Вторая"]);
        assert_eq!(
            lectures.lectures[1].content,
            "<pre style=\"white-space: pre-wrap;\"></pre>"
        );
    }
}
