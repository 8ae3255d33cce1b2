//! Compiled-in category knowledge base.
//!
//! A curated mapping of category -> member words plus a one-hop relation
//! graph between categories. Pure static lookups, no I/O. Member lists are
//! a curated subset: a member may be absent from the loaded vocabulary and
//! is filtered out at lookup time.
//!
//! A word may appear in more than one category ("눈" is listed under both
//! 날씨 and 몸); lookups resolve to the first category in declared order.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::vocabulary::Vocabulary;

/// Categories in declared order. Declaration order is load-bearing: it
/// decides first-match resolution in [`category_of`] and the member order
/// returned by [`members_in_vocabulary`].
static CATEGORIES: &[(&str, &[&str])] = &[
    ("인사", &["안녕", "반갑다", "감사", "미안", "잘가", "환영"]),
    (
        "사람",
        &["나", "너", "우리", "사람", "친구", "가족", "엄마", "아빠", "선생님"],
    ),
    (
        "시간",
        &["오늘", "내일", "어제", "지금", "아침", "점심", "저녁", "밤", "시간"],
    ),
    (
        "감정",
        &["좋다", "싫다", "기쁘다", "슬프다", "화나다", "행복", "사랑", "무섭다"],
    ),
    (
        "날씨",
        &["날씨", "맑다", "흐리다", "비", "눈", "바람", "덥다", "춥다"],
    ),
    (
        "음식",
        &["밥", "물", "빵", "과일", "우유", "고기", "맛있다", "배고프다"],
    ),
    (
        "행동",
        &["하다", "가다", "오다", "보다", "먹다", "자다", "놀다", "공부하다", "말하다"],
    ),
    ("장소", &["집", "학교", "병원", "공원", "가게", "화장실"]),
    ("몸", &["머리", "손", "발", "눈", "배", "아프다", "피곤하다"]),
];

/// One-hop relations between categories, in declared order.
static RELATED: &[(&str, &[&str])] = &[
    ("인사", &["사람", "시간", "감정"]),
    ("사람", &["감정", "행동", "장소"]),
    ("시간", &["행동", "날씨"]),
    ("감정", &["사람", "행동"]),
    ("날씨", &["시간", "감정", "장소"]),
    ("음식", &["행동", "감정", "장소"]),
    ("행동", &["장소", "시간", "사람"]),
    ("장소", &["행동", "사람"]),
    ("몸", &["감정", "행동"]),
];

/// Word -> first declared category. Built once; first insert wins, so the
/// declared category order decides overlapping words.
static WORD_TO_CATEGORY: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for (name, members) in CATEGORIES {
        for member in *members {
            map.entry(*member).or_insert(*name);
        }
    }
    map
});

/// All category names in declared order.
pub fn names() -> Vec<&'static str> {
    CATEGORIES.iter().map(|(name, _)| *name).collect()
}

/// The first declared category containing `word`, if any.
pub fn category_of(word: &str) -> Option<&'static str> {
    WORD_TO_CATEGORY.get(word).copied()
}

/// Declared members of `category`, unfiltered. Empty for unknown categories.
pub fn members(category: &str) -> &'static [&'static str] {
    CATEGORIES
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, members)| *members)
        .unwrap_or(&[])
}

/// Members of `category` present in `vocabulary`, preserving declared order.
pub fn members_in_vocabulary(category: &str, vocabulary: &Vocabulary) -> Vec<&'static str> {
    members(category)
        .iter()
        .copied()
        .filter(|member| vocabulary.contains(member))
        .collect()
}

/// Categories related to `category`, in declared order. Possibly empty.
pub fn related(category: &str) -> &'static [&'static str] {
    RELATED
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, related)| *related)
        .unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab(words: &[&str]) -> Vocabulary {
        Vocabulary::from_words(words.iter().map(|w| w.to_string())).unwrap()
    }

    #[test]
    fn test_category_of_known_words() {
        assert_eq!(category_of("안녕"), Some("인사"));
        assert_eq!(category_of("오늘"), Some("시간"));
        assert_eq!(category_of("먹다"), Some("행동"));
    }

    #[test]
    fn test_category_of_unknown_word() {
        assert_eq!(category_of("나나"), None);
        assert_eq!(category_of(""), None);
    }

    #[test]
    fn test_overlapping_word_resolves_to_first_declared() {
        // 눈 is declared under 날씨 (snow) before 몸 (eye).
        assert_eq!(category_of("눈"), Some("날씨"));
        assert!(members("몸").contains(&"눈"));
    }

    #[test]
    fn test_members_preserve_declared_order() {
        assert_eq!(
            members("인사"),
            &["안녕", "반갑다", "감사", "미안", "잘가", "환영"]
        );
        assert!(members("없는분류").is_empty());
    }

    #[test]
    fn test_members_in_vocabulary_filters_and_keeps_order() {
        let vocabulary = vocab(&["감사", "안녕", "환영", "오늘"]);
        assert_eq!(
            members_in_vocabulary("인사", &vocabulary),
            vec!["안녕", "감사", "환영"]
        );
        assert!(members_in_vocabulary("음식", &vocabulary).is_empty());
    }

    #[test]
    fn test_related_declared_order() {
        assert_eq!(related("인사"), &["사람", "시간", "감정"]);
        assert_eq!(related("시간"), &["행동", "날씨"]);
        assert!(related("없는분류").is_empty());
    }

    #[test]
    fn test_every_relation_points_to_a_declared_category() {
        let declared = names();
        for (name, related) in RELATED {
            assert!(declared.contains(name), "{name} is not declared");
            for rel in *related {
                assert!(declared.contains(rel), "{name} -> {rel} is not declared");
            }
        }
    }

    #[test]
    fn test_names_in_declared_order() {
        let names = names();
        assert_eq!(names[0], "인사");
        assert_eq!(names.len(), CATEGORIES.len());
    }
}
