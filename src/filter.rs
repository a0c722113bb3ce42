use rand::Rng;
use rand::seq::SliceRandom;
use std::fmt;
use std::str::FromStr;

use handle_errors::Error;

use crate::types::{difficulty::Difficulty, question::Question};

/// 목록 화면의 난이도 선택. `All`은 목록을 그대로 돌려준다.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DifficultyFilter {
    #[default]
    All,
    Only(Difficulty),
}

impl DifficultyFilter {
    pub fn matches(&self, question: &Question) -> bool {
        match self {
            DifficultyFilter::All => true,
            DifficultyFilter::Only(difficulty) => question.difficulty == *difficulty,
        }
    }
}

impl fmt::Display for DifficultyFilter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DifficultyFilter::All => f.write_str("ALL"),
            DifficultyFilter::Only(difficulty) => write!(f, "{}", difficulty),
        }
    }
}

impl FromStr for DifficultyFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(DifficultyFilter::All)
        } else {
            s.parse().map(DifficultyFilter::Only)
        }
    }
}

impl From<Option<Difficulty>> for DifficultyFilter {
    fn from(difficulty: Option<Difficulty>) -> Self {
        difficulty.map_or(DifficultyFilter::All, DifficultyFilter::Only)
    }
}

pub fn filter_by_difficulty(questions: &[Question], filter: DifficultyFilter) -> Vec<&Question> {
    questions.iter().filter(|q| filter.matches(q)).collect()
}

/// 주어진 태그 이름 중 하나라도 가진 질문만 남긴다.
pub fn retain_any_tag(questions: &mut Vec<Question>, tag_names: &[String]) {
    questions.retain(|q| q.has_any_tag(tag_names));
}

pub fn retain_difficulty(questions: &mut Vec<Question>, difficulty: Difficulty) {
    questions.retain(|q| q.difficulty == difficulty);
}

/// 균등한 Fisher-Yates 셔플
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    items.shuffle(rng);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::question::QuestionId;
    use crate::types::tag::{Tag, TagId};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn question(id: i32, difficulty: Difficulty, tags: &[&str]) -> Question {
        Question {
            id: QuestionId(id),
            question_text: format!("question {}", id),
            question_answer: format!("answer {}", id),
            difficulty,
            tags: Some(
                tags.iter()
                    .enumerate()
                    .map(|(i, name)| Tag {
                        id: TagId(i as i32),
                        name: name.to_string(),
                        questions: None,
                    })
                    .collect(),
            ),
        }
    }

    fn sample() -> Vec<Question> {
        vec![
            question(1, Difficulty::Easy, &["rust"]),
            question(2, Difficulty::Medium, &["concurrency"]),
            question(3, Difficulty::Hard, &["rust", "concurrency"]),
            question(4, Difficulty::Medium, &[]),
        ]
    }

    #[test]
    fn difficulty_filter_returns_exact_subset() {
        let questions = sample();
        for difficulty in Difficulty::ALL {
            let filtered = filter_by_difficulty(&questions, DifficultyFilter::Only(difficulty));
            let expected: Vec<&Question> =
                questions.iter().filter(|q| q.difficulty == difficulty).collect();
            assert_eq!(filtered, expected);
            assert!(filtered.iter().all(|q| q.difficulty == difficulty));
        }
    }

    #[test]
    fn all_returns_list_unchanged() {
        let questions = sample();
        let filtered = filter_by_difficulty(&questions, DifficultyFilter::All);
        assert_eq!(filtered, questions.iter().collect::<Vec<_>>());
    }

    #[test]
    fn parses_filter_values() {
        assert_eq!("ALL".parse::<DifficultyFilter>().unwrap(), DifficultyFilter::All);
        assert_eq!(
            "medium".parse::<DifficultyFilter>().unwrap(),
            DifficultyFilter::Only(Difficulty::Medium)
        );
        assert!("sometimes".parse::<DifficultyFilter>().is_err());
    }

    #[test]
    fn retain_any_tag_keeps_union() {
        let mut questions = sample();
        retain_any_tag(&mut questions, &["concurrency".to_string(), "go".to_string()]);
        let ids: Vec<i32> = questions.iter().map(|q| q.id.0).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn shuffle_is_a_permutation() {
        for len in [0usize, 1, 2, 7, 50] {
            let original: Vec<usize> = (0..len).map(|i| i % 5).collect();
            for seed in 0..20u64 {
                let mut rng = StdRng::seed_from_u64(seed);
                let mut shuffled = original.clone();
                shuffle(&mut shuffled, &mut rng);
                assert_eq!(shuffled.len(), original.len());
                let mut a = original.clone();
                let mut b = shuffled;
                a.sort_unstable();
                b.sort_unstable();
                assert_eq!(a, b);
            }
        }
    }

    #[test]
    fn shuffle_reaches_every_first_position() {
        // 편향된 비교 정렬과 달리 모든 원소가 첫 자리에 올 수 있어야 한다.
        let mut seen = [false; 4];
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..400 {
            let mut items = [0usize, 1, 2, 3];
            shuffle(&mut items, &mut rng);
            seen[items[0]] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }
}
