use crate::types::question::Question;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardFace {
    Hidden,
    Shown,
}

/// 섞인 질문 목록 위를 움직이는 커서. 양 끝에서 멈추고 되돌아가지 않는다.
#[derive(Debug, Clone)]
pub struct Flashcards {
    cards: Vec<Question>,
    current: usize,
    face: CardFace,
}

impl Flashcards {
    pub fn new(cards: Vec<Question>) -> Self {
        Flashcards {
            cards,
            current: 0,
            face: CardFace::Hidden,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn index(&self) -> usize {
        self.current
    }

    pub fn face(&self) -> CardFace {
        self.face
    }

    pub fn cards(&self) -> &[Question] {
        &self.cards
    }

    pub fn current(&self) -> Option<&Question> {
        self.cards.get(self.current)
    }

    pub fn reveal(&mut self) {
        self.face = CardFace::Shown;
    }

    pub fn toggle_answer(&mut self) {
        self.face = match self.face {
            CardFace::Hidden => CardFace::Shown,
            CardFace::Shown => CardFace::Hidden,
        };
    }

    pub fn can_previous(&self) -> bool {
        self.current > 0
    }

    pub fn can_next(&self) -> bool {
        self.current + 1 < self.cards.len()
    }

    /// 첫 카드에서는 움직이지 않는다. 움직였으면 `true`
    pub fn previous(&mut self) -> bool {
        if !self.can_previous() {
            return false;
        }
        self.current -= 1;
        self.face = CardFace::Hidden;
        true
    }

    /// 마지막 카드에서는 움직이지 않는다. 움직였으면 `true`
    pub fn next(&mut self) -> bool {
        if !self.can_next() {
            return false;
        }
        self.current += 1;
        self.face = CardFace::Hidden;
        true
    }

    /// "Card 2 of 5" 형태의 위치 표시
    pub fn position(&self) -> String {
        if self.cards.is_empty() {
            return "No cards".to_string();
        }
        format!("Card {} of {}", self.current + 1, self.cards.len())
    }
}
