use colored::{ColoredString, Colorize};
use std::fmt::Write;

use crate::types::{difficulty::Difficulty, question::Question, tag::Tag};
use crate::views::{
    Loadable, Status,
    flashcards::{CardFace, Flashcards},
};

pub fn difficulty_badge(difficulty: Difficulty) -> ColoredString {
    difficulty.as_str().color(difficulty.color()).bold()
}

pub fn tag_list(question: &Question) -> String {
    question
        .tag_names()
        .iter()
        .map(|name| format!("#{}", name))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn question_card(question: &Question, show_answer: bool) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "[{}] {} {}",
        question.id,
        difficulty_badge(question.difficulty),
        question.question_text.bold()
    );
    let tags = tag_list(question);
    if !tags.is_empty() {
        let _ = write!(out, "\n    {}", tags.dimmed());
    }
    if show_answer {
        let _ = write!(out, "\n    {}", question.question_answer);
    }
    out
}

pub fn question_list(questions: &[&Question], show_answers: bool) -> String {
    questions
        .iter()
        .map(|q| question_card(q, show_answers))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn tag_line(tag: &Tag) -> String {
    let count = tag.question_count();
    format!(
        "[{}] {} ({} question{})",
        tag.id,
        tag.name.bold(),
        count,
        if count == 1 { "" } else { "s" }
    )
}

pub fn flashcard(deck: &Flashcards) -> String {
    let Some(question) = deck.current() else {
        return "No questions found for the selected tags.".to_string();
    };

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}  {}",
        deck.position().dimmed(),
        difficulty_badge(question.difficulty)
    );
    let _ = writeln!(out, "\n{}\n", question.question_text.bold());
    match deck.face() {
        CardFace::Hidden => {
            let _ = writeln!(out, "{}", "(answer hidden)".dimmed());
        }
        CardFace::Shown => {
            let _ = writeln!(out, "{}", question.question_answer);
        }
    }
    let mut controls = Vec::new();
    if deck.can_previous() {
        controls.push("[p]revious");
    }
    controls.push("[a]nswer");
    if deck.can_next() {
        controls.push("[n]ext");
    }
    controls.push("[q]uit");
    let _ = write!(out, "{}", controls.join("  "));
    out
}

/// 로딩/에러 상태를 한 줄로 보여 준다. 값이 준비됐으면 `None`
pub fn status_line<T>(state: &Loadable<T>) -> Option<String> {
    match state.status() {
        Status::Idle => None,
        Status::Loading => Some("Loading...".to_string()),
        Status::Ready(_) => None,
        Status::Failed(message) => Some(format!(
            "{}\n{}",
            message.red(),
            "Run the command again to try again.".dimmed()
        )),
    }
}
