use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io::{BufRead, Write};
use std::process::ExitCode;
use tracing::{Level, event, instrument};

use handle_errors::{Error, user_message};

use crate::client::ApiClient;
use crate::config::ConnectionArgs;
use crate::filter::DifficultyFilter;
use crate::render;
use crate::types::{
    difficulty::Difficulty,
    question::QuestionId,
    tag::{Tag, TagId},
};
use crate::views::{
    Loadable,
    flashcards::Flashcards,
    question_form::{FormMode, QuestionForm},
    questions::QuestionsView,
    quiz_start::QuizStart,
    search::SearchView,
    tags::{TagOutcome, TagsView},
};

#[derive(Parser, Debug)]
#[clap(
    name = "interview_deck",
    version,
    about = "Browse, edit and quiz yourself on a remote interview question catalog"
)]
pub struct Cli {
    #[clap(flatten)]
    pub connection: ConnectionArgs,
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List all questions, optionally narrowed to one difficulty
    List {
        /// ALL, EASY, MEDIUM or HARD
        #[clap(short, long, default_value = "ALL")]
        difficulty: DifficultyFilter,
        /// Print answers under each question
        #[clap(long)]
        answers: bool,
    },
    /// Show one question with its answer
    Show { id: i32 },
    /// Search by keyword, tags and difficulty
    Search {
        #[clap(short, long)]
        keyword: Option<String>,
        #[clap(short, long)]
        difficulty: Option<Difficulty>,
        #[clap(short, long = "tag")]
        tags: Vec<String>,
    },
    /// Create a question
    Add {
        #[clap(long)]
        text: String,
        #[clap(long)]
        answer: String,
        #[clap(short, long, default_value = "MEDIUM")]
        difficulty: Difficulty,
        /// Tag to attach; created when no tag with that name exists
        #[clap(short, long = "tag")]
        tags: Vec<String>,
    },
    /// Edit a question; unspecified fields keep their current value
    Edit {
        id: i32,
        #[clap(long)]
        text: Option<String>,
        #[clap(long)]
        answer: Option<String>,
        #[clap(short, long)]
        difficulty: Option<Difficulty>,
        #[clap(short, long = "tag")]
        tags: Vec<String>,
        #[clap(long)]
        untag: Vec<String>,
    },
    /// Delete a question
    Delete { id: i32 },
    /// Attach a tag to a question
    Tag { id: i32, name: String },
    /// Detach a tag from a question
    Untag { id: i32, name: String },
    /// Manage tags
    #[clap(subcommand)]
    Tags(TagsCommand),
    /// Flashcard quiz over questions carrying any of the given tags
    Quiz {
        #[clap(short, long = "tag", required = true)]
        tags: Vec<String>,
        /// Fixed shuffle seed, for a repeatable card order
        #[clap(long)]
        seed: Option<u64>,
    },
}

#[derive(Subcommand, Debug)]
pub enum TagsCommand {
    /// List tags with their question counts
    List {
        /// Only tags that have questions
        #[clap(long)]
        used: bool,
        /// Only tags without questions
        #[clap(long, conflicts_with = "used")]
        unused: bool,
    },
    /// Find tags by keyword
    Search { keyword: String },
    /// Create a tag (an existing name, ignoring case, is reused)
    Create { name: String },
    /// Rename a tag
    Rename { id: i32, name: String },
    /// Delete a tag and remove it from all questions
    Delete { id: i32 },
}

/// 명령 하나를 실행하고 결과를 출력한다. 실패는 화면 단위에서 메시지로 바뀐다.
#[instrument(skip(client))]
pub async fn run(command: Command, client: ApiClient) -> ExitCode {
    match command {
        Command::List {
            difficulty,
            answers,
        } => list(client, difficulty, answers).await,
        Command::Show { id } => match client.get_question(QuestionId(id), true).await {
            Ok(question) => {
                println!("{}", render::question_card(&question, true));
                ExitCode::SUCCESS
            }
            Err(e) => failure(&user_message("load question", &e)),
        },
        Command::Search {
            keyword,
            difficulty,
            tags,
        } => search(client, keyword, difficulty, tags).await,
        Command::Add {
            text,
            answer,
            difficulty,
            tags,
        } => {
            let mut form = QuestionForm::new(client, FormMode::New);
            form.load().await;
            if let Some(code) = require_tags(&form, &tags) {
                return code;
            }
            form.set_text(&text);
            form.set_answer(&answer);
            form.set_difficulty(difficulty);
            submit_form(form, &tags, &[]).await
        }
        Command::Edit {
            id,
            text,
            answer,
            difficulty,
            tags,
            untag,
        } => {
            let mut form = QuestionForm::new(client, FormMode::Edit(QuestionId(id)));
            form.load().await;
            if let Some(message) = form.error() {
                return failure(message);
            }
            if let Some(code) = require_tags(&form, &tags) {
                return code;
            }
            if let Some(text) = text {
                form.set_text(&text);
            }
            if let Some(answer) = answer {
                form.set_answer(&answer);
            }
            if let Some(difficulty) = difficulty {
                form.set_difficulty(difficulty);
            }
            submit_form(form, &tags, &untag).await
        }
        Command::Delete { id } => {
            let mut view = QuestionsView::new(client);
            view.delete(QuestionId(id)).await;
            match view.mutation_error() {
                Some(message) => failure(message),
                None => {
                    println!("Question {} deleted", id);
                    ExitCode::SUCCESS
                }
            }
        }
        Command::Tag { id, name } => {
            match client.add_tag_to_question(QuestionId(id), &name).await {
                Ok(()) => {
                    println!("Tagged question {} with {}", id, name);
                    ExitCode::SUCCESS
                }
                Err(e) => failure(&user_message("add tag", &e)),
            }
        }
        Command::Untag { id, name } => {
            match client.remove_tag_from_question(QuestionId(id), &name).await {
                Ok(()) => {
                    println!("Removed {} from question {}", name, id);
                    ExitCode::SUCCESS
                }
                Err(e) => failure(&user_message("remove tag", &e)),
            }
        }
        Command::Tags(command) => tags(client, command).await,
        Command::Quiz { tags, seed } => {
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            quiz(client, &tags, seed, stdin.lock(), stdout.lock()).await
        }
    }
}

fn failure(message: &str) -> ExitCode {
    eprintln!("{}", message);
    ExitCode::FAILURE
}

fn report<T>(state: &Loadable<T>) -> Option<ExitCode> {
    let line = render::status_line(state)?;
    if state.error().is_some() {
        eprintln!("{}", line);
        return Some(ExitCode::FAILURE);
    }
    println!("{}", line);
    None
}

/// 붙일 태그가 있으면 중복 확인에 쓸 태그 목록이 있어야 한다.
fn require_tags(form: &QuestionForm, wanted: &[String]) -> Option<ExitCode> {
    if wanted.is_empty() {
        return None;
    }
    report(form.tags_state())
}

async fn list(client: ApiClient, difficulty: DifficultyFilter, answers: bool) -> ExitCode {
    let mut view = QuestionsView::new(client);
    view.set_filter(difficulty);
    view.load().await;
    if let Some(code) = report(view.state()) {
        return code;
    }

    let visible = view.visible();
    println!("{}\n", view.count_label());
    if visible.is_empty() {
        println!("{}", view.empty_message());
    } else {
        println!("{}", render::question_list(&visible, answers));
    }
    ExitCode::SUCCESS
}

async fn search(
    client: ApiClient,
    keyword: Option<String>,
    difficulty: Option<Difficulty>,
    tags: Vec<String>,
) -> ExitCode {
    let mut view = SearchView::new(client);
    view.set_keyword(keyword.as_deref().unwrap_or_default());
    view.set_difficulty(difficulty);
    for tag in &tags {
        view.add_tag(tag);
    }
    view.search().await;
    if let Some(code) = report(view.results()) {
        return code;
    }

    let results: Vec<_> = view.results().value().map(|qs| qs.iter().collect()).unwrap_or_default();
    if results.is_empty() {
        println!("No questions match your search.");
    } else {
        println!(
            "{} result{}\n",
            results.len(),
            if results.len() == 1 { "" } else { "s" }
        );
        println!("{}", render::question_list(&results, false));
    }
    ExitCode::SUCCESS
}

async fn submit_form(mut form: QuestionForm, add: &[String], remove: &[String]) -> ExitCode {
    for name in add {
        match form.add_tag(name).await {
            Ok(Some(TagOutcome::Created(tag))) => println!("Created tag {}", tag.name),
            Ok(_) => {}
            Err(_) => return failure(form.error().unwrap_or("Failed to add tag")),
        }
    }
    for name in remove {
        form.remove_tag(name);
    }

    match form.submit().await {
        Ok(question) => {
            let verb = match form.mode() {
                FormMode::New => "Created",
                FormMode::Edit(_) => "Updated",
            };
            println!("{} question {}", verb, question.id);
            ExitCode::SUCCESS
        }
        Err(_) => failure(form.error().unwrap_or("Failed to save question")),
    }
}

async fn tags(client: ApiClient, command: TagsCommand) -> ExitCode {
    match command {
        TagsCommand::List { used, unused } if used || unused => {
            let result = if used {
                client.get_tags_with_questions().await
            } else {
                client.get_tags_without_questions().await
            };
            print_tags(result.map_err(|e| user_message("load tags", &e)))
        }
        TagsCommand::List { .. } => {
            let mut view = TagsView::new(client);
            view.load().await;
            if let Some(code) = report(view.state()) {
                return code;
            }
            println!("{}\n", view.count_label());
            print_tags(Ok(view.tags().to_vec()))
        }
        TagsCommand::Search { keyword } => print_tags(
            client
                .search_tags(&keyword)
                .await
                .map_err(|e| user_message("search tags", &e)),
        ),
        TagsCommand::Create { name } => {
            let mut view = TagsView::new(client);
            view.load().await;
            if let Some(code) = report(view.state()) {
                return code;
            }
            match view.create(&name).await {
                Ok(TagOutcome::Created(tag)) => {
                    println!("Created tag [{}] {}", tag.id, tag.name);
                    ExitCode::SUCCESS
                }
                Ok(TagOutcome::Existing(tag)) => {
                    println!("Tag [{}] {} already exists", tag.id, tag.name);
                    ExitCode::SUCCESS
                }
                Err(_) => failure(view.mutation_error().unwrap_or("Failed to create tag")),
            }
        }
        TagsCommand::Rename { id, name } => {
            let mut view = TagsView::new(client);
            match view.rename(TagId(id), &name).await {
                Ok(tag) => {
                    println!("Renamed tag {} to {}", tag.id, tag.name);
                    ExitCode::SUCCESS
                }
                Err(_) => failure(view.mutation_error().unwrap_or("Failed to update tag")),
            }
        }
        TagsCommand::Delete { id } => {
            let mut view = TagsView::new(client);
            match view.delete(TagId(id)).await {
                Ok(()) => {
                    println!("Tag {} deleted", id);
                    ExitCode::SUCCESS
                }
                Err(_) => failure(view.mutation_error().unwrap_or("Failed to delete tag")),
            }
        }
    }
}

fn print_tags(result: Result<Vec<Tag>, String>) -> ExitCode {
    match result {
        Ok(tags) if tags.is_empty() => {
            println!("No tags found. Create your first tag to get started!");
            ExitCode::SUCCESS
        }
        Ok(tags) => {
            for tag in &tags {
                println!("{}", render::tag_line(tag));
            }
            ExitCode::SUCCESS
        }
        Err(message) => failure(&message),
    }
}

async fn quiz<I: BufRead, O: Write>(
    client: ApiClient,
    tags: &[String],
    seed: Option<u64>,
    input: I,
    mut output: O,
) -> ExitCode {
    let mut start = QuizStart::new(client);
    start.load().await;
    if let Some(code) = report(start.tags()) {
        return code;
    }
    for name in tags {
        let known = start
            .tags()
            .value()
            .is_some_and(|all| all.iter().any(|tag| tag.name == *name));
        if !known {
            event!(Level::WARN, tag = %name, "tag is not in the catalog");
        }
        if !start.selected().contains(name) {
            start.toggle(name);
        }
    }

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let deck = match start.start(&mut rng).await {
        Ok(deck) => deck,
        Err(e) => return failure(start.error().unwrap_or(&e.to_string())),
    };

    match run_flashcards(deck, input, &mut output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => failure(&e.to_string()),
    }
}

/// 한 줄에 명령 하나: `n` 다음, `p` 이전, `a` 답 보기/숨기기, `q` 끝내기.
pub fn run_flashcards<I: BufRead, O: Write>(
    mut deck: Flashcards,
    input: I,
    mut output: O,
) -> Result<(), Error> {
    writeln!(output, "{}", render::flashcard(&deck))?;
    if deck.is_empty() {
        return Ok(());
    }

    for line in input.lines() {
        match line?.trim() {
            "n" | "next" => {
                deck.next();
            }
            "p" | "prev" | "previous" => {
                deck.previous();
            }
            "a" | "answer" | "" => deck.toggle_answer(),
            "q" | "quit" => break,
            other => {
                writeln!(output, "Unknown command '{}'", other)?;
                continue;
            }
        }
        writeln!(output, "\n{}", render::flashcard(&deck))?;
    }
    Ok(())
}
