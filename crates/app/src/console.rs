//! Line-oriented quiz screens over any `BufRead`/`Write` pair.

use std::io::{self, BufRead, Write};

use quiz_core::model::{CategoryId, CategorySummary, QuizId, QuizSummary};
use quiz_core::time::format_minutes_seconds;
use services::{
    AdvanceOutcome, AnswerFeedback, AppServices, CatalogService, QuizSession, QuizSessionService,
};

const BAR_WIDTH: usize = 20;

/// How a played session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayExit {
    /// The user finished and chose to quit.
    Finished,
    /// Input ran out before the user quit.
    Abandoned,
}

pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }

    /// Next trimmed line, or `None` at end of input.
    fn prompt(&mut self, text: &str) -> io::Result<Option<String>> {
        write!(self.output, "{text}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_owned()))
    }

    /// Ask for a 1-based choice in `1..=count`; returns the 0-based index.
    fn choose(&mut self, text: &str, count: usize) -> io::Result<Option<usize>> {
        loop {
            let Some(answer) = self.prompt(text)? else {
                return Ok(None);
            };
            match answer.parse::<usize>() {
                Ok(n) if (1..=count).contains(&n) => return Ok(Some(n - 1)),
                _ => writeln!(self.output, "Please enter a number from 1 to {count}.")?,
            }
        }
    }

    pub fn print_categories(&mut self, categories: &[CategorySummary]) -> io::Result<()> {
        writeln!(self.output, "Choose a Category")?;
        for (i, category) in categories.iter().enumerate() {
            writeln!(
                self.output,
                "  {}) {} {} ({} quizzes) - {}",
                i + 1,
                category.icon,
                category.name,
                category.quiz_count,
                category.description
            )?;
        }
        Ok(())
    }

    pub fn print_quizzes(&mut self, category: &CategoryId, quizzes: &[QuizSummary]) -> io::Result<()> {
        if quizzes.is_empty() {
            writeln!(self.output, "No quizzes in {category} yet.")?;
            return Ok(());
        }
        for (i, quiz) in quizzes.iter().enumerate() {
            writeln!(
                self.output,
                "  {}) {} [{}] {} questions, ~{} min - {}",
                i + 1,
                quiz.title,
                quiz.difficulty,
                quiz.question_count,
                quiz.estimated_time,
                quiz.description
            )?;
        }
        Ok(())
    }

    /// Listing for one category. An unknown category gets a not-found message
    /// pointing back to the category list; returns whether it was found.
    ///
    /// # Errors
    ///
    /// Returns provider and I/O failures.
    pub async fn show_category(
        &mut self,
        catalog: &CatalogService,
        id: &CategoryId,
    ) -> Result<bool, Box<dyn std::error::Error>> {
        let Some(category) = catalog.get_category(id).await? else {
            tracing::warn!(category = %id, "category not found");
            writeln!(self.output, "Category {id} not found.")?;
            writeln!(self.output, "Run `quiz categories` to see what is available.")?;
            return Ok(false);
        };
        let quizzes = catalog.list_quizzes(&category.id).await?;
        writeln!(self.output, "{} {}", category.icon, category.name)?;
        self.print_quizzes(&category.id, &quizzes)?;
        Ok(true)
    }

    /// Category menu, then quiz menu, then play. Returns `None` if input ran out
    /// before a quiz was picked.
    ///
    /// # Errors
    ///
    /// Returns provider, session and I/O failures.
    pub async fn browse(
        &mut self,
        app: &AppServices,
    ) -> Result<Option<PlayExit>, Box<dyn std::error::Error>> {
        let catalog = app.catalog();
        let categories = catalog.list_categories().await?;
        if categories.is_empty() {
            writeln!(self.output, "The catalog is empty.")?;
            return Ok(None);
        }

        loop {
            self.print_categories(&categories)?;
            let Some(pick) = self.choose("Category: ", categories.len())? else {
                return Ok(None);
            };
            let category = &categories[pick];
            let quizzes = catalog.list_quizzes(&category.id).await?;
            writeln!(self.output)?;
            writeln!(self.output, "{} {}", category.icon, category.name)?;
            self.print_quizzes(&category.id, &quizzes)?;
            if quizzes.is_empty() {
                continue;
            }

            let Some(pick) = self.choose("Quiz: ", quizzes.len())? else {
                return Ok(None);
            };
            let exit = self.play(&app.sessions(), &quizzes[pick].id).await?;
            return Ok(Some(exit));
        }
    }

    /// Start a session on `quiz_id` and play it until the user quits.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the quiz cannot be started, or I/O failures.
    pub async fn play(
        &mut self,
        sessions: &QuizSessionService,
        quiz_id: &QuizId,
    ) -> Result<PlayExit, Box<dyn std::error::Error>> {
        let mut session = sessions.start_session(quiz_id).await?;
        loop {
            if !self.run_questions(sessions, &mut session)? {
                return Ok(PlayExit::Abandoned);
            }
            self.print_results(sessions, &session)?;

            let Some(answer) = self.prompt("[r] Retake Quiz  [q] Quit: ")? else {
                return Ok(PlayExit::Abandoned);
            };
            if answer.eq_ignore_ascii_case("r") {
                sessions.restart(&mut session);
                writeln!(self.output)?;
            } else {
                return Ok(PlayExit::Finished);
            }
        }
    }

    /// Walk every question. Returns `false` if input ran out first.
    fn run_questions(
        &mut self,
        sessions: &QuizSessionService,
        session: &mut QuizSession,
    ) -> Result<bool, Box<dyn std::error::Error>> {
        loop {
            let phase = session.phase();
            if phase.is_completed() {
                return Ok(true);
            }

            if phase.accepts_selection() {
                self.print_question(session)?;
                let count = session.current_question().map_or(0, |q| q.option_count());
                let Some(choice) = self.choose("Your answer: ", count)? else {
                    return Ok(false);
                };
                session.select_option(choice)?;
                if session.phase().can_submit() {
                    let feedback = session.submit_answer()?;
                    self.print_feedback(session, &feedback)?;
                }
            } else if phase.can_advance() {
                let label = if session.is_last_question() {
                    "Finish Quiz"
                } else {
                    "Next Question"
                };
                if self.prompt(&format!("[Enter] {label} "))?.is_none() {
                    return Ok(false);
                }
                if let AdvanceOutcome::NextQuestion { .. } = sessions.advance(session)? {
                    writeln!(self.output)?;
                }
            } else {
                tracing::warn!(?phase, "no action available");
                return Ok(false);
            }
        }
    }

    fn print_feedback(
        &mut self,
        session: &QuizSession,
        feedback: &AnswerFeedback,
    ) -> io::Result<()> {
        if feedback.is_correct {
            writeln!(self.output, "Correct!")?;
        } else {
            let answer = session
                .current_question()
                .and_then(|q| q.option(feedback.correct_index))
                .unwrap_or_default();
            writeln!(
                self.output,
                "Incorrect. The answer is {}) {answer}",
                feedback.correct_index + 1
            )?;
        }
        writeln!(self.output, "Explanation: {}", feedback.explanation)
    }

    fn print_question(&mut self, session: &QuizSession) -> io::Result<()> {
        let Some(question) = session.current_question() else {
            return Ok(());
        };
        let progress = session.progress();
        let fraction = session.progress_fraction().unwrap_or(1.0);

        writeln!(self.output, "{}", session.quiz().title())?;
        writeln!(
            self.output,
            "Question {} of {} {}",
            progress.position,
            progress.total,
            progress_bar(fraction, BAR_WIDTH)
        )?;
        writeln!(self.output, "{}", question.prompt())?;
        for (i, option) in question.options().iter().enumerate() {
            writeln!(self.output, "  {}) {option}", i + 1)?;
        }
        Ok(())
    }

    fn print_results(
        &mut self,
        sessions: &QuizSessionService,
        session: &QuizSession,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let result = session.result()?;
        writeln!(self.output)?;
        writeln!(self.output, "Quiz Complete! {}", session.quiz().title())?;
        writeln!(self.output, "Score: {} / {}", result.correct(), result.total())?;
        writeln!(self.output, "Accuracy: {}%", result.accuracy_percent())?;
        writeln!(
            self.output,
            "Time: {}",
            format_minutes_seconds(sessions.elapsed(session))
        )?;
        writeln!(self.output, "{}", result.tier().message())?;
        for (i, review) in result.answers().iter().enumerate() {
            let mark = if review.is_correct { "+" } else { "-" };
            writeln!(
                self.output,
                "  {mark} Q{}: answered {}, correct {}",
                i + 1,
                review.selected + 1,
                review.correct_index + 1
            )?;
        }
        Ok(())
    }
}

/// `[#####-----]`-style bar for a fraction in `[0, 1]`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn progress_bar(fraction: f64, width: usize) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::Category;
    use quiz_core::time::fixed_clock;
    use std::io::Cursor;
    use storage::repository::Storage;
    use storage::Catalog;

    fn console(script: &str) -> Console<Cursor<Vec<u8>>, Vec<u8>> {
        Console::new(Cursor::new(script.as_bytes().to_vec()), Vec::new())
    }

    fn output(console: Console<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        String::from_utf8(console.into_output()).unwrap()
    }

    #[test]
    fn progress_bar_fills_proportionally() {
        assert_eq!(progress_bar(0.0, 4), "[----]");
        assert_eq!(progress_bar(0.5, 4), "[##--]");
        assert_eq!(progress_bar(1.0, 4), "[####]");
        assert_eq!(progress_bar(3.0, 4), "[####]");
    }

    #[tokio::test]
    async fn plays_a_full_quiz_and_quits() {
        let app = AppServices::in_memory(fixed_clock()).unwrap();
        // Five questions: answer 1 then Enter for each, then quit.
        let script = "1\n\n".repeat(5) + "q\n";
        let mut console = console(&script);

        let exit = console
            .play(&app.sessions(), &QuizId::new("algebra-basics"))
            .await
            .unwrap();
        assert_eq!(exit, PlayExit::Finished);

        let text = output(console);
        assert!(text.contains("Question 1 of 5"));
        assert!(text.contains("Question 5 of 5"));
        assert!(text.contains("Finish Quiz"));
        assert!(text.contains("Quiz Complete!"));
        assert!(text.contains("Time: 0:00"));
    }

    #[tokio::test]
    async fn invalid_choice_reprompts() {
        let app = AppServices::in_memory(fixed_clock()).unwrap();
        let mut console = console("9\nabc\n");

        let exit = console
            .play(&app.sessions(), &QuizId::new("geometry"))
            .await
            .unwrap();
        assert_eq!(exit, PlayExit::Abandoned);

        let text = output(console);
        assert_eq!(text.matches("Please enter a number from 1 to").count(), 2);
    }

    #[tokio::test]
    async fn retake_restarts_from_the_first_question() {
        let app = AppServices::in_memory(fixed_clock()).unwrap();
        let script = "2\n\n".repeat(5) + "r\n" + &"2\n\n".repeat(5) + "q\n";
        let mut console = console(&script);

        let exit = console
            .play(&app.sessions(), &QuizId::new("calculus"))
            .await
            .unwrap();
        assert_eq!(exit, PlayExit::Finished);
        assert_eq!(output(console).matches("Quiz Complete!").count(), 2);
    }

    #[tokio::test]
    async fn browse_walks_from_category_to_quiz() {
        let app = AppServices::in_memory(fixed_clock()).unwrap();
        // Math category (third), first quiz, then abandon.
        let mut console = console("3\n1\n");

        let exit = console.browse(&app).await.unwrap();
        assert_eq!(exit, Some(PlayExit::Abandoned));

        let text = output(console);
        assert!(text.contains("Choose a Category"));
        assert!(text.contains("Algebra Basics"));
        assert!(text.contains("Question 1 of 5"));
    }

    fn empty_category_app() -> AppServices {
        let music = Category::new(CategoryId::new("music"), "Music", "Scales and keys", "~").unwrap();
        let storage = Storage::from_catalog(Catalog::new(vec![music], Vec::new()).unwrap());
        AppServices::new(&storage, fixed_clock())
    }

    #[tokio::test]
    async fn unknown_category_is_not_found() {
        let app = empty_category_app();
        let mut console = console("");

        let found = console
            .show_category(&app.catalog(), &CategoryId::new("cooking"))
            .await
            .unwrap();
        assert!(!found);

        let text = output(console);
        assert!(text.contains("Category cooking not found."));
        assert!(text.contains("quiz categories"));
        assert!(!text.contains("No quizzes"));
    }

    #[tokio::test]
    async fn empty_category_is_listed_as_empty() {
        let app = empty_category_app();
        let mut console = console("");

        let found = console
            .show_category(&app.catalog(), &CategoryId::new("music"))
            .await
            .unwrap();
        assert!(found);

        let text = output(console);
        assert!(text.contains("~ Music"));
        assert!(text.contains("No quizzes in music yet."));
        assert!(!text.contains("not found"));
    }

    #[tokio::test]
    async fn known_category_lists_its_quizzes() {
        let app = AppServices::in_memory(fixed_clock()).unwrap();
        let mut console = console("");

        console
            .show_category(&app.catalog(), &CategoryId::new("science"))
            .await
            .unwrap();
        let text = output(console);
        assert!(text.contains("Physics Basics"));
        assert_eq!(text.matches(" questions, ~").count(), 4);
    }

    #[tokio::test]
    async fn unknown_quiz_is_reported() {
        let app = AppServices::in_memory(fixed_clock()).unwrap();
        let mut console = console("");
        let err = console
            .play(&app.sessions(), &QuizId::new("missing"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "quiz missing is unavailable");
    }
}
