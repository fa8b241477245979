use std::io::{self, IsTerminal, Write};

use async_trait::async_trait;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("terminal i/o failed: {0}")]
    Io(#[from] io::Error),
    #[error("input closed")]
    Closed,
    #[error("prompt interrupted")]
    Interrupted,
}

/// Operator input. Any error here ends the interactive loop.
#[async_trait]
pub trait Prompter: Send {
    /// Index into `items` of the chosen entry.
    async fn select(&mut self, label: &str, items: &[String]) -> Result<usize, PromptError>;
    async fn input(&mut self, label: &str) -> Result<String, PromptError>;
    async fn password(&mut self, label: &str) -> Result<String, PromptError>;
}

pub struct TerminalPrompter {
    lines: Lines<BufReader<Stdin>>,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    async fn read_line(&mut self) -> Result<String, PromptError> {
        match self.lines.next_line().await? {
            Some(line) => Ok(line),
            None => Err(PromptError::Closed),
        }
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

fn show(text: &str) -> io::Result<()> {
    let mut stdout = io::stdout();
    write!(stdout, "{text}")?;
    stdout.flush()
}

#[async_trait]
impl Prompter for TerminalPrompter {
    async fn select(&mut self, label: &str, items: &[String]) -> Result<usize, PromptError> {
        let mut menu = format!("\n{label}\n");
        for (i, item) in items.iter().enumerate() {
            menu.push_str(&format!("  {}) {}\n", i + 1, item));
        }
        show(&menu)?;

        loop {
            show("> ")?;
            let line = self.read_line().await?;
            match line.trim().parse::<usize>() {
                Ok(n) if (1..=items.len()).contains(&n) => return Ok(n - 1),
                _ => show(&format!("Choose a number between 1 and {}\n", items.len()))?,
            }
        }
    }

    async fn input(&mut self, label: &str) -> Result<String, PromptError> {
        show(&format!("{label}: "))?;
        self.read_line().await
    }

    async fn password(&mut self, label: &str) -> Result<String, PromptError> {
        if !io::stdin().is_terminal() {
            return self.input(label).await;
        }
        show(&format!("{label}: "))?;
        let secret = tokio::task::spawn_blocking(read_masked)
            .await
            .map_err(io::Error::other)??;
        secret.ok_or(PromptError::Interrupted)
    }
}

/// Reads one line with echo replaced by `*`. `None` on Ctrl-C or Esc.
fn read_masked() -> io::Result<Option<String>> {
    enable_raw_mode()?;
    let result = read_masked_raw();
    disable_raw_mode()?;
    println!();
    result
}

fn read_masked_raw() -> io::Result<Option<String>> {
    let mut secret = String::new();
    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Enter => return Ok(Some(secret)),
            KeyCode::Esc => return Ok(None),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return Ok(None),
            KeyCode::Backspace => {
                if secret.pop().is_some() {
                    show("\u{8} \u{8}")?;
                }
            }
            KeyCode::Char(c) => {
                secret.push(c);
                show("*")?;
            }
            _ => {}
        }
    }
}

#[cfg(test)]
pub use scripted::{Answer, ScriptedPrompter};

#[cfg(test)]
mod scripted {
    use std::collections::VecDeque;

    use super::*;

    #[derive(Debug, Clone)]
    pub enum Answer {
        /// Picks the menu entry with this exact label.
        Pick(&'static str),
        Text(&'static str),
    }

    /// Replays canned answers; runs dry with `PromptError::Closed`.
    #[derive(Default)]
    pub struct ScriptedPrompter {
        answers: VecDeque<Answer>,
        pub seen_menus: Vec<Vec<String>>,
    }

    impl ScriptedPrompter {
        pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
            Self {
                answers: answers.into_iter().collect(),
                seen_menus: Vec::new(),
            }
        }

        fn next(&mut self) -> Result<Answer, PromptError> {
            self.answers.pop_front().ok_or(PromptError::Closed)
        }
    }

    #[async_trait]
    impl Prompter for ScriptedPrompter {
        async fn select(&mut self, label: &str, items: &[String]) -> Result<usize, PromptError> {
            self.seen_menus.push(items.to_vec());
            match self.next()? {
                Answer::Pick(want) => items.iter().position(|i| i == want).ok_or_else(|| {
                    io::Error::new(
                        io::ErrorKind::InvalidInput,
                        format!("'{want}' not offered in '{label}': {items:?}"),
                    )
                    .into()
                }),
                other => panic!("expected a pick for '{label}', got {other:?}"),
            }
        }

        async fn input(&mut self, label: &str) -> Result<String, PromptError> {
            match self.next()? {
                Answer::Text(text) => Ok(text.to_string()),
                other => panic!("expected text for '{label}', got {other:?}"),
            }
        }

        async fn password(&mut self, label: &str) -> Result<String, PromptError> {
            self.input(label).await
        }
    }
}
