//! Menu-driven console loop.

pub mod prompt;

use std::io::Write;

use tracing::{error, warn};

use crate::auth::services as auth;
use crate::error::AppError;
use crate::habits::services as habits;
use crate::session::Session;
use crate::state::AppState;
use prompt::{PromptError, Prompter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Register,
    Login,
    AddHabit,
    ListHabits,
    DueToday,
    MarkDone,
    DeleteHabit,
    DeleteAccount,
    Logout,
    Exit,
}

impl Action {
    pub fn label(self) -> &'static str {
        match self {
            Action::Register => "Register",
            Action::Login => "Login",
            Action::AddHabit => "Add Habit",
            Action::ListHabits => "List Habits",
            Action::DueToday => "Today's Must Do",
            Action::MarkDone => "Mark Habit Done",
            Action::DeleteHabit => "Delete Habit",
            Action::DeleteAccount => "Delete Account",
            Action::Logout => "Logout",
            Action::Exit => "Exit",
        }
    }

    pub fn menu(authenticated: bool) -> &'static [Action] {
        if authenticated {
            &[
                Action::AddHabit,
                Action::ListHabits,
                Action::DueToday,
                Action::MarkDone,
                Action::DeleteHabit,
                Action::Logout,
                Action::DeleteAccount,
                Action::Exit,
            ]
        } else {
            &[Action::Register, Action::Login, Action::Exit]
        }
    }
}

/// Errors that stop the loop. Action failures are reported and swallowed.
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error(transparent)]
    Prompt(#[from] PromptError),
    #[error("console output failed: {0}")]
    Output(#[from] std::io::Error),
}

pub struct Shell<P, W> {
    state: AppState,
    session: Session,
    prompter: P,
    out: W,
}

impl<P: Prompter, W: Write> Shell<P, W> {
    pub fn new(state: AppState, prompter: P, out: W) -> Self {
        Self {
            state,
            session: Session::new(),
            prompter,
            out,
        }
    }

    #[cfg(test)]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Runs until the operator picks Exit.
    pub async fn run(&mut self) -> Result<(), ShellError> {
        loop {
            let label = match self.session.user() {
                Some(user) => format!("Select Action ({})", user.username),
                None => "Select Action".to_string(),
            };
            let menu = Action::menu(self.session.is_authenticated());
            let items: Vec<String> = menu.iter().map(|a| a.label().to_string()).collect();
            let action = menu[self.prompter.select(&label, &items).await?];

            if action == Action::Exit {
                writeln!(self.out, "Goodbye!")?;
                return Ok(());
            }

            match self.dispatch(action).await {
                Ok(()) => {}
                Err(Failure::Action(e)) => self.report(action, e)?,
                Err(Failure::Shell(e)) => return Err(e),
            }
        }
    }

    fn report(&mut self, action: Action, e: AppError) -> Result<(), ShellError> {
        if e.is_operator_error() {
            warn!(action = action.label(), error = %e, "action failed");
        } else {
            error!(action = action.label(), error = %e, "action failed");
        }
        writeln!(self.out, "Error: {e}")?;
        Ok(())
    }

    async fn dispatch(&mut self, action: Action) -> Result<(), Failure> {
        match action {
            Action::Register => self.register().await,
            Action::Login => self.login().await,
            Action::AddHabit => self.add_habit().await,
            Action::ListHabits => self.list_habits().await,
            Action::DueToday => self.due_today().await,
            Action::MarkDone => self.mark_done().await,
            Action::DeleteHabit => self.delete_habit().await,
            Action::DeleteAccount => self.delete_account().await,
            Action::Logout => self.logout(),
            Action::Exit => Ok(()),
        }
    }

    async fn register(&mut self) -> Result<(), Failure> {
        let username = self.prompter.input("Enter username").await?;
        let password = self.prompter.password("Enter password").await?;

        let user = auth::register(&self.state, &mut self.session, &username, &password).await?;
        writeln!(self.out, "User {} registered and logged in successfully!", user.username)?;
        self.warm_display_ids().await;
        Ok(())
    }

    async fn login(&mut self) -> Result<(), Failure> {
        let username = self.prompter.input("Enter username").await?;
        let password = self.prompter.password("Enter password").await?;

        let user = auth::login(&self.state, &mut self.session, &username, &password).await?;
        writeln!(self.out, "User {} logged in successfully!", user.username)?;
        self.warm_display_ids().await;
        Ok(())
    }

    /// Numbers the user's habits right after sign-in so "Today's Must Do"
    /// can show display ids before the first explicit listing.
    async fn warm_display_ids(&mut self) {
        if let Err(e) = habits::list_habits(&self.state, &mut self.session).await {
            warn!(error = %e, "could not fetch habits after sign-in");
        }
    }

    fn logout(&mut self) -> Result<(), Failure> {
        auth::logout(&mut self.session);
        writeln!(self.out, "Logged out successfully!")?;
        Ok(())
    }

    async fn add_habit(&mut self) -> Result<(), Failure> {
        self.session.require_user()?;
        let name = self.prompter.input("Enter habit name").await?;
        let description = self.prompter.input("Enter habit description").await?;

        habits::add_habit(&self.state, &self.session, &name, &description).await?;
        writeln!(self.out, "Habit added successfully!")?;
        Ok(())
    }

    async fn list_habits(&mut self) -> Result<(), Failure> {
        let listed = habits::list_habits(&self.state, &mut self.session).await?;
        if listed.is_empty() {
            writeln!(self.out, "You haven't added any habits yet!")?;
            return Ok(());
        }

        writeln!(self.out, "Your habits:")?;
        for l in &listed {
            writeln!(
                self.out,
                "{}. {} - {} (Days Completed: {})",
                l.display_id, l.habit.name, l.habit.description, l.habit.days_completed
            )?;
        }
        Ok(())
    }

    async fn due_today(&mut self) -> Result<(), Failure> {
        let due = habits::due_today(&self.state, &self.session).await?;
        if due.is_empty() {
            writeln!(self.out, "All habits are done for today!")?;
            return Ok(());
        }

        writeln!(self.out, "Habits must do today:")?;
        for h in &due {
            let number = match self.session.display_ids.display_of(h.id) {
                Some(n) => n.to_string(),
                None => "-".to_string(),
            };
            writeln!(
                self.out,
                "{}. {} - {} (Days Completed: {})",
                number, h.name, h.description, h.days_completed
            )?;
        }
        Ok(())
    }

    async fn mark_done(&mut self) -> Result<(), Failure> {
        let due = habits::due_today(&self.state, &self.session).await?;
        if due.is_empty() {
            writeln!(self.out, "All habits are already done for today!")?;
            return Ok(());
        }

        let names: Vec<String> = due.iter().map(|h| h.name.clone()).collect();
        let picked = self.prompter.select("Select Habit to Mark Done", &names).await?;

        let done = habits::mark_done(&self.state, &self.session, &due[picked]).await?;
        writeln!(self.out, "Habit '{}' marked as done for today!", done.name)?;
        Ok(())
    }

    async fn delete_habit(&mut self) -> Result<(), Failure> {
        self.session.require_user()?;
        let raw = self.prompter.input("Enter habit ID to delete").await?;
        let display_id = habits::parse_display_id(&raw)?;

        habits::delete_habit(&self.state, &self.session, display_id).await?;
        writeln!(self.out, "Habit deleted successfully!")?;
        Ok(())
    }

    async fn delete_account(&mut self) -> Result<(), Failure> {
        let username = self.session.require_user()?.username.clone();
        let answer = self
            .prompter
            .input(&format!("Delete account '{username}' and all its habits? [y/N]"))
            .await?;
        if !answer.trim().eq_ignore_ascii_case("y") {
            writeln!(self.out, "Aborted.")?;
            return Ok(());
        }

        auth::delete_account(&self.state, &mut self.session).await?;
        writeln!(self.out, "Account {username} deleted.")?;
        Ok(())
    }
}

/// Outcome of one dispatched action.
enum Failure {
    Action(AppError),
    Shell(ShellError),
}

impl From<AppError> for Failure {
    fn from(e: AppError) -> Self {
        Failure::Action(e)
    }
}

impl From<PromptError> for Failure {
    fn from(e: PromptError) -> Self {
        Failure::Shell(e.into())
    }
}

impl From<std::io::Error> for Failure {
    fn from(e: std::io::Error) -> Self {
        Failure::Shell(e.into())
    }
}
