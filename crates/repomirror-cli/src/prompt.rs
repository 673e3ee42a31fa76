//! Interactive operator prompts

use dialoguer::theme::ColorfulTheme;
use dialoguer::Select;
use repomirror_types::{Error, IncomingDecision, OperatorPrompt, Result, RetiredDecision};
use std::path::Path;
use tracing::info;

const INCOMING_CHOICES: [&str; 3] = [
    "Continue with the staged files",
    "Restart: clear the incoming and retired directories",
    "Stop",
];

const RETIRED_CHOICES: [&str; 3] = [
    "Delete the retired files first",
    "Continue, keeping the retired files",
    "Stop",
];

/// Asks the operator on the terminal
#[derive(Default)]
pub struct ConsolePrompt {
    theme: ColorfulTheme,
}

impl ConsolePrompt {
    /// Create a prompt with the colorful theme
    pub fn new() -> Self {
        Self::default()
    }

    fn select(&self, question: String, choices: &[&str]) -> Result<usize> {
        Select::with_theme(&self.theme)
            .with_prompt(question)
            .items(choices)
            .default(0)
            .interact()
            .map_err(|e| Error::user_abort(format!("prompt interrupted: {}", e)))
    }
}

fn incoming_decision(choice: usize) -> IncomingDecision {
    match choice {
        0 => IncomingDecision::Continue,
        1 => IncomingDecision::Restart,
        _ => IncomingDecision::Stop,
    }
}

fn retired_decision(choice: usize) -> RetiredDecision {
    match choice {
        0 => RetiredDecision::Delete,
        1 => RetiredDecision::Continue,
        _ => RetiredDecision::Stop,
    }
}

impl OperatorPrompt for ConsolePrompt {
    fn resolve_incoming(&self, incoming: &Path, entries: usize) -> Result<IncomingDecision> {
        let choice = self.select(
            format!(
                "'{}' holds {} entries from an earlier run",
                incoming.display(),
                entries
            ),
            &INCOMING_CHOICES,
        )?;
        let decision = incoming_decision(choice);
        info!("Incoming directory: operator chose {:?}", decision);
        Ok(decision)
    }

    fn resolve_retired(&self, retired: &Path, entries: usize) -> Result<RetiredDecision> {
        let choice = self.select(
            format!(
                "'{}' holds {} files from an earlier run",
                retired.display(),
                entries
            ),
            &RETIRED_CHOICES,
        )?;
        let decision = retired_decision(choice);
        info!("Retired directory: operator chose {:?}", decision);
        Ok(decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, IncomingDecision::Continue)]
    #[case(1, IncomingDecision::Restart)]
    #[case(2, IncomingDecision::Stop)]
    fn test_incoming_choices(#[case] choice: usize, #[case] expected: IncomingDecision) {
        assert_eq!(incoming_decision(choice), expected);
        assert!(choice < INCOMING_CHOICES.len());
    }

    #[rstest]
    #[case(0, RetiredDecision::Delete)]
    #[case(1, RetiredDecision::Continue)]
    #[case(2, RetiredDecision::Stop)]
    fn test_retired_choices(#[case] choice: usize, #[case] expected: RetiredDecision) {
        assert_eq!(retired_decision(choice), expected);
        assert!(choice < RETIRED_CHOICES.len());
    }
}
