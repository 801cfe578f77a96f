//! Terminal prompts answering removal questions

use console::Term;
use dialoguer::{theme::ColorfulTheme, Confirm, Select};

use crate::mutator::{DecisionProvider, MultiUseChoice, Scripted};

/// Asks on the terminal when one is attached, otherwise answers from the
/// command-line flags
pub struct TerminalDecisions {
    interactive: bool,
    fallback: Scripted,
    theme: ColorfulTheme,
}

impl TerminalDecisions {
    pub fn new(fallback: Scripted) -> Self {
        Self {
            interactive: Term::stderr().is_term() && Term::stdout().is_term(),
            fallback,
            theme: ColorfulTheme::default(),
        }
    }

    /// Never prompt
    pub fn scripted(fallback: Scripted) -> Self {
        Self {
            interactive: false,
            ..Self::new(fallback)
        }
    }
}

impl DecisionProvider for TerminalDecisions {
    fn confirm(&mut self, message: &str) -> bool {
        if !self.interactive || self.fallback.confirm {
            return self.fallback.confirm(message);
        }
        Confirm::with_theme(&self.theme)
            .with_prompt(message)
            .default(false)
            .interact()
            .unwrap_or(false)
    }

    fn multi_use(&mut self, type_name: &str, usages: usize) -> Option<MultiUseChoice> {
        if !self.interactive || self.fallback.multi_use.is_some() {
            return self.fallback.multi_use(type_name, usages);
        }
        let options = &[
            "Cancel",
            "Remove only this usage",
            "Remove the method from the class (all usages)",
        ];
        let selection = Select::with_theme(&self.theme)
            .with_prompt(format!("{} is used by {} registrations", type_name, usages))
            .items(options)
            .default(0)
            .interact()
            .ok()?;
        match selection {
            1 => Some(MultiUseChoice::ThisUsageOnly),
            2 => Some(MultiUseChoice::AllUsages),
            _ => Some(MultiUseChoice::Cancel),
        }
    }
}
