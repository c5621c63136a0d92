use crate::cli::commands::{audit, open_pool};
use crate::cli::parser::{Commands, OnboardAction};
use crate::config::Config;
use crate::core::changes::ChangeHub;
use crate::core::onboarding::{Onboarding, parse_selection};
use crate::errors::AppResult;
use crate::ui::messages::{info, success};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Onboard { action } = cmd {
        let mut pool = open_pool(cfg)?;

        match action {
            OnboardAction::Start { subjects } => {
                let selection = subjects
                    .iter()
                    .map(|s| parse_selection(s))
                    .collect::<AppResult<Vec<_>>>()?;

                let token =
                    Onboarding::start(&mut pool, &cfg.onboarding_secret, &cfg.student, &selection)?;

                audit(
                    &pool,
                    "onboard",
                    &cfg.student,
                    &format!("Pending setup with {} subjects", selection.len()),
                );
                info("Keep this token to finish the setup once your account is verified:");
                println!("{}", token);
            }

            OnboardAction::Finish { token } => {
                let hub = ChangeHub::new();
                let added = Onboarding::finish(&mut pool, &hub, &cfg.onboarding_secret, token)?;

                let codes: Vec<&str> = added.iter().map(|t| t.subject.as_str()).collect();
                audit(
                    &pool,
                    "onboard",
                    "finish",
                    &format!("Added subjects: {}", codes.join(", ")),
                );
                if codes.is_empty() {
                    info("Setup applied; all subjects were already configured.");
                } else {
                    success(format!("Setup applied: {}", codes.join(", ")));
                }
            }
        }
    }

    Ok(())
}
