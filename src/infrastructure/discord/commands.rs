//! Slash command definitions and guild synchronization.
//!
//! Commands are scoped to the single test guild named by `TEST_GUILD_ID`;
//! they are published at startup and re-published on demand by `/sync`.

use std::sync::Arc;

use twilight_http::Client as HttpClient;
use twilight_model::application::command::{Command, CommandType};
use twilight_model::id::marker::{ApplicationMarker, GuildMarker};
use twilight_model::id::Id;
use twilight_util::builder::command::{CommandBuilder, StringBuilder};

use crate::application::errors::BotError;

pub const MANAGE: &str = "manage";
pub const EXTENSIONS: &str = "extensions";
pub const SYNC: &str = "sync";

/// Name of the required choice option on `/manage`.
pub const ACTION_OPTION: &str = "action";

/// The full command set published to the guild.
pub fn definitions() -> Vec<Command> {
    vec![
        CommandBuilder::new(
            MANAGE,
            "Load, unload, or reload an extension at runtime",
            CommandType::ChatInput,
        )
        .option(
            StringBuilder::new(ACTION_OPTION, "Lifecycle operation to perform")
                .required(true)
                .choices([
                    ("load", "load"),
                    ("unload", "unload"),
                    ("reload", "reload"),
                ]),
        )
        .build(),
        CommandBuilder::new(
            EXTENSIONS,
            "Show currently loaded extensions",
            CommandType::ChatInput,
        )
        .build(),
        CommandBuilder::new(
            SYNC,
            "Re-publish slash commands to the test guild",
            CommandType::ChatInput,
        )
        .build(),
    ]
}

/// Replace the guild's command set with [`definitions`].
pub async fn sync_guild_commands(
    http: &Arc<HttpClient>,
    application_id: Id<ApplicationMarker>,
    guild_id: Id<GuildMarker>,
) -> Result<(), BotError> {
    let commands = definitions();
    http.interaction(application_id)
        .set_guild_commands(guild_id, &commands)
        .await
        .map_err(|e| BotError::Platform(format!("Failed to set guild commands: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publishes_the_three_management_commands() {
        let defs = definitions();
        let names: Vec<&str> = defs.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec![MANAGE, EXTENSIONS, SYNC]);
    }

    #[test]
    fn manage_requires_an_action_choice() {
        let defs = definitions();
        let manage = defs.iter().find(|c| c.name == MANAGE).unwrap();
        assert_eq!(manage.options.len(), 1);

        let action = &manage.options[0];
        assert_eq!(action.name, ACTION_OPTION);
        assert_eq!(action.required, Some(true));
        assert_eq!(
            action.choices.as_ref().map(|c| c.len()),
            Some(3),
            "one choice per lifecycle operation"
        );
    }
}
