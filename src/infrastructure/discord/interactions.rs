//! Interaction handling for the management commands.
//!
//! `/manage` arms a one-shot select-menu prompt; its submission drives the
//! armed -> in-progress -> done message sequence around the registry call.
//! Every path ends in a terminal user-visible state: failures are mapped to
//! fixed messages, and a final catch-all reports anything unanticipated
//! instead of crashing the handler.

use std::sync::Arc;

use tracing::{error, warn};
use uuid::Uuid;

use twilight_model::application::interaction::application_command::{
    CommandData, CommandOptionValue,
};
use twilight_model::application::interaction::message_component::MessageComponentInteractionData;
use twilight_model::application::interaction::{Interaction, InteractionData};
use twilight_model::channel::message::component::{
    ActionRow, Component, SelectMenu, SelectMenuOption, SelectMenuType,
};
use twilight_model::channel::message::MessageFlags;
use twilight_model::http::interaction::{
    InteractionResponse, InteractionResponseData, InteractionResponseType,
};
use twilight_model::id::marker::ApplicationMarker;
use twilight_model::id::Id;
use twilight_model::util::Timestamp;
use twilight_util::builder::embed::{EmbedAuthorBuilder, EmbedBuilder, ImageSource};

use super::commands;
use super::runtime::BotContext;
use crate::application::errors::BotError;
use crate::application::lifecycle::{outcome_message, SelectPrompt, PROMPT_TIMEOUT};
use crate::domain::entities::OpKind;
use crate::domain::traits::ExtensionRegistry;
use crate::infrastructure::config;

/// Discord caps select menus at 25 options.
const MAX_SELECT_OPTIONS: usize = 25;

const SELECT_PLACEHOLDER: &str = "Extension name";

/// An armed prompt awaiting its single submission.
pub struct PendingPrompt {
    pub op: OpKind,
    pub prompt: SelectPrompt,
    /// Token of the interaction that created the prompt message; used to
    /// edit that message through every state transition.
    pub origin_token: String,
}

/// Entry point for one interaction, run on its own task.
pub async fn handle<R: ExtensionRegistry + 'static>(
    ctx: Arc<BotContext<R>>,
    interaction: Interaction,
) {
    let result = match interaction.data.clone() {
        Some(InteractionData::ApplicationCommand(data)) => {
            handle_command(&ctx, &interaction, &data).await
        }
        Some(InteractionData::MessageComponent(data)) => {
            handle_component(&ctx, &interaction, &data).await
        }
        _ => Ok(()),
    };

    if let Err(err) = result {
        error!("Interaction handler failed: {err}");
        report_failure(&ctx, &interaction, &err).await;
    }
}

async fn handle_command<R: ExtensionRegistry + 'static>(
    ctx: &Arc<BotContext<R>>,
    interaction: &Interaction,
    data: &CommandData,
) -> Result<(), BotError> {
    match data.name.as_str() {
        commands::MANAGE => match action_option(data) {
            Some(op) => start_prompt(ctx, interaction, op).await,
            None => respond_ephemeral(ctx, interaction, "Unrecognized action").await,
        },
        commands::EXTENSIONS => list_extensions(ctx, interaction).await,
        commands::SYNC => sync_commands(ctx, interaction).await,
        other => {
            warn!("Unrecognized command: {other}");
            respond_ephemeral(ctx, interaction, &format!("Unrecognized command: {other}")).await
        }
    }
}

fn action_option(data: &CommandData) -> Option<OpKind> {
    data.options.iter().find_map(|opt| {
        if opt.name != commands::ACTION_OPTION {
            return None;
        }
        match &opt.value {
            CommandOptionValue::String(value) => OpKind::parse(value),
            _ => None,
        }
    })
}

/// Arm a selection prompt for `op` and schedule its expiry.
async fn start_prompt<R: ExtensionRegistry + 'static>(
    ctx: &Arc<BotContext<R>>,
    interaction: &Interaction,
    op: OpKind,
) -> Result<(), BotError> {
    // Candidates are a fresh snapshot per request, never cached: extension
    // availability changes between commands.
    let mut candidates = ctx
        .manager
        .candidates(op)
        .await
        .map_err(|e| BotError::Platform(e.to_string()))?;

    if candidates.is_empty() {
        return respond_ephemeral(ctx, interaction, &format!("No extensions available to {op}"))
            .await;
    }
    if candidates.len() > MAX_SELECT_OPTIONS {
        warn!(
            "{} candidates for {op}, truncating to {MAX_SELECT_OPTIONS}",
            candidates.len()
        );
        candidates.truncate(MAX_SELECT_OPTIONS);
    }

    let custom_id = Uuid::new_v4().to_string();
    let row = select_row(&custom_id, &candidates, false, SELECT_PLACEHOLDER);
    respond(
        ctx,
        interaction,
        InteractionResponseData {
            content: Some(format!("Select an extension to {op}")),
            components: Some(vec![row]),
            ..Default::default()
        },
    )
    .await?;

    ctx.prompts.lock().await.insert(
        custom_id.clone(),
        PendingPrompt {
            op,
            prompt: SelectPrompt::new(candidates),
            origin_token: interaction.token.clone(),
        },
    );

    let ctx = ctx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(PROMPT_TIMEOUT).await;
        expire_prompt(ctx, custom_id).await;
    });

    Ok(())
}

/// Timeout path: if the prompt was never submitted, rewrite the hosting
/// message to its timed-out state and drop the widget. Submitted prompts are
/// already out of the map, so this is a no-op for them.
async fn expire_prompt<R: ExtensionRegistry>(
    ctx: Arc<BotContext<R>>,
    custom_id: String,
) {
    let pending = {
        let mut prompts = ctx.prompts.lock().await;
        let expired = prompts
            .get_mut(&custom_id)
            .map(|p| p.prompt.expire())
            .unwrap_or(false);
        if expired {
            prompts.remove(&custom_id)
        } else {
            None
        }
    };

    if let Some(pending) = pending {
        let app_id = match application_id(&ctx) {
            Ok(id) => id,
            Err(_) => return,
        };
        if let Err(e) = ctx
            .http
            .interaction(app_id)
            .update_response(&pending.origin_token)
            .content(Some("Selection timed out"))
            .components(None)
            .await
        {
            warn!("Failed to edit timed-out prompt: {e}");
        }
    }
}

async fn handle_component<R: ExtensionRegistry>(
    ctx: &Arc<BotContext<R>>,
    interaction: &Interaction,
    data: &MessageComponentInteractionData,
) -> Result<(), BotError> {
    let submission = {
        let mut prompts = ctx.prompts.lock().await;
        let choice = data.values.first().cloned();
        match (prompts.remove(&data.custom_id), choice) {
            (Some(mut pending), Some(choice)) => match pending.prompt.submit(&choice) {
                Ok(()) => Some((pending, choice)),
                Err(e) => {
                    // Leave the prompt in place for its timeout task.
                    warn!("Rejected submission: {e}");
                    prompts.insert(data.custom_id.clone(), pending);
                    None
                }
            },
            (Some(pending), None) => {
                prompts.insert(data.custom_id.clone(), pending);
                None
            }
            (None, _) => None,
        }
    };

    match submission {
        Some((pending, choice)) => {
            run_submission(ctx, interaction, &data.custom_id, pending, choice).await
        }
        None => {
            // Stale or duplicate interaction: acknowledge silently so the
            // client does not display a failure.
            let app_id = application_id(ctx)?;
            ctx.http
                .interaction(app_id)
                .create_response(
                    interaction.id,
                    &interaction.token,
                    &InteractionResponse {
                        kind: InteractionResponseType::DeferredUpdateMessage,
                        data: None,
                    },
                )
                .await
                .map_err(|e| BotError::Platform(format!("Failed to acknowledge: {e}")))?;
            Ok(())
        }
    }
}

/// The submission sequence: disable the prompt, acknowledge the operator,
/// apply the operation, report the outcome, finalize the prompt message.
/// The message-state transitions are strictly sequential.
async fn run_submission<R: ExtensionRegistry>(
    ctx: &Arc<BotContext<R>>,
    interaction: &Interaction,
    custom_id: &str,
    pending: PendingPrompt,
    choice: String,
) -> Result<(), BotError> {
    let op = pending.op;
    let app_id = application_id(ctx)?;
    let client = ctx.http.interaction(app_id);

    // The selector stays visible but permanently disabled, relabeled with
    // the chosen identifier.
    let resolved_row = select_row(custom_id, pending.prompt.candidates(), true, &choice);

    client
        .update_response(&pending.origin_token)
        .content(Some(&format!("{} in progress", op.verb())))
        .components(Some(std::slice::from_ref(&resolved_row)))
        .await
        .map_err(|e| BotError::Platform(format!("Failed to update prompt message: {e}")))?;

    client
        .create_response(
            interaction.id,
            &interaction.token,
            &InteractionResponse {
                kind: InteractionResponseType::ChannelMessageWithSource,
                data: Some(InteractionResponseData {
                    content: Some(format!("{} {choice}...", op.gerund())),
                    flags: Some(MessageFlags::EPHEMERAL),
                    ..Default::default()
                }),
            },
        )
        .await
        .map_err(|e| BotError::Platform(format!("Failed to acknowledge submission: {e}")))?;

    let outcome = ctx.manager.apply(op, &choice).await;
    let message = outcome_message(op, &choice, &outcome);

    if let Err(e) = client
        .update_response(&interaction.token)
        .content(Some(&message))
        .await
    {
        error!("Failed to report outcome: {e}");
    }

    // Terminal state regardless of outcome: the operator is never left
    // looking at "in progress".
    if let Err(e) = client
        .update_response(&pending.origin_token)
        .content(Some(&format!("{} complete", op.verb())))
        .components(Some(std::slice::from_ref(&resolved_row)))
        .await
    {
        error!("Failed to finalize prompt message: {e}");
    }

    Ok(())
}

/// `/extensions`: one embed listing the active set, one identifier per line.
async fn list_extensions<R: ExtensionRegistry>(
    ctx: &Arc<BotContext<R>>,
    interaction: &Interaction,
) -> Result<(), BotError> {
    let active = ctx.manager.active().await;
    let description = if active.is_empty() {
        "(none)".to_string()
    } else {
        active.join("\n")
    };

    let timestamp = Timestamp::from_secs(chrono::Utc::now().timestamp())
        .map_err(|e| BotError::Platform(format!("Invalid timestamp: {e}")))?;

    let name = ctx
        .bot_user
        .get()
        .cloned()
        .unwrap_or_else(|| ctx.display_name.clone());
    let mut author = EmbedAuthorBuilder::new(name);
    if let Some(icon) = config::bot_icon() {
        match ImageSource::url(icon) {
            Ok(source) => author = author.icon_url(source),
            Err(e) => warn!("Ignoring invalid BOT_ICON_URL: {e}"),
        }
    }

    let embed = EmbedBuilder::new()
        .title("Extensions")
        .description(description)
        .timestamp(timestamp)
        .author(author.build())
        .build();

    respond(
        ctx,
        interaction,
        InteractionResponseData {
            embeds: Some(vec![embed]),
            ..Default::default()
        },
    )
    .await
}

/// `/sync`: re-publish the command set to the configured guild. The guild id
/// is read fresh at this point of use; a missing value is reported, not
/// swallowed.
async fn sync_commands<R: ExtensionRegistry>(
    ctx: &Arc<BotContext<R>>,
    interaction: &Interaction,
) -> Result<(), BotError> {
    let app_id = application_id(ctx)?;
    let client = ctx.http.interaction(app_id);

    client
        .create_response(
            interaction.id,
            &interaction.token,
            &InteractionResponse {
                kind: InteractionResponseType::ChannelMessageWithSource,
                data: Some(InteractionResponseData {
                    content: Some("Syncing commands...".to_string()),
                    ..Default::default()
                }),
            },
        )
        .await
        .map_err(|e| BotError::Platform(format!("Failed to respond: {e}")))?;

    let result = match config::test_guild() {
        Ok(guild_id) => commands::sync_guild_commands(&ctx.http, app_id, guild_id).await,
        Err(e) => Err(BotError::Config(e)),
    };
    let message = match result {
        Ok(()) => "Commands synced".to_string(),
        Err(e) => format!("Sync failed: {e}"),
    };

    if let Err(e) = client
        .update_response(&interaction.token)
        .content(Some(&message))
        .await
    {
        error!("Failed to report sync result: {e}");
    }

    Ok(())
}

fn application_id<R: ExtensionRegistry>(
    ctx: &BotContext<R>,
) -> Result<Id<ApplicationMarker>, BotError> {
    ctx.application_id
        .get()
        .copied()
        .ok_or_else(|| BotError::Platform("interaction received before READY".to_string()))
}

async fn respond<R: ExtensionRegistry>(
    ctx: &BotContext<R>,
    interaction: &Interaction,
    data: InteractionResponseData,
) -> Result<(), BotError> {
    let app_id = application_id(ctx)?;
    ctx.http
        .interaction(app_id)
        .create_response(
            interaction.id,
            &interaction.token,
            &InteractionResponse {
                kind: InteractionResponseType::ChannelMessageWithSource,
                data: Some(data),
            },
        )
        .await
        .map_err(|e| BotError::Platform(format!("Failed to respond: {e}")))?;
    Ok(())
}

async fn respond_ephemeral<R: ExtensionRegistry>(
    ctx: &BotContext<R>,
    interaction: &Interaction,
    content: &str,
) -> Result<(), BotError> {
    respond(
        ctx,
        interaction,
        InteractionResponseData {
            content: Some(content.to_string()),
            flags: Some(MessageFlags::EPHEMERAL),
            ..Default::default()
        },
    )
    .await
}

/// Last-resort terminal response for unanticipated handler failures.
async fn report_failure<R: ExtensionRegistry>(
    ctx: &BotContext<R>,
    interaction: &Interaction,
    err: &BotError,
) {
    let Ok(app_id) = application_id(ctx) else {
        return;
    };
    let client = ctx.http.interaction(app_id);
    let message = format!("An unexpected error occurred:\n{err}");

    let acked = client
        .create_response(
            interaction.id,
            &interaction.token,
            &InteractionResponse {
                kind: InteractionResponseType::ChannelMessageWithSource,
                data: Some(InteractionResponseData {
                    content: Some(message.clone()),
                    flags: Some(MessageFlags::EPHEMERAL),
                    ..Default::default()
                }),
            },
        )
        .await;

    if acked.is_err() {
        // The interaction was already acknowledged; edit that response.
        let _ = client
            .update_response(&interaction.token)
            .content(Some(&message))
            .await;
    }
}

/// One action row holding the single-choice selector (min = max = 1).
fn select_row(custom_id: &str, candidates: &[String], disabled: bool, placeholder: &str) -> Component {
    let options = candidates
        .iter()
        .map(|id| SelectMenuOption {
            default: false,
            description: None,
            emoji: None,
            label: id.clone(),
            value: id.clone(),
        })
        .collect();

    Component::ActionRow(ActionRow {
        components: vec![Component::SelectMenu(SelectMenu {
            channel_types: None,
            custom_id: custom_id.to_string(),
            default_values: None,
            disabled,
            kind: SelectMenuType::Text,
            max_values: Some(1),
            min_values: Some(1),
            options: Some(options),
            placeholder: Some(placeholder.to_string()),
        })],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unwrap_select(component: &Component) -> &SelectMenu {
        let Component::ActionRow(row) = component else {
            panic!("expected action row");
        };
        let Component::SelectMenu(menu) = &row.components[0] else {
            panic!("expected select menu");
        };
        menu
    }

    #[test]
    fn selector_enforces_single_choice() {
        let candidates = vec!["events".to_string(), "extension_manage".to_string()];
        let row = select_row("id-1", &candidates, false, SELECT_PLACEHOLDER);
        let menu = unwrap_select(&row);

        assert_eq!(menu.min_values, Some(1));
        assert_eq!(menu.max_values, Some(1));
        assert!(!menu.disabled);
        let options = menu.options.as_ref().unwrap();
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].label, "events");
        assert_eq!(options[0].value, "events");
    }

    #[test]
    fn resolved_selector_is_disabled_and_relabeled() {
        let candidates = vec!["events".to_string()];
        let row = select_row("id-1", &candidates, true, "events");
        let menu = unwrap_select(&row);

        assert!(menu.disabled);
        assert_eq!(menu.placeholder.as_deref(), Some("events"));
    }
}
