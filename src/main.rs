mod commands;
mod config;
mod fqe;

use poise::serenity_prelude as serenity;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

type Error = Box<dyn std::error::Error + Send + Sync>;
type Context<'a> = poise::Context<'a, Data, Error>;

// User data, which is stored and accessible in all command invocations
pub struct Data {
    fqe: fqe::FqeClient,
}

async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {:?}", error);
            std::process::exit(1);
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command `{}`: {:?}", ctx.command().name, error);
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {}", e)
            }
        }
    }
}

async fn event_handler(
    _ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    _data: &Data,
) -> Result<(), Error> {
    if let serenity::FullEvent::Ready { data_about_bot, .. } = event {
        info!(
            "Logged in as {}#{}",
            data_about_bot.user.name,
            data_about_bot
                .user
                .discriminator
                .map(|d| d.to_string())
                .unwrap_or_default()
        );
    }
    Ok(())
}

/// Deletes the commands this bot registered, from the scope they were registered in.
async fn remove_commands(
    http: &serenity::Http,
    guild_id: Option<u64>,
    names: &[String],
) -> Result<(), serenity::Error> {
    match guild_id {
        Some(id) => {
            let guild = serenity::GuildId::new(id);
            for command in guild.get_commands(http).await? {
                if names.contains(&command.name) {
                    guild.delete_command(http, command.id).await?;
                    info!("Removed command '{}' from guild {}", command.name, id);
                }
            }
        }
        None => {
            for command in serenity::Command::get_global_commands(http).await? {
                if names.contains(&command.name) {
                    serenity::Command::delete_global_command(http, command.id).await?;
                    info!("Removed global command '{}'", command.name);
                }
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match config::BotConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid bot parameters: {}", e);
            std::process::exit(1);
        }
    };

    let fqe = match fqe::FqeClient::new(&config.fqe) {
        Ok(client) => client,
        Err(e) => {
            error!("Cannot build the FQE client: {}", e);
            std::process::exit(1);
        }
    };

    let options = poise::FrameworkOptions {
        commands: vec![commands::ping(), commands::elo()],
        // The global error handler for all error cases that may occur
        on_error: |error| Box::pin(on_error(error)),
        // This code is run before every command
        pre_command: |ctx| {
            Box::pin(async move {
                info!(
                    user = %ctx.author().name,
                    "Executing command {}...",
                    ctx.command().qualified_name
                );
            })
        },
        // This code is run after a command if it was successful (returned Ok)
        post_command: |ctx| {
            Box::pin(async move {
                info!("Executed command {}!", ctx.command().qualified_name);
            })
        },
        event_handler: |ctx, event, framework, data| {
            Box::pin(event_handler(ctx, event, framework, data))
        },
        ..Default::default()
    };
    let command_names: Vec<String> = options.commands.iter().map(|c| c.name.clone()).collect();

    let guild_id = config.guild_id;
    let framework = poise::Framework::builder()
        .setup(move |ctx, _ready, framework| {
            Box::pin(async move {
                info!("Adding commands...");
                match guild_id {
                    Some(id) => {
                        poise::builtins::register_in_guild(
                            ctx,
                            &framework.options().commands,
                            serenity::GuildId::new(id),
                        )
                        .await?
                    }
                    None => {
                        poise::builtins::register_globally(ctx, &framework.options().commands)
                            .await?
                    }
                }

                Ok(Data { fqe })
            })
        })
        .options(options)
        .build();

    let intents = serenity::GatewayIntents::non_privileged();
    let mut client = match serenity::ClientBuilder::new(&config.token, intents)
        .framework(framework)
        .await
    {
        Ok(client) => client,
        Err(e) => {
            error!("Cannot open the session: {}", e);
            std::process::exit(1);
        }
    };

    let http = client.http.clone();
    let shard_manager = client.shard_manager.clone();
    let mut session = tokio::spawn(async move { client.start().await });

    info!("Press Ctrl+C to exit");
    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                error!("Cannot listen for Ctrl+C: {}", e);
            }
        }
        stopped = &mut session => {
            match stopped {
                Ok(Ok(())) => warn!("Session ended on its own"),
                Ok(Err(e)) => error!("Session failed: {}", e),
                Err(e) => error!("Session task panicked: {}", e),
            }
            std::process::exit(1);
        }
    }

    if config.remove_commands {
        info!("Removing commands...");
        if let Err(e) = remove_commands(&http, config.guild_id, &command_names).await {
            error!("Cannot remove commands: {}", e);
        }
    }

    shard_manager.shutdown_all().await;
    info!("Gracefully shutting down.");
}
