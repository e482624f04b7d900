//! VipGate Telegram Bot
//!
//! Main application entry point

use std::net::SocketAddr;
use std::sync::Arc;
use teloxide::{prelude::*, types::Update};
use teloxide::dispatching::UpdateHandler;
use teloxide::update_listeners::{webhooks, UpdateListener};
use tokio::net::TcpListener;
use teloxide::utils::command::BotCommands;
use tracing::{info, warn, error, debug};

use vipgate::{
    config::Settings,
    utils::logging,
    database::DatabaseService,
    services::ServiceFactory,
    server,
    utils::errors::VipGateError,
    handlers::{
        Command,
        handle_command,
        handle_callback_query,
        handle_message,
    },
};

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new()?;
    settings.validate()?;

    // Initialize logging; the guard flushes the file writer on exit
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", vipgate::info());

    // Load the user registry and the config document
    let database = DatabaseService::load(&settings.storage, &settings.bot.admin_ids).await?;

    // Initialize bot
    let bot = Bot::new(&settings.bot.token);

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        warn!(error = %e, "Failed to register the command list");
    }

    // Initialize services
    let services = Arc::new(ServiceFactory::new(bot.clone(), &settings, database));

    let mut dispatcher = Dispatcher::builder(bot.clone(), create_handler())
        .dependencies(dptree::deps![services])
        .default_handler(|upd| async move {
            debug!("Unhandled update: {:?}", upd.kind);
        })
        .error_handler(LoggingErrorHandler::with_custom_text("An error has occurred in the dispatcher"))
        .enable_ctrlc_handler()
        .build();

    let address = SocketAddr::from(([0, 0, 0, 0], settings.bot.port));
    let endpoint = settings.webhook_endpoint()?;
    info!(address = %address, url = %endpoint, "Registering webhook");

    let (mut listener, stop_flag, webhook_app) =
        webhooks::axum_to_router(bot, webhooks::Options::new(address, endpoint)).await?;
    let stop_token = listener.stop_token();
    let app = webhook_app.merge(server::health_router());
    let tcp_listener = TcpListener::bind(address).await?;

    tokio::spawn(async move {
        if let Err(e) = server::serve(tcp_listener, app, stop_flag).await {
            error!(error = %e, "HTTP server failed");
            stop_token.stop();
        }
    });

    info!("VipGate bot is ready!");

    dispatcher
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("An error from the update listener"),
        )
        .await;

    info!("VipGate bot has been shut down.");

    Ok(())
}

/// Create the main update handler
fn create_handler() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    dptree::entry()
        .branch(
            Update::filter_message()
                .branch(
                    // Handle commands
                    dptree::entry()
                        .filter_command::<Command>()
                        .endpoint(handle_commands),
                )
                .branch(
                    // Contacts and free text
                    dptree::endpoint(handle_messages),
                ),
        )
        .branch(Update::filter_callback_query().endpoint(handle_callbacks))
}

/// Handle bot commands
async fn handle_commands(
    bot: Bot,
    msg: Message,
    cmd: Command,
    services: Arc<ServiceFactory>,
) -> HandlerResult {
    if let Err(e) = handle_command(bot, msg, cmd, (*services).clone()).await {
        report(&e, "command");
        return Err(e.into());
    }

    Ok(())
}

/// Handle contacts and free text
async fn handle_messages(
    bot: Bot,
    msg: Message,
    services: Arc<ServiceFactory>,
) -> HandlerResult {
    if let Err(e) = handle_message(bot, msg, (*services).clone()).await {
        report(&e, "message");
        return Err(e.into());
    }

    Ok(())
}

/// Handle callback queries
async fn handle_callbacks(
    bot: Bot,
    query: CallbackQuery,
    services: Arc<ServiceFactory>,
) -> HandlerResult {
    let user_id = query.from.id.0 as i64;

    if let Err(e) = handle_callback_query(bot, query, (*services).clone()).await {
        warn!(user_id = user_id, "Callback query failed");
        report(&e, "callback query");
        return Err(e.into());
    }

    Ok(())
}

fn report(e: &VipGateError, kind: &str) {
    if e.is_recoverable() {
        warn!(error = %e, severity = %e.severity(), "Error handling {}", kind);
    } else {
        error!(error = %e, severity = %e.severity(), "Error handling {}", kind);
    }
}
