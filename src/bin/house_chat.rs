//! House Chat - terminal client
//!
//! Reads lines from stdin and sends each one as `{"content": line}`.
//! Relay events are printed as they arrive.
//!
//! Usage:
//!   ./house_chat                                  # config/house_chat.yaml or defaults
//!   HOUSE_CHAT_URL=ws://localhost:9000 ./house_chat
//!   HOUSE_CHAT_CONFIG_PATH=my.yaml ./house_chat

use anyhow::Result;
use house_chat::bin_common::{
    load_config_from_env, BinaryRunner, ConfigType, ConnectionWatch, RunConfig, ShutdownManager,
};
use house_chat::config::ChatConfig;
use house_chat::logging::init_tracing_with_level;
use house_chat::peerlink::{DataText, Listener, Message, Outbound};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

/// How long to wait for the closing handshake on exit
const CLOSE_GRACE: Duration = Duration::from_secs(2);

fn timestamp() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

fn print_line(from: &str, content: &str) {
    println!("[{}] {}: {}", timestamp(), from, content);
}

fn print_system(content: &str) {
    println!("[{}] * {}", timestamp(), content);
}

fn message_content(message: &Message) -> String {
    match message.get_str("content") {
        Some(content) => content.to_string(),
        None => message.as_value().to_string(),
    }
}

struct HouseChat {
    run_config: RunConfig,
    config: ChatConfig,
    shutdown: Arc<ShutdownManager>,
}

impl BinaryRunner for HouseChat {
    fn config(&self) -> &RunConfig {
        &self.run_config
    }

    async fn run(&mut self) -> Result<()> {
        let watch = Arc::new(ConnectionWatch::new());
        let (on_open, on_retry, on_closed) =
            (Arc::clone(&watch), Arc::clone(&watch), Arc::clone(&watch));

        let client = self
            .config
            .client_builder()
            .on(Listener::open(move |self_id| {
                on_open.mark_open();
                print_system(&format!("joined as {}", self_id))
            }))
            .on(Listener::connect(|peer| {
                print_system(&format!("{} has joined", peer))
            }))
            .on(Listener::disconnect(|peer| {
                print_system(&format!("{} has left", peer))
            }))
            .on(Listener::data(|message, peer| {
                print_line(peer, &message_content(message))
            }))
            .on(Listener::data_string(|text: &DataText, peer| {
                print_line(peer, &text.to_string())
            }))
            .on(Listener::reconnecting(move |reason, delay| {
                on_retry.mark_down();
                print_system(&format!(
                    "connection lost ({}), retrying in {:.1}s",
                    reason,
                    delay.as_secs_f64()
                ))
            }))
            .on(Listener::closed(move |code| {
                print_system(&format!("connection closed ({})", code));
                on_closed.mark_down();
            }))
            .build()?;

        client.open();

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            tokio::select! {
                _ = self.shutdown.wait() => break,
                line = lines.next_line() => match line? {
                    Some(line) => {
                        let line = line.trim_end();
                        if line.is_empty() {
                            continue;
                        }
                        client.send(Outbound::json(&json!({ "content": line }))?);
                    }
                    None => {
                        info!("stdin closed");
                        self.shutdown.trigger();
                        break;
                    }
                },
            }
        }

        client.close();
        if !watch.wait_closed(CLOSE_GRACE).await {
            warn!("Connection did not confirm closure within {:?}", CLOSE_GRACE);
        }

        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Load config
    let config_path = load_config_from_env(ConfigType::Chat);
    let config = ChatConfig::load(&config_path)?;

    // Initialize logging
    init_tracing_with_level(&config.log_level, config.debug);
    config.log();

    let shutdown = Arc::new(ShutdownManager::new());
    shutdown.spawn_signal_handler();

    let mut app = HouseChat {
        run_config: RunConfig::new("house.chat").with_endpoint(config.url.clone()),
        config,
        shutdown,
    };

    app.execute().await
}
