//! Console dashboard for one BetterDisplay monitor
//!
//! Loads a monitor, prints every entity's state, then reprints whenever the
//! cached state changes. Ctrl-C unloads the entry and exits.
//!
//! Run with:
//!   cargo run -p better-display --example monitor_dashboard -- \
//!       http://192.168.6.248:55777 "DELL U2720Q" "hdmi1:15,hdmi2:16,dp:17"
//!
//! Set DISPLAY_LOG_MODE=development to see poller and write logs.

use better_display::{
    logging, ConfigEntry, Entity, EntryInput, Integration, IntegrationConfig, Monitor, SdkError,
    DEFAULT_NAME, DEFAULT_SOURCE_LIST,
};

#[tokio::main]
async fn main() -> Result<(), SdkError> {
    if let Err(e) = logging::init_logging_from_env() {
        eprintln!("Logging disabled: {}", e);
    }

    let mut args = std::env::args().skip(1);
    let input = EntryInput {
        base_url: args
            .next()
            .unwrap_or_else(|| "http://127.0.0.1:55777".to_string()),
        device_name: args.next().unwrap_or_else(|| DEFAULT_NAME.to_string()),
        source_list: args
            .next()
            .unwrap_or_else(|| DEFAULT_SOURCE_LIST.to_string()),
    };

    let data = input.validate().map_err(|errors| {
        SdkError::InvalidConfig(
            errors
                .iter()
                .map(|(field, key)| format!("{}: {}", field, key))
                .collect::<Vec<_>>()
                .join(", "),
        )
    })?;

    println!("BetterDisplay dashboard");
    println!("=======================");
    println!("Connecting to {} at {}...", data.device_name, data.base_url);

    let integration = Integration::new(IntegrationConfig::default())?;
    let monitor = match integration
        .setup_entry(&ConfigEntry::new("dashboard", data))
        .await
    {
        Ok(monitor) => monitor,
        Err(SdkError::EntryNotReady { device, reason }) => {
            println!("{} is not reachable yet: {}", device, reason);
            println!("Make sure BetterDisplay is running with its HTTP server enabled");
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    print_states(&monitor);

    let Some(mut updates) = monitor.entities().first().map(|e| e.updates()) else {
        return Ok(());
    };

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if !changed {
                    break;
                }
                print_states(&monitor);
            }
            _ = tokio::signal::ctrl_c() => {
                println!("\nShutting down...");
                break;
            }
        }
    }

    integration.shutdown().await;
    Ok(())
}

fn print_states(monitor: &Monitor) {
    let availability = if monitor.available() { "online" } else { "offline" };
    println!("\n{} ({})", monitor.name, availability);
    for entity in monitor.entities() {
        println!("  {:<32} {}", entity.info().name, entity.state());
    }
}
