//! Entity behavior against a fake control server
//!
//! Each test loads one monitor through the Integration and drives its
//! entities, checking both the values they report and the requests sent.

mod helpers;

use better_display::{
    Entity, EntityKind, Integration, IntegrationConfig, Monitor, PollerConfig,
};
use helpers::{FakeMonitor, FakeState};
use proptest::prelude::*;
use std::time::Duration;

const SOURCES: &str = "hdmi1:15,hdmi2:16,dp:17";

async fn load(server: &FakeMonitor) -> (Integration, Monitor) {
    let config = IntegrationConfig::default().with_poller(
        PollerConfig::default().with_refresh_debounce(Duration::from_millis(20)),
    );
    let integration = Integration::new(config).unwrap();
    let monitor = integration
        .setup_entry(&server.entry("entry-1", "DELL", SOURCES))
        .await
        .unwrap();
    (integration, monitor)
}

#[tokio::test]
async fn test_entity_metadata() {
    let server = FakeMonitor::start().await;
    let (_integration, monitor) = load(&server).await;

    let ids: Vec<_> = monitor
        .entities()
        .iter()
        .map(|e| (e.info().kind, e.info().unique_id.clone()))
        .collect();
    assert_eq!(
        ids,
        [
            (EntityKind::Light, "DELL_brightness".to_string()),
            (EntityKind::Number, "DELL_brightness_number".to_string()),
            (EntityKind::Fan, "DELL_volume".to_string()),
            (EntityKind::Number, "DELL_volume_number".to_string()),
            (EntityKind::MediaPlayer, "DELL_volume_player".to_string()),
            (
                EntityKind::Select,
                "hass_better_display_DELL_input_source_select".to_string()
            ),
        ]
    );

    let select = monitor.entity("hass_better_display_DELL_input_source_select").unwrap();
    assert_eq!(select.info().name, "DELL Input Source");
    assert_eq!(select.info().device.configuration_url, server.url());

    let fan = monitor.fan.as_ref().unwrap();
    assert_eq!(fan.info().icon, Some("mdi:volume-high"));
    assert_eq!(fan.info().supported_features, ["set_speed", "turn_on", "turn_off"]);
}

// ============================================================================
// Light
// ============================================================================

#[tokio::test]
async fn test_light_reports_byte_brightness() {
    let server = FakeMonitor::with_state(FakeState {
        brightness: "0.5".to_string(),
        ..Default::default()
    })
    .await;
    let (_integration, monitor) = load(&server).await;
    let light = monitor.light.as_ref().unwrap();

    assert!(light.is_on());
    assert_eq!(light.brightness(), 128);
    assert_eq!(
        light.state(),
        serde_json::json!({"state": "on", "brightness": 128, "color_mode": "brightness"})
    );
}

#[tokio::test]
async fn test_light_turn_on_with_level() {
    let server = FakeMonitor::start().await;
    let (_integration, monitor) = load(&server).await;
    let light = monitor.light.as_ref().unwrap();

    assert!(light.turn_on(Some(128)).await);

    let write = server.last_write().unwrap();
    assert_eq!(write.param("feature"), Some("brightness"));
    assert_eq!(write.param("value"), Some("0.5"));
    assert_eq!(monitor.snapshot().brightness, 0.5);
    assert_eq!(light.brightness(), 128);
}

#[tokio::test]
async fn test_light_power() {
    let server = FakeMonitor::start().await;
    let (_integration, monitor) = load(&server).await;
    let light = monitor.light.as_ref().unwrap();

    assert!(light.turn_off().await);
    assert_eq!(server.last_write().unwrap().param("value"), Some("0"));
    assert!(!light.is_on());

    assert!(light.turn_on(None).await);
    assert_eq!(server.last_write().unwrap().param("value"), Some("1"));
    assert!(light.is_on());
    assert_eq!(light.brightness(), 255);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Any 0..255 level written through the light reads back within one step
    #[test]
    fn prop_light_level_round_trip(level in 0u8..=255) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let (accepted, read) = runtime.block_on(async {
            let server = FakeMonitor::start().await;
            let (_integration, monitor) = load(&server).await;
            let light = monitor.light.as_ref().unwrap();

            let accepted = light.turn_on(Some(level)).await;
            monitor.device().refresh().await.unwrap();
            (accepted, light.brightness())
        });

        prop_assert!(accepted);
        prop_assert!((i16::from(read) - i16::from(level)).abs() <= 1);
    }
}

// ============================================================================
// Fan
// ============================================================================

#[tokio::test]
async fn test_fan_power_follows_mute_only() {
    let server = FakeMonitor::with_state(FakeState {
        mute: "on".to_string(),
        ..Default::default()
    })
    .await;
    let (_integration, monitor) = load(&server).await;
    let fan = monitor.fan.as_ref().unwrap();

    assert!(!fan.is_on());
    assert_eq!(fan.percentage(), 30);

    assert!(fan.set_percentage(0).await);
    let write = server.last_write().unwrap();
    assert_eq!(write.param("feature"), Some("volume"));
    assert_eq!(write.param("value"), Some("0"));
    assert_eq!(fan.percentage(), 0);
    assert!(!fan.is_on());

    assert!(fan.turn_on(None).await);
    let write = server.last_write().unwrap();
    assert_eq!(write.param("feature"), Some("mute"));
    assert_eq!(write.param("value"), Some("off"));
    assert!(fan.is_on());
    assert_eq!(fan.percentage(), 0);

    assert!(fan.turn_off().await);
    assert_eq!(server.last_write().unwrap().param("value"), Some("on"));
    assert!(!fan.is_on());
}

#[tokio::test]
async fn test_fan_percentage_rounds_to_two_places() {
    let server = FakeMonitor::start().await;
    let (_integration, monitor) = load(&server).await;
    let fan = monitor.fan.as_ref().unwrap();

    assert!(fan.set_percentage(37).await);

    assert_eq!(server.last_write().unwrap().param("value"), Some("0.37"));
    assert_eq!(fan.percentage(), 37);
}

#[tokio::test]
async fn test_fan_turn_on_with_percentage() {
    let server = FakeMonitor::with_state(FakeState {
        mute: "on".to_string(),
        ..Default::default()
    })
    .await;
    let (_integration, monitor) = load(&server).await;
    let fan = monitor.fan.as_ref().unwrap();

    assert!(fan.turn_on(Some(40)).await);

    let writes: Vec<_> = server
        .writes()
        .iter()
        .map(|w| (w.param("feature").unwrap().to_string(), w.param("value").unwrap().to_string()))
        .collect();
    assert_eq!(
        writes,
        [
            ("mute".to_string(), "off".to_string()),
            ("volume".to_string(), "0.4".to_string())
        ]
    );
}

// ============================================================================
// Numbers and media player
// ============================================================================

#[tokio::test]
async fn test_numbers_pass_through_and_clamp() {
    let server = FakeMonitor::start().await;
    let (_integration, monitor) = load(&server).await;
    let brightness = monitor.brightness_number.as_ref().unwrap();
    let volume = monitor.volume_number.as_ref().unwrap();

    assert_eq!(brightness.value(), 0.7);
    assert_eq!(volume.value(), 0.3);

    assert!(volume.set_value(0.25).await);
    assert_eq!(server.last_write().unwrap().param("value"), Some("0.25"));
    assert_eq!(volume.value(), 0.25);

    assert!(brightness.set_value(1.7).await);
    assert_eq!(server.last_write().unwrap().param("value"), Some("1"));
    assert_eq!(brightness.value(), 1.0);

    let state = brightness.state();
    assert_eq!(state["step"], 0.0625);
    assert_eq!(brightness.info().device_class, Some("brightness"));
}

#[tokio::test]
async fn test_media_player_muted_at_zero() {
    let server = FakeMonitor::with_state(FakeState {
        volume: "0".to_string(),
        ..Default::default()
    })
    .await;
    let (_integration, monitor) = load(&server).await;
    let player = monitor.media_player.as_ref().unwrap();

    assert!(!player.is_on());
    assert!(player.is_volume_muted());

    assert!(player.set_volume_level(0.6).await);
    assert!(player.is_on());
    assert!(!player.is_volume_muted());
    assert_eq!(player.volume_level(), 0.6);
}

// ============================================================================
// Select
// ============================================================================

#[tokio::test]
async fn test_select_options_and_current() {
    let server = FakeMonitor::start().await;
    let (_integration, monitor) = load(&server).await;
    let select = monitor.select.as_ref().unwrap();

    assert_eq!(
        select.options(),
        ["switch to hdmi1", "switch to hdmi2", "switch to dp"]
    );
    assert_eq!(select.current_option().as_deref(), Some("switch to hdmi1"));
}

#[tokio::test]
async fn test_select_option_switches_source() {
    let server = FakeMonitor::start().await;
    let (_integration, monitor) = load(&server).await;
    let select = monitor.select.as_ref().unwrap();

    assert!(select.select_option("switch to dp").await);

    let write = server.last_write().unwrap();
    assert_eq!(write.param("vcp"), Some("inputSelect"));
    assert_eq!(write.param("ddc"), Some("17"));
    assert_eq!(write.param("name"), Some("DELL"));
    assert_eq!(select.current_option().as_deref(), Some("switch to dp"));
}

#[tokio::test]
async fn test_select_code_with_reserved_characters() {
    let server = FakeMonitor::start().await;
    let config = IntegrationConfig::default().with_poller(
        PollerConfig::default().with_refresh_debounce(Duration::from_millis(20)),
    );
    let integration = Integration::new(config).unwrap();
    let monitor = integration
        .setup_entry(&server.entry("entry-1", "DELL U2720Q", "usb-c:x:27,hdmi1:15"))
        .await
        .unwrap();
    let select = monitor.select.as_ref().unwrap();

    assert!(select.select_option("switch to usb-c").await);

    let write = server.last_write().unwrap();
    assert_eq!(write.param("ddc"), Some("x:27"));
    assert_eq!(write.param("name"), Some("DELL U2720Q"));
    assert_eq!(server.state().source, "x:27");

    // The follow-up refresh reads the code back from the server
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(monitor.snapshot().source_code, "x:27");
    assert_eq!(select.current_option().as_deref(), Some("switch to usb-c"));
}

#[tokio::test]
async fn test_select_unknown_option_sends_nothing() {
    let server = FakeMonitor::start().await;
    let (_integration, monitor) = load(&server).await;
    let select = monitor.select.as_ref().unwrap();

    assert!(!select.select_option("dp").await);
    assert!(server.writes().is_empty());
}

#[tokio::test]
async fn test_select_unconfigured_code_has_no_current_option() {
    let server = FakeMonitor::with_state(FakeState {
        source: "99".to_string(),
        ..Default::default()
    })
    .await;
    let (_integration, monitor) = load(&server).await;
    let select = monitor.select.as_ref().unwrap();

    assert_eq!(select.current_option(), None);
    assert_eq!(select.state()["state"], serde_json::Value::Null);
}

// ============================================================================
// Failures and updates
// ============================================================================

#[tokio::test]
async fn test_rejected_write_keeps_state() {
    let server = FakeMonitor::start().await;
    let (_integration, monitor) = load(&server).await;
    server.update(|s| s.reject_writes = true);
    let light = monitor.light.as_ref().unwrap();

    assert!(!light.turn_on(Some(10)).await);

    assert_eq!(monitor.snapshot().brightness, 0.7);
    assert_eq!(monitor.device().refresh_signal().requested_count(), 0);
}

#[tokio::test]
async fn test_entities_unavailable_after_failed_refresh() {
    let server = FakeMonitor::start().await;
    let (_integration, monitor) = load(&server).await;
    assert!(monitor.entities().iter().all(|e| e.available()));

    server.update(|s| s.offline = true);
    assert!(monitor.device().refresh().await.is_err());

    assert!(monitor.entities().iter().all(|e| !e.available()));
    assert_eq!(monitor.snapshot().volume, 0.3);
}

#[tokio::test]
async fn test_updates_fire_on_write() {
    let server = FakeMonitor::start().await;
    let (_integration, monitor) = load(&server).await;
    let light = monitor.light.clone().unwrap();
    let mut updates = light.updates();

    let waiter = tokio::spawn(async move { updates.changed().await });
    assert!(light.turn_off().await);

    let changed = tokio::time::timeout(Duration::from_secs(1), waiter)
        .await
        .unwrap()
        .unwrap();
    assert!(changed);
}

#[tokio::test]
async fn test_write_triggers_refresh_from_server() {
    let server = FakeMonitor::start().await;
    let (_integration, monitor) = load(&server).await;
    let volume = monitor.volume_number.as_ref().unwrap();

    assert!(volume.set_value(0.6).await);
    // The device now reports something else; the requested refresh picks it up
    server.update(|s| s.volume = "0.55".to_string());

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(volume.value(), 0.55);
}
