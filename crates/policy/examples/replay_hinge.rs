//! Example: Replay a hinge sweep through the tent-mode policy.
//!
//! Run with: cargo run -p foldstate-policy --example replay_hinge

use foldstate_events::{event_names, DeviceStateChangedEvent, InMemoryEventBus};
use foldstate_policy::device_states::REAR_DISPLAY;
use foldstate_policy::{DeviceStatePolicy, PolicySettings, TentModePolicy};
use foldstate_provider::Capabilities;
use foldstate_sensors::{NullProvider, RequesterToken, SensorSample};
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("foldstate_provider=debug,foldstate_policy=debug")
        .init();

    println!("=== Hinge Replay Example ===");

    // Samples are pushed below instead of polled
    let settings = PolicySettings {
        sensor_poll_interval_ms: 0,
        ..PolicySettings::from_json_str("{}")?
    };

    let null = Arc::new(NullProvider);
    let policy = TentModePolicy::new(
        settings,
        Capabilities {
            sensors: null.clone(),
            environment: null.clone(),
            foreground: null,
        },
    )?;

    let bus = Arc::new(InMemoryEventBus::new());
    policy.attach_event_bus(bus.clone());
    let provider = policy.get_device_state_provider();

    println!("Closing from flat, then propping up into tent posture...\n");
    for angle in [180.0, 120.0, 60.0, 20.0, 4.0, 30.0, 75.0, 90.0, 100.0, 180.0] {
        provider.on_sensor_sample(SensorSample::angle(angle));
        provider.flush()?;
        println!(
            "angle {:>5.1} -> {}",
            angle,
            provider.table().name_of(provider.get_state())
        );
    }

    println!("\nRequesting REAR_DISPLAY, then closing the device...\n");
    let token = RequesterToken::new();
    provider.request_override(REAR_DISPLAY, token)?;
    println!("override   -> {}", provider.table().name_of(provider.get_state()));

    provider.on_sensor_sample(SensorSample::angle(2.0));
    provider.flush()?;
    println!("angle   2.0 -> {}", provider.table().name_of(provider.get_state()));

    println!("\nPublished events:");
    let changes: Vec<DeviceStateChangedEvent> =
        bus.payloads_for(event_names::DEVICE_STATE_CHANGED);
    for event in changes {
        println!(
            "[{}] {:<18} previous={:?} overridden={}",
            chrono::DateTime::from_timestamp_millis(event.timestamp_ms)
                .map(|t| t.format("%H:%M:%S%.3f").to_string())
                .unwrap_or_default(),
            event.name,
            event.previous,
            event.overridden
        );
    }

    println!("\nDone.");
    Ok(())
}
