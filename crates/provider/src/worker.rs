//! Serialized command loop for the provider.
//!
//! Sensor samples, override requests, environment changes and the
//! foreground-check tick are all funnelled through one channel into a
//! dedicated thread, so no two of them ever interleave.

use crate::error::Result;
use crate::listener::ListenerRef;
use crate::machine::ProviderCore;
use crossbeam_channel::{select, Receiver, Sender};
use foldstate_sensors::{RequesterToken, SensorSample};
use foldstate_states::StateId;
use std::time::Duration;

/// Request sent to the provider worker.
pub enum Command {
    /// Re-resolve against a new sensor sample.
    Sample(SensorSample),
    /// Register a listener after all earlier commands.
    AddListener(ListenerRef),
    RequestOverride {
        state: StateId,
        token: RequesterToken,
        reply: Sender<Result<()>>,
    },
    CancelOverride {
        token: RequesterToken,
        reply: Sender<bool>,
    },
    /// Run the foreground check now instead of waiting for the tick.
    CheckForeground,
    /// Re-read the environment capability.
    EnvironmentChanged,
    /// Reply once every earlier command has been handled.
    Flush(Sender<()>),
    /// Stop the worker.
    Shutdown,
}

/// The command loop running on the provider thread.
pub fn run(mut core: ProviderCore, commands: Receiver<Command>, foreground_interval: Option<Duration>) {
    tracing::info!(?foreground_interval, "device state worker started");

    let ticker = match foreground_interval {
        Some(interval) if !interval.is_zero() => crossbeam_channel::tick(interval),
        _ => crossbeam_channel::never(),
    };

    loop {
        select! {
            recv(commands) -> msg => match msg {
                Ok(Command::Shutdown) | Err(_) => break,
                Ok(command) => handle(&mut core, command),
            },
            recv(ticker) -> _ => core.check_foreground(),
        }
    }

    tracing::info!("device state worker stopped");
}

fn handle(core: &mut ProviderCore, command: Command) {
    match command {
        Command::Sample(sample) => core.on_sensor_sample(sample),
        Command::AddListener(listener) => core.add_listener(listener),
        Command::RequestOverride {
            state,
            token,
            reply,
        } => {
            let _ = reply.send(core.request_override(state, token));
        }
        Command::CancelOverride { token, reply } => {
            let _ = reply.send(core.cancel_override(token));
        }
        Command::CheckForeground => core.check_foreground(),
        Command::EnvironmentChanged => core.on_environment_changed(),
        Command::Flush(reply) => {
            let _ = reply.send(());
        }
        // Handled by the loop.
        Command::Shutdown => {}
    }
}
