//! Ringlock demo binary.
//!
//! Runs the full engine against mock hardware and drives the trigger from
//! stdin, so the ring-code decoder, lockout guard, and relock scheduler
//! can be exercised without a physical installation.
//!
//! ```text
//! ringlock [config.json]
//!
//!   p       press the doorbell button
//!   r       release the doorbell button
//!   u       write target state = unsecured (accessory side)
//!   s       write target state = secured
//!   q       quit
//! ```
//!
//! The configuration file uses the flat JSON layout of the reference
//! installation (`anyMin` .. `veryLongMax` plus a `code` array of class
//! integers). A rejected configuration is reported loudly and the engine
//! runs disarmed: bells and lockout accounting still work, but the
//! terminal unlock step is unreachable.

use anyhow::Context;
use ringlock_core::{ActivePolarity, CodeConfig, LockTargetState, constants::AUTO_SECURITY_PULSE};
use ringlock_engine::{Engine, HardwareSettings, spawn_capture};
use ringlock_hardware::mock::{MockActuator, MockAudio, MockTrigger};
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn load_config(path: Option<&Path>) -> CodeConfig {
    let Some(path) = path else {
        info!("no configuration file given; running disarmed");
        return CodeConfig::disarmed();
    };

    let loaded = std::fs::read_to_string(path)
        .context("reading configuration file")
        .and_then(|raw| serde_json::from_str::<CodeConfig>(&raw).context("parsing configuration"));

    match loaded {
        Ok(config) => {
            info!(path = %path.display(), steps = config.code.len(), "ring code configured");
            config
        }
        Err(error) => {
            // A bad code must not be silently truncated into something
            // that half-works.
            error!(path = %path.display(), %error, "configuration rejected; running disarmed");
            CodeConfig::disarmed()
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config_path = std::env::args().nth(1);
    let config = load_config(config_path.as_deref().map(Path::new));

    let (trigger, trigger_handle) = MockTrigger::new();
    let (actuator, actuator_handle) = MockActuator::new();
    let (sink, _audio_handle) = MockAudio::new();

    let (engine, handle, mut notify_rx) = Engine::new(
        config,
        actuator,
        sink,
        HardwareSettings::new(),
        AUTO_SECURITY_PULSE,
    )?;

    let capture = spawn_capture(trigger, ActivePolarity::default(), handle.clone());
    let engine_task = tokio::spawn(engine.run());
    let notify_task = tokio::spawn(async move {
        while let Some(notification) = notify_rx.recv().await {
            info!(?notification, "accessory notification");
        }
    });

    info!("ready; commands: p(ress) r(elease) u(nsecure) s(ecure) q(uit)");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "p" => trigger_handle.press()?,
            "r" => trigger_handle.release()?,
            "u" => handle.set_target(LockTargetState::Unsecured).await?,
            "s" => handle.set_target(LockTargetState::Secured).await?,
            "q" => break,
            "" => {}
            other => warn!(command = other, "unknown command"),
        }
        info!(lock = %actuator_handle.physical_state(), "physical state");
    }

    // Orderly teardown: disconnect the trigger so the capture thread
    // exits, then stop the dispatcher and wait for everything to drain.
    drop(trigger_handle);
    handle.shutdown().await?;
    engine_task.await??;
    if capture.join().is_err() {
        warn!("capture thread panicked during shutdown");
    }
    notify_task.await?;

    info!("goodbye");
    Ok(())
}
