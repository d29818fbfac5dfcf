//! The resident process: keyboard hook, overlay thread and engine loop.
//!
//! Threads:
//! - the hook thread owned by [`win_hotkey::Manager`]
//! - a bridge thread moving hook events onto the engine channel
//! - the overlay thread owned by [`OverlayHost`]
//! - this thread, which joins the COM apartment and runs the engine on a
//!   current-thread runtime
use std::{sync::Arc, thread};

use crossbeam_channel::unbounded;
use hintkeys_engine::{Engine, Services, UiEvent};
use tokio::{runtime::Builder, signal, sync::mpsc::unbounded_channel};
use tracing::{debug, info, warn};
use win_hotkey::Manager;
use win_ops::{OverlayHost, RealWinOps, WinOps, WindowId, com};

use crate::{Result, assemble};

/// Run until Ctrl+C.
pub fn run(config: &config::Config) -> Result<()> {
    win_ops::init_dpi_awareness();
    let _com = com::init_mta()?;

    let ops: Arc<dyn WinOps> = Arc::new(RealWinOps);
    let (registry, finders) = assemble(config, ops.clone());
    let chords = registry.chords();
    if chords.is_empty() {
        warn!("no_bindings_active");
    }

    let (tx, rx) = unbounded_channel();
    let overlay_tx = tx.clone();
    let overlay = Arc::new(OverlayHost::spawn(move |session, input| {
        if overlay_tx.send(UiEvent::Overlay { session, input }).is_err() {
            debug!(session, "engine_gone_overlay_input_dropped");
        }
    })?);

    let services = Services {
        ops,
        surface: overlay.clone(),
        finders: Arc::new(finders),
    };
    let mut engine = Engine::with_channel(registry, services, (tx, rx));

    let (hk_tx, hk_rx) = unbounded();
    let manager = Manager::new(hk_tx);
    manager.set_bindings(chords);
    manager.start()?;

    let bridge_tx = engine.sender();
    let bridge = thread::Builder::new()
        .name("hintkeys-hotkeys".into())
        .spawn(move || {
            for ev in hk_rx {
                let foreground = (ev.foreground != 0).then_some(WindowId(ev.foreground));
                let event = UiEvent::Hotkey {
                    chord: ev.chord,
                    foreground,
                };
                if bridge_tx.send(event).is_err() {
                    break;
                }
            }
        })?;

    let runtime = Builder::new_current_thread().enable_all().build()?;
    runtime.block_on(async {
        let stop_tx = engine.sender();
        tokio::spawn(async move {
            match signal::ctrl_c().await {
                Ok(()) => {
                    info!("ctrl_c");
                    if stop_tx.send(UiEvent::Shutdown).is_err() {
                        debug!("engine_already_stopped");
                    }
                }
                Err(e) => warn!(error = %e, "ctrl_c_handler_failed"),
            }
        });
        engine.run().await;
    });

    drop(engine);
    manager.stop();
    // Dropping the manager closes the hook channel and ends the bridge.
    drop(manager);
    if bridge.join().is_err() {
        warn!("hotkey_bridge_panicked");
    }
    overlay.shutdown();
    info!("hintkeys_stopped");
    Ok(())
}
