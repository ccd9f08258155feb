//! Interrupt Handling
//!
//! Turns Ctrl-C into a flag the run loop checks between timesteps, so an
//! interrupted run still flushes its measurements.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::{error, warn};

/// Install a Ctrl-C listener and return the flag it raises.
///
/// The listener runs on its own thread with a single-threaded runtime; the
/// simulation itself stays synchronous.
pub fn install_interrupt_flag() -> Arc<AtomicBool> {
    let flag = Arc::new(AtomicBool::new(false));
    let listener_flag = Arc::clone(&flag);

    let spawned = thread::Builder::new()
        .name("ctrl-c".to_string())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(e) => {
                    error!("Failed to start interrupt listener: {}", e);
                    return;
                }
            };
            runtime.block_on(async {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => {
                        warn!("Interrupt received, stopping after the current timestep");
                        listener_flag.store(true, Ordering::SeqCst);
                    }
                    Err(e) => error!("Failed to listen for Ctrl-C: {}", e),
                }
            });
        });

    if let Err(e) = spawned {
        error!("Failed to spawn interrupt listener: {}", e);
    }
    flag
}
