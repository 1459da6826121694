//! Service lifecycle subcommands.

use crate::cli::ServiceAction;
use crate::config::{self, ConfigManager};
use crate::daemon;
use std::time::{Duration, Instant};

/// How long `start` waits for the spawned child to claim the pid file.
const START_GRACE: Duration = Duration::from_secs(5);

/// Dispatches one `service` subcommand. `Run` consumes the manager and
/// blocks until the daemon exits.
///
/// # Errors
/// Lifecycle failures from the daemon module.
pub fn cmd_service(action: &ServiceAction, manager: ConfigManager) -> Result<(), crate::Error> {
    match action {
        ServiceAction::Start => start(&manager),
        ServiceAction::Stop => {
            daemon::stop(&manager.handle().current())?;
            println!("service stopped");
            Ok(())
        }
        ServiceAction::Status => {
            let status = daemon::status(&manager.handle().current())?;
            if status.alive {
                println!("service running (pid {}, port {})", status.pid, status.port);
            } else {
                println!(
                    "service not running (stale pid file for pid {}, remove it to restart)",
                    status.pid
                );
            }
            Ok(())
        }
        ServiceAction::Run => daemon::run(manager),
    }
}

fn start(manager: &ConfigManager) -> Result<(), crate::Error> {
    let config = manager.handle().current();
    let pid_path = config::pid_path(&config);
    if pid_path.exists() {
        return Err(crate::Error::AlreadyRunning(pid_path));
    }

    let child = daemon::spawn_detached()?;
    let deadline = Instant::now() + START_GRACE;
    while !pid_path.exists() {
        if Instant::now() >= deadline {
            return Err(crate::Error::Signal(format!(
                "spawned pid {child} but no pid file appeared at {}",
                pid_path.display()
            )));
        }
        std::thread::sleep(Duration::from_millis(100));
    }
    println!("service started (pid {child}, port {})", config.port);
    Ok(())
}
