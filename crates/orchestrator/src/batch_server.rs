//! The historical out-of-process batch-server hooks.
//!
//! `start_batch_server` is kept in the contract surface for parity but is
//! unconditionally unimplemented here. Out-of-process batching is an
//! embedding concern this orchestrator does not take on. `stop_batch_server`
//! still does something useful standalone: deliver a termination signal
//! to a server process by PID, ignoring the case where that process is
//! already gone.

use nix::{
    errno::Errno,
    sys::signal::{self, Signal},
    unistd::Pid,
};

use crate::error::Error;

/// Always fails: starting an in-process batch server is not supported by
/// this orchestrator. Kept so embedders compiling against the historical
/// contract surface still link.
pub fn start_batch_server() -> Result<(), Error> {
    Err(Error::NotImplemented {
        operation: "start_batch_server".to_string(),
    })
}

/// Sends `SIGTERM` to `server_pid`. A process that has already exited
/// (`ESRCH`) is not an error: the server is already stopped.
pub fn stop_batch_server(server_pid: i32) -> Result<(), Error> {
    match signal::kill(Pid::from_raw(server_pid), Signal::SIGTERM) {
        Ok(()) => Ok(()),
        Err(Errno::ESRCH) => Ok(()),
        Err(errno) => Err(Error::Io {
            operation: "stop_batch_server".to_string(),
            message: errno.to_string(),
        }),
    }
}
