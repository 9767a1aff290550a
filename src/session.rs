//! Shell session rows.
//!
//! One sessions row is inserted when a shell starts (its id is exported to
//! the environment as `CMDHIST_SESSION_ID`) and stamped with an end time
//! when the shell exits.

use crate::record::InsertableRecord;
use crate::storage::{HistoryStore, Value};
use crate::unix;

/// The environment variable holding the current session's row id.
pub const SESSION_ID_VAR: &str = "CMDHIST_SESSION_ID";

/// A sessions row captured from the running shell's environment.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub time_zone: String,
    pub start_time: i64,
    pub ppid: i64,
    pub pid: i64,
    pub tty: Option<String>,
    pub uid: i64,
    pub euid: i64,
    pub logname: Option<String>,
    pub hostname: Option<String>,
    pub host_ip: Option<String>,
    pub shell: String,
    pub sudo_user: Option<String>,
    pub sudo_uid: Option<i64>,
    pub ssh_client: Option<String>,
    pub ssh_connection: Option<String>,
}

impl SessionRecord {
    /// Capture the current shell session's metadata.
    pub fn capture() -> Self {
        Self {
            time_zone: unix::time_zone(),
            start_time: unix::epoch_time(),
            ppid: unix::shell_ppid(),
            pid: unix::shell_pid(),
            tty: unix::tty(),
            uid: unix::uid(),
            euid: unix::euid(),
            logname: unix::login_name(),
            hostname: unix::hostname(),
            host_ip: unix::host_ip(),
            shell: unix::shell()
                .or_else(|| unix::get_env("SHELL").map(|s| basename(&s)))
                .unwrap_or_else(|| "unknown".to_string()),
            sudo_user: unix::get_env("SUDO_USER"),
            sudo_uid: unix::get_env("SUDO_UID").and_then(|v| v.parse().ok()),
            ssh_client: unix::get_env("SSH_CLIENT"),
            ssh_connection: unix::get_env("SSH_CONNECTION"),
        }
    }
}

impl InsertableRecord for SessionRecord {
    fn table(&self) -> &'static str {
        "sessions"
    }

    fn fields(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("time_zone", Value::from(self.time_zone.clone())),
            ("start_time", Value::Integer(self.start_time)),
            ("ppid", Value::Integer(self.ppid)),
            ("pid", Value::Integer(self.pid)),
            ("tty", Value::from(self.tty.clone())),
            ("uid", Value::Integer(self.uid)),
            ("euid", Value::Integer(self.euid)),
            ("logname", Value::from(self.logname.clone())),
            ("hostname", Value::from(self.hostname.clone())),
            ("host_ip", Value::from(self.host_ip.clone())),
            ("shell", Value::from(self.shell.clone())),
            ("sudo_user", Value::from(self.sudo_user.clone())),
            ("sudo_uid", self.sudo_uid.map(Value::Integer).unwrap_or(Value::Null)),
            ("ssh_client", Value::from(self.ssh_client.clone())),
            ("ssh_connection", Value::from(self.ssh_connection.clone())),
        ]
    }
}

/// Stamp the session's end time and duration.
pub fn close_session(store: &HistoryStore, session_id: i64) -> crate::Result<usize> {
    let now = unix::epoch_time();
    store.execute(
        "UPDATE sessions SET end_time = ?1, duration = ?1 - start_time WHERE id = ?2",
        &[&now, &session_id],
    )
}

fn basename(path: &str) -> String {
    path.rsplit('/').next().unwrap_or(path).to_string()
}
