//! Logged command rows.

use crate::record::InsertableRecord;
use crate::session::SESSION_ID_VAR;
use crate::storage::Value;
use crate::unix;

/// A commands row describing one executed shell command.
#[derive(Debug, Clone)]
pub struct CommandRecord {
    pub session_id: i64,
    pub shell_level: i64,
    pub command_no: Option<i64>,
    pub tty: Option<String>,
    pub euid: i64,
    pub cwd: String,
    pub rval: i64,
    pub start_time: i64,
    pub end_time: i64,
    pub duration: i64,
    pub pipe_cnt: Option<i64>,
    pub pipe_vals: Option<String>,
    pub command: Option<String>,
}

impl CommandRecord {
    /// Build a command row from the logger's arguments, capturing the rest
    /// of the context (session id, shell level, tty, cwd) from the
    /// environment. A missing command text becomes null and is rejected by
    /// the table's NOT NULL constraint, so such a call logs nothing.
    pub fn capture(
        command: Option<String>,
        rval: i64,
        start_time: i64,
        end_time: i64,
        command_no: Option<i64>,
        pipe_vals: Option<String>,
    ) -> Self {
        let cwd = effective_cwd(
            command.as_deref().unwrap_or(""),
            rval,
            unix::cwd(),
            unix::get_env("OLDPWD"),
        );
        Self {
            session_id: unix::get_env_int(SESSION_ID_VAR),
            shell_level: unix::get_env_int("SHLVL"),
            command_no,
            tty: unix::tty(),
            euid: unix::euid(),
            cwd,
            rval,
            start_time,
            end_time,
            duration: end_time - start_time,
            pipe_cnt: pipe_vals.as_deref().map(|p| p.split('_').count() as i64),
            pipe_vals,
            command,
        }
    }
}

impl InsertableRecord for CommandRecord {
    fn table(&self) -> &'static str {
        "commands"
    }

    fn fields(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("session_id", Value::Integer(self.session_id)),
            ("shell_level", Value::Integer(self.shell_level)),
            ("command_no", self.command_no.map(Value::Integer).unwrap_or(Value::Null)),
            ("tty", Value::from(self.tty.clone())),
            ("euid", Value::Integer(self.euid)),
            ("cwd", Value::from(self.cwd.clone())),
            ("rval", Value::Integer(self.rval)),
            ("start_time", Value::Integer(self.start_time)),
            ("end_time", Value::Integer(self.end_time)),
            ("duration", Value::Integer(self.duration)),
            ("pipe_cnt", self.pipe_cnt.map(Value::Integer).unwrap_or(Value::Null)),
            ("pipe_vals", Value::from(self.pipe_vals.clone())),
            ("command", Value::from(self.command.clone())),
        ]
    }
}

/// The directory a command was typed in.
///
/// A successful `cd` has already moved the process by the time it is logged,
/// so the previous directory (`$OLDPWD`) is the honest answer for it.
fn effective_cwd(command: &str, rval: i64, cwd: String, oldpwd: Option<String>) -> String {
    if rval == 0 && (command == "cd" || command.starts_with("cd ")) {
        if let Some(oldpwd) = oldpwd {
            return oldpwd;
        }
    }
    cwd
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::HistoryStore;

    #[test]
    fn test_effective_cwd_for_cd() {
        let cwd = "/home/user/project".to_string();
        let oldpwd = Some("/home/user".to_string());
        assert_eq!(
            effective_cwd("cd project", 0, cwd.clone(), oldpwd.clone()),
            "/home/user"
        );
        assert_eq!(effective_cwd("cd", 0, cwd.clone(), oldpwd.clone()), "/home/user");
    }

    #[test]
    fn test_effective_cwd_keeps_cwd_otherwise() {
        let cwd = "/home/user/project".to_string();
        let oldpwd = Some("/home/user".to_string());
        // A failed cd never moved, and "cdecl" is not cd.
        assert_eq!(effective_cwd("cd /nope", 1, cwd.clone(), oldpwd.clone()), cwd);
        assert_eq!(effective_cwd("cdecl", 0, cwd.clone(), oldpwd.clone()), cwd);
        assert_eq!(effective_cwd("cd x", 0, cwd.clone(), None), cwd);
    }

    #[test]
    fn test_pipe_counting() {
        let record = CommandRecord::capture(
            Some("cat a | sort | uniq".to_string()),
            0,
            10,
            12,
            Some(1),
            Some("0_0_0".to_string()),
        );
        assert_eq!(record.pipe_cnt, Some(3));
        assert_eq!(record.duration, 2);

        let plain = CommandRecord::capture(Some("ls".to_string()), 0, 10, 10, Some(2), None);
        assert_eq!(plain.pipe_cnt, None);
    }

    #[test]
    fn test_insert_capture() {
        let store = HistoryStore::open_in_memory().unwrap();
        let record = CommandRecord::capture(Some("ls".to_string()), 0, 10, 11, Some(1), None);
        assert!(store.insert(&record).unwrap() > 0);
    }

    #[test]
    fn test_missing_command_text_logs_nothing() {
        let store = HistoryStore::open_in_memory().unwrap();
        let record = CommandRecord::capture(None, 0, 10, 11, Some(1), None);
        assert_eq!(store.insert(&record).unwrap(), 0);
    }

    #[test]
    fn test_null_command_numbers_do_not_collide() {
        // UNIQUE(session_id, command_no) must not reject repeated NULLs.
        let store = HistoryStore::open_in_memory().unwrap();
        let a = CommandRecord::capture(Some("ls".to_string()), 0, 10, 11, None, None);
        let b = CommandRecord::capture(Some("pwd".to_string()), 0, 11, 12, None, None);
        assert!(store.insert(&a).unwrap() > 0);
        assert!(store.insert(&b).unwrap() > 0);
    }
}
