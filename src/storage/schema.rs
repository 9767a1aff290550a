//! Database schema definitions.
//!
//! Each logical table owns its authoritative `CREATE TABLE` text. The store
//! compares this text against what `sqlite_master` actually holds before any
//! read or write touches the table; a mismatch is reported but never
//! auto-migrated.

/// SQL to create the sessions table
pub const CREATE_SESSIONS_TABLE: &str = "\
CREATE TABLE sessions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    hostname TEXT,
    host_ip TEXT,
    ppid INTEGER NOT NULL,
    pid INTEGER NOT NULL,
    time_zone TEXT NOT NULL,
    start_time INTEGER NOT NULL,
    end_time INTEGER,
    duration INTEGER,
    tty TEXT,
    uid INTEGER NOT NULL,
    euid INTEGER NOT NULL,
    logname TEXT,
    shell TEXT NOT NULL,
    sudo_user TEXT,
    sudo_uid INTEGER,
    ssh_client TEXT,
    ssh_connection TEXT
)";

/// SQL to create the commands table
pub const CREATE_COMMANDS_TABLE: &str = "\
CREATE TABLE commands (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id INTEGER NOT NULL,
    shell_level INTEGER NOT NULL,
    command_no INTEGER,
    tty TEXT,
    euid INTEGER NOT NULL,
    cwd TEXT NOT NULL,
    rval INTEGER NOT NULL,
    start_time INTEGER NOT NULL,
    end_time INTEGER NOT NULL,
    duration INTEGER NOT NULL,
    pipe_cnt INTEGER,
    pipe_vals TEXT,
    command TEXT NOT NULL,
    UNIQUE(session_id, command_no)
)";

/// All logical tables as (name, create statement) pairs, in creation order.
pub fn all_tables() -> &'static [(&'static str, &'static str)] {
    &[
        ("sessions", CREATE_SESSIONS_TABLE),
        ("commands", CREATE_COMMANDS_TABLE),
    ]
}
