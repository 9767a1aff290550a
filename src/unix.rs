//! Unix system information for session and command rows.
//!
//! The logger runs from shell hooks, so "the shell" is this process's
//! parent: its pid, its controlling tty and its `/proc` stat line are what
//! get recorded. Every accessor degrades to `None` rather than failing; a
//! missing tty or hostname must never stop a command from being logged.

use std::ffi::CStr;
use std::process::Command;

/// Returns the environment variable value, if set.
pub fn get_env(variable: &str) -> Option<String> {
    std::env::var(variable).ok()
}

/// Returns the environment variable parsed as an integer, defaulting to 0.
pub fn get_env_int(variable: &str) -> i64 {
    get_env(variable)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0)
}

/// Returns the current working directory.
pub fn cwd() -> String {
    std::env::current_dir()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Returns the pid of the shell (this process's parent).
pub fn shell_pid() -> i64 {
    unsafe { libc::getppid() as i64 }
}

/// Returns the parent pid of the shell, read from its `/proc` stat line.
pub fn shell_ppid() -> i64 {
    proc_stat(shell_pid())
        .and_then(|stat| parse_stat_field(&stat, 3))
        .and_then(|field| field.parse().ok())
        .unwrap_or(0)
}

/// Returns the name of the shell (e.g. `bash` or `zsh`).
pub fn shell() -> Option<String> {
    proc_stat(shell_pid()).and_then(|stat| parse_stat_field(&stat, 1))
}

/// Returns the real user id.
pub fn uid() -> i64 {
    unsafe { libc::getuid() as i64 }
}

/// Returns the effective user id.
pub fn euid() -> i64 {
    unsafe { libc::geteuid() as i64 }
}

/// Returns the controlling tty name with any `/dev/` prefix removed.
pub fn tty() -> Option<String> {
    let name = unsafe {
        let ptr = libc::ttyname(libc::STDIN_FILENO);
        if ptr.is_null() {
            return None;
        }
        CStr::from_ptr(ptr).to_string_lossy().into_owned()
    };
    Some(name.strip_prefix("/dev/").unwrap_or(&name).to_string())
}

/// Returns the hostname.
pub fn hostname() -> Option<String> {
    let mut buf = [0u8; 256];
    let rc = unsafe { libc::gethostname(buf.as_mut_ptr() as *mut libc::c_char, buf.len()) };
    if rc != 0 {
        return None;
    }
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    Some(String::from_utf8_lossy(&buf[..end]).into_owned())
}

/// Returns the login name, preferring the environment over passwd.
pub fn login_name() -> Option<String> {
    if let Some(name) = get_env("LOGNAME").or_else(|| get_env("USER")) {
        return Some(name);
    }
    unsafe {
        let pw = libc::getpwuid(libc::getuid());
        if pw.is_null() || (*pw).pw_name.is_null() {
            return None;
        }
        Some(CStr::from_ptr((*pw).pw_name).to_string_lossy().into_owned())
    }
}

/// Returns all configured host addresses, space separated.
///
/// Shells out to `ip -o addr` the way the original tooling shelled out to
/// `ifconfig`; any failure yields `None`.
pub fn host_ip() -> Option<String> {
    let output = Command::new("ip").args(["-o", "addr"]).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8_lossy(&output.stdout);
    let mut ips = Vec::new();
    for line in text.lines() {
        let mut tokens = line.split_whitespace();
        while let Some(token) = tokens.next() {
            if token == "inet" || token == "inet6" {
                if let Some(addr) = tokens.next() {
                    ips.push(addr.split('/').next().unwrap_or(addr).to_string());
                }
                break;
            }
        }
    }
    if ips.is_empty() {
        None
    } else {
        Some(ips.join(" "))
    }
}

/// Returns the epoch timestamp in seconds.
pub fn epoch_time() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Returns the local time zone as an offset string (e.g. `+02:00`).
pub fn time_zone() -> String {
    chrono::Local::now().format("%Z").to_string()
}

fn proc_stat(pid: i64) -> Option<String> {
    std::fs::read_to_string(format!("/proc/{}/stat", pid)).ok()
}

/// Extracts field `num` from a `/proc/<pid>/stat` line. Field 1 is the comm
/// name (parenthesized, may contain spaces), later fields count from the
/// closing paren.
fn parse_stat_field(stat: &str, num: usize) -> Option<String> {
    let open = stat.find('(')?;
    let close = stat.rfind(')')?;
    if num == 0 {
        return Some(stat[..open].trim().to_string());
    }
    if num == 1 {
        return Some(stat[open + 1..close].to_string());
    }
    stat[close + 1..]
        .split_whitespace()
        .nth(num - 2)
        .map(str::to_string)
}
