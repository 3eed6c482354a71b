#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::{Value, json};

pub const LOGIN_PATH: &str = "/api/collections/users/auth-with-password";
pub const REFRESH_PATH: &str = "/api/collections/users/auth-refresh";

/// Run the CLI with a custom HOME directory for isolated session storage.
pub fn run_cli_with_env(args: &[&str], home: &Path, url: &str) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_warden"));
    cmd.args(args);
    cmd.env("HOME", home);
    cmd.env("XDG_DATA_HOME", home.join("data"));
    cmd.env("WARDEN_URL", url);
    cmd.env_remove("WARDEN_PASSWORD");
    cmd.env("NO_COLOR", "1");
    cmd.output().expect("Failed to execute CLI")
}

/// Run the CLI off the async runtime so a mock server can answer it.
pub async fn warden(args: &[&str], home: &Path, url: &str) -> Output {
    let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    let home = home.to_path_buf();
    let url = url.to_string();

    tokio::task::spawn_blocking(move || {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        run_cli_with_env(&args, &home, &url)
    })
    .await
    .expect("CLI task panicked")
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// Where the CLI keeps its session under an isolated home.
pub fn session_file(home: &Path) -> PathBuf {
    home.join("data").join("warden").join("session.json")
}

/// A JWT expiring `hours` from now.
pub fn jwt(hours: i64) -> String {
    let exp = chrono::Utc::now().timestamp() + hours * 3600;
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(json!({ "id": "u1", "exp": exp }).to_string());
    format!("{header}.{payload}.sig")
}

pub fn auth_body(token: &str) -> Value {
    json!({
        "token": token,
        "record": {
            "id": "u1",
            "email": "alice@example.com",
            "role": "admin"
        }
    })
}
