//! Output for registering the tool-server with an MCP client.

use std::path::Path;

use serde_json::json;

/// Shell command registering `executable` with the `claude` CLI.
///
/// Meant to be run with `eval "$(pochi --mcp-install)"`, so the path is
/// double-quoted with shell metacharacters escaped.
pub fn install_command(executable: &Path) -> String {
    format!(
        "claude mcp add pochi -- {} --mcp",
        shell_quote(&executable.to_string_lossy())
    )
}

/// `mcpServers` JSON snippet for clients configured through a file.
pub fn config_snippet(executable: &Path) -> String {
    let config = json!({
        "mcpServers": {
            "pochi": {
                "command": executable.to_string_lossy(),
                "args": ["--mcp"],
            }
        }
    });

    serde_json::to_string_pretty(&config).unwrap_or_else(|_| config.to_string())
}

fn shell_quote(raw: &str) -> String {
    let mut quoted = String::with_capacity(raw.len() + 2);
    quoted.push('"');
    for c in raw.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}
