//! Platform definition for vendor-specific CLI behavior.

use regex::bytes::Regex;

/// Everything vendor-specific the SSH session needs.
#[derive(Debug, Clone)]
pub struct PlatformDefinition {
    /// Platform name (e.g., "cisco_ios").
    pub name: String,

    /// Matches any prompt (exec, privileged, or configuration mode).
    pub prompt_pattern: Regex,

    /// Response substrings that mark a command as rejected.
    pub failed_when_contains: Vec<String>,

    /// Commands to run when the connection is established.
    pub on_open_commands: Vec<String>,

    /// Command that enters configuration mode.
    pub config_enter: String,

    /// Command that leaves configuration mode.
    pub config_exit: String,

    /// Terminal width for PTY.
    pub terminal_width: u32,

    /// Terminal height for PTY.
    pub terminal_height: u32,
}

impl PlatformDefinition {
    /// Create a platform definition from its prompt pattern.
    pub fn new(name: impl Into<String>, prompt_pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            name: name.into(),
            prompt_pattern: Regex::new(prompt_pattern)?,
            failed_when_contains: vec![],
            on_open_commands: vec![],
            config_enter: "configure terminal".to_string(),
            config_exit: "end".to_string(),
            terminal_width: 511,
            terminal_height: 24,
        })
    }

    /// Add a failure pattern.
    pub fn with_failure_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.failed_when_contains.push(pattern.into());
        self
    }

    /// Add an on_open command.
    pub fn with_on_open_command(mut self, command: impl Into<String>) -> Self {
        self.on_open_commands.push(command.into());
        self
    }

    /// Set the configuration mode entry and exit commands.
    pub fn with_config_mode(mut self, enter: impl Into<String>, exit: impl Into<String>) -> Self {
        self.config_enter = enter.into();
        self.config_exit = exit.into();
        self
    }

    /// Set terminal dimensions.
    pub fn with_terminal_size(mut self, width: u32, height: u32) -> Self {
        self.terminal_width = width;
        self.terminal_height = height;
        self
    }

    /// Strip the command echo and the trailing prompt from a raw response.
    pub fn normalize_output(&self, raw: &str, command: &str) -> String {
        let mut lines: Vec<&str> = raw.lines().collect();

        if lines
            .last()
            .is_some_and(|last| self.prompt_pattern.is_match(last.as_bytes()))
        {
            lines.pop();
        }
        if !command.is_empty() && lines.first().is_some_and(|first| first.contains(command)) {
            lines.remove(0);
        }

        lines.join("\n").trim_end().to_string()
    }
}
