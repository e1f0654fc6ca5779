//! Cisco IOS / IOS-XE platform definition.
//!
//! # Prompt Examples
//!
//! ```text
//! router>                     # user exec
//! router#                     # privileged exec
//! router(config)#             # configuration
//! router(config-router)#      # routing protocol context
//! ```

use super::PlatformDefinition;
use crate::executor::DEFAULT_REJECTION_MARKER;

/// Matches every IOS prompt. Multiline so `^` anchors at line start.
const PROMPT_PATTERN: &str = r"(?m)^[\w.\-@()/: ]{1,63}[>#]\s?$";

/// Create the Cisco IOS platform definition.
pub fn platform() -> PlatformDefinition {
    PlatformDefinition::new("cisco_ios", PROMPT_PATTERN)
        .expect("static IOS prompt pattern is valid")
        .with_failure_pattern(DEFAULT_REJECTION_MARKER)
        .with_on_open_command("terminal length 0")
        .with_config_mode("configure terminal", "end")
        .with_terminal_size(511, 24)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_match() {
        let p = platform();
        for prompt in ["R1>", "R1#", "R1# ", "R1(config)#", "R1(config-router)#", "core-sw.lab#"] {
            assert!(p.prompt_pattern.is_match(prompt.as_bytes()), "{prompt}");
        }
        assert!(p.prompt_pattern.is_match(b"Building configuration...\r\nR1#"));
        assert!(!p.prompt_pattern.is_match(b"R1#show ip route"));
        assert!(!p.prompt_pattern.is_match(b"Gateway of last resort is not set"));
    }

    #[test]
    fn test_defaults() {
        let p = platform();
        assert_eq!(p.name, "cisco_ios");
        assert_eq!(p.failed_when_contains, vec!["Invalid".to_string()]);
        assert_eq!(p.on_open_commands, vec!["terminal length 0".to_string()]);
        assert_eq!(p.config_enter, "configure terminal");
        assert_eq!(p.config_exit, "end");
    }

    #[test]
    fn test_normalize_output() {
        let p = platform();
        let raw = "show ip bgp summary\r\nBGP router identifier 1.1.1.1\r\nR1#";
        assert_eq!(
            p.normalize_output(raw, "show ip bgp summary"),
            "BGP router identifier 1.1.1.1"
        );
        // Feature with nothing to report: only echo and prompt.
        assert_eq!(p.normalize_output("show ip bgp summary\r\nR1#", "show ip bgp summary"), "");
    }
}
