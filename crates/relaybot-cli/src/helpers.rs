//! Shared CLI helpers — banner and credential masking.

use colored::Colorize;

/// Print the startup banner.
pub fn print_banner() {
    let version = env!("CARGO_PKG_VERSION");
    println!("{}  v{}", "🦀 Relaybot".cyan().bold(), version.dimmed());
}

/// Mask a credential for display: keep the last 4 characters.
pub fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        return "(not set)".to_string();
    }
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        "••••".to_string()
    } else {
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("••••{tail}")
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_empty() {
        assert_eq!(mask_secret(""), "(not set)");
    }

    #[test]
    fn mask_short() {
        assert_eq!(mask_secret("abc"), "••••");
        assert_eq!(mask_secret("abcd"), "••••");
    }

    #[test]
    fn mask_keeps_last_four() {
        assert_eq!(mask_secret("sk-1234567890wxyz"), "••••wxyz");
    }
}
