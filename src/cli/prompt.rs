use colored::Colorize;

use crate::{info, management::AuthorizationPrompt, warning};

/// Prints the login link as a terminal hyperlink and tries to open it in the
/// default browser.
pub struct TerminalPrompt;

impl AuthorizationPrompt for TerminalPrompt {
    fn present(&self, url: &str) {
        info!("Log in to Spotify to create the playlist");
        println!(
            "    {}",
            hyperlink(url, &"Click to authenticate to Spotify!".yellow().to_string())
        );
        println!("    {}", url.dimmed());

        if webbrowser::open(url).is_err() {
            warning!("Failed to open browser. Please open the link above manually.");
        }
    }
}

/// OSC 8 hyperlink; terminals without support show just `text`.
pub fn hyperlink(url: &str, text: &str) -> String {
    format!("\x1b]8;;{}\x1b\\{}\x1b]8;;\x1b\\", url, text)
}
