//! Console output for the server process

use chat_application::ModelCatalog;
use colored::Colorize;

/// Formats startup and shutdown messages for the terminal
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Startup banner with the address to open and the available models
    pub fn banner(url: &str, server_url: &str, catalog: &ModelCatalog) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Ollama Chat"));
        output.push('\n');

        output.push_str(&format!("{} {}\n", "Open:".cyan().bold(), url));
        output.push_str(&format!("{} {}\n", "Ollama:".cyan().bold(), server_url));
        output.push_str(&format!(
            "{} {}\n",
            "Default model:".cyan().bold(),
            catalog.default
        ));

        output.push_str(&format!("\n{}\n", "Installed models:".cyan().bold()));
        if catalog.installed.is_empty() {
            output.push_str(&format!("  {}\n", "(none)".dimmed()));
        }
        for model in &catalog.installed {
            output.push_str(&format!("  * {}\n", model));
        }

        if !catalog.is_installed(&catalog.default) {
            output.push_str(&format!(
                "\n{}\n",
                format!(
                    "'{}' is not installed yet, it will be downloaded on first use.",
                    catalog.default
                )
                .yellow()
            ));
        }

        output.push_str(&Self::footer());
        output
    }

    /// Fatal error line
    pub fn error(message: &str) -> String {
        format!("{} {}", "Error:".red().bold(), message)
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_banner_lists_models() {
        plain();
        let catalog = ModelCatalog::new(
            vec!["llama3.2:1b".parse().unwrap(), "mistral:latest".parse().unwrap()],
            "llama3.2:1b".parse().unwrap(),
        );
        let banner = ConsoleFormatter::banner(
            "http://0.0.0.0:5555",
            "http://localhost:11434",
            &catalog,
        );
        assert!(banner.contains("Open: http://0.0.0.0:5555"));
        assert!(banner.contains("  * mistral:latest"));
        assert!(!banner.contains("will be downloaded"));
    }

    #[test]
    fn test_banner_warns_about_missing_default() {
        plain();
        let catalog = ModelCatalog::new(vec![], "llama3.2:1b".parse().unwrap());
        let banner = ConsoleFormatter::banner("http://x", "http://y", &catalog);
        assert!(banner.contains("(none)"));
        assert!(banner.contains("'llama3.2:1b' is not installed yet"));
    }

    #[test]
    fn test_error() {
        plain();
        assert_eq!(ConsoleFormatter::error("boom"), "Error: boom");
    }
}
