//! CLI command definitions

use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for ollama-chat
#[derive(Parser, Debug)]
#[command(name = "ollama-chat")]
#[command(author, version, about = "Web chat for models served by a local Ollama")]
#[command(long_about = r#"
ollama-chat serves a small web page for chatting with models installed in a
local Ollama server. Answers are streamed back as they are generated.

If the selected model is not installed, the fallback model is downloaded
once and the user is told about it.

Configuration files are loaded from (in priority order):
1. OLLAMA_CHAT_* environment variables (e.g. OLLAMA_CHAT_WEB__PORT=8080)
2. --config <path>          Explicit config file
3. ./ollama-chat.toml       Project-level config
4. ~/.config/ollama-chat/config.toml   Global config

Example:
  ollama-chat
  ollama-chat --port 8080 --model mistral
  ollama-chat --server-url http://gpu-box:11434 -v
"#)]
pub struct Cli {
    /// Address to listen on
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Base URL of the Ollama server
    #[arg(long, value_name = "URL")]
    pub server_url: Option<String>,

    /// Model preselected in the page
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Model downloaded when the selected one is not installed
    #[arg(long, value_name = "MODEL")]
    pub fallback_model: Option<String>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Also write logs to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}
