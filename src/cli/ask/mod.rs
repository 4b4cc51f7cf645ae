//! Ask command - sends one prompt and prints the answer

use std::io::Write;

use clap::Args;
use futures::StreamExt;
use tokio::io::AsyncReadExt;
use tracing::debug;

use crate::config::AppConfig;
use crate::domain::{CallOptions, CompletionResult, StreamEvent};
use crate::infrastructure::llm::ClientRegistry;

/// Arguments for the ask command
#[derive(Args, Debug, Clone)]
pub struct AskArgs {
    /// Profile id (defaults to the configured default profile)
    #[arg(long, short)]
    pub profile: Option<String>,

    /// System prompt (chat profiles only)
    #[arg(long)]
    pub system: Option<String>,

    /// Sampling temperature, 0.0 to 2.0 (chat profiles only)
    #[arg(long)]
    pub temperature: Option<f64>,

    /// Maximum tokens to generate (chat profiles only)
    #[arg(long)]
    pub max_tokens: Option<i64>,

    /// Provider-specific parameter as key=value, repeatable
    #[arg(long = "param", value_parser = parse_param)]
    pub params: Vec<(String, String)>,

    /// Wait for the full response instead of streaming
    #[arg(long)]
    pub no_stream: bool,

    /// Echo request headers and bodies and save them to the request log directory
    #[arg(long, short)]
    pub verbose: bool,

    /// Prompt text; read from stdin when omitted
    pub prompt: Vec<String>,
}

impl AskArgs {
    pub fn call_options(&self) -> CallOptions {
        let mut options = CallOptions::new();
        options.temperature = self.temperature;
        options.max_tokens = self.max_tokens;
        options.system_prompt = self.system.clone();
        for (key, value) in &self.params {
            options = options.with_param(key.clone(), value.clone());
        }
        options
    }
}

pub async fn run(args: AskArgs, config: &AppConfig) -> anyhow::Result<()> {
    let prompt = resolve_prompt(&args.prompt, tokio::io::stdin()).await?;
    let registry = ClientRegistry::from_config(config)?;
    let client = registry.client(args.profile.as_deref()).await?;
    let options = args.call_options();

    debug!(profile = %client.profile().id(), streaming = !args.no_stream, "Asking");

    if args.no_stream {
        let result = client.get_full_response(&prompt, &options, false).await?;
        println!("{}", result.formatted().trim_end());
        return Ok(());
    }

    let mut events = client.stream(&prompt, &options).await?;
    let mut result = CompletionResult::default();
    let mut stdout = std::io::stdout();

    while let Some(event) = events.next().await {
        match event? {
            StreamEvent::TextFragment(fragment) => {
                stdout.write_all(fragment.as_bytes())?;
                stdout.flush()?;
                result.push_text(&fragment);
            }
            StreamEvent::ReferenceSet { references, .. } => result.references = references,
            StreamEvent::QueryMeta { keywords, .. } => {
                if !keywords.is_empty() {
                    debug!(keywords = ?keywords, "Search keywords");
                }
            }
            StreamEvent::Error { .. } | StreamEvent::Heartbeat => {}
        }
    }

    // Only the reference block remains to be printed
    let formatted = result.formatted();
    let tail = &formatted[result.text.len()..];
    writeln!(stdout, "{}", tail.trim_end())?;
    Ok(())
}

/// Join prompt words, or read the whole of `input` when there are none
pub async fn resolve_prompt<R>(words: &[String], mut input: R) -> anyhow::Result<String>
where
    R: tokio::io::AsyncRead + Unpin,
{
    let prompt = if words.is_empty() {
        let mut buffer = String::new();
        input.read_to_string(&mut buffer).await?;
        buffer
    } else {
        words.join(" ")
    };

    let prompt = prompt.trim();
    if prompt.is_empty() {
        anyhow::bail!("Prompt is empty");
    }
    Ok(prompt.to_string())
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in '{}'", raw));
    }
    Ok((key.to_string(), value.to_string()))
}
