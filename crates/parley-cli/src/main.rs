//! Parley CLI - Command-line interface
//!
//! Usage:
//!   parley compute "turn off the light"
//!   parley compute --qna before "what are your opening hours?"
//!
//! Credentials come from PARLEY_APP_TOKEN, PARLEY_APP_ID, PARLEY_APP_KEY
//! (and optionally PARLEY_API_URL).

use anyhow::Context;
use clap::{Parser, Subcommand};

use parley_core::{ClassifierCredentials, DialogContext, NluConfig, QnaMode};
use parley_pipeline::Nlu;

#[derive(Parser)]
#[command(name = "parley")]
#[command(about = "NLU pipeline for conversational agents")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute intents and entities for a sentence
    Compute {
        /// The utterance to understand
        sentence: String,

        /// QnA precedence: off, before, or after
        #[arg(long, default_value = "off")]
        qna: String,

        /// Allow two intents in the result (only applies with a filter)
        #[arg(long)]
        multi_intent: bool,

        /// Spellchecking key (disabled when absent)
        #[arg(long)]
        spellcheck: Option<String>,

        /// Bot locale for the built-in extractors
        #[arg(long, default_value = "en")]
        locale: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compute {
            sentence,
            qna,
            multi_intent,
            spellcheck,
            locale,
        } => {
            let credentials =
                ClassifierCredentials::from_env().context("loading classifier credentials")?;

            let config = NluConfig {
                locale,
                qna: qna.parse::<QnaMode>()?,
                spellchecking: spellcheck,
                multi_intent,
            };

            let nlu = Nlu::new(&credentials, config)?;
            let understanding = nlu.compute(&sentence, &DialogContext::new()).await?;

            println!("{}", serde_json::to_string_pretty(&understanding)?);
        }
    }

    Ok(())
}
