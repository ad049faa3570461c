//! Subcommand implementations.

use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use colored::Colorize;
use dc_core::config::loader::load_config;
use dc_core::init::{generate_docchat_structure, InitOptions};
use dc_core::stream::{load_script, open, replay as replay_events, StreamOptions};
use dc_protocol::framing::Framing;
use serde_json::json;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tokio_stream::StreamExt;

pub async fn init(target_dir: PathBuf, force: bool, minimal: bool) -> Result<()> {
    let dc_dir = generate_docchat_structure(InitOptions {
        target_dir,
        force,
        minimal,
    })
    .await?;

    println!(
        "{} Initialized {}",
        "✓".green().bold(),
        dc_dir.display().to_string().bold()
    );
    if minimal {
        println!("  Using the built-in prompts. Add prompts/*.md to override them.");
    }

    Ok(())
}

pub fn parse(file: Option<&Path>, framing: Framing) -> Result<()> {
    let content = match file {
        Some(path) => std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .wrap_err("Failed to read stdin")?;
            buffer
        }
    };

    let parsed = framing.parse(&content);
    println!("{}", serde_json::to_string_pretty(&parsed)?);

    Ok(())
}

pub async fn replay(script: &Path, framing: Framing, capacity: usize) -> Result<()> {
    let events = load_script(script).map_err(|e| eyre!("{:#}", e))?;
    tracing::debug!(events = events.len(), script = %script.display(), "Replaying callback script");

    let options = StreamOptions::default()
        .with_framing(framing)
        .with_capacity(capacity);
    let (mut stream, handlers) = open(options, None);

    // Handlers drop with the task, which ends the stream if the script never closes it
    let producer = tokio::spawn(async move {
        replay_events(&handlers, &events).await;
    });

    let mut stdout = std::io::stdout().lock();
    let mut failure = None;
    while let Some(item) = stream.next().await {
        match item {
            Ok(chunk) => {
                stdout.write_all(chunk.as_bytes())?;
                stdout.flush()?;
            }
            Err(error) => failure = Some(error),
        }
    }
    drop(stdout);

    producer.await?;

    match failure {
        Some(error) => {
            eprintln!();
            Err(eyre!("{} {}", "Stream aborted:".red().bold(), error))
        }
        None => Ok(()),
    }
}

pub async fn config(dir: &Path) -> Result<()> {
    let config = load_config(dir).await?;

    let prompts = json!({
        "condense-question": {
            "input_variables": config.prompts.condense_question.input_variables(),
            "template": config.prompts.condense_question.template(),
        },
        "qa": {
            "input_variables": config.prompts.qa.input_variables(),
            "template": config.prompts.qa.template(),
        },
    });
    let output = json!({
        "chat": config.chat,
        "prompts": prompts,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
