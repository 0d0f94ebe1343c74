//! tcv - command-line client for tcv-server
//!
//! Covers both sides of the service: reviewers browse audios, compare
//! transcriptions and vote; admins upload audio, import CSV transcriptions
//! and manage models.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tcv_common::gallery::StatusFilter;

mod client;
mod commands;
mod session;

use client::TcvClient;
use commands::{import, models, review, upload};

#[derive(Parser, Debug)]
#[command(name = "tcv")]
#[command(about = "Compare and vote on audio transcriptions")]
#[command(version)]
struct Cli {
    /// Base URL of tcv-server
    #[arg(long, env = "TCV_SERVER", default_value = "http://127.0.0.1:5740")]
    server: String,

    /// File holding the reviewer session id
    #[arg(long, env = "TCV_SESSION_FILE")]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List audios with validation counts
    Gallery {
        /// Case-insensitive match on name or language tag
        #[arg(short, long, default_value = "")]
        search: String,
        /// all, validated or pending
        #[arg(long, default_value = "all")]
        status: StatusFilter,
    },
    /// Show the transcriptions of one audio side by side
    Show { audio_id: String },
    /// Vote for a transcription and/or leave a comment
    Vote {
        audio_id: String,
        /// Transcription id, or its number in `tcv show`
        #[arg(short, long)]
        prefer: Option<String>,
        #[arg(short, long)]
        comment: Option<String>,
    },
    /// List feedback, newest first
    Feedback {
        #[arg(long)]
        audio_id: Option<String>,
    },
    /// Per-audio vote totals by model
    Stats,
    /// Mark an audio validated (or pending again with --pending)
    Validate {
        audio_id: String,
        #[arg(long)]
        pending: bool,
    },
    /// Upload .wav/.mp3 files
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Import transcriptions of one model from a CSV file
    Import {
        /// Model id or name
        #[arg(short, long)]
        model: String,
        file: PathBuf,
    },
    /// Manage transcription models
    Models {
        #[command(subcommand)]
        action: ModelAction,
    },
}

#[derive(Subcommand, Debug)]
enum ModelAction {
    List,
    Create {
        name: String,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Rename or re-describe a model (an empty description clears it)
    Update {
        /// Model id or name
        model: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Delete a model and its transcriptions
    Delete {
        /// Model id or name
        model: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = TcvClient::new(&cli.server)?;
    let session_path = cli.session_file.unwrap_or_else(session::default_session_path);

    match cli.command {
        Command::Gallery { search, status } => review::gallery(&client, &search, status).await,
        Command::Show { audio_id } => review::show(&client, &audio_id).await,
        Command::Vote {
            audio_id,
            prefer,
            comment,
        } => review::vote(&client, &session_path, &audio_id, prefer, comment).await,
        Command::Feedback { audio_id } => review::feedback(&client, audio_id.as_deref()).await,
        Command::Stats => review::stats(&client).await,
        Command::Validate { audio_id, pending } => review::validate(&client, &audio_id, !pending).await,
        Command::Upload { files } => upload::run(&client, &files).await,
        Command::Import { model, file } => import::run(&client, &model, &file).await,
        Command::Models { action } => match action {
            ModelAction::List => models::list(&client).await,
            ModelAction::Create { name, description } => models::create(&client, &name, description).await,
            ModelAction::Update {
                model,
                name,
                description,
            } => models::update(&client, &model, name, description).await,
            ModelAction::Delete { model } => models::delete(&client, &model).await,
        },
    }
}
