//! Model manager

use anyhow::{bail, Result};
use tcv_common::api_types::{CreateModelRequest, UpdateModelRequest};

use super::find_model;
use crate::client::TcvClient;

pub async fn list(client: &TcvClient) -> Result<()> {
    let models = client.list_models().await?;
    if models.is_empty() {
        println!("No models yet. Add one with `tcv models create <name>`.");
        return Ok(());
    }
    for model in models {
        match model.description.as_deref() {
            Some(description) => println!("{}  {}  ({})", model.id, model.model_name, description),
            None => println!("{}  {}", model.id, model.model_name),
        }
    }
    Ok(())
}

pub async fn create(client: &TcvClient, name: &str, description: Option<String>) -> Result<()> {
    if name.trim().is_empty() {
        bail!("Model name is required");
    }
    let model = client
        .create_model(&CreateModelRequest {
            model_name: Some(name.trim().to_string()),
            description,
        })
        .await?;
    println!("Created model {} ({})", model.model_name, model.id);
    Ok(())
}

pub async fn update(
    client: &TcvClient,
    key: &str,
    name: Option<String>,
    description: Option<String>,
) -> Result<()> {
    if name.is_none() && description.is_none() {
        bail!("Nothing to update: pass --name and/or --description");
    }
    let models = client.list_models().await?;
    let Some(target) = find_model(&models, key) else {
        bail!("Model not found: {key}");
    };

    let model = client
        .update_model(
            &target.id,
            &UpdateModelRequest {
                model_name: name,
                description,
            },
        )
        .await?;
    println!("Updated model {} ({})", model.model_name, model.id);
    Ok(())
}

pub async fn delete(client: &TcvClient, key: &str) -> Result<()> {
    let models = client.list_models().await?;
    let Some(target) = find_model(&models, key) else {
        bail!("Model not found: {key}");
    };
    client.delete_model(&target.id).await?;
    println!("Deleted model {} and its transcriptions", target.model_name);
    Ok(())
}
