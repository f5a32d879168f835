use crate::core::config::Config;
use crate::core::io::Storage;
use crate::core::state::CharacterUpdate;
use crate::services::studio::Studio;
use crate::utils::image::{load_image_file, mime_type_for};
use anyhow::{anyhow, Result};
use inquire::{Confirm, Password, Select, Text};
use std::fmt;
use std::path::{Path, PathBuf};

pub async fn ensure_credential(studio: &Studio, config: &Config) -> Result<()> {
    if studio.credential().await?.is_some() {
        return Ok(());
    }
    if config.unattended {
        return Err(anyhow!(
            "No API key saved. Run once interactively to store one under {}",
            config.data_folder
        ));
    }

    prompt_and_save_credential(studio).await
}

async fn prompt_and_save_credential(studio: &Studio) -> Result<()> {
    let key = Password::new("Gemini API key:")
        .without_confirmation()
        .prompt()?;
    studio.save_credential(key.trim()).await?;
    println!("API key saved.");
    Ok(())
}

pub async fn list_input_images(folder: &str) -> Result<Vec<PathBuf>> {
    let mut images = Vec::new();
    if !tokio::fs::try_exists(folder).await? {
        return Ok(images);
    }

    let mut dir = tokio::fs::read_dir(folder).await?;
    while let Some(entry) = dir.next_entry().await? {
        let path = entry.path();
        if path.is_file() && mime_type_for(&path).is_some() {
            images.push(path);
        }
    }
    images.sort();
    Ok(images)
}

/// Registers one character per image in the input folder, named after the file.
pub async fn load_input_characters(studio: &Studio, folder: &str) -> Result<usize> {
    let images = list_input_images(folder).await?;
    for path in &images {
        let image = load_image_file(path).await?;
        let id = studio.add_character().id().to_string();
        if let Some(stem) = path.file_stem() {
            studio.update_character(&id, CharacterUpdate::name(stem.to_string_lossy()));
        }
        studio.update_character(&id, CharacterUpdate::image(image));
    }
    log::info!("Loaded {} characters from {}", images.len(), folder);
    Ok(images.len())
}

pub async fn run_unattended(studio: &Studio, config: &Config, storage: &dyn Storage) -> Result<()> {
    let lock = studio.generate_lock().await?;
    println!("{}", lock.to_pretty_json()?);
    studio.export_lock(storage, &config.export_path()).await?;
    println!("Exported to {}", config.export_path());
    Ok(())
}

#[derive(Clone, Copy)]
enum MenuAction {
    Describe,
    GenerateLock,
    Export,
    Rename,
    AttachImage,
    Remove,
    AddCharacter,
    ReplaceKey,
    DeleteKey,
    Quit,
}

impl fmt::Display for MenuAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MenuAction::Describe => "Describe a character",
            MenuAction::GenerateLock => "Generate character lock JSON",
            MenuAction::Export => "Export character lock",
            MenuAction::Rename => "Rename a character",
            MenuAction::AttachImage => "Attach an image",
            MenuAction::Remove => "Remove a character",
            MenuAction::AddCharacter => "Add an empty character",
            MenuAction::ReplaceKey => "Replace API key",
            MenuAction::DeleteKey => "Delete API key",
            MenuAction::Quit => "Quit",
        };
        f.write_str(label)
    }
}

const MENU: [MenuAction; 10] = [
    MenuAction::Describe,
    MenuAction::GenerateLock,
    MenuAction::Export,
    MenuAction::Rename,
    MenuAction::AttachImage,
    MenuAction::Remove,
    MenuAction::AddCharacter,
    MenuAction::ReplaceKey,
    MenuAction::DeleteKey,
    MenuAction::Quit,
];

pub async fn run_menu(studio: &Studio, config: &Config, storage: &dyn Storage) -> Result<()> {
    loop {
        print_characters(studio);
        let action = Select::new("What next?", MENU.to_vec()).prompt()?;

        // Failures of a single action are reported and the menu keeps going.
        if let Err(e) = run_action(action, studio, config, storage).await {
            println!("Error: {:#}", e);
        }
        if matches!(action, MenuAction::Quit) {
            return Ok(());
        }
    }
}

async fn run_action(
    action: MenuAction,
    studio: &Studio,
    config: &Config,
    storage: &dyn Storage,
) -> Result<()> {
    match action {
        MenuAction::Describe => {
            if let Some(id) = select_character(studio, "Describe which character?")? {
                println!("Generating description...");
                studio.analyze_character(&id).await?;
                if let Some(c) = studio.character(&id) {
                    println!("\n{}\n", c.description);
                }
            }
        }
        MenuAction::GenerateLock => {
            let lock = studio.generate_lock().await?;
            println!("{}", lock.to_pretty_json()?);
        }
        MenuAction::Export => {
            let path = config.export_path();
            studio.export_lock(storage, &path).await?;
            println!("Exported to {}", path);
        }
        MenuAction::Rename => {
            if let Some(id) = select_character(studio, "Rename which character?")? {
                let name = Text::new("New name:").prompt()?;
                studio.update_character(&id, CharacterUpdate::name(name));
            }
        }
        MenuAction::AttachImage => {
            if let Some(id) = select_character(studio, "Attach an image to which character?")? {
                let path = Text::new("Image path:").prompt()?;
                let image = load_image_file(Path::new(path.trim())).await?;
                studio.update_character(&id, CharacterUpdate::image(image));
            }
        }
        MenuAction::Remove => {
            if let Some(id) = select_character(studio, "Remove which character?")? {
                if Confirm::new("Remove this character?").with_default(false).prompt()? {
                    studio.remove_character(&id);
                }
            }
        }
        MenuAction::AddCharacter => {
            let c = studio.add_character();
            println!("Added {}", c.name);
        }
        MenuAction::ReplaceKey => prompt_and_save_credential(studio).await?,
        MenuAction::DeleteKey => {
            studio.clear_credential().await?;
            println!("API key deleted.");
        }
        MenuAction::Quit => {}
    }
    Ok(())
}

fn print_characters(studio: &Studio) {
    let characters = studio.characters();
    if characters.is_empty() {
        println!("No characters yet.");
        return;
    }
    for (i, c) in characters.iter().enumerate() {
        let image = c.image_mime_type().unwrap_or("no image");
        println!("{:>3}. {} [{}]", i + 1, c.name, image);
    }
}

fn select_character(studio: &Studio, prompt: &str) -> Result<Option<String>> {
    let characters = studio.characters();
    if characters.is_empty() {
        println!("No characters yet.");
        return Ok(None);
    }

    let options: Vec<String> = characters
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{}. {}", i + 1, c.name))
        .collect();
    let selection = Select::new(prompt, options).raw_prompt()?;

    Ok(Some(characters[selection.index].id().to_string()))
}
