#[cfg(not(target_arch = "wasm32"))]
use anyhow::Result;

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() -> Result<()> {
    use character_lock::core::config::Config;
    use character_lock::core::io::{NativeStorage, Storage};
    use character_lock::services::credential::CredentialStore;
    use character_lock::services::inference::InferenceClient;
    use character_lock::services::llm::create_vision_client;
    use character_lock::services::setup;
    use character_lock::services::studio::Studio;
    use std::sync::Arc;

    env_logger::init();

    // 1. Load or create config
    let config = match Config::load_or_create() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading config: {:#}", e);
            eprintln!("Please check 'config.yml'.");
            return Err(e);
        }
    };
    config.ensure_directories()?;

    // 2. Wire up the session
    let storage: Arc<dyn Storage> = Arc::new(NativeStorage::new());
    let credentials = CredentialStore::with_key(storage.clone(), config.credential_path());
    let vision = create_vision_client(&config.llm)?;
    let studio = Studio::new(credentials, InferenceClient::new(vision, config.language.clone()));

    // 3. API key
    setup::ensure_credential(&studio, &config).await?;

    // 4. Characters from the input folder
    let count = setup::load_input_characters(&studio, &config.input_folder).await?;
    println!("Loaded {} characters from '{}'", count, config.input_folder);

    // 5. Run
    if config.unattended {
        setup::run_unattended(&studio, &config, storage.as_ref()).await?;
    } else {
        if count == 0 {
            studio.add_character();
        }
        setup::run_menu(&studio, &config, storage.as_ref()).await?;
    }

    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {}
