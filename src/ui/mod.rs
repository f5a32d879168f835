use crate::core::config::Config;
use crate::core::io::Storage;
use crate::core::lock::EXPORT_FILE_NAME;
use crate::core::state::{Character, CharacterUpdate, ImageData};
use crate::core::web_io::WebStorage;
use crate::services::credential::CredentialStore;
use crate::services::inference::InferenceClient;
use crate::services::llm::create_vision_client;
use crate::services::studio::Studio;
use crate::utils::image::encode_image;
use leptos::*;
use std::rc::Rc;
use std::sync::Arc;
use wasm_bindgen::{JsCast, JsValue};

const LOCK_PLACEHOLDER: &str = "Generating character_lock JSON, please wait...";

fn build_studio() -> anyhow::Result<Studio> {
    let config = Config::default();
    let storage: Arc<dyn Storage> = Arc::new(WebStorage::new()?);
    let vision = create_vision_client(&config.llm)?;
    Ok(Studio::new(
        CredentialStore::new(storage),
        InferenceClient::new(vision, config.language),
    ))
}

fn alert(message: &str) {
    if let Some(window) = web_sys::window() {
        let _ = window.alert_with_message(message);
    }
}

#[component]
pub fn App() -> impl IntoView {
    view! {
        <div class="app-container">
            <h1>"Character Lock"</h1>
            {match build_studio() {
                Ok(studio) => view! { <Workspace studio=Rc::new(studio)/> }.into_view(),
                Err(e) => view! { <p>"Error loading storage: " {e.to_string()}</p> }.into_view(),
            }}
        </div>
    }
}

#[component]
fn Workspace(studio: Rc<Studio>) -> impl IntoView {
    let characters = create_rw_signal(Vec::<Character>::new());
    let api_key_input = create_rw_signal(String::new());
    let lock_text = create_rw_signal(String::new());
    let generating = create_rw_signal(false);

    studio.add_character();
    characters.set(studio.characters());

    {
        let studio = studio.clone();
        spawn_local(async move {
            match studio.credential().await {
                Ok(Some(key)) => api_key_input.set(key),
                Ok(None) => {}
                Err(e) => log::error!("Failed to load API key: {}", e),
            }
        });
    }

    let on_save_key = {
        let studio = studio.clone();
        move |_| {
            let studio = studio.clone();
            spawn_local(async move {
                match studio.save_credential(&api_key_input.get_untracked()).await {
                    Ok(()) => alert("API key saved!"),
                    Err(e) => alert(&e.to_string()),
                }
            });
        }
    };

    let on_delete_key = {
        let studio = studio.clone();
        move |_| {
            let studio = studio.clone();
            spawn_local(async move {
                match studio.clear_credential().await {
                    Ok(()) => {
                        api_key_input.set(String::new());
                        alert("API key deleted!");
                    }
                    Err(e) => alert(&e.to_string()),
                }
            });
        }
    };

    let on_add = {
        let studio = studio.clone();
        move |_| {
            studio.add_character();
            characters.set(studio.characters());
        }
    };

    let on_generate = {
        let studio = studio.clone();
        move |_| {
            if generating.get_untracked() {
                return;
            }
            let studio = studio.clone();
            let previous = lock_text.get_untracked();
            generating.set(true);
            lock_text.set(LOCK_PLACEHOLDER.to_string());
            spawn_local(async move {
                match studio.generate_lock().await {
                    Ok(lock) => match lock.to_pretty_json() {
                        Ok(text) => lock_text.set(text),
                        Err(e) => {
                            lock_text.set(previous);
                            alert(&e.to_string());
                        }
                    },
                    Err(e) => {
                        lock_text.set(previous);
                        alert(&e.to_string());
                    }
                }
                generating.set(false);
            });
        }
    };

    let on_export = {
        let studio = studio.clone();
        move |_| match studio.export_json() {
            Ok(json) => {
                if let Err(e) = download(EXPORT_FILE_NAME, &json) {
                    log::error!("Export failed: {:?}", e);
                }
            }
            Err(e) => alert(&e.to_string()),
        }
    };

    let cards_studio = studio.clone();

    view! {
        <section class="api-key">
            <label for="api-key">"Gemini API key (saved in this browser)"</label>
            <input
                id="api-key"
                type="password"
                prop:value=move || api_key_input.get()
                on:input=move |ev| api_key_input.set(event_target_value(&ev))
            />
            <a href="https://aistudio.google.com/app/api-keys" target="_blank" rel="noopener noreferrer">"Get a key"</a>
            <button on:click=on_save_key>"Save key"</button>
            <button on:click=on_delete_key>"Delete key"</button>
        </section>

        <section class="characters">
            <h2>"Characters"</h2>
            {move || {
                characters
                    .get()
                    .into_iter()
                    .map(|c| view! { <CharacterCard character=c studio=cards_studio.clone() characters=characters/> })
                    .collect_view()
            }}
            <button on:click=on_add>"+ Add character"</button>
        </section>

        <section class="character-lock">
            <h2>"Character JSON"</h2>
            <button on:click=on_generate disabled=move || generating.get()>
                {move || if generating.get() { "Generating..." } else { "Generate character JSON" }}
            </button>
            <button
                on:click=on_export
                disabled=move || generating.get() || lock_text.get().is_empty()
            >
                "Export to file (json)"
            </button>
            <pre>
                <code>
                    {move || {
                        let text = lock_text.get();
                        if text.is_empty() {
                            "Press \"Generate character JSON\" to build the character_lock structure.".to_string()
                        } else {
                            text
                        }
                    }}
                </code>
            </pre>
        </section>
    }
}

#[component]
fn CharacterCard(
    character: Character,
    studio: Rc<Studio>,
    characters: RwSignal<Vec<Character>>,
) -> impl IntoView {
    let id = character.id().to_string();

    let on_name = {
        let studio = studio.clone();
        let id = id.clone();
        move |ev: ev::Event| {
            studio.update_character(&id, CharacterUpdate::name(event_target_value(&ev)));
            characters.set(studio.characters());
        }
    };

    let on_file = {
        let studio = studio.clone();
        let id = id.clone();
        move |ev: ev::Event| {
            let input: web_sys::HtmlInputElement = event_target(&ev);
            let Some(file) = input.files().and_then(|files| files.get(0)) else {
                return;
            };
            let studio = studio.clone();
            let id = id.clone();
            spawn_local(async move {
                match read_image(&file).await {
                    Ok(image) => {
                        studio.update_character(&id, CharacterUpdate::image(image));
                        characters.set(studio.characters());
                    }
                    Err(e) => log::error!("Failed to read image: {:?}", e),
                }
            });
        }
    };

    let on_analyze = {
        let studio = studio.clone();
        let id = id.clone();
        move |_| {
            let studio = studio.clone();
            let id = id.clone();
            spawn_local(async move {
                let image = match studio.character_image(&id) {
                    Ok(image) => image,
                    Err(e) => return alert(&e.to_string()),
                };
                let api_key = match studio.require_credential().await {
                    Ok(key) => key,
                    Err(e) => return alert(&e.to_string()),
                };

                studio.mark_analyzing(&id);
                characters.set(studio.characters());

                let description = studio.describe(&api_key, &image).await;
                studio.complete_analysis(&id, description);
                characters.set(studio.characters());
            });
        }
    };

    let on_delete = {
        let studio = studio.clone();
        let id = id.clone();
        move |_| {
            studio.remove_character(&id);
            characters.set(studio.characters());
        }
    };

    let preview = character
        .usable_image()
        .map(|img| format!("data:{};base64,{}", img.mime_type, img.data));
    let is_loading = character.is_loading;

    view! {
        <div class="character-card">
            <input type="text" prop:value=character.name.clone() on:change=on_name/>
            {preview.map(|src| view! { <img src=src alt="character"/> })}
            <input type="file" accept="image/*" on:change=on_file/>
            <button on:click=on_analyze disabled=is_loading>
                {if is_loading { "Analysing..." } else { "Analyse" }}
            </button>
            <button on:click=on_delete>"Delete"</button>
            <pre class="description">{character.description.clone()}</pre>
        </div>
    }
}

async fn read_image(file: &web_sys::File) -> Result<ImageData, JsValue> {
    let buffer = wasm_bindgen_futures::JsFuture::from(file.array_buffer()).await?;
    let bytes = js_sys::Uint8Array::new(&buffer).to_vec();
    Ok(encode_image(&bytes, &file.type_()))
}

fn download(file_name: &str, content: &str) -> Result<(), JsValue> {
    let parts = js_sys::Array::of1(&JsValue::from_str(content));
    let options = web_sys::BlobPropertyBag::new();
    options.set_type("application/json");
    let blob = web_sys::Blob::new_with_str_sequence_and_options(&parts, &options)?;
    let url = web_sys::Url::create_object_url_with_blob(&blob)?;

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("No document available"))?;
    let body = document
        .body()
        .ok_or_else(|| JsValue::from_str("No document body"))?;
    let anchor: web_sys::HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
    anchor.set_href(&url);
    anchor.set_download(file_name);

    body.append_child(&anchor)?;
    anchor.click();
    body.remove_child(&anchor)?;
    web_sys::Url::revoke_object_url(&url)?;
    Ok(())
}
