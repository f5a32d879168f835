use uuid::Uuid;

/// Base64 image payload together with its MIME type.
///
/// An empty payload or an empty MIME type counts as no image at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub data: String,
    pub mime_type: String,
}

impl ImageData {
    pub fn new(data: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mime_type: mime_type.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty() || self.mime_type.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Character {
    id: String,
    pub name: String,
    pub image: Option<ImageData>,
    pub description: String,
    pub is_loading: bool,
}

impl Character {
    fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            image: None,
            description: String::new(),
            is_loading: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn usable_image(&self) -> Option<&ImageData> {
        self.image.as_ref().filter(|img| !img.is_empty())
    }

    pub fn image(&self) -> Option<&str> {
        self.usable_image().map(|img| img.data.as_str())
    }

    pub fn image_mime_type(&self) -> Option<&str> {
        self.usable_image().map(|img| img.mime_type.as_str())
    }

    pub fn has_image(&self) -> bool {
        self.usable_image().is_some()
    }
}

/// Partial update applied by [`CharacterRegistry::update`]. `None` leaves the
/// field as it is; `image: Some(None)` detaches the image.
#[derive(Debug, Clone, Default)]
pub struct CharacterUpdate {
    pub name: Option<String>,
    pub image: Option<Option<ImageData>>,
    pub description: Option<String>,
    pub is_loading: Option<bool>,
}

impl CharacterUpdate {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn image(image: ImageData) -> Self {
        Self {
            image: Some(Some(image)),
            ..Default::default()
        }
    }

    pub fn clear_image() -> Self {
        Self {
            image: Some(None),
            ..Default::default()
        }
    }

    pub fn loading(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            is_loading: Some(true),
            ..Default::default()
        }
    }

    pub fn finished(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            is_loading: Some(false),
            ..Default::default()
        }
    }

    fn apply(self, character: &mut Character) {
        if let Some(name) = self.name {
            character.name = name;
        }
        if let Some(image) = self.image {
            character.image = image;
        }
        if let Some(description) = self.description {
            character.description = description;
        }
        if let Some(is_loading) = self.is_loading {
            character.is_loading = is_loading;
        }
    }
}

/// Ordered collection of characters. Order is insertion order and decides the
/// positional keys of a batch run.
#[derive(Debug, Clone, Default)]
pub struct CharacterRegistry {
    characters: Vec<Character>,
}

impl CharacterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self) -> &Character {
        let name = format!("Character {}", self.characters.len() + 1);
        self.characters.push(Character::new(name));
        &self.characters[self.characters.len() - 1]
    }

    /// Returns false when no character has this id.
    pub fn update(&mut self, id: &str, update: CharacterUpdate) -> bool {
        match self.characters.iter_mut().find(|c| c.id == id) {
            Some(character) => {
                update.apply(character);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.characters.len();
        self.characters.retain(|c| c.id != id);
        self.characters.len() != before
    }

    pub fn get(&self, id: &str) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Character> {
        self.characters.iter()
    }

    pub fn eligible(&self) -> impl Iterator<Item = &Character> {
        self.characters.iter().filter(|c| c.has_image())
    }

    pub fn snapshot(&self) -> Vec<Character> {
        self.characters.clone()
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_image_pairing(registry: &CharacterRegistry) {
        for c in registry.iter() {
            assert_eq!(c.image().is_some(), c.image_mime_type().is_some());
        }
    }

    #[test]
    fn test_add_assigns_default_name_and_fresh_id() {
        let mut registry = CharacterRegistry::new();
        let first = registry.add().clone();
        let second = registry.add().clone();

        assert_eq!(first.name, "Character 1");
        assert_eq!(second.name, "Character 2");
        assert_ne!(first.id(), second.id());
        assert!(first.description.is_empty());
        assert!(!first.is_loading);
        assert!(!first.has_image());
        assert_image_pairing(&registry);
    }

    #[test]
    fn test_default_name_follows_current_count() {
        let mut registry = CharacterRegistry::new();
        let a = registry.add().id().to_string();
        registry.add();
        registry.remove(&a);

        // Names are derived from the count, not a monotonic counter.
        assert_eq!(registry.add().name, "Character 2");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_ids_are_not_reused_after_removal() {
        let mut registry = CharacterRegistry::new();
        let removed = registry.add().id().to_string();
        registry.remove(&removed);
        let next = registry.add().id().to_string();
        assert_ne!(removed, next);
    }

    #[test]
    fn test_update_merges_only_given_fields() {
        let mut registry = CharacterRegistry::new();
        let id = registry.add().id().to_string();

        assert!(registry.update(&id, CharacterUpdate::name("Alice")));
        assert!(registry.update(&id, CharacterUpdate::image(ImageData::new("aGVsbG8=", "image/png"))));

        let c = registry.get(&id).unwrap();
        assert_eq!(c.name, "Alice");
        assert_eq!(c.image(), Some("aGVsbG8="));
        assert_eq!(c.image_mime_type(), Some("image/png"));
        assert!(c.description.is_empty());
        assert_image_pairing(&registry);

        registry.update(&id, CharacterUpdate::clear_image());
        let c = registry.get(&id).unwrap();
        assert_eq!(c.name, "Alice");
        assert!(c.image().is_none());
        assert!(c.image_mime_type().is_none());
        assert_image_pairing(&registry);
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let mut registry = CharacterRegistry::new();
        registry.add();
        let before = registry.snapshot();

        assert!(!registry.update("missing", CharacterUpdate::name("Nobody")));
        assert_eq!(registry.snapshot(), before);
    }

    #[test]
    fn test_remove_unknown_id_is_noop() {
        let mut registry = CharacterRegistry::new();
        registry.add();
        registry.add();
        let before = registry.snapshot();

        assert!(!registry.remove("missing"));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.snapshot(), before);
    }

    #[test]
    fn test_eligible_keeps_insertion_order() {
        let mut registry = CharacterRegistry::new();
        let a = registry.add().id().to_string();
        registry.add();
        let c = registry.add().id().to_string();
        registry.update(&c, CharacterUpdate::image(ImageData::new("Yw==", "image/jpeg")));
        registry.update(&a, CharacterUpdate::image(ImageData::new("YQ==", "image/png")));

        let eligible: Vec<&str> = registry.eligible().map(|ch| ch.id()).collect();
        assert_eq!(eligible, vec![a.as_str(), c.as_str()]);
    }

    #[test]
    fn test_empty_image_counts_as_absent() {
        let mut registry = CharacterRegistry::new();
        let no_data = registry.add().id().to_string();
        let no_type = registry.add().id().to_string();
        registry.update(&no_data, CharacterUpdate::image(ImageData::new("", "image/png")));
        registry.update(&no_type, CharacterUpdate::image(ImageData::new("YQ==", "")));

        assert_image_pairing(&registry);
        assert!(registry.iter().all(|c| !c.has_image() && c.image().is_none()));
        assert_eq!(registry.eligible().count(), 0);
    }

    #[test]
    fn test_loading_lifecycle_updates() {
        let mut registry = CharacterRegistry::new();
        let id = registry.add().id().to_string();

        registry.update(&id, CharacterUpdate::loading("Generating description..."));
        assert!(registry.get(&id).unwrap().is_loading);

        registry.update(&id, CharacterUpdate::finished("A tall knight."));
        let c = registry.get(&id).unwrap();
        assert!(!c.is_loading);
        assert_eq!(c.description, "A tall knight.");
    }
}
