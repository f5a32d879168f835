/// Fields the extraction prompt asks for, with the guidance given to the model.
/// `id` and `name` are filled in locally.
pub const PROFILE_SCHEMA: &[(&str, &str)] = &[
    ("species", "Species of the character (e.g. Human, Robot, Alien, Elf). May add detail (e.g. Robot – Medical robot)"),
    ("gender", "Gender (e.g. Male, Female, Non-binary)"),
    ("age", "Age or apparent age (e.g. 25, Appears as a teenager)"),
    ("voice_personality", "Voice and personality, using the format: '[Pitch], [Clarity]; locale=[locale]; accent=[accent]'"),
    ("body_build", "Build (e.g. Athletic, Slender, Muscular, Petite)"),
    ("face_shape", "Face shape (e.g. Round, Oval, Square)"),
    ("hair", "Hair (color, style, length)"),
    ("skin_or_fur_color", "Skin or fur color"),
    ("signature_feature", "The most recognisable feature (e.g. A prominent scar over the left eye, glowing tattoos)"),
    ("outfit_top", "Upper-body outfit"),
    ("outfit_bottom", "Lower-body outfit"),
    ("helmet_or_hat", "Helmet, hat or other headwear"),
    ("shoes_or_footwear", "Shoes or footwear"),
    ("props", "Props the character holds or carries"),
    ("body_metrics", "Body metrics, using the format: 'u=cm; abs.height=...; abs.head=...; abs.shoulder=...; abs.torso=...; abs.tail=...; abs.paw=...; anch.bottle500=...; cons=no-auto-rescale,lock-proportions'"),
];

const PROFILE_EXAMPLES: &str = r#"Example 1:
{
  "species": "Robot – Rabbit-shaped robot",
  "gender": "Female",
  "age": "Appears as a young adult robot",
  "voice_personality": "High-pitched; locale=en-US; accent=Robotic monotone",
  "body_build": "Petite, slender",
  "face_shape": "Rabbit-like, round",
  "hair": "None",
  "skin_or_fur_color": "White and pink metallic casing",
  "signature_feature": "Long rabbit ears, large black eyes with pink rims, heart symbol on body",
  "outfit_top": "Integrated pink dress-like torso",
  "outfit_bottom": "Integrated pink dress-like lower body",
  "helmet_or_hat": "Pink bow on head",
  "shoes_or_footwear": "Integrated robot feet",
  "props": "None",
  "body_metrics": "u=cm; abs.height=100; abs.head=20; abs.shoulder=25; abs.torso=50; abs.tail=0; abs.paw=10; anch.bottle500=20; cons=no-auto-rescale,lock-proportions"
}
Example 2:
{
  "species": "Robot – Humanoid robot",
  "gender": "Male",
  "age": "Appears as an adult robot",
  "voice_personality": "Male, clear; locale=en-US; accent=Robotic monotone",
  "body_build": "Standard humanoid robot build",
  "face_shape": "Rectangular screen for head",
  "hair": "None",
  "skin_or_fur_color": "Orange metallic casing",
  "signature_feature": "Rectangular screen head (displaying eyes), two antennae, heart symbol on torso",
  "outfit_top": "Integrated robot torso",
  "outfit_bottom": "Integrated robot lower body",
  "helmet_or_hat": "None",
  "shoes_or_footwear": "Integrated robot feet",
  "props": "None",
  "body_metrics": "u=cm; abs.height=180; abs.head=30; abs.shoulder=40; abs.torso=80; abs.tail=0; abs.paw=15; anch.bottle500=20; cons=no-auto-rescale,lock-proportions"
}"#;

pub fn describe_prompt(language: &str) -> String {
    format!(
        "Analyse the character in the provided image and write a detailed description in {language}.\n\
        Use natural prose split into clear sections, following the example below.\n\
        \n\
        ### EXAMPLE OF THE EXPECTED STRUCTURE ###\n\
        \n\
        This character is a humanoid creature drawn in a simple 2D cartoon style with bold, consistent black outlines.\n\
        \n\
        **Overall appearance:**\n\
        *   **Main colors:** The whole body, head to toe, is a bright, uniform orange.\n\
        *   **Body shape:** A simple trapezoid torso flaring slightly at the bottom. Long, thin arms and legs of even thickness.\n\
        *   **Proportions:** The head is large compared to the body.\n\
        \n\
        **Face:**\n\
        *   **Head shape:** Round.\n\
        *   **Eyes:** Large eyes with simple round pupils, giving a sly look.\n\
        *   **Eyebrows:** Thick black eyebrows knitted together.\n\
        *   **Mouth:** A very wide grin showing many teeth.\n\
        *   **Nose and ears:** No nose. The ears are replaced by headphones.\n\
        \n\
        **Clothing and accessories:**\n\
        *   **Clothing:** No visible clothing.\n\
        *   **Headwear:** A pair of headphones combined with antennae, each topped by a round ball.\n\
        \n\
        **Style and expression:**\n\
        *   **Style:** Minimalist, flat graphics.\n\
        *   **Pose:** Standing upright, legs apart, hands loosely closed.\n\
        *   **Expression:** Confident, defiant and somewhat mischievous.\n\
        \n\
        ### RULES ###\n\
        1.  Describe as much detail as the image allows.\n\
        2.  Use markdown with bold headings (**...**) and bullet points (*).\n\
        3.  Do not return JSON. Return only the descriptive text.\n\
        \n\
        ### END OF EXAMPLE ###\n\
        \n\
        Now analyse the provided image and write the detailed description."
    )
}

pub fn extract_prompt() -> String {
    let structure = PROFILE_SCHEMA
        .iter()
        .map(|(field, hint)| format!("  \"{}\": \"{}\"", field, hint))
        .collect::<Vec<_>>()
        .join(",\n");

    format!(
        "Analyse the character in the provided image and return a SINGLE JSON object.\n\
        The object must be EXTREMELY DETAILED so video generation models can \"lock\" the character's traits.\n\
        Every value must be a concise but complete descriptive string.\n\
        \n\
        ### EXAMPLES OF THE EXPECTED OUTPUT (WITHOUT \"id\" AND \"name\") ###\n\
        {PROFILE_EXAMPLES}\n\
        \n\
        ### REQUIRED STRUCTURE ###\n\
        Use exactly these keys:\n\
        {{\n{structure}\n}}\n\
        \n\
        ### ABSOLUTE RULES ###\n\
        1.  **EXTREMELY DETAILED:** Another AI must be able to recreate the character from the values.\n\
        2.  **JSON ONLY:** Do NOT add any text before or after the JSON object.\n\
        3.  **NO MARKDOWN:** Do NOT wrap the JSON in a markdown code block (```json ... ```).\n\
        4.  **NO 'id' OR 'name' FIELDS:** The object must NOT contain \"id\" or \"name\". The application adds them.\n\
        \n\
        Now analyse the provided image and produce the detailed JSON object following these rules."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_prompt_lists_every_profile_field() {
        let prompt = extract_prompt();
        for (field, _) in PROFILE_SCHEMA {
            assert!(prompt.contains(&format!("\"{}\":", field)), "missing {}", field);
        }
        assert_eq!(PROFILE_SCHEMA.len(), 15);
        assert!(!PROFILE_SCHEMA.iter().any(|(f, _)| *f == "id" || *f == "name"));
    }

    #[test]
    fn test_describe_prompt_names_language_and_forbids_json() {
        let prompt = describe_prompt("English");
        assert!(prompt.contains("detailed description in English"));
        assert!(prompt.contains("Do not return JSON"));
        assert!(prompt.contains("**Face:**"));
    }
}
