use crate::schema::enum_def::GenerationKind;

/// Blocked substrings for the visual kinds (image, living): brands,
/// public figures, style-mimicry phrases, explicit content.
const VISUAL_BLOCKED_TERMS: [&str; 47] = [
    "disney", "marvel", "dc comics", "batman", "superman", "spiderman",
    "harry potter", "star wars", "lord of the rings", "pokemon", "nintendo",
    "mickey mouse", "pixar", "dreamworks", "studio ghibli",
    "taylor swift", "beyonce", "drake", "kanye", "eminem", "rihanna",
    "ariana grande", "justin bieber", "ed sheeran", "billie eilish",
    "trump", "biden", "obama", "celebrity", "famous person",
    "elon musk", "jeff bezos", "mark zuckerberg",
    "in the style of", "like picasso", "like van gogh", "like monet",
    "like banksy", "like warhol", "greg rutkowski", "artgerm",
    "nsfw", "nude", "naked", "explicit", "sexual", "porn",
];

/// Blocked substrings for sound prompts: musicians, imitation phrases,
/// licensing terms, explicit content.
const SOUND_BLOCKED_TERMS: [&str; 28] = [
    "taylor swift", "beyonce", "drake", "kanye", "eminem", "rihanna",
    "ariana grande", "justin bieber", "ed sheeran", "billie eilish",
    "beatles", "elvis", "michael jackson", "madonna", "prince",
    "in the style of", "cover of", "remix of", "sounds like",
    "voice of", "celebrity voice", "famous singer",
    "copyrighted", "trademark", "licensed music",
    "nsfw", "explicit", "profanity",
];

fn blocked_terms(kind: GenerationKind) -> &'static [&'static str] {
    match kind {
        GenerationKind::Image | GenerationKind::Living => &VISUAL_BLOCKED_TERMS,
        GenerationKind::Sound => &SOUND_BLOCKED_TERMS,
    }
}

/// Checks a prompt against the denylist and length bounds. Matching is
/// case-insensitive substring containment only: no tokenization, no
/// stemming. That means benign words containing a blocked substring are
/// rejected and spaced-out evasions pass; a blunt heuristic, not a
/// moderation system.
pub fn validate_prompt(kind: GenerationKind, prompt: &str) -> Result<(), String> {
    let lower = prompt.to_lowercase();
    for term in blocked_terms(kind) {
        if lower.contains(term) {
            return Err(format!(
                "Content policy violation: \"{}\" is not allowed",
                term
            ));
        }
    }
    let length = prompt.chars().count();
    if length < 3 {
        return Err("Prompt too short".to_string());
    }
    if length > 500 {
        return Err("Prompt too long (max 500 characters)".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_prompts_are_rejected() {
        assert_eq!(
            validate_prompt(GenerationKind::Image, "hi"),
            Err("Prompt too short".to_string())
        );
        assert_eq!(
            validate_prompt(GenerationKind::Image, ""),
            Err("Prompt too short".to_string())
        );
    }

    #[test]
    fn long_prompts_are_rejected() {
        let prompt = "a".repeat(501);
        assert_eq!(
            validate_prompt(GenerationKind::Sound, &prompt),
            Err("Prompt too long (max 500 characters)".to_string())
        );
        assert!(validate_prompt(GenerationKind::Sound, &"a".repeat(500)).is_ok());
    }

    #[test]
    fn denylisted_substring_rejects() {
        let err = validate_prompt(GenerationKind::Image, "harry potter wizard").unwrap_err();
        assert!(err.contains("harry potter"));
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert!(validate_prompt(GenerationKind::Living, "A scene from STAR WARS").is_err());
        assert!(validate_prompt(GenerationKind::Sound, "a COVER OF my favorite song").is_err());
    }

    #[test]
    fn benign_near_misses_pass() {
        // substring containment goes the other way: "otter" is not blocked
        assert!(validate_prompt(GenerationKind::Image, "a happy otter").is_ok());
        assert!(validate_prompt(GenerationKind::Image, "a quiet forest pond at dusk").is_ok());
    }

    #[test]
    fn sound_list_differs_from_visual_list() {
        // "disney" only blocks visual prompts; "cover of" only blocks sound
        assert!(validate_prompt(GenerationKind::Sound, "disney-like chimes").is_ok());
        assert!(validate_prompt(GenerationKind::Image, "a cover of moss on stone").is_ok());
    }
}
