//! Input validation functions
//!
//! Chirp body rules and the profanity filter. Account fields are validated
//! with the `validator` derive on the request types.

/// Words replaced by [`CENSORED`] in chirp bodies (matched case-insensitively)
pub const BANNED_WORDS: [&str; 3] = ["kerfuffle", "sharbert", "fornax"];

/// Replacement for a banned word
pub const CENSORED: &str = "****";

/// Validate a chirp body against the configured maximum length (in characters)
pub fn validate_chirp_body(body: &str, max_length: usize) -> Result<(), String> {
    if body.trim().is_empty() {
        return Err("Chirp cannot be empty".to_string());
    }
    if body.chars().count() > max_length {
        return Err("Chirp is too long".to_string());
    }
    Ok(())
}

/// Replace every space-separated word found in [`BANNED_WORDS`] with `****`.
///
/// Words with attached punctuation (`"Sharbert!"`) are left alone.
pub fn censor_profanity(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let lowered = word.to_lowercase();
            if BANNED_WORDS.contains(&lowered.as_str()) {
                CENSORED
            } else {
                word
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
