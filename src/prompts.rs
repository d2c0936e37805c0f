// Contains the prompt sent to Gemini for book recommendations.

use crate::models::Selection;

pub const RECOMMENDATION_COUNT: usize = 6;

pub fn recommendation_prompt(selection: &Selection) -> String {
    format!(
        r#"Recommend {count} books for a {level} {genre} reader feeling {mood}. For each book, provide:
1. Title and Author
2. Brief description (2-3 sentences)
3. Why it matches their mood and level

Format as a numbered list."#,
        count = RECOMMENDATION_COUNT,
        level = selection.level,
        genre = selection.genre,
        mood = selection.mood,
    )
}
