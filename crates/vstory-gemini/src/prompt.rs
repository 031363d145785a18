//! Fixed story prompt and output normalization.

/// Prompt sent with every video. The model invents a dateline (year 2025,
/// month matched to the scene's season), a quoted title of at most 45
/// characters, at least three paragraphs, and a closing AI disclosure line.
pub const STORY_PROMPT: &str = r#"Based on the video, create a news story that strictly follows the format and structure of the example below.

- Invent a plausible location and a date following these rules:
  * The year must be 2025
  * The month should match the video content:
    - Winter scenes (snow, ice, cold weather) → December, January, or February
    - Summer scenes (beach, heat, outdoor activities) → June, July, or August
    - Spring scenes (flowers, rain, mild weather) → March, April, or May
    - Fall scenes (autumn leaves, harvest) → September, October, or November
    - Indoor/neutral content → Any month is acceptable
  * Pick a realistic day for that month (1-28/29/30/31 depending on month)
- The title must be 45 characters or less and enclosed in double quotes.
- The main story (between the date and the final disclaimer) must have at least 3 paragraphs.
- The output must be a continuous stream.
- Use a single blank line to separate the title, date, each paragraph, and the final disclaimer.

**EXAMPLE:**

"Chain-Reaction Crash on Icy Hill Leaves Dozens Stranded"

Bozeman, Montana — January 15, 2019

A sheet of invisible black ice turned a quiet mountain roadway into a chaotic crash zone Thursday morning, as car after car slid helplessly down a steep hill, slamming into vehicles already wrecked at the bottom.

The viral video shows the terrifying sequence unfolding in real time: a red sedan loses control first, spinning sideways across the road. A white SUV approaches moments later, taps the brakes, and instantly begins sliding as if on glass, colliding violently with the stranded sedan. Within seconds, another crossover comes down the hill with zero traction, tires locked, skidding directly into the growing pileup.

Drivers exiting their vehicles can be seen slipping on the ice themselves, shouting warnings to oncoming traffic as more cars crest the hill unaware of the danger. Fortunately, authorities report that despite the dramatic footage, injuries were minor—thanks largely to the low speeds and quick response from nearby motorists who helped divert traffic.

Officials are urging drivers to stay off steep grades during freezing rain conditions, as black ice often forms without any visible indication and can render brakes and steering nearly useless.

This video is created using AI, and the story is for your entertainment."#;

/// Strip the enclosing double quotes from the first line of the raw model
/// output, if present. Titles are normalized, not re-validated: the prompt's
/// length and paragraph rules are the model's to follow.
pub fn strip_title_quotes(raw: &str) -> String {
    let mut lines: Vec<&str> = raw.split('\n').collect();
    if let Some(first) = lines.first() {
        if first.len() >= 2 && first.starts_with('"') && first.ends_with('"') {
            let trimmed = &first[1..first.len() - 1];
            lines[0] = trimmed;
            return lines.join("\n");
        }
    }
    raw.to_string()
}
