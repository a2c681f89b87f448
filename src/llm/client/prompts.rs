//! Default LLM prompts for model annotation.

/// Default system prompt for extracting character and outfit data.
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"You are an assistant specialized in processing information about LORA models from CivitAI.
Analyze the information provided and extract structured data about characters and their outfits.

Return ONLY a valid JSON object with the following keys:
- character_name: simple character name in lowercase with underscores
- character_description: basic physical characteristics (no "solo", no clothing)
- s1: all outfits separated by /cut, with a shoeless version when applicable
- s2: main outfit /cut _tokenClothing /cut _tokenClothing2
- s3: main outfit /cut _tokenClothing /cut _tokenClothing2"#;

/// Separator line between sections of the user message.
pub const SECTION_RULE: &str = "----------------------------------------";
