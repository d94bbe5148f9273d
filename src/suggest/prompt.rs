use super::MatchMode;

/// The instruction fragment each matching mode contributes to the prompt.
pub fn mode_instruction(mode: MatchMode) -> &'static str {
    match mode {
        MatchMode::Exact => "using only these ingredients",
        MatchMode::Few => "using these ingredients plus at most 1-2 extra ingredients",
        MatchMode::Flexible => "using at least half of these ingredients",
    }
}

/// Build the natural-language prompt for a recipe search. The reply format
/// is spelled out in full and fences are forbidden so the reply can be
/// parsed strictly as JSON.
pub fn build_prompt(ingredients: &[String], mode: MatchMode) -> String {
    format!(
        concat!(
            "You are an expert chef. The user has the following ingredients: {}.\n\n",
            "Suggest 3 recipes {}. For each recipe, reply ONLY with a valid JSON ",
            "object in this exact format:\n\n",
            "{{\n",
            "  \"recipes\": [\n",
            "    {{\n",
            "      \"name\": \"Recipe name\",\n",
            "      \"description\": \"Short, appetizing description\",\n",
            "      \"ingredients\": [\"ingredient 1\", \"ingredient 2\"],\n",
            "      \"instructions\": [\"step 1\", \"step 2\", \"step 3\"],\n",
            "      \"cookingTime\": \"20 minutes\",\n",
            "      \"servings\": 4,\n",
            "      \"difficulty\": \"Easy\",\n",
            "      \"matchScore\": 90\n",
            "    }}\n",
            "  ]\n",
            "}}\n\n",
            "IMPORTANT: your reply must be ONLY this JSON, with no text before ",
            "or after. Do not start with ```json and do not end with ```."
        ),
        ingredients.join(", "),
        mode_instruction(mode)
    )
}
