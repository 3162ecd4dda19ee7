//! Prompt construction for the expense-parsing call.
//!
//! The instruction embeds the fund's category options in priority order.
//! User-defined categories are listed in their own block above the system
//! defaults and the rules tell the model to prefer them, so a fund's own
//! taxonomy always outranks the stock one.

use fundmate_core::category::CategoryOption;

/// Render the category blocks of the prompt.
fn render_categories(categories: &[CategoryOption]) -> String {
    if categories.is_empty() {
        return "\n\nNo categories available, set \"categoryId\" to null.".to_string();
    }

    let line = |c: &CategoryOption| {
        format!(
            "- ID: \"{}\", Name: \"{}\", Description: \"{}\"\n",
            c.id,
            c.name,
            c.description.as_deref().unwrap_or("")
        )
    };

    let mut out = String::from("\n\nAvailable categories (listed in priority order):\n");
    let custom: Vec<&CategoryOption> = categories.iter().filter(|c| !c.is_default).collect();
    let default: Vec<&CategoryOption> = categories.iter().filter(|c| c.is_default).collect();

    if !custom.is_empty() {
        out.push_str("\n[USER-DEFINED CATEGORIES - HIGHEST PRIORITY]\n");
        for c in &custom {
            out.push_str(&line(c));
        }
    }
    if !default.is_empty() {
        out.push_str("\n[SYSTEM DEFAULT CATEGORIES - LOWER PRIORITY]\n");
        for c in &default {
            out.push_str(&line(c));
        }
    }

    out.push_str(
        "\nIMPORTANT PRIORITY RULES:\n\
         - If multiple categories could match the expense, ALWAYS choose the USER-DEFINED category first\n\
         - Only use a SYSTEM DEFAULT category if no user-defined category matches\n\
         - If the expense matches one of the categories above, include \"categoryId\" with the category's ID\n\
         - If no category matches, set \"categoryId\" to null",
    );
    out
}

/// Build the full parsing instruction for a piece of free text.
pub fn build_prompt(text: &str, categories: &[CategoryOption]) -> String {
    format!(
        "Parse this Vietnamese/English expense entry into JSON format. Extract:\n\
         - spendValue: amount spent in thousands VND (number without zeros, null if not spending)\n\
         - earnValue: amount earned in thousands VND (number without zeros, null if not earning)\n\
         - content: description of what was bought/earned (string)\n\
         - categoryId: the ID of the matching category if applicable, or null{}\n\n\
         Rules:\n\
         - If text contains \"nhận\", \"thu\", \"earn\", \"kiếm\", treat as earning (set earnValue, spendValue=null)\n\
         - Otherwise it's spending (set spendValue, earnValue=null)\n\
         - Amount is in thousands (35 means 35,000 VND)\n\
         - Match category based on description if available\n\
         - ALWAYS prioritize user-defined categories over system default categories when both could match\n\
         - Return ONLY valid JSON, no markdown formatting\n\n\
         Now parse this: \"{}\"\n\n\
         Return ONLY the JSON object, no other text.",
        render_categories(categories),
        text
    )
}

/// Wrap a prompt into the provider's request body shape.
pub fn build_request_body(prompt: &str) -> serde_json::Value {
    serde_json::json!({
        "contents": [
            {
                "parts": [
                    { "text": prompt }
                ]
            }
        ]
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
