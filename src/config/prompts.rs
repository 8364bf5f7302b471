//! Prompt templates for Podium.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub resolver: ResolverPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}


/// Prompts for command-to-content resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverPrompts {
    pub system: String,
    pub user: String,
}

impl Default for ResolverPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are the presentation assistant for a live presenter. Your task is to analyze the presenter's command and pick the most suitable item from the content library.

Rules:
- Select at most one item, and only when it genuinely matches the command
- Judge relevance by title, description and keywords
- If nothing fits, select nothing and propose what the presenter could try instead
- Reply with a single JSON object and nothing else around it"#
                .to_string(),

            user: r#"Content library:
{{library}}

Presenter command: {{command}}

Reply with a JSON object of exactly this shape:
{
  "selectedContentId": "UUID of the chosen item, or null when nothing fits",
  "response": "a friendly reply explaining the choice, or suggesting alternatives",
  "suggestion": "an additional tip for the presentation"
}"#
            .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let resolver_path = custom_path.join("resolver.toml");
            if resolver_path.exists() {
                let content = std::fs::read_to_string(&resolver_path)?;
                prompts.resolver = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(prompts.resolver.user.contains("selectedContentId"));
        assert!(!prompts.resolver.system.is_empty());
    }

    #[test]
    fn test_render_template() {
        let template = "Command: {{command}} against {{library}}";
        let mut vars = std::collections::HashMap::new();
        vars.insert("command".to_string(), "play intro".to_string());
        vars.insert("library".to_string(), "3 items".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Command: play intro against 3 items");
    }

    #[test]
    fn test_custom_variables_do_not_override_provided() {
        let mut prompts = Prompts::default();
        prompts
            .variables
            .insert("command".to_string(), "stale".to_string());

        let mut vars = std::collections::HashMap::new();
        vars.insert("command".to_string(), "fresh".to_string());

        let result = prompts.render_with_custom("{{command}}", &vars);
        assert_eq!(result, "fresh");
    }
}
