use anyhow::Result;
use serde::Serialize;

use crate::cli;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

impl From<cli::OutputFormat> for OutputFormat {
    fn from(format: cli::OutputFormat) -> Self {
        match format {
            cli::OutputFormat::Yaml => OutputFormat::Yaml,
            cli::OutputFormat::Auto | cli::OutputFormat::Json => OutputFormat::Json,
        }
    }
}

/// Render `data` in the requested format
pub fn render<T: Serialize>(data: T, format: OutputFormat) -> Result<String> {
    let json_value = serde_json::to_value(data)?;
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&json_value)?,
        OutputFormat::Yaml => serde_yaml::to_string(&json_value)?,
    };
    Ok(rendered)
}

pub fn print_output<T: Serialize>(data: T, format: impl Into<OutputFormat>) -> Result<()> {
    let rendered = render(data, format.into())?;
    println!("{}", rendered.trim_end());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_json() {
        let out = render(json!({"name": "op-1", "status": "DONE"}), OutputFormat::Json).unwrap();
        assert!(out.contains("\"name\": \"op-1\""));
        assert!(out.starts_with('{'));
    }

    #[test]
    fn test_render_yaml() {
        let out = render(json!({"name": "op-1", "status": "DONE"}), OutputFormat::Yaml).unwrap();
        assert!(out.contains("name: op-1"));
        assert!(out.contains("status: DONE"));
    }

    #[test]
    fn test_auto_renders_as_json() {
        assert_eq!(OutputFormat::from(cli::OutputFormat::Auto), OutputFormat::Json);
    }
}
