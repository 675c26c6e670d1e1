use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

/// Input file encodings, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Yaml,
}

impl Format {
    fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("yaml") | Some("yml") => Format::Yaml,
            _ => Format::Json,
        }
    }
}

/// Read a JSON or YAML file and deserialise into a typed struct.
pub fn read_input<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let contents = fs::read_to_string(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;
    let format = Format::from_path(&canonical);
    tracing::debug!(path = %canonical.display(), ?format, "reading input file");
    parse(&contents, format)
        .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e).into())
}

fn parse<T: DeserializeOwned>(
    contents: &str,
    format: Format,
) -> Result<T, Box<dyn std::error::Error>> {
    match format {
        Format::Json => Ok(serde_json::from_str(contents)?),
        Format::Yaml => Ok(serde_yaml::from_str(contents)?),
    }
}

/// Resolve the path against the working directory and check it is a file.
fn resolve_path(path: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let p = Path::new(path);
    let canonical = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };

    if !canonical.exists() {
        return Err(format!("File not found: {}", canonical.display()).into());
    }
    if !canonical.is_file() {
        return Err(format!("Not a file: {}", canonical.display()).into());
    }

    Ok(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use regcap_core::liquidity::NsfrInput;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(Format::from_path(Path::new("bank.yaml")), Format::Yaml);
        assert_eq!(Format::from_path(Path::new("bank.YML")), Format::Yaml);
        assert_eq!(Format::from_path(Path::new("bank.json")), Format::Json);
        assert_eq!(Format::from_path(Path::new("bank")), Format::Json);
    }

    #[test]
    fn test_yaml_and_json_parse_alike() {
        let yaml: NsfrInput =
            parse("stable_retail_deposits: \"1000\"\nresidential_mortgages: \"1000\"\n", Format::Yaml)
                .unwrap();
        let json: NsfrInput = parse(
            r#"{"stable_retail_deposits": "1000", "residential_mortgages": "1000"}"#,
            Format::Json,
        )
        .unwrap();
        assert_eq!(yaml, json);
        assert_eq!(yaml.residential_mortgages, dec!(1000));
    }

    #[test]
    fn test_missing_file_reported() {
        let err = read_input::<NsfrInput>("does/not/exist.json").unwrap_err();
        assert!(err.to_string().starts_with("File not found"));
    }
}
