//! Parsing of the `--landmarks` argument of `predict`.

use anyhow::Context;
use data_contracts::FEATURE_DIM;
use std::path::Path;

/// Parse numbers separated by commas and/or whitespace.
pub fn parse_values(text: &str) -> anyhow::Result<Vec<f32>> {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .map(|t| {
            t.parse::<f32>()
                .with_context(|| format!("not a number in landmark list: {t:?}"))
        })
        .collect()
}

/// Accept either a path to a file holding the values or an inline list.
pub fn read_landmarks(arg: &str) -> anyhow::Result<Vec<f32>> {
    let path = Path::new(arg);
    let values = if path.is_file() {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read landmarks from {}", path.display()))?;
        parse_values(&text)?
    } else {
        parse_values(arg)?
    };
    if values.len() != FEATURE_DIM {
        anyhow::bail!(
            "expected {FEATURE_DIM} landmark values (21 points x, y, z), got {}",
            values.len()
        );
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixed_separators() {
        assert_eq!(parse_values("1, 2\n3 -0.5").unwrap(), vec![1.0, 2.0, 3.0, -0.5]);
        assert!(parse_values("1,x").is_err());
    }

    #[test]
    fn reads_from_file_or_inline() {
        let list: Vec<String> = (0..FEATURE_DIM).map(|i| i.to_string()).collect();
        let inline = list.join(",");
        assert_eq!(read_landmarks(&inline).unwrap().len(), FEATURE_DIM);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hand.txt");
        std::fs::write(&path, list.join(" ")).unwrap();
        let from_file = read_landmarks(path.to_str().unwrap()).unwrap();
        assert_eq!(from_file[62], 62.0);

        let err = read_landmarks("1,2,3").unwrap_err();
        assert!(err.to_string().contains("got 3"));
    }
}
