use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

/// Raw text of one gazette and the label it is reported under.
#[derive(Debug, Clone)]
pub struct Source {
    pub origin: String,
    pub text: String,
}

/// Read every path; directories expand to their `*.txt` files sorted by name.
pub fn load(paths: &[PathBuf]) -> Result<Vec<Source>> {
    let mut sources = Vec::new();
    for path in paths {
        if path.is_dir() {
            for file in text_files(path)? {
                sources.push(read_source(&file)?);
            }
        } else {
            sources.push(read_source(path)?);
        }
    }
    Ok(sources)
}

fn text_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("reading directory {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("txt")))
        .collect();
    files.sort();
    if files.is_empty() {
        warn!(dir = %dir.display(), "no .txt files in directory");
    }
    Ok(files)
}

fn read_source(path: &Path) -> Result<Source> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let text = String::from_utf8_lossy(&bytes).into_owned();
    let origin = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    debug!(origin = %origin, bytes = bytes.len(), "loaded source");
    Ok(Source { origin, text })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_fixture_directory_sorted() {
        let sources = load(&[PathBuf::from("tests/fixtures")]).unwrap();
        let origins: Vec<&str> = sources.iter().map(|s| s.origin.as_str()).collect();
        assert_eq!(origins, ["djen_processo.txt", "djgo_plain.txt", "tjal_numbered.txt"]);
        assert!(sources[2].text.contains("Publicação 1 de 4"));
    }

    #[test]
    fn single_file_origin_is_file_name() {
        let sources = load(&[PathBuf::from("tests/fixtures/djgo_plain.txt")]).unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].origin, "djgo_plain.txt");
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load(&[PathBuf::from("tests/fixtures/nope.txt")]).unwrap_err();
        assert!(err.to_string().contains("nope.txt"));
    }
}
