//! Solve configuration loaded from TOML.
//!
//! ```toml
//! rows = 7
//! cols = 7
//! catalog = "shapes"
//!
//! [[shapes]]
//! name = "Ricochet"
//! color = "hsl(120, 100%, 50%)"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::shape::{Color, Shape};
use crate::solver::SolveRequest;

/// Default board edge, matching the stock board.
pub const DEFAULT_SIZE: usize = 7;

fn default_size() -> usize {
    DEFAULT_SIZE
}

fn default_catalog() -> PathBuf {
    PathBuf::from("shapes")
}

/// One shape to pack; colour is taken from the palette when absent.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ShapeEntry {
    pub name: String,
    pub color: Option<Color>,
}

/// Top-level TOML file structure.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SolveConfig {
    #[serde(default = "default_size")]
    pub rows: usize,
    #[serde(default = "default_size")]
    pub cols: usize,
    /// Catalog directory holding `filelist.json`.
    #[serde(default = "default_catalog")]
    pub catalog: PathBuf,
    /// Pause after every placement.
    #[serde(default)]
    pub step: bool,
    /// Directory to write the solve report into.
    pub output: Option<PathBuf>,
    #[serde(default)]
    pub shapes: Vec<ShapeEntry>,
}

impl Default for SolveConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_SIZE,
            cols: DEFAULT_SIZE,
            catalog: default_catalog(),
            step: false,
            output: None,
            shapes: Vec::new(),
        }
    }
}

impl SolveConfig {
    /// Builds a solve request, looking each shape up in `catalog`.
    ///
    /// Entries without a colour get the colour at their position in an
    /// evenly spaced palette over all entries.
    pub fn to_request(&self, catalog: &Catalog) -> Result<SolveRequest> {
        let palette = Color::palette(self.shapes.len());
        let shapes = self
            .shapes
            .iter()
            .zip(palette)
            .map(|(entry, fallback)| {
                let cells = catalog
                    .get(&entry.name)
                    .ok_or_else(|| Error::UnknownShape(entry.name.clone()))?;
                Shape::new(&*entry.name, cells.to_vec(), entry.color.unwrap_or(fallback))
            })
            .collect::<Result<Vec<_>>>()?;

        SolveRequest::new(self.rows, self.cols, shapes)
    }
}

/// Parses a solve configuration from TOML text.
pub fn parse_config(text: &str, path: &Path) -> Result<SolveConfig> {
    toml::from_str(text).map_err(|source| Error::Config {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads a solve configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<SolveConfig> {
    let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let config = parse_config(&text, path)?;
    tracing::debug!(path = %path.display(), shapes = config.shapes.len(), "loaded solve config");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<SolveConfig> {
        parse_config(text, Path::new("test.toml"))
    }

    #[test]
    fn test_defaults_apply() {
        assert_eq!(parse("").unwrap(), SolveConfig::default());
    }

    #[test]
    fn test_full_config() {
        let config = parse(
            r#"
            rows = 2
            cols = 3
            catalog = "assets/shapes"
            step = true
            output = "out"

            [[shapes]]
            name = "Ricochet"
            color = "hsl(120, 100%, 50%)"

            [[shapes]]
            name = "Smart_slide"
            "#,
        )
        .unwrap();

        assert_eq!((config.rows, config.cols), (2, 3));
        assert_eq!(config.catalog, PathBuf::from("assets/shapes"));
        assert!(config.step);
        assert_eq!(config.output, Some(PathBuf::from("out")));
        assert_eq!(config.shapes[0].color, Some(Color::hsl(120, 100, 50)));
        assert_eq!(config.shapes[1].color, None);
    }

    #[test]
    fn test_bad_color_is_config_error() {
        let err = parse("[[shapes]]\nname = \"a\"\ncolor = \"blue\"\n").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_to_request_assigns_palette_and_rejects_unknown() {
        let mut catalog = Catalog::default();
        catalog.insert("a", vec![(0, 0)]);
        catalog.insert("b", vec![(0, 0), (0, 1)]);

        let mut config = SolveConfig {
            rows: 2,
            cols: 2,
            shapes: vec![
                ShapeEntry {
                    name: "a".to_string(),
                    color: None,
                },
                ShapeEntry {
                    name: "b".to_string(),
                    color: Some(Color::GRAY),
                },
            ],
            ..SolveConfig::default()
        };

        let request = config.to_request(&catalog).unwrap();
        assert_eq!(request.names(), vec!["a", "b"]);
        assert_eq!(request.shapes[0].color(), Color::hsl(0, 100, 50));
        assert_eq!(request.shapes[1].color(), Color::GRAY);
        assert_eq!(request.shapes[1].cells(), &[(0, 0), (0, 1)]);

        config.shapes.push(ShapeEntry {
            name: "missing".to_string(),
            color: None,
        });
        assert!(matches!(
            config.to_request(&catalog),
            Err(Error::UnknownShape(name)) if name == "missing"
        ));
    }
}
