//! Shape catalog: the shape text format and the category index.
//!
//! A shape file holds one `q,r` pair per line. The catalog index,
//! `filelist.json`, maps each category name to an ordered list of shape file
//! names, and each file lives at `<base>/<category>/<file>`. The file name
//! is the shape's name and must be unique across categories.

use std::fs;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use crate::error::{Error, ParseError, Result};
use crate::shape::Coord;

/// Name of the index file inside a catalog directory.
pub const INDEX_FILE: &str = "filelist.json";

/// Category names with their ordered shape file names, in index file order.
pub type CatalogIndex = Vec<(String, Vec<String>)>;

/// Parses shape text: one `q,r` integer pair per line.
///
/// Blank lines are skipped and `\r\n` endings are accepted. Anything else
/// that is not exactly two comma separated integers is an error.
pub fn parse_shape(text: &str) -> Result<Vec<Coord>, ParseError> {
    let mut cells = Vec::new();

    for (i, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        let error = |reason| ParseError {
            line: i + 1,
            content: raw_line.to_string(),
            reason,
        };

        let mut fields = line.split(',').map(str::trim);
        let (Some(q), Some(r), None) = (fields.next(), fields.next(), fields.next()) else {
            return Err(error("expected two comma separated fields"));
        };
        let q = q.parse::<i32>().map_err(|_| error("q is not an integer"))?;
        let r = r.parse::<i32>().map_err(|_| error("r is not an integer"))?;
        cells.push((q, r));
    }

    Ok(cells)
}

/// Formats cells in the shape text format, one `q,r` per line.
pub fn format_shape(cells: &[Coord]) -> String {
    cells.iter().map(|(q, r)| format!("{q},{r}\n")).collect()
}

/// Reads and parses a single shape file.
pub fn load_shape(path: &Path) -> Result<Vec<Coord>> {
    let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    parse_shape(&text).map_err(|source| Error::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes cells to a shape file.
pub fn save_shape(path: &Path, cells: &[Coord]) -> Result<()> {
    fs::write(path, format_shape(cells)).map_err(|e| Error::io(path, e))
}

/// Reads the category index from `<base>/filelist.json`.
pub fn load_index(base: &Path) -> Result<CatalogIndex> {
    let path = base.join(INDEX_FILE);
    let text = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
    parse_index(&text).map_err(|source| Error::Index { path, source })
}

/// Parses index text, keeping categories in the order they are written.
fn parse_index(text: &str) -> serde_json::Result<CatalogIndex> {
    let object: serde_json::Map<String, serde_json::Value> = serde_json::from_str(text)?;
    object
        .into_iter()
        .map(|(category, files)| {
            serde_json::from_value::<Vec<String>>(files).map(|files| (category, files))
        })
        .collect()
}

/// Problems met while loading a catalog that did not stop the load.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Names listed again after their first registration.
    pub duplicates: Vec<String>,
    /// Shape files that could not be read or parsed.
    pub failures: Vec<Error>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.duplicates.is_empty() && self.failures.is_empty()
    }
}

/// Loaded shapes, grouped by category.
#[derive(Debug, Default)]
pub struct Catalog {
    categories: CatalogIndex,
    shapes: FxHashMap<String, Vec<Coord>>,
    report: LoadReport,
}

impl Catalog {
    /// Loads the index under `base` and every shape file it lists.
    pub fn load(base: &Path) -> Result<Self> {
        let index = load_index(base)?;
        Ok(Self::from_index(base, index))
    }

    /// Loads every shape file listed in `index`, resolved against `base`.
    ///
    /// Unreadable or malformed shape files are left out and recorded in the
    /// report. When a name appears twice, the first one loaded wins.
    pub fn from_index(base: &Path, index: CatalogIndex) -> Self {
        let mut catalog = Self::default();

        for (category, files) in &index {
            let mut loaded = Vec::with_capacity(files.len());
            for file in files {
                let path: PathBuf = base.join(category).join(file);
                match load_shape(&path) {
                    Ok(cells) => {
                        if catalog.insert(file, cells) {
                            loaded.push(file.clone());
                        }
                    }
                    Err(err) => {
                        tracing::warn!(path = %path.display(), error = %err, "skipping shape");
                        catalog.report.failures.push(err);
                    }
                }
            }
            catalog.categories.push((category.clone(), loaded));
        }

        tracing::debug!(
            categories = catalog.categories.len(),
            shapes = catalog.shapes.len(),
            "loaded catalog"
        );
        catalog
    }

    /// Registers a shape; returns false and records a duplicate when the
    /// name is already taken.
    pub fn insert(&mut self, name: &str, cells: Vec<Coord>) -> bool {
        if self.shapes.contains_key(name) {
            tracing::warn!(name, "shape name registered more than once, keeping the first");
            self.report.duplicates.push(name.to_string());
            return false;
        }
        self.shapes.insert(name.to_string(), cells);
        true
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|(name, _)| name.as_str())
    }

    /// Shape names in a category, in index order.
    pub fn shapes_in(&self, category: &str) -> Option<&[String]> {
        self.categories
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, names)| names.as_slice())
    }

    pub fn get(&self, name: &str) -> Option<&[Coord]> {
        self.shapes.get(name).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }
}
