//! Writing and reading solve reports.
//!
//! A report is written to an output directory as two files:
//! - `solution.json`: the full [`SolveReport`], for other tools to consume
//! - `solution.txt`: a header plus the board drawn by `format_board`
//!
//! Only finished results are stored; search state is never persisted.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::board::{format_board, Board, CellRecord};
use crate::error::{Error, Result};
use crate::solver::{Placement, SolveRequest, SolveResult};

pub const REPORT_JSON: &str = "solution.json";
pub const REPORT_TXT: &str = "solution.txt";

/// Serializable outcome of one solve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolveReport {
    pub rows: usize,
    pub cols: usize,
    pub solved: bool,
    /// Shape names in request order.
    pub shapes: Vec<String>,
    pub placements: Vec<Placement>,
    pub cells: Vec<CellRecord>,
}

impl SolveReport {
    pub fn new(request: &SolveRequest, result: &SolveResult) -> Self {
        Self {
            rows: request.rows,
            cols: request.cols,
            solved: result.outcome.is_solved(),
            shapes: request.names().into_iter().map(String::from).collect(),
            placements: result.outcome.placements().to_vec(),
            cells: result.board.records(),
        }
    }

    /// Draws the stored cells the same way `format_board` draws a board.
    ///
    /// Occupied cells that do not fit a `rows` x `cols` board, or that
    /// repeat, are left out with a warning.
    pub fn format(&self) -> String {
        let mut board = Board::new(self.rows, self.cols);
        for cell in self.cells.iter().filter(|cell| cell.occupied) {
            if !board.place(&[(cell.q, cell.r)], 0, 0, cell.color, &cell.owner) {
                tracing::warn!(
                    q = cell.q,
                    r = cell.r,
                    owner = %cell.owner,
                    rows = self.rows,
                    cols = self.cols,
                    "report cell does not fit its board, leaving it out"
                );
            }
        }
        let owners: Vec<&str> = self.shapes.iter().map(String::as_str).collect();
        format_board(&board, &owners)
    }
}

/// Writes both report files into `dir`, creating it if needed.
pub fn save(dir: &Path, report: &SolveReport) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
    save_text(&dir.join(REPORT_TXT), report)?;
    save_json(&dir.join(REPORT_JSON), report)?;
    Ok(())
}

fn save_text(path: &Path, report: &SolveReport) -> Result<()> {
    let write_report = || -> std::io::Result<()> {
        let mut file = File::create(path)?;
        let status = if report.solved { "Solved" } else { "Unsatisfiable" };
        writeln!(
            file,
            "{status}: {} shapes on a {}x{} board\n",
            report.shapes.len(),
            report.rows,
            report.cols
        )?;
        for (i, name) in report.shapes.iter().enumerate() {
            writeln!(file, "{}: {name}", i + 1)?;
        }
        writeln!(file)?;
        write!(file, "{}", report.format())?;
        Ok(())
    };
    write_report().map_err(|e| Error::io(path, e))
}

fn save_json(path: &Path, report: &SolveReport) -> Result<()> {
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    serde_json::to_writer_pretty(file, report).map_err(|source| Error::Report {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads a report from `solution.json`, or from `path` itself if it is a file.
pub fn load(path: &Path) -> Result<SolveReport> {
    let path: PathBuf = if path.is_dir() {
        path.join(REPORT_JSON)
    } else {
        path.to_path_buf()
    };
    let text = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
    serde_json::from_str(&text).map_err(|source| Error::Report { path, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{Color, Shape};
    use crate::solver::solve;

    fn solved_pair() -> (SolveRequest, SolveResult) {
        let shapes = vec![
            Shape::new("a", vec![(0, 0), (0, 1)], Color::hsl(0, 100, 50)).unwrap(),
            Shape::new("b", vec![(0, 0), (0, 1)], Color::hsl(180, 100, 50)).unwrap(),
        ];
        let request = SolveRequest::new(2, 2, shapes).unwrap();
        let result = solve(&request).unwrap();
        (request, result)
    }

    #[test]
    fn test_report_round_trips_through_disk() {
        let (request, result) = solved_pair();
        let report = SolveReport::new(&request, &result);
        let dir = tempfile::tempdir().unwrap();

        save(dir.path(), &report).unwrap();

        assert_eq!(load(dir.path()).unwrap(), report);
        assert_eq!(load(&dir.path().join(REPORT_JSON)).unwrap(), report);
    }

    #[test]
    fn test_text_report_draws_the_board() {
        let (request, result) = solved_pair();
        let report = SolveReport::new(&request, &result);
        let dir = tempfile::tempdir().unwrap();

        save(dir.path(), &report).unwrap();
        let text = fs::read_to_string(dir.path().join(REPORT_TXT)).unwrap();

        insta::assert_snapshot!(text, @r"
        Solved: 2 shapes on a 2x2 board

        1: a
        2: b

        1 1
         2 2
        ");
    }

    #[test]
    fn test_report_format_matches_board() {
        let (request, result) = solved_pair();
        let report = SolveReport::new(&request, &result);
        assert_eq!(report.format(), format_board(&result.board, &request.names()));
    }

    #[test]
    fn test_format_skips_cells_off_the_board() {
        let (request, result) = solved_pair();
        let mut report = SolveReport::new(&request, &result);
        report.cells.push(CellRecord {
            q: 5,
            r: 5,
            occupied: true,
            color: Color::GRAY,
            owner: "a".to_string(),
        });
        report.rows = 1;

        assert_eq!(report.format(), "1 1\n");
    }

    #[test]
    fn test_load_missing_report_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(load(dir.path()), Err(Error::Io { .. })));
    }
}
