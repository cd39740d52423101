//! Backtracking placer.
//!
//! Shapes are placed in list order. For the head shape the search sweeps
//! rotation (outermost), then offset x, then offset y, both offsets over
//! half-open windows `[-cols, cols)` and `[-rows, rows)`. Each successful
//! placement recurses on the tail; if the tail cannot be packed the
//! placement is undone before the next candidate is tried. The first full
//! packing found is kept on the board.
//!
//! The search is deterministic: the same board, shape order and starting
//! orientations always produce the same placements.

use std::sync::mpsc::{self, Receiver, Sender};

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::board::{Board, CellRecord};
use crate::error::{Error, IntegrityError, Result};
use crate::geometry::{translate, NUM_ROTATIONS};
use crate::shape::{Coord, Shape};

/// A shape committed to the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub shape: String,
    /// Number of 60° steps from the shape's original orientation.
    pub rotation: u8,
    pub offset: Coord,
    /// Board cells covered by the shape.
    pub cells: Vec<Coord>,
}

/// Result of a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Placements in shape order; the board holds exactly these.
    Solved(Vec<Placement>),
    /// No packing exists within the search window; the board is clear.
    Unsatisfiable,
}

impl Outcome {
    pub fn is_solved(&self) -> bool {
        matches!(self, Self::Solved(_))
    }

    pub fn placements(&self) -> &[Placement] {
        match self {
            Self::Solved(placements) => placements,
            Self::Unsatisfiable => &[],
        }
    }
}

/// Counters collected during one search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Calls to `Board::place`.
    pub attempts: u64,
    /// Calls to `Board::place` that succeeded.
    pub placements: u64,
    /// Placements undone after their subtree failed.
    pub backtracks: u64,
}

/// Hook called after every successful tentative placement.
///
/// The board is borrowed read-only; an implementation may block to pace
/// the search, but it cannot change its result.
pub trait StepObserver {
    fn on_step(&mut self, board: &Board, placement: &Placement);
}

/// Observer that never pauses.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl StepObserver for NoopObserver {
    fn on_step(&mut self, _board: &Board, _placement: &Placement) {}
}

impl<F> StepObserver for F
where
    F: FnMut(&Board, &Placement),
{
    fn on_step(&mut self, board: &Board, placement: &Placement) {
        self(board, placement)
    }
}

/// Board state at one step of the search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub placement: Placement,
    pub cells: Vec<CellRecord>,
}

/// Observer that hands snapshots to a [`StepController`] and waits for it.
///
/// Each step sends one snapshot and blocks until the controller resumes, so
/// at most one pause is outstanding. Once the controller is dropped the
/// stepper stops pausing and the search runs to the end.
#[derive(Debug)]
pub struct ChannelStepper {
    snapshots: Sender<Snapshot>,
    resume: Receiver<()>,
    detached: bool,
}

/// Receiving end of a [`ChannelStepper`].
#[derive(Debug)]
pub struct StepController {
    snapshots: Receiver<Snapshot>,
    resume: Sender<()>,
}

impl ChannelStepper {
    pub fn channel() -> (Self, StepController) {
        let (snapshot_tx, snapshot_rx) = mpsc::channel();
        let (resume_tx, resume_rx) = mpsc::channel();
        (
            Self {
                snapshots: snapshot_tx,
                resume: resume_rx,
                detached: false,
            },
            StepController {
                snapshots: snapshot_rx,
                resume: resume_tx,
            },
        )
    }
}

impl StepObserver for ChannelStepper {
    fn on_step(&mut self, board: &Board, placement: &Placement) {
        if self.detached {
            return;
        }
        let snapshot = Snapshot {
            placement: placement.clone(),
            cells: board.records(),
        };
        if self.snapshots.send(snapshot).is_err() || self.resume.recv().is_err() {
            tracing::debug!("step controller dropped, continuing without pauses");
            self.detached = true;
        }
    }
}

impl StepController {
    /// Waits for the next paused step; `None` once the search has finished.
    pub fn next_step(&self) -> Option<Snapshot> {
        self.snapshots.recv().ok()
    }

    /// Lets the paused search continue.
    pub fn resume(&self) {
        // the search may already have finished
        let _ = self.resume.send(());
    }
}

impl Iterator for StepController {
    type Item = Snapshot;

    /// Waits for the next step and lets the search continue straight away.
    fn next(&mut self) -> Option<Snapshot> {
        let snapshot = self.next_step()?;
        self.resume();
        Some(snapshot)
    }
}

struct Placer<'a, O: StepObserver> {
    board: &'a mut Board,
    observer: &'a mut O,
    stats: SearchStats,
}

impl<O: StepObserver> Placer<'_, O> {
    /// Tries to pack `shapes` onto the board.
    ///
    /// Returns `Ok(true)` with every shape placed, or `Ok(false)` with the
    /// board exactly as it was on entry.
    fn place_all(
        &mut self,
        shapes: &[Shape],
        placed: &mut Vec<Placement>,
    ) -> Result<bool, IntegrityError> {
        let Some((head, tail)) = shapes.split_first() else {
            return Ok(true);
        };

        let rows = self.board.rows() as i32;
        let cols = self.board.cols() as i32;
        let mut current = head.clone();

        for _ in 0..NUM_ROTATIONS {
            for offset_x in -cols..cols {
                for offset_y in -rows..rows {
                    self.stats.attempts += 1;
                    if !self.board.place(
                        current.cells(),
                        offset_x,
                        offset_y,
                        current.color(),
                        current.name(),
                    ) {
                        continue;
                    }
                    self.stats.placements += 1;

                    let placement = Placement {
                        shape: current.name().to_string(),
                        rotation: current.rotation(),
                        offset: (offset_x, offset_y),
                        cells: translate(current.cells(), offset_x, offset_y).collect(),
                    };
                    tracing::trace!(
                        shape = %placement.shape,
                        rotation = placement.rotation,
                        offset = ?placement.offset,
                        depth = placed.len(),
                        "placed"
                    );
                    self.observer.on_step(self.board, &placement);
                    placed.push(placement);

                    if self.place_all(tail, placed)? {
                        return Ok(true);
                    }

                    placed.pop();
                    self.board.unplace(current.cells(), offset_x, offset_y)?;
                    self.stats.backtracks += 1;
                }
            }
            current = current.rotate();
        }

        Ok(false)
    }
}

/// Packs `shapes` onto `board` in order.
///
/// On [`Outcome::Solved`] the board holds the packing; on
/// [`Outcome::Unsatisfiable`] it is back in the state it was passed in.
pub fn place_shapes<O: StepObserver>(
    board: &mut Board,
    shapes: &[Shape],
    observer: &mut O,
) -> Result<(Outcome, SearchStats), IntegrityError> {
    let mut placer = Placer {
        board,
        observer,
        stats: SearchStats::default(),
    };
    let mut placed = Vec::with_capacity(shapes.len());

    let outcome = if placer.place_all(shapes, &mut placed)? {
        Outcome::Solved(placed)
    } else {
        Outcome::Unsatisfiable
    };
    Ok((outcome, placer.stats))
}

/// Board dimensions plus the ordered, coloured shapes to pack.
#[derive(Debug, Clone)]
pub struct SolveRequest {
    pub rows: usize,
    pub cols: usize,
    pub shapes: Vec<Shape>,
}

impl SolveRequest {
    pub fn new(rows: usize, cols: usize, shapes: Vec<Shape>) -> Result<Self> {
        let request = Self { rows, cols, shapes };
        request.validate()?;
        Ok(request)
    }

    /// Checks for positive dimensions and unique shape names.
    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(Error::InvalidBoard {
                rows: self.rows,
                cols: self.cols,
            });
        }
        let mut names = FxHashSet::default();
        for shape in &self.shapes {
            if !names.insert(shape.name()) {
                return Err(Error::DuplicateShape(shape.name().to_string()));
            }
        }
        Ok(())
    }

    /// Shape names in request order, as a legend for `format_board`.
    pub fn names(&self) -> Vec<&str> {
        self.shapes.iter().map(Shape::name).collect()
    }
}

/// Everything a solve leaves behind.
#[derive(Debug, Clone)]
pub struct SolveResult {
    pub board: Board,
    pub outcome: Outcome,
    pub stats: SearchStats,
}

/// Solves a request on a fresh board without pausing.
pub fn solve(request: &SolveRequest) -> Result<SolveResult> {
    solve_with(request, &mut NoopObserver)
}

/// Solves a request on a fresh board, reporting each step to `observer`.
pub fn solve_with<O: StepObserver>(
    request: &SolveRequest,
    observer: &mut O,
) -> Result<SolveResult> {
    request.validate()?;

    let mut board = Board::new(request.rows, request.cols);
    tracing::debug!(
        rows = request.rows,
        cols = request.cols,
        cells = board.len(),
        shapes = request.shapes.len(),
        "starting search"
    );

    let (outcome, stats) = place_shapes(&mut board, &request.shapes, observer)?;
    tracing::info!(
        solved = outcome.is_solved(),
        attempts = stats.attempts,
        placements = stats.placements,
        backtracks = stats.backtracks,
        "search finished"
    );

    Ok(SolveResult {
        board,
        outcome,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Color;

    fn shape(name: &str, cells: &[Coord]) -> Shape {
        Shape::new(name, cells.to_vec(), Color::hsl(200, 100, 50)).unwrap()
    }

    #[test]
    fn test_empty_shape_list_succeeds_immediately() {
        let mut board = Board::new(2, 2);
        let (outcome, stats) = place_shapes(&mut board, &[], &mut NoopObserver).unwrap();
        assert_eq!(outcome, Outcome::Solved(vec![]));
        assert_eq!(stats, SearchStats::default());
        assert!(board.is_clear());
    }

    #[test]
    fn test_single_cell_lands_on_first_free_cell() {
        let mut board = Board::new(3, 3);
        let shapes = [shape("dot", &[(0, 0)])];
        let (outcome, _) = place_shapes(&mut board, &shapes, &mut NoopObserver).unwrap();
        assert_eq!(
            outcome.placements(),
            &[Placement {
                shape: "dot".to_string(),
                rotation: 0,
                offset: (0, 0),
                cells: vec![(0, 0)],
            }]
        );
    }

    #[test]
    fn test_offsets_are_relative_to_shape_cells() {
        // the dot sits at (2, 5), so the first offsets that reach the board
        // are the lowest offset x and offset y inside the windows
        let mut board = Board::new(3, 3);
        let shapes = [shape("dot", &[(2, 5)])];
        let (outcome, _) = place_shapes(&mut board, &shapes, &mut NoopObserver).unwrap();
        let placement = &outcome.placements()[0];
        assert_eq!(placement.offset, (-2, -3));
        assert_eq!(placement.cells, vec![(0, 2)]);
    }

    #[test]
    fn test_rotation_is_tried_when_translations_fail() {
        // three rows of q do not fit on two rows; a 60° turn lays the bar
        // along r in row 0
        let mut board = Board::new(2, 3);
        let (outcome, _) = place_shapes(
            &mut board,
            &[shape("stick", &[(0, 0), (1, 0), (2, 0)])],
            &mut NoopObserver,
        )
        .unwrap();
        let placement = &outcome.placements()[0];
        assert_eq!(placement.rotation, 1);
        assert_eq!(placement.offset, (-1, 1));
        assert_eq!(placement.cells, vec![(0, 0), (0, 1), (0, 2)]);
    }

    #[test]
    fn test_failed_subtree_is_undone() {
        // the bar fits but the second shape never does, so both are undone
        let mut board = Board::new(2, 2);
        let shapes = [
            shape("bar", &[(0, 0), (0, 1)]),
            shape("big", &[(0, 0), (0, 1), (1, 0)]),
        ];
        let (outcome, stats) = place_shapes(&mut board, &shapes, &mut NoopObserver).unwrap();
        assert_eq!(outcome, Outcome::Unsatisfiable);
        assert!(board.is_clear());
        assert_eq!(stats.placements, stats.backtracks);
        assert!(stats.backtracks > 0);
    }

    #[test]
    fn test_observer_sees_every_placement() {
        let mut board = Board::new(2, 2);
        let shapes = [shape("a", &[(0, 0), (0, 1)]), shape("b", &[(0, 0), (0, 1)])];
        let mut seen = Vec::new();
        let mut observer = |board: &Board, placement: &Placement| {
            seen.push((placement.shape.clone(), board.occupied_count()));
        };
        let (outcome, stats) = place_shapes(&mut board, &shapes, &mut observer).unwrap();

        assert!(outcome.is_solved());
        assert_eq!(seen, vec![("a".to_string(), 2), ("b".to_string(), 4)]);
        assert_eq!(stats.placements, 2);
    }

    #[test]
    fn test_request_validation() {
        let dot = shape("dot", &[(0, 0)]);
        assert!(matches!(
            SolveRequest::new(0, 3, vec![dot.clone()]),
            Err(Error::InvalidBoard { rows: 0, cols: 3 })
        ));
        assert!(matches!(
            SolveRequest::new(2, 2, vec![dot.clone(), dot.clone()]),
            Err(Error::DuplicateShape(name)) if name == "dot"
        ));
        assert!(SolveRequest::new(2, 2, vec![dot]).is_ok());
    }

    #[test]
    fn test_channel_stepper_pauses_once_per_placement() {
        let request = SolveRequest::new(
            2,
            2,
            vec![shape("a", &[(0, 0), (0, 1)]), shape("b", &[(0, 0), (0, 1)])],
        )
        .unwrap();
        let (mut stepper, controller) = ChannelStepper::channel();

        let search = std::thread::spawn(move || solve_with(&request, &mut stepper));
        let steps: Vec<Snapshot> = controller.collect();
        let result = search.join().unwrap().unwrap();

        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].placement.shape, "a");
        assert_eq!(steps[0].cells.iter().filter(|c| c.occupied).count(), 2);
        assert_eq!(steps[1].cells, result.board.records());
    }

    #[test]
    fn test_dropped_controller_does_not_block() {
        let request = SolveRequest::new(2, 2, vec![shape("a", &[(0, 0)])]).unwrap();
        let (mut stepper, controller) = ChannelStepper::channel();
        drop(controller);
        assert!(solve_with(&request, &mut stepper).unwrap().outcome.is_solved());
    }
}
