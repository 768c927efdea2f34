//! AnnotatedAdjacency: the N×N street matrix the model consumes.
//!
//! Cell `(i, j)` is `None` when no street joins `i` and `j`, otherwise the
//! street as seen from `i`. A well-formed matrix is symmetric: `(j, i)`
//! carries the same attributes with the opposite orientation.

use serde::{Deserialize, Serialize};
use super::{Orientation, Street};
use crate::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotatedAdjacency {
    cells: Vec<Vec<Option<Street>>>,
}

impl AnnotatedAdjacency {
    /// An `n`×`n` matrix with no streets.
    pub fn empty(n: usize) -> Self {
        Self { cells: vec![vec![None; n]; n] }
    }

    /// Wrap raw rows, checking that the matrix is square.
    pub fn from_rows(cells: Vec<Vec<Option<Street>>>) -> Result<Self> {
        let adjacency = Self { cells };
        adjacency.check_square()?;
        Ok(adjacency)
    }

    /// Number of junctions.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn rows(&self) -> &[Vec<Option<Street>>] {
        &self.cells
    }

    pub fn get(&self, i: usize, j: usize) -> Option<&Street> {
        self.cells.get(i)?.get(j)?.as_ref()
    }

    pub fn contains(&self, i: usize, j: usize) -> bool {
        self.get(i, j).is_some()
    }

    /// Insert a street and its mirror cell.
    pub fn insert(&mut self, i: usize, j: usize, street: Street) -> Result<()> {
        self.check_index(i)?;
        self.check_index(j)?;
        if i == j {
            return Err(Error::InvalidGraph(format!("street from junction {i} to itself")));
        }
        self.cells[i][j] = Some(street);
        self.cells[j][i] = Some(street.mirrored());
        Ok(())
    }

    /// Remove a street (both cells). Returns whether it existed.
    pub fn remove(&mut self, i: usize, j: usize) -> Result<bool> {
        self.check_index(i)?;
        self.check_index(j)?;
        let existed = self.cells[i][j].take().is_some();
        self.cells[j][i] = None;
        Ok(existed)
    }

    pub fn set_width(&mut self, i: usize, j: usize, width: f64) -> Result<()> {
        if !(width > 0.0) {
            return Err(Error::InvalidSegment { from: i, to: j, width });
        }
        self.update(i, j, |s| s.width = width)
    }

    pub fn set_alpha(&mut self, i: usize, j: usize, alpha: f64) -> Result<()> {
        check_unit("alpha", i, j, alpha)?;
        self.update(i, j, |s| s.alpha = alpha)
    }

    pub fn set_beta(&mut self, i: usize, j: usize, beta: f64) -> Result<()> {
        check_unit("beta", i, j, beta)?;
        self.update(i, j, |s| s.beta = beta)
    }

    fn update(&mut self, i: usize, j: usize, apply: impl Fn(&mut Street)) -> Result<()> {
        self.check_index(i)?;
        self.check_index(j)?;
        for (from, to) in [(i, j), (j, i)] {
            let street = self.cells[from][to]
                .as_mut()
                .ok_or(Error::NotNeighbors { a: i, b: j })?;
            apply(street);
        }
        Ok(())
    }

    /// Every street once, as `(i, j, street)` with `i < j`.
    pub fn streets(&self) -> impl Iterator<Item = (usize, usize, &Street)> + '_ {
        self.cells.iter().enumerate().flat_map(|(i, row)| {
            row.iter()
                .enumerate()
                .skip(i + 1)
                .filter_map(move |(j, cell)| cell.as_ref().map(|s| (i, j, s)))
        })
    }

    pub fn street_count(&self) -> usize {
        self.streets().count()
    }

    pub fn check_square(&self) -> Result<()> {
        let n = self.cells.len();
        if let Some((i, row)) = self.cells.iter().enumerate().find(|(_, row)| row.len() != n) {
            return Err(Error::InvalidGraph(format!(
                "matrix is not square: row {i} has {} cells, expected {n}",
                row.len()
            )));
        }
        Ok(())
    }

    /// Check the mirror invariant and per-junction orientation uniqueness.
    pub fn check_symmetry(&self) -> Result<()> {
        let n = self.cells.len();
        for i in 0..n {
            if self.cells[i][i].is_some() {
                return Err(Error::InvalidGraph(format!("street from junction {i} to itself")));
            }
            let mut seen: [Option<usize>; 4] = [None; 4];
            for j in 0..n {
                let Some(street) = &self.cells[i][j] else {
                    if self.cells[j][i].is_some() {
                        return Err(Error::InvalidGraph(format!(
                            "cell ({j}, {i}) present but ({i}, {j}) absent"
                        )));
                    }
                    continue;
                };
                match &self.cells[j][i] {
                    Some(mirror) if street.mirrors(mirror) => {}
                    Some(_) => {
                        return Err(Error::InvalidGraph(format!(
                            "cells ({i}, {j}) and ({j}, {i}) are not mirrored"
                        )));
                    }
                    None => {
                        return Err(Error::InvalidGraph(format!(
                            "cell ({i}, {j}) present but ({j}, {i}) absent"
                        )));
                    }
                }
                let slot = &mut seen[street.orientation.value() as usize];
                if let Some(k) = slot {
                    return Err(Error::InvalidGraph(format!(
                        "junction {i}: streets to {k} and {j} share orientation {}",
                        street.orientation
                    )));
                }
                *slot = Some(j);
            }
        }
        Ok(())
    }

    /// Orientation of the street leaving `i` towards `j`.
    pub fn orientation(&self, i: usize, j: usize) -> Option<Orientation> {
        self.get(i, j).map(|s| s.orientation)
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.len() {
            return Err(Error::OutOfRange { index, len: self.len() });
        }
        Ok(())
    }
}

pub(crate) fn check_unit(name: &'static str, from: usize, to: usize, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(Error::InvalidAbsorption { from, to, name, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn street(o: Orientation) -> Street {
        Street::new(10.0, 100.0, 0.5, 0.0, o)
    }

    #[test]
    fn test_insert_mirrors_cell() {
        let mut adj = AnnotatedAdjacency::empty(2);
        adj.insert(0, 1, street(Orientation::POS_X)).unwrap();
        assert_eq!(adj.orientation(1, 0), Some(Orientation::NEG_X));
        assert!(adj.check_symmetry().is_ok());
        assert_eq!(adj.street_count(), 1);
    }

    #[test]
    fn test_not_square_rejected() {
        let rows = vec![vec![None, None], vec![None]];
        assert!(matches!(AnnotatedAdjacency::from_rows(rows), Err(Error::InvalidGraph(_))));
    }

    #[test]
    fn test_asymmetric_cell_rejected() {
        let mut rows = vec![vec![None; 2]; 2];
        rows[0][1] = Some(street(Orientation::POS_X));
        rows[1][0] = Some(street(Orientation::POS_X));
        let adj = AnnotatedAdjacency::from_rows(rows).unwrap();
        assert!(matches!(adj.check_symmetry(), Err(Error::InvalidGraph(_))));
    }

    #[test]
    fn test_duplicate_orientation_rejected() {
        let mut adj = AnnotatedAdjacency::empty(3);
        adj.insert(0, 1, street(Orientation::POS_X)).unwrap();
        adj.insert(0, 2, street(Orientation::POS_X)).unwrap();
        assert!(adj.check_symmetry().is_err());
    }

    #[test]
    fn test_setters_update_both_cells() {
        let mut adj = AnnotatedAdjacency::empty(2);
        adj.insert(0, 1, street(Orientation::POS_Y)).unwrap();
        adj.set_width(1, 0, 20.0).unwrap();
        adj.set_alpha(0, 1, 0.1).unwrap();
        adj.set_beta(0, 1, 0.2).unwrap();
        assert_eq!(adj.get(0, 1).unwrap().width, 20.0);
        assert_eq!(adj.get(1, 0).unwrap().alpha, 0.1);
        assert_eq!(adj.get(1, 0).unwrap().beta, 0.2);
        assert!(adj.check_symmetry().is_ok());

        assert!(matches!(adj.set_alpha(0, 1, 1.5), Err(Error::InvalidAbsorption { .. })));
        assert!(matches!(adj.set_width(0, 1, 0.0), Err(Error::InvalidSegment { .. })));
        assert!(matches!(adj.set_beta(0, 0, 0.5), Err(Error::NotNeighbors { .. })));
        assert!(matches!(adj.set_beta(0, 7, 0.5), Err(Error::OutOfRange { index: 7, .. })));
    }

    #[test]
    fn test_json_cells() {
        let json = r#"[[null, {"width": 10.0, "length": 50.0, "alpha": 0.5, "orientation": 0}],
                       [{"width": 10.0, "length": 50.0, "alpha": 0.5, "orientation": 2}, null]]"#;
        let adj: AnnotatedAdjacency = serde_json::from_str(json).unwrap();
        assert_eq!(adj.len(), 2);
        assert_eq!(adj.get(0, 1).unwrap().beta, 0.0);
        assert!(adj.check_symmetry().is_ok());
    }
}
