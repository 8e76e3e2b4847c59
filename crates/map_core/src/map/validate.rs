//! Grid consistency checking.

use tracing::warn;

use super::MapGrid;
use crate::coord::CellIndex;
use crate::objects::{ObjectId, ObjectPool};

impl MapGrid {
    /// Scan every cell in index order and report whether the grid is
    /// consistent. Stops at the first problem, which is logged.
    ///
    /// A cell is consistent when its template is `NONE` or a catalog entry
    /// whose tile map has the cell's icon, and every occupier and overlapper
    /// resolves in `objects` to an object that is out of limbo and whose
    /// coordinate lies on the grid.
    #[must_use]
    pub fn validate(&self, objects: &ObjectPool) -> bool {
        self.cells.iter().enumerate().all(|(index, cell)| {
            let template = cell.template();
            if !template.is_none() {
                let Some(data) = self.terrain.templates.get(template) else {
                    warn!(cell = index, template = template.0, "Unknown template");
                    return false;
                };
                if !data.has_icon(cell.icon()) {
                    warn!(cell = index, template = template.0, icon = cell.icon(), "Icon missing from template");
                    return false;
                }
            }

            cell.occupiers()
                .iter()
                .copied()
                .chain(cell.overlappers())
                .all(|id| self.object_is_placed(index, id, objects))
        })
    }

    fn object_is_placed(&self, cell: CellIndex, id: ObjectId, objects: &ObjectPool) -> bool {
        let Some(object) = objects.get(id) else {
            warn!(cell, object = id.index(), "Dangling object handle");
            return false;
        };
        if object.in_limbo {
            warn!(cell, object = id.index(), "Object in limbo still on the map");
            return false;
        }
        if self.size.coord_to_cell(object.coord).is_none() {
            warn!(cell, object = id.index(), coord = ?object.coord, "Object coordinate off the grid");
            return false;
        }
        true
    }
}
