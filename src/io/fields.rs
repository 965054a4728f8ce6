//! Named per-entity data written alongside the mesh.

use super::error::MeshIoError;
use crate::geometry::Point2;

/// One value of a named output quantity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FieldValue {
    Scalar(f64),
    Vector(Point2),
}

/// A named value produced for one cell.
#[derive(Clone, Debug, PartialEq)]
pub struct OutputField {
    pub name: String,
    pub value: FieldValue,
}

impl OutputField {
    pub fn new(name: impl Into<String>, value: FieldValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Values of one named quantity over all nodes or all cells.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldArray {
    Scalar(Vec<f64>),
    Vector(Vec<Point2>),
}

impl FieldArray {
    pub fn len(&self) -> usize {
        match self {
            FieldArray::Scalar(v) => v.len(),
            FieldArray::Vector(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push(&mut self, value: FieldValue) -> bool {
        match (self, value) {
            (FieldArray::Scalar(v), FieldValue::Scalar(s)) => v.push(s),
            (FieldArray::Vector(v), FieldValue::Vector(p)) => v.push(p),
            _ => return false,
        }
        true
    }
}

/// Point and cell data for one snapshot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldData {
    /// Simulation time, written as a field-data entry when present.
    pub time: Option<f64>,
    pub point_data: Vec<(String, FieldArray)>,
    pub cell_data: Vec<(String, FieldArray)>,
}

impl FieldData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_time(mut self, time: f64) -> Self {
        self.time = Some(time);
        self
    }

    pub fn add_point_field(&mut self, name: impl Into<String>, values: FieldArray) {
        self.point_data.push((name.into(), values));
    }

    pub fn add_cell_field(&mut self, name: impl Into<String>, values: FieldArray) {
        self.cell_data.push((name.into(), values));
    }

    /// Transpose per-cell output fields into one array per field name.
    ///
    /// Every cell must report the same names and kinds in the same order.
    pub fn from_cell_fields<I>(cells: I) -> Result<Self, MeshIoError>
    where
        I: IntoIterator<Item = Vec<OutputField>>,
    {
        let mut data = Self::new();
        for (i, fields) in cells.into_iter().enumerate() {
            if i == 0 {
                data.cell_data = fields
                    .iter()
                    .map(|f| {
                        let array = match f.value {
                            FieldValue::Scalar(_) => FieldArray::Scalar(Vec::new()),
                            FieldValue::Vector(_) => FieldArray::Vector(Vec::new()),
                        };
                        (f.name.clone(), array)
                    })
                    .collect();
            }
            if fields.len() != data.cell_data.len() {
                return Err(MeshIoError::InconsistentFields(format!(
                    "cell {} reports {} fields, expected {}",
                    i,
                    fields.len(),
                    data.cell_data.len()
                )));
            }
            for (field, (name, array)) in fields.into_iter().zip(data.cell_data.iter_mut()) {
                if field.name != *name || !array.push(field.value) {
                    return Err(MeshIoError::InconsistentFields(format!(
                        "cell {} reports '{}' where '{}' was expected",
                        i, field.name, name
                    )));
                }
            }
        }
        Ok(data)
    }

    /// Check every array against the node and cell counts.
    pub fn check_lengths(&self, n_points: usize, n_cells: usize) -> Result<(), MeshIoError> {
        let point_arrays = self.point_data.iter().map(|f| (f, n_points));
        let cell_arrays = self.cell_data.iter().map(|f| (f, n_cells));
        for ((name, array), expected) in point_arrays.chain(cell_arrays) {
            if array.len() != expected {
                return Err(MeshIoError::FieldLength {
                    name: name.clone(),
                    expected,
                    found: array.len(),
                });
            }
        }
        Ok(())
    }
}

/// Replace whitespace so a name stays a single token in text formats.
pub(crate) fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}
