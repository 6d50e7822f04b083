use cellwatch_core::{CellId, Measurement, Mode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("{0} is not a configured cell")]
    UnknownCell(CellId),
}

/// Operator-entered values for one cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellInput {
    pub mode: Mode,
    pub voltage: f64,
    pub current: f64,
    pub temperature: f64,
    pub capacity: f64,
}

impl Default for CellInput {
    fn default() -> Self {
        Self {
            mode: Mode::Idle,
            voltage: 5.0,
            current: 10.0,
            temperature: 30.0,
            capacity: 100.0,
        }
    }
}

impl From<CellInput> for Measurement {
    fn from(input: CellInput) -> Self {
        Measurement {
            voltage: input.voltage,
            current: input.current,
            temperature: input.temperature,
            capacity: input.capacity,
            mode: input.mode,
        }
    }
}

/// A cell's input tagged with its identity, as exchanged with the form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellInputEntry {
    pub cell: CellId,
    #[serde(flatten)]
    pub input: CellInput,
}

/// The manual input form: one slot per configured cell, indexed by position.
#[derive(Debug, Clone)]
pub struct InputPanel {
    inputs: Vec<CellInput>,
}

impl InputPanel {
    pub fn new(cell_count: usize) -> Self {
        Self {
            inputs: vec![CellInput::default(); cell_count],
        }
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    pub fn get(&self, cell: &CellId) -> Option<&CellInput> {
        self.slot(cell).map(|index| &self.inputs[index])
    }

    pub fn set(&mut self, cell: CellId, input: CellInput) -> Result<(), InputError> {
        let index = self.slot(&cell).ok_or(InputError::UnknownCell(cell))?;
        self.inputs[index] = input;
        Ok(())
    }

    /// Apply a submitted form. Either every entry is applied or, if any
    /// names an unknown cell, none is.
    pub fn submit(&mut self, entries: &[CellInputEntry]) -> Result<(), InputError> {
        if let Some(entry) = entries.iter().find(|e| self.slot(&e.cell).is_none()) {
            return Err(InputError::UnknownCell(entry.cell));
        }

        for entry in entries {
            self.set(entry.cell, entry.input)?;
        }
        Ok(())
    }

    pub fn entries(&self) -> Vec<CellInputEntry> {
        self.cells()
            .zip(self.inputs.iter())
            .map(|(cell, input)| CellInputEntry {
                cell,
                input: *input,
            })
            .collect()
    }

    /// One measurement per configured cell, in cell order.
    pub fn sweep(&self) -> Vec<(CellId, Measurement)> {
        self.cells()
            .zip(self.inputs.iter())
            .map(|(cell, input)| (cell, Measurement::from(*input)))
            .collect()
    }

    fn cells(&self) -> impl Iterator<Item = CellId> {
        // Cell counts are capped well below u8::MAX.
        CellId::range(self.inputs.len() as u8)
    }

    fn slot(&self, cell: &CellId) -> Option<usize> {
        (cell.0 >= 1 && cell.index() < self.inputs.len()).then(|| cell.index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_panel_uses_form_defaults() {
        let panel = InputPanel::new(3);

        assert_eq!(panel.len(), 3);
        assert_eq!(panel.get(&CellId(2)), Some(&CellInput::default()));
        assert_eq!(panel.get(&CellId(4)), None);
        assert_eq!(panel.get(&CellId(0)), None);

        let sweep = panel.sweep();
        assert_eq!(sweep.len(), 3);
        assert_eq!(sweep[0].0, CellId(1));
        assert_eq!(sweep[2].1.voltage, 5.0);
        assert_eq!(sweep[2].1.mode, Mode::Idle);
    }

    #[test]
    fn set_updates_one_cell() {
        let mut panel = InputPanel::new(2);
        let charging = CellInput {
            mode: Mode::Charging,
            voltage: 3.9,
            ..CellInput::default()
        };

        panel.set(CellId(2), charging).unwrap();

        assert_eq!(panel.get(&CellId(2)), Some(&charging));
        assert_eq!(panel.get(&CellId(1)), Some(&CellInput::default()));
        assert_eq!(
            panel.set(CellId(3), charging),
            Err(InputError::UnknownCell(CellId(3)))
        );
    }

    #[test]
    fn submit_is_all_or_nothing() {
        let mut panel = InputPanel::new(2);
        let hot = CellInput {
            temperature: 70.0,
            ..CellInput::default()
        };

        let err = panel
            .submit(&[
                CellInputEntry {
                    cell: CellId(1),
                    input: hot,
                },
                CellInputEntry {
                    cell: CellId(9),
                    input: hot,
                },
            ])
            .unwrap_err();

        assert_eq!(err, InputError::UnknownCell(CellId(9)));
        assert_eq!(panel.get(&CellId(1)), Some(&CellInput::default()));

        panel
            .submit(&[CellInputEntry {
                cell: CellId(1),
                input: hot,
            }])
            .unwrap();
        assert_eq!(panel.get(&CellId(1)).unwrap().temperature, 70.0);
    }

    #[test]
    fn entries_serialize_with_cell_label() {
        let panel = InputPanel::new(1);
        let json = serde_json::to_value(panel.entries()).unwrap();

        assert_eq!(json[0]["cell"], "Cell 1");
        assert_eq!(json[0]["mode"], "Idle");
        assert_eq!(json[0]["capacity"], 100.0);
    }
}
