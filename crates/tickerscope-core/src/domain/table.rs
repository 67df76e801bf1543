use crate::UtcDateTime;

/// Cell storage for one raw provider column.
///
/// Providers hand back column-major payloads with explicit nulls, so every
/// cell is optional. Timestamp columns are kept apart from numeric ones to
/// avoid lossy epoch/float conversions before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCells {
    Numbers(Vec<Option<f64>>),
    Timestamps(Vec<Option<UtcDateTime>>),
}

impl RawCells {
    pub fn len(&self) -> usize {
        match self {
            Self::Numbers(values) => values.len(),
            Self::Timestamps(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Named raw column, name exactly as the provider sent it.
#[derive(Debug, Clone, PartialEq)]
pub struct RawColumn {
    pub name: String,
    pub cells: RawCells,
}

/// Raw tabular payload as returned by a provider history call.
///
/// The date axis may arrive either as a named column or as the table index;
/// the normalizer promotes the index when no date column is present.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTable {
    pub index: Option<Vec<Option<UtcDateTime>>>,
    pub columns: Vec<RawColumn>,
}

impl RawTable {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_index(mut self, index: Vec<Option<UtcDateTime>>) -> Self {
        self.index = Some(index);
        self
    }

    pub fn with_numbers(mut self, name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        self.columns.push(RawColumn {
            name: name.into(),
            cells: RawCells::Numbers(values),
        });
        self
    }

    pub fn with_timestamps(
        mut self,
        name: impl Into<String>,
        values: Vec<Option<UtcDateTime>>,
    ) -> Self {
        self.columns.push(RawColumn {
            name: name.into(),
            cells: RawCells::Timestamps(values),
        });
        self
    }

    /// Row count: the longest column (or the index) bounds iteration; ragged
    /// columns read as null past their end.
    pub fn row_count(&self) -> usize {
        let column_max = self
            .columns
            .iter()
            .map(|column| column.cells.len())
            .max()
            .unwrap_or(0);
        let index_len = self.index.as_ref().map(Vec::len).unwrap_or(0);
        column_max.max(index_len)
    }
}
