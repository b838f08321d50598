//! Offline lookup table of expected rewards per action.
//!
//! Text format:
//!
//! ```text
//! # grid_size num_actions
//! 4 3
//! # state_id r_0 r_1 r_2
//! 1290 12.5 -3.0 0.0
//! ```
//!
//! Lines starting with `#` and blank lines are ignored.

use std::collections::HashMap;
use std::io::{BufRead, Write};

use super::error::LutError;
use crate::grid::Grid;
use crate::state::StateId;

/// Map from packed state ids on a fixed grid to a reward per action.
#[derive(Debug, Clone, PartialEq)]
pub struct Lut {
    grid: Grid,
    num_actions: usize,
    entries: HashMap<StateId, Vec<f64>>,
}

impl Lut {
    pub fn new(grid_size: u32, num_actions: usize) -> Self {
        Self {
            grid: Grid::new(grid_size),
            num_actions,
            entries: HashMap::new(),
        }
    }

    /// Grid the table's states are expressed on.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn num_actions(&self) -> usize {
        self.num_actions
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stores the reward row of `state`, returning the row it replaced.
    pub fn insert(
        &mut self,
        state: StateId,
        rewards: Vec<f64>,
    ) -> Result<Option<Vec<f64>>, LutError> {
        if rewards.len() != self.num_actions {
            return Err(LutError::WidthMismatch {
                state: state.0,
                expected: self.num_actions,
                found: rewards.len(),
            });
        }
        Ok(self.entries.insert(state, rewards))
    }

    pub fn get(&self, state: StateId) -> Option<&[f64]> {
        self.entries.get(&state).map(Vec::as_slice)
    }

    /// Parses a table in the text format.
    pub fn read_from<R: BufRead>(reader: R) -> Result<Self, LutError> {
        let mut lut: Option<Lut> = None;
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let line_no = idx + 1;
            let content = line.trim();
            if content.is_empty() || content.starts_with('#') {
                continue;
            }
            let mut tokens = content.split_whitespace();

            let Some(table) = lut.as_mut() else {
                lut = Some(parse_header(content, line_no)?);
                continue;
            };

            let state = StateId(parse_token(tokens.next().unwrap_or_default(), line_no)?);
            let rewards = tokens
                .map(|t| parse_token::<f64>(t, line_no))
                .collect::<Result<Vec<_>, _>>()?;
            table.insert(state, rewards)?;
        }

        let lut = lut.ok_or(LutError::MissingHeader)?;
        tracing::info!(
            grid = lut.grid.size(),
            actions = lut.num_actions,
            entries = lut.len(),
            "lookup table loaded"
        );
        Ok(lut)
    }

    /// Writes the table in the text format, rows sorted by state id.
    pub fn write_to<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        writeln!(writer, "# grid_size num_actions")?;
        writeln!(writer, "{} {}", self.grid.size(), self.num_actions)?;
        let mut states: Vec<&StateId> = self.entries.keys().collect();
        states.sort();
        for state in states {
            write!(writer, "{}", state.0)?;
            for reward in &self.entries[state] {
                write!(writer, " {}", reward)?;
            }
            writeln!(writer)?;
        }
        Ok(())
    }
}

fn parse_header(content: &str, line: usize) -> Result<Lut, LutError> {
    let invalid = || LutError::InvalidHeader {
        line,
        content: content.to_string(),
    };
    let fields: Vec<&str> = content.split_whitespace().collect();
    let [size, actions] = fields.as_slice() else {
        return Err(invalid());
    };
    let size: u32 = size.parse().map_err(|_| invalid())?;
    let actions: usize = actions.parse().map_err(|_| invalid())?;
    if size == 0 || actions == 0 {
        return Err(invalid());
    }
    Ok(Lut::new(size, actions))
}

fn parse_token<T: std::str::FromStr>(token: &str, line: usize) -> Result<T, LutError> {
    token.parse().map_err(|_| LutError::Parse {
        line,
        token: token.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
# offline rewards
3 2

10 1.5 -2
# second row
11 0 4.25
";

    #[test]
    fn reads_text_format() {
        let lut = Lut::read_from(TABLE.as_bytes()).unwrap();
        assert_eq!(lut.grid().size(), 3);
        assert_eq!(lut.num_actions(), 2);
        assert_eq!(lut.len(), 2);
        assert_eq!(lut.get(StateId(10)), Some(&[1.5, -2.0][..]));
        assert_eq!(lut.get(StateId(12)), None);
    }

    #[test]
    fn written_table_reads_back() {
        let lut = Lut::read_from(TABLE.as_bytes()).unwrap();
        let mut out = Vec::new();
        lut.write_to(&mut out).unwrap();
        assert_eq!(Lut::read_from(out.as_slice()).unwrap(), lut);
    }

    #[test]
    fn rejects_short_rows() {
        let err = Lut::read_from("3 2\n10 1.5\n".as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            LutError::WidthMismatch {
                state: 10,
                expected: 2,
                found: 1
            }
        ));
    }

    #[test]
    fn rejects_bad_tokens_and_headers() {
        let err = Lut::read_from("3 2\n10 1.5 abc\n".as_bytes()).unwrap_err();
        assert!(matches!(err, LutError::Parse { line: 2, .. }));

        let err = Lut::read_from("3\n".as_bytes()).unwrap_err();
        assert!(matches!(err, LutError::InvalidHeader { line: 1, .. }));

        let err = Lut::read_from("# only comments\n".as_bytes()).unwrap_err();
        assert!(matches!(err, LutError::MissingHeader));
    }

    #[test]
    fn insert_checks_width() {
        let mut lut = Lut::new(4, 3);
        assert!(lut.insert(StateId(1), vec![0.0; 3]).unwrap().is_none());
        assert!(lut.insert(StateId(1), vec![1.0; 3]).unwrap().is_some());
        assert!(lut.insert(StateId(2), vec![0.0; 2]).is_err());
    }
}
