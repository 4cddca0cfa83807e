use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt::{self, Write};
use ndarray::Array2;

use crate::*;

const PADDING: &str = "  ";

/// Parses comma separated rows into the board side length and its row-major values.
pub(crate) fn parse_grid(
    text: &str,
) -> core::result::Result<(Coord, Vec<Option<Value>>), ConstructionError> {
    use ConstructionError::*;

    let lines: Vec<&str> = text.trim().lines().collect();
    let size = lines.len();
    if size < usize::from(MIN_BOARD_SIZE) {
        return Err(TooSmall(size));
    }
    if size > usize::from(MAX_BOARD_SIZE) {
        return Err(TooBig(size));
    }

    let mut values = Vec::with_capacity(size * size);
    for (i, line) in lines.into_iter().enumerate() {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != size {
            return Err(WrongFieldCount {
                line: i + 1,
                expected: size,
                found: fields.len(),
            });
        }
        for field in fields {
            values.push(parse_field(field, i + 1)?);
        }
    }

    Ok((size as Coord, values))
}

fn parse_field(field: &str, line: usize) -> core::result::Result<Option<Value>, ConstructionError> {
    if field.is_empty() {
        return Ok(None);
    }
    match field.parse::<Value>() {
        Ok(value) if value > 0 => Ok(Some(value)),
        _ => Err(ConstructionError::InvalidTileValue {
            line,
            value: field.to_string(),
        }),
    }
}

/// Inverse of [`parse_grid`], empty tiles become blank fields.
pub(crate) fn write_grid(grid: &Array2<Tile>) -> String {
    let mut out = String::new();
    for (i, row) in grid.rows().into_iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        for (j, tile) in row.iter().enumerate() {
            if j > 0 {
                out.push(',');
            }
            if let Some(value) = tile.value() {
                out.push_str(&value.to_string());
            }
        }
    }
    out
}

/// Number of decimal digits needed to print `value`.
pub(crate) fn digit_count(value: Value) -> usize {
    value.checked_ilog10().map_or(1, |digits| digits as usize + 1)
}

/// Renders the grid as a bordered table, every cell as wide as the largest value on the board.
pub(crate) fn write_pretty<W: Write>(out: &mut W, grid: &Array2<Tile>) -> fmt::Result {
    let width = grid
        .iter()
        .filter_map(Tile::value)
        .max()
        .map_or(1, digit_count);
    let inner = grid.ncols() * (width + 2 * PADDING.len());

    write_border(out, '╔', '╗', inner)?;
    out.write_char('\n')?;
    for row in grid.rows() {
        out.write_char('║')?;
        for tile in row {
            match tile.value() {
                Some(value) => write!(out, "{PADDING}{value:>width$}{PADDING}")?,
                None => write!(out, "{PADDING}{:width$}{PADDING}", "")?,
            }
        }
        out.write_str("║\n")?;
    }
    write_border(out, '╚', '╝', inner)
}

fn write_border<W: Write>(out: &mut W, left: char, right: char, inner: usize) -> fmt::Result {
    out.write_char(left)?;
    for _ in 0..inner {
        out.write_char('═')?;
    }
    out.write_char(right)
}
