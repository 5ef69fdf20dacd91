//! Plain text form of 1D and 2D arrays
//!
//! Arrays are written as rows of separated values, one line per index along
//! the first axis. Reading accepts any mix of whitespace and commas between
//! values and either takes the shape explicitly or guesses it from the row
//! layout.

// standard library
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

// crate modules
use crate::error::{Error, Result};
use crate::Array;

// gridkit modules
use gridkit_utils::{f, ShapeExt, ValueExt};

// external crates
use log::debug;
use nom::bytes::complete::take_while1;
use nom::combinator::{all_consuming, opt};
use nom::multi::separated_list0;
use nom::number::complete::double;
use nom::sequence::delimited;
use nom::IResult;

/// Write an array as rows of text
///
/// The first axis runs down the lines and everything after it is flattened
/// into the columns, so a rank 1 array becomes a single column. With
/// `transpose` the roles of rows and columns are swapped. Values use `%g`
/// style formatting.
///
/// ```rust
/// # use gridkit_array::{write_text, Array};
/// let array = Array::from_vec(vec![2, 2], vec![1.0, 2.5, -3.0, 0.0001]).unwrap();
/// let mut buffer = Vec::new();
/// write_text(&array, &mut buffer, ",", false).unwrap();
/// assert_eq!(String::from_utf8(buffer).unwrap(), "1,2.5\n-3,0.0001\n");
/// ```
pub fn write_text<W: Write>(
    array: &Array,
    mut writer: W,
    separator: &str,
    transpose: bool,
) -> Result<()> {
    if array.rank() == 0 {
        return Err(Error::InvalidRank(0));
    }

    let nx = array.dims()[0];
    let ny = array.dims()[1..].element_count().unwrap_or(1);
    let data = array.data();

    let (rows, columns) = if transpose { (ny, nx) } else { (nx, ny) };
    for row in 0..rows {
        let line = (0..columns)
            .map(|column| {
                let index = if transpose {
                    column * ny + row
                } else {
                    row * ny + column
                };
                data[index].general()
            })
            .collect::<Vec<String>>()
            .join(separator);
        writeln!(writer, "{line}")?;
    }

    writer.flush()?;
    Ok(())
}

/// Write an array as text to a file, see [write_text()]
pub fn write_text_file<P: AsRef<Path>>(
    array: &Array,
    path: P,
    separator: &str,
    transpose: bool,
) -> Result<()> {
    let file = File::create(path.as_ref())?;
    write_text(array, BufWriter::new(file), separator, transpose)
}

/// Read an array from text
///
/// Blank lines are ignored. If `dims` is given the total number of values
/// must match it. Otherwise a single row or a single column gives a rank 1
/// array, and anything else is taken as rows by columns, in which case every
/// row must have the same number of values.
///
/// ```rust
/// # use gridkit_array::read_text;
/// let array = read_text("1 2 3\n4, 5, 6\n", None).unwrap();
/// assert_eq!(array.dims(), &[2, 3]);
///
/// let array = read_text("1\n2\n3\n4\n", None).unwrap();
/// assert_eq!(array.dims(), &[4]);
/// ```
pub fn read_text(text: &str, dims: Option<&[usize]>) -> Result<Array> {
    let mut data = Vec::new();
    let mut columns = Vec::new();

    for (number, line) in text.lines().enumerate() {
        let (_, values) = all_consuming(row)(line)
            .map_err(|_| Error::ParseError(f!("unreadable values on line {}", number + 1)))?;
        if !values.is_empty() {
            columns.push(values.len());
            data.extend(values);
        }
    }

    let count = data.len();
    let nrows = columns.len();

    let dims = match dims {
        Some(dims) => {
            if dims.element_count() != Some(count) {
                return Err(Error::NotConformant {
                    expected: dims.to_vec(),
                    found: vec![count],
                });
            }
            dims.to_vec()
        }
        None if nrows <= 1 || nrows == count => vec![count],
        None => {
            if columns.iter().any(|c| *c != columns[0]) {
                return Err(Error::ParseError(
                    "inconsistent number of columns".to_string(),
                ));
            }
            vec![nrows, columns[0]]
        }
    };

    debug!("Read {count} values in {nrows} rows as {}", dims.shape_string());
    Array::from_vec(dims, data)
}

/// Read an array from a text file, see [read_text()]
pub fn read_text_file<P: AsRef<Path>>(path: P, dims: Option<&[usize]>) -> Result<Array> {
    let text = std::fs::read_to_string(path)?;
    read_text(&text, dims)
}

fn separator(i: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_whitespace() || c == ',')(i)
}

fn row(i: &str) -> IResult<&str, Vec<f64>> {
    delimited(
        opt(separator),
        separated_list0(separator, double),
        opt(separator),
    )(i)
}
