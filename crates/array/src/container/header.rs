//! Parsers for the `.npy` header
//!
//! Only the header is needed to know the shape and element type of a dataset,
//! so shape queries never touch the element data.

// crate modules
use crate::error::{Error, Result};

// external crates
use nom::branch::alt;
use nom::bytes::complete::{tag, take_while};
use nom::character::complete::{char, digit1, multispace0};
use nom::combinator::{map, map_res, opt, value};
use nom::multi::separated_list0;
use nom::number::complete::{le_u16, le_u32, le_u8};
use nom::sequence::{delimited, pair, preceded, separated_pair, terminated};
use nom::IResult;

/// Bytes before the header dictionary for a version 1 file
pub(crate) const PREAMBLE_V1: usize = 10;

/// Bytes before the header dictionary for version 2 and 3 files
pub(crate) const PREAMBLE_V2: usize = 12;

/// Element type of a dataset as far as gridkit is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ElementKind {
    Float32,
    Float64,
}

/// Decoded header dictionary
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NpyHeader {
    pub descr: String,
    pub fortran_order: bool,
    pub shape: Vec<usize>,
}

impl NpyHeader {
    /// Map the dtype descriptor onto a supported element type
    pub fn element_kind(&self) -> Option<ElementKind> {
        let (order, code) = self.descr.split_at(self.descr.len().min(1));
        if !matches!(order, "<" | ">" | "=" | "|") {
            return None;
        }
        match code {
            "f4" => Some(ElementKind::Float32),
            "f8" => Some(ElementKind::Float64),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum PyValue {
    Str(String),
    Bool(bool),
    Tuple(Vec<usize>),
}

/// Format version and dictionary length from the magic string onwards
///
/// Expects at least [PREAMBLE_V2] bytes, which any valid file has.
pub(crate) fn preamble(i: &[u8]) -> IResult<&[u8], (u8, usize)> {
    let (i, (major, _minor)) = preceded(tag(&b"\x93NUMPY"[..]), pair(le_u8, le_u8))(i)?;
    if major == 1 {
        map(le_u16, |len| (major, len as usize))(i)
    } else {
        map(le_u32, |len| (major, len as usize))(i)
    }
}

/// Decode the python dictionary literal that follows the preamble
pub(crate) fn parse_header(text: &str) -> Result<NpyHeader> {
    let (_, entries) = dictionary(text)
        .map_err(|e| Error::ReadFailed(gridkit_utils::f!("bad npy header: {e}")))?;

    let mut descr = None;
    let mut fortran_order = false;
    let mut shape = None;

    for (key, value) in entries {
        match (key, value) {
            ("descr", PyValue::Str(s)) => descr = Some(s),
            ("fortran_order", PyValue::Bool(b)) => fortran_order = b,
            ("shape", PyValue::Tuple(t)) => shape = Some(t),
            _ => (),
        }
    }

    match (descr, shape) {
        (Some(descr), Some(shape)) => Ok(NpyHeader {
            descr,
            fortran_order,
            shape,
        }),
        _ => Err(Error::ReadFailed("incomplete npy header".to_string())),
    }
}

fn ws<'a, O, F>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

fn quoted(i: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('\''), take_while(|c| c != '\''), char('\'')),
        delimited(char('"'), take_while(|c| c != '"'), char('"')),
    ))(i)
}

fn boolean(i: &str) -> IResult<&str, bool> {
    alt((value(true, tag("True")), value(false, tag("False"))))(i)
}

fn integer(i: &str) -> IResult<&str, usize> {
    // numpy on some platforms writes longs as "3L"
    terminated(map_res(digit1, str::parse::<usize>), opt(char('L')))(i)
}

fn tuple(i: &str) -> IResult<&str, Vec<usize>> {
    delimited(
        ws(char('(')),
        terminated(
            separated_list0(char(','), ws(integer)),
            opt(ws(char(','))),
        ),
        char(')'),
    )(i)
}

fn py_value(i: &str) -> IResult<&str, PyValue> {
    alt((
        map(quoted, |s| PyValue::Str(s.to_string())),
        map(boolean, PyValue::Bool),
        map(tuple, PyValue::Tuple),
    ))(i)
}

fn dictionary(i: &str) -> IResult<&str, Vec<(&str, PyValue)>> {
    delimited(
        ws(char('{')),
        terminated(
            separated_list0(char(','), separated_pair(ws(quoted), char(':'), ws(py_value))),
            opt(ws(char(','))),
        ),
        ws(char('}')),
    )(i)
}

#[cfg(test)]
mod header_tests {
    use super::*;

    #[test]
    fn version_one_preamble() {
        let bytes = b"\x93NUMPY\x01\x00\x76\x00{'descr'";
        let (rest, (major, len)) = preamble(bytes).unwrap();
        assert_eq!(major, 1);
        assert_eq!(len, 118);
        assert_eq!(rest, b"{'descr'");
    }

    #[test]
    fn version_two_preamble() {
        let bytes = b"\x93NUMPY\x02\x00\x00\x01\x00\x00{";
        let (_, (major, len)) = preamble(bytes).unwrap();
        assert_eq!(major, 2);
        assert_eq!(len, 256);
    }

    #[test]
    fn bad_magic() {
        assert!(preamble(b"PK\x03\x04\x01\x00\x76\x00\x00\x00").is_err());
    }

    #[test]
    fn standard_header() {
        let text = "{'descr': '<f8', 'fortran_order': False, 'shape': (2, 3, 4), }          \n";
        let header = parse_header(text).unwrap();
        assert_eq!(header.descr, "<f8");
        assert!(!header.fortran_order);
        assert_eq!(header.shape, vec![2, 3, 4]);
        assert_eq!(header.element_kind(), Some(ElementKind::Float64));
    }

    #[test]
    fn unusual_shapes() {
        let single = parse_header("{'shape': (5,), 'descr': '>f4', 'fortran_order': True}").unwrap();
        assert_eq!(single.shape, vec![5]);
        assert!(single.fortran_order);
        assert_eq!(single.element_kind(), Some(ElementKind::Float32));

        let scalar = parse_header("{\"descr\": \"<i4\", \"fortran_order\": False, \"shape\": ()}").unwrap();
        assert!(scalar.shape.is_empty());
        assert_eq!(scalar.element_kind(), None);
    }

    #[test]
    fn incomplete_header() {
        assert!(parse_header("{'descr': '<f8'}").is_err());
        assert!(parse_header("not a dict").is_err());
    }
}
