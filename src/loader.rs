//! Parse DIMACS graph files into [`ColGraph`]s.
//!
//! Two encodings are supported. The text format has a `p edge N M` problem
//! line and one `e u v` line per edge, with 1-indexed vertices and
//! `c`-prefixed comments. The packed binary format has the same ASCII header,
//! ending at the `p edge` line, followed by the upper triangle of the
//! adjacency matrix: one bit per pair `(i, j)` with `i < j`, in row-major
//! order, most significant bit first.
//!
//! Malformed lines are skipped with a warning. A file without a usable
//! problem line, or one declaring more than [`MAX_VERTICES`] vertices, is an
//! error.

use std::{ffi::OsStr, fs, path::Path};

use tracing::warn;

use crate::{error::LoadError, graph::ColGraph};

/// Largest vertex count accepted from a problem line. Adjacency is stored as
/// `n` bitsets of `n` bits, so this caps it at 512 MiB.
pub const MAX_VERTICES: usize = 1 << 16;

/// Load a graph from `path`, choosing the decoder by extension: files ending
/// in `.b` (e.g. `queen8_8.col.b`) are packed binary, all others are text.
pub fn load(path: &Path) -> Result<ColGraph, LoadError> {
    if path.extension().and_then(OsStr::to_str) == Some("b") {
        parse_dimacs_binary(&fs::read(path)?)
    } else {
        parse_dimacs_str(&fs::read_to_string(path)?)
    }
}

/// Parse a DIMACS text graph.
pub fn parse_dimacs_str(input: &str) -> Result<ColGraph, LoadError> {
    let mut graph: Option<ColGraph> = None;

    for (lineno, line) in input.lines().enumerate() {
        let lineno = lineno + 1;
        let mut parts = line.split_whitespace();
        match parts.next() {
            None | Some("c") => continue,
            Some("p") => {
                if graph.is_some() {
                    warn!(lineno, "ignoring repeated problem line");
                    continue;
                }
                match parse_problem_line(line) {
                    Some(n) => graph = Some(ColGraph::new(check_vertex_count(n)?)),
                    None => warn!(lineno, line, "skipping malformed problem line"),
                }
            }
            Some("e") => {
                let Some(g) = graph.as_mut() else {
                    warn!(lineno, "skipping edge before problem line");
                    continue;
                };
                let endpoints = parts
                    .next()
                    .zip(parts.next())
                    .and_then(|(u, v)| u.parse::<usize>().ok().zip(v.parse::<usize>().ok()));
                match endpoints {
                    Some((u, v)) if (1..=g.len()).contains(&u) && (1..=g.len()).contains(&v) => {
                        g.add_edge(u - 1, v - 1);
                    }
                    Some(_) => warn!(lineno, line, "skipping edge with endpoint out of range"),
                    None => warn!(lineno, line, "skipping malformed edge line"),
                }
            }
            Some(_) => continue,
        }
    }

    graph.ok_or(LoadError::MissingProblemLine)
}

/// Parse a packed binary DIMACS graph.
pub fn parse_dimacs_binary(bytes: &[u8]) -> Result<ColGraph, LoadError> {
    let mut offset = 0;
    let mut num_vertices = None;

    // Header: newline-terminated ASCII lines up to and including `p edge`.
    while offset < bytes.len() {
        let end = bytes[offset..]
            .iter()
            .position(|&b| b == b'\n')
            .map_or(bytes.len(), |i| offset + i);
        let line = String::from_utf8_lossy(&bytes[offset..end]);
        offset = (end + 1).min(bytes.len());
        if line.trim_start().starts_with('p') {
            match parse_problem_line(&line) {
                Some(n) => {
                    num_vertices = Some(n);
                    break;
                }
                None => warn!(line = %line, "skipping malformed problem line"),
            }
        }
    }

    let n = check_vertex_count(num_vertices.ok_or(LoadError::MissingProblemLine)?)?;
    let body = &bytes[offset..];
    let pairs = n
        .checked_mul(n.saturating_sub(1))
        .map(|twice| twice / 2)
        .ok_or(LoadError::TooManyVertices {
            declared: n,
            max: MAX_VERTICES,
        })?;
    let expected = pairs.div_ceil(8);
    if body.len() < expected {
        return Err(LoadError::TruncatedBitMatrix {
            expected,
            found: body.len(),
        });
    }

    let mut graph = ColGraph::new(n);
    let mut bit = 0;
    for i in 0..n {
        for j in i + 1..n {
            if (body[bit / 8] >> (7 - bit % 8)) & 1 == 1 {
                graph.add_edge(i, j);
            }
            bit += 1;
        }
    }
    Ok(graph)
}

fn check_vertex_count(n: usize) -> Result<usize, LoadError> {
    if n > MAX_VERTICES {
        return Err(LoadError::TooManyVertices {
            declared: n,
            max: MAX_VERTICES,
        });
    }
    Ok(n)
}

/// Return `N` from a `p edge N M` line.
fn parse_problem_line(line: &str) -> Option<usize> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    match parts.as_slice() {
        ["p", "edge", n, m, ..] => {
            m.parse::<usize>().ok()?;
            n.parse().ok()
        }
        _ => None,
    }
}
