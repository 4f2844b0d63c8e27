// This file is originally from stl_io. It has been hacked up significantly.
// https://github.com/hmeyer/stl_io/blob/master/src/lib.rs
use crate::error::{Result, StlError};
use crate::stl::{
    detect_format, StlFormat, BINARY_HEADER_LEN, BINARY_PREAMBLE_LEN, BINARY_TRIANGLE_LEN,
    DETECTION_WINDOW,
};
use crate::trimesh::{dedupe, IndexedMesh, Triangle, Truncation, Vertex};
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{BufRead, BufReader, ErrorKind, Read, Seek, SeekFrom};
use tracing::{debug, warn};

/// Upper bound on what a binary header may make us preallocate.
const MAX_PREALLOCATED_TRIANGLES: usize = 1 << 20;

/// How to read an STL stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReadOptions {
    /// Force an encoding instead of sniffing it.
    pub format: Option<StlFormat>,
}

impl ReadOptions {
    pub fn with_format(format: StlFormat) -> ReadOptions {
        ReadOptions {
            format: Some(format),
        }
    }
}

/// Read an STL stream, detecting whether it is ASCII or binary.
pub fn read_stl<R>(read: &mut R) -> Result<IndexedMesh>
where
    R: Read + Seek,
{
    read_stl_with(read, &ReadOptions::default())
}

pub fn read_stl_with<R>(read: &mut R, options: &ReadOptions) -> Result<IndexedMesh>
where
    R: Read + Seek,
{
    let format = match options.format {
        Some(format) => format,
        None => sniff_format(read)?,
    };
    debug!(?format, "reading STL");

    let mesh = match format {
        StlFormat::Ascii => read_ascii_stl(read)?,
        StlFormat::Binary => read_binary_stl(read)?,
    };
    debug!(
        nodes = mesh.node_len(),
        triangles = mesh.triangle_len(),
        "read STL"
    );
    Ok(mesh)
}

/// Read the STL file at `path`. The file is closed before returning.
pub fn read_stl_file<P: AsRef<std::path::Path>>(path: P) -> Result<IndexedMesh> {
    let input_file = std::fs::File::open(path)?;
    let mut input_reader = BufReader::new(input_file);
    read_stl(&mut input_reader)
}

fn sniff_format<R: Read + Seek>(read: &mut R) -> Result<StlFormat> {
    let start = read.stream_position()?;
    let mut prefix = Vec::with_capacity(DETECTION_WINDOW);
    let maybe_read_error = read
        .by_ref()
        .take(DETECTION_WINDOW as u64)
        .read_to_end(&mut prefix);
    // Seek back before evaluating potential read errors.
    read.seek(SeekFrom::Start(start))?;
    maybe_read_error?;
    Ok(detect_format(&prefix))
}

/// Fill `buf` as far as the stream allows. Returns the number of bytes read.
fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

fn read_vec3(fields: &mut &[u8]) -> std::io::Result<Vertex> {
    Ok(Vertex::new(
        fields.read_f32::<LittleEndian>()?,
        fields.read_f32::<LittleEndian>()?,
        fields.read_f32::<LittleEndian>()?,
    ))
}

fn read_binary_stl<R: Read>(read: &mut R) -> Result<IndexedMesh> {
    let mut reader = BufReader::new(read);

    let mut preamble = [0u8; BINARY_PREAMBLE_LEN];
    let preamble_len = read_up_to(&mut reader, &mut preamble)?;
    if preamble_len < BINARY_PREAMBLE_LEN {
        return Err(StlError::format(format!(
            "file too small for binary STL: {} bytes",
            preamble_len
        )));
    }
    let declared = (&preamble[BINARY_HEADER_LEN..]).read_u32::<LittleEndian>()? as usize;

    let mut triangles = Vec::with_capacity(declared.min(MAX_PREALLOCATED_TRIANGLES));
    let mut record = [0u8; BINARY_TRIANGLE_LEN];
    for _ in 0..declared {
        if read_up_to(&mut reader, &mut record)? < BINARY_TRIANGLE_LEN {
            break;
        }
        let mut fields = &record[..];
        let normal = read_vec3(&mut fields)?;
        let vertices = [
            read_vec3(&mut fields)?,
            read_vec3(&mut fields)?,
            read_vec3(&mut fields)?,
        ];
        // The trailing attribute byte count is ignored.
        triangles.push(Triangle::with_normal(normal, vertices));
    }

    let decoded = triangles.len();
    let mut mesh = dedupe(triangles);
    if decoded < declared {
        warn!(declared, decoded, "binary STL ended before its declared triangle count");
        mesh.truncation = Some(Truncation { declared, decoded });
    }
    Ok(mesh)
}

/// Line source for the ASCII grammar: whitespace separated tokens, blank
/// lines skipped, line numbers kept for error messages.
struct AsciiLines<R: BufRead> {
    reader: R,
    line: usize,
    buffer: Vec<u8>,
}

impl<R: BufRead> AsciiLines<R> {
    fn new(reader: R) -> Self {
        AsciiLines {
            reader,
            line: 0,
            buffer: Vec::new(),
        }
    }

    fn next_tokens(&mut self) -> Result<Option<(usize, Vec<String>)>> {
        loop {
            self.buffer.clear();
            if self.reader.read_until(b'\n', &mut self.buffer)? == 0 {
                return Ok(None);
            }
            self.line += 1;
            let tokens = String::from_utf8_lossy(&self.buffer)
                .split_whitespace()
                .map(|t| t.to_string())
                .collect::<Vec<_>>();
            if !tokens.is_empty() {
                return Ok(Some((self.line, tokens)));
            }
        }
    }

    fn expect_tokens(&mut self, expecting: &str) -> Result<(usize, Vec<String>)> {
        self.next_tokens()?.ok_or_else(|| {
            StlError::format_at(
                self.line + 1,
                format!("unexpected end of file while expecting {}", expecting),
            )
        })
    }

    fn expect_static(&mut self, expectation: &[&str]) -> Result<()> {
        let (line, tokens) = self.expect_tokens(&expectation.join(" "))?;
        if !tokens_match(&tokens, expectation) {
            return Err(StlError::format_at(
                line,
                format!("expected {:?}, got {:?}", expectation.join(" "), tokens.join(" ")),
            ));
        }
        Ok(())
    }
}

fn is_keyword(tokens: &[String], keyword: &str) -> bool {
    tokens
        .first()
        .map_or(false, |t| t.eq_ignore_ascii_case(keyword))
}

fn tokens_match(tokens: &[String], expectation: &[&str]) -> bool {
    tokens.len() == expectation.len()
        && tokens
            .iter()
            .zip(expectation)
            .all(|(t, e)| t.eq_ignore_ascii_case(e))
}

fn parse_coordinate(line: usize, token: &str) -> Result<f32> {
    token
        .parse::<f32>()
        .map_err(|_| StlError::format_at(line, format!("invalid number {:?}", token)))
}

/// Normals are taken as written, `nan` and `inf` included.
fn parse_vec3(line: usize, tokens: &[String]) -> Result<Vertex> {
    Ok(Vertex::new(
        parse_coordinate(line, &tokens[0])?,
        parse_coordinate(line, &tokens[1])?,
        parse_coordinate(line, &tokens[2])?,
    ))
}

fn parse_position(line: usize, tokens: &[String]) -> Result<Vertex> {
    let position = parse_vec3(line, tokens)?;
    if let Some(c) = position.iter().find(|c| !c.is_finite()) {
        return Err(StlError::format_at(
            line,
            format!("expected finite coordinate, got {}", c),
        ));
    }
    Ok(position)
}

fn read_facet<R: BufRead>(
    lines: &mut AsciiLines<R>,
    facet_line: usize,
    header: &[String],
) -> Result<Triangle> {
    if header.len() != 5 || !header[1].eq_ignore_ascii_case("normal") {
        return Err(StlError::format_at(
            facet_line,
            format!("invalid facet header: {:?}", header.join(" ")),
        ));
    }
    let normal = parse_vec3(facet_line, &header[2..5])?;
    lines.expect_static(&["outer", "loop"])?;

    let mut vertices = Vec::with_capacity(3);
    loop {
        let (line, tokens) = lines.expect_tokens("vertex or endloop")?;
        if is_keyword(&tokens, "vertex") {
            if tokens.len() != 4 {
                return Err(StlError::format_at(
                    line,
                    format!("expected \"vertex x y z\", got {:?}", tokens.join(" ")),
                ));
            }
            vertices.push(parse_position(line, &tokens[1..4])?);
        } else if tokens_match(&tokens, &["endloop"]) {
            break;
        } else {
            return Err(StlError::format_at(
                line,
                format!("expected vertex or endloop, got {:?}", tokens.join(" ")),
            ));
        }
    }
    lines.expect_static(&["endfacet"])?;

    match vertices[..] {
        [a, b, c] => Ok(Triangle::with_normal(normal, [a, b, c])),
        _ => Err(StlError::format_at(
            facet_line,
            format!("facet has {} vertices, expected 3", vertices.len()),
        )),
    }
}

fn read_ascii_stl<R: Read>(read: &mut R) -> Result<IndexedMesh> {
    let mut lines = AsciiLines::new(BufReader::new(read));

    let (line, tokens) = lines.expect_tokens("solid")?;
    if !is_keyword(&tokens, "solid") {
        return Err(StlError::format_at(
            line,
            format!("expected solid, got {:?}", tokens.join(" ")),
        ));
    }

    let mut triangles = Vec::new();
    loop {
        let (line, tokens) = match lines.next_tokens()? {
            Some(next) => next,
            None => {
                warn!(line = lines.line, "ASCII STL ended without endsolid");
                break;
            }
        };
        if is_keyword(&tokens, "facet") {
            triangles.push(read_facet(&mut lines, line, &tokens)?);
        } else if is_keyword(&tokens, "endsolid") {
            // Several solids may follow each other in one file.
            match lines.next_tokens()? {
                None => break,
                Some((line, tokens)) if is_keyword(&tokens, "solid") => {
                    debug!(line, "continuing with another solid");
                }
                Some((line, tokens)) => {
                    return Err(StlError::format_at(
                        line,
                        format!("expected solid after endsolid, got {:?}", tokens.join(" ")),
                    ));
                }
            }
        } else {
            return Err(StlError::format_at(
                line,
                format!("expected facet or endsolid, got {:?}", tokens.join(" ")),
            ));
        }
    }
    Ok(dedupe(triangles))
}
