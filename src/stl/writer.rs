// This file is originally from stl_io. It has been hacked up significantly.
// https://github.com/hmeyer/stl_io/blob/master/src/lib.rs
use crate::error::{Result, StlError};
use crate::stl::{StlFormat, BINARY_HEADER_LEN};
use crate::trimesh::{Triangle, Vertex};
use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{BufWriter, Write};
use tracing::debug;

/// How to write an STL file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriteOptions {
    pub format: StlFormat,
    /// Solid name for ASCII output, header text for binary output.
    pub name: String,
}

impl Default for WriteOptions {
    fn default() -> Self {
        WriteOptions {
            format: StlFormat::Binary,
            name: String::from("stlmesh"),
        }
    }
}

impl WriteOptions {
    pub fn ascii() -> WriteOptions {
        WriteOptions {
            format: StlFormat::Ascii,
            ..WriteOptions::default()
        }
    }

    pub fn binary() -> WriteOptions {
        WriteOptions::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> WriteOptions {
        self.name = name.into();
        self
    }
}

/// Serialize `triangles` to `writer` in the requested encoding.
///
/// Binary output needs the triangle count up front, so the sequence is
/// collected first. ASCII output streams it.
pub fn write_stl<W, I>(writer: &mut W, triangles: I, options: &WriteOptions) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = Triangle>,
{
    let mut writer = BufWriter::new(writer);
    match options.format {
        StlFormat::Binary => write_binary_stl(&mut writer, triangles, &options.name)?,
        StlFormat::Ascii => write_ascii_stl(&mut writer, triangles, &options.name)?,
    }
    writer.flush()?;
    Ok(())
}

/// Create or truncate `path` and write `triangles` into it.
///
/// Not atomic: a failure part way through leaves a partial file behind.
pub fn write_stl_file<P, I>(path: P, triangles: I, options: &WriteOptions) -> Result<()>
where
    P: AsRef<std::path::Path>,
    I: IntoIterator<Item = Triangle>,
{
    let mut output_file = std::fs::File::create(path)?;
    write_stl(&mut output_file, triangles, options)
}

/// The 80 byte binary header. Never starts with `solid`, so the output
/// cannot be mistaken for ASCII.
fn binary_header(name: &str) -> [u8; BINARY_HEADER_LEN] {
    let mut header = [0u8; BINARY_HEADER_LEN];
    let text = if name.starts_with("solid") {
        format!(" {}", name)
    } else {
        name.to_string()
    };
    let len = text.len().min(BINARY_HEADER_LEN);
    header[..len].copy_from_slice(&text.as_bytes()[..len]);
    header
}

/// Binary STL stores the triangle count as a u32.
fn triangle_count(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| {
        StlError::format(format!(
            "{} triangles do not fit in a binary STL triangle count",
            len
        ))
    })
}

/// Solid name for the ASCII `solid` and `endsolid` lines, kept on one line.
fn solid_name(name: &str) -> String {
    name.replace(|c: char| c == '\r' || c == '\n', " ")
}

fn write_vec3<W: Write>(writer: &mut W, v: &Vertex) -> std::io::Result<()> {
    for c in v.iter() {
        writer.write_f32::<LittleEndian>(*c)?;
    }
    Ok(())
}

fn write_binary_stl<W, I>(writer: &mut W, triangles: I, name: &str) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = Triangle>,
{
    let triangles: Vec<Triangle> = triangles.into_iter().collect();
    let count = triangle_count(triangles.len())?;
    debug!(triangles = count, "writing binary STL");

    writer.write_all(&binary_header(name))?;
    writer.write_u32::<LittleEndian>(count)?;
    for t in &triangles {
        write_vec3(writer, &t.normal_or_zero())?;
        for v in &t.vertices {
            write_vec3(writer, v)?;
        }
        // Attribute byte count
        writer.write_u16::<LittleEndian>(0)?;
    }
    Ok(())
}

fn write_ascii_vec3<W: Write>(writer: &mut W, keyword: &str, v: &Vertex) -> std::io::Result<()> {
    // `{:e}` prints the shortest digits that parse back to the same f32.
    writeln!(writer, "{} {:e} {:e} {:e}", keyword, v.x, v.y, v.z)
}

fn write_ascii_stl<W, I>(writer: &mut W, triangles: I, name: &str) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = Triangle>,
{
    let name = solid_name(name);
    let mut count = 0usize;
    writeln!(writer, "solid {}", name)?;
    for t in triangles {
        // The reader only takes finite positions back.
        if t.vertices.iter().flatten().any(|c| !c.is_finite()) {
            return Err(StlError::format(format!(
                "triangle {} has a non-finite vertex coordinate",
                count
            )));
        }
        write_ascii_vec3(writer, "facet normal", &t.normal_or_zero())?;
        writeln!(writer, "outer loop")?;
        for v in &t.vertices {
            write_ascii_vec3(writer, "vertex", v)?;
        }
        writeln!(writer, "endloop")?;
        writeln!(writer, "endfacet")?;
        count += 1;
    }
    writeln!(writer, "endsolid {}", name)?;
    debug!(triangles = count, "wrote ASCII STL");
    Ok(())
}
