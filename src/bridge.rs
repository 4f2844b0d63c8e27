//! Glue towards the application that owns the meshes.
//!
//! The host hands finished meshes to a [`MeshConsumer`] on import, and pulls
//! triangles from one [`MeshProvider`] per object on export. Everything about
//! how the host builds or evaluates its objects stays on its side of these
//! traits.

use crate::stl::{read_stl_file, write_stl_file, WriteOptions};
use crate::trimesh::{IndexedMesh, Triangle};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

/// Receives imported meshes.
pub trait MeshConsumer {
    fn create_mesh(&mut self, name: &str, mesh: IndexedMesh) -> Result<()>;
}

/// Supplies the triangles of one object for export.
///
/// The returned sequence is consumed once.
pub trait MeshProvider {
    fn triangles(&self) -> Box<dyn Iterator<Item = Triangle> + '_>;
}

impl MeshProvider for IndexedMesh {
    fn triangles(&self) -> Box<dyn Iterator<Item = Triangle> + '_> {
        Box::new(IndexedMesh::triangles(self))
    }
}

impl MeshProvider for Vec<Triangle> {
    fn triangles(&self) -> Box<dyn Iterator<Item = Triangle> + '_> {
        Box::new(self.iter().copied())
    }
}

/// Object name for an imported file.
///
/// Takes the file stem and turns underscores into spaces. An all lowercase
/// stem gets each word capitalized, anything else is kept as is.
pub fn display_name<P: AsRef<Path>>(path: P) -> String {
    let stem = path
        .as_ref()
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = stem.replace('_', " ");
    if name.chars().any(|c| c.is_uppercase()) {
        return name;
    }
    name.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Read each file and hand it to `consumer`, stopping at the first failure.
pub fn import_files<I, P, C>(paths: I, consumer: &mut C) -> Result<usize>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
    C: MeshConsumer + ?Sized,
{
    let mut imported = 0;
    for path in paths {
        let path = path.as_ref();
        let mesh = read_stl_file(path)
            .with_context(|| format!("Failed to read stl file: {}", path.display()))?;
        let name = display_name(path);
        debug!(
            %name,
            nodes = mesh.node_len(),
            triangles = mesh.triangle_len(),
            truncated = mesh.is_truncated(),
            "importing"
        );
        consumer
            .create_mesh(&name, mesh)
            .with_context(|| format!("Failed to create mesh for: {}", path.display()))?;
        imported += 1;
    }
    Ok(imported)
}

/// Write the triangles of every provider, in order, into one file.
pub fn export_objects<P>(
    path: P,
    providers: &[&dyn MeshProvider],
    options: &WriteOptions,
) -> Result<()>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let triangles = providers.iter().flat_map(|provider| provider.triangles());
    write_stl_file(path, triangles, options)
        .with_context(|| format!("Failed to write stl file: {}", path.display()))
}
