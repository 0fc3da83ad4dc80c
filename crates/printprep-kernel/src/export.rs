//! Binary STL export.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::error::{KernelError, KernelResult};
use crate::mesh::TriangleMesh;
use crate::solid::Solid;

/// Write a mesh as binary STL to any writer. Returns the triangle count.
pub fn write_stl_to<W: Write>(writer: &mut W, mesh: &TriangleMesh) -> KernelResult<usize> {
    let triangles: Vec<stl_io::Triangle> = (0..mesh.num_triangles())
        .map(|i| {
            let [a, b, c] = mesh.triangle(i);
            stl_io::Triangle {
                normal: stl_io::Normal::new(mesh.triangle_normal(i)),
                vertices: [
                    stl_io::Vertex::new(a),
                    stl_io::Vertex::new(b),
                    stl_io::Vertex::new(c),
                ],
            }
        })
        .collect();
    stl_io::write_stl(writer, triangles.iter()).map_err(|e| KernelError::Export(e.to_string()))?;
    Ok(triangles.len())
}

/// Tessellate `solids` into one mesh and save it as binary STL at `path`.
pub fn write_stl<P: AsRef<Path>>(path: P, solids: &[Solid]) -> KernelResult<usize> {
    let path = path.as_ref();
    let mut mesh = TriangleMesh::new();
    for solid in solids {
        mesh.merge(&solid.to_mesh());
    }
    if mesh.num_triangles() == 0 {
        return Err(KernelError::Export("nothing to export".into()));
    }
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    let count = write_stl_to(&mut writer, &mesh)?;
    writer.flush()?;
    info!(path = %path.display(), triangles = count, "wrote STL");
    Ok(count)
}
