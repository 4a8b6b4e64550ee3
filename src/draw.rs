//! Output boundary: gnuplot and POV-Ray drawing plus the custom
//! `%`-directive formatter. Every function writes to an explicit sink; the
//! kernel never touches global output.

use std::io::{self, Write};

use crate::cell::VoronoiCell;
use crate::container::{Container, ContainerPoly};
use crate::loops::Particle;

fn write_gnuplot_cells<W: Write>(
    parts: impl Iterator<Item = Particle>,
    mut compute: impl FnMut(&mut VoronoiCell, usize, usize) -> bool,
    w: &mut W,
) -> io::Result<()> {
    let mut cell = VoronoiCell::new();
    for p in parts {
        if !compute(&mut cell, p.block, p.slot) {
            continue;
        }
        let verts = cell.vertices_at(p.position[0], p.position[1], p.position[2]);
        for face in cell.faces() {
            // close the loop back to the first vertex, one vertex per line
            for &v in face.iter().chain(face.first()) {
                writeln!(w, "{} {} {}", verts[3 * v], verts[3 * v + 1], verts[3 * v + 2])?;
            }
            writeln!(w)?;
        }
    }
    Ok(())
}

fn write_pov_cells<W: Write>(
    parts: impl Iterator<Item = Particle>,
    mut compute: impl FnMut(&mut VoronoiCell, usize, usize) -> bool,
    w: &mut W,
) -> io::Result<()> {
    let mut cell = VoronoiCell::new();
    for p in parts {
        if !compute(&mut cell, p.block, p.slot) {
            continue;
        }
        writeln!(w, "// cell {}", p.id)?;
        let verts = cell.vertices_at(p.position[0], p.position[1], p.position[2]);
        for v in 0..cell.number_of_vertices() {
            writeln!(
                w,
                "sphere{{<{},{},{}>,r}}",
                verts[3 * v],
                verts[3 * v + 1],
                verts[3 * v + 2]
            )?;
        }
        for face in cell.faces() {
            for t in 0..face.len() {
                let a = face[t];
                let b = face[(t + 1) % face.len()];
                if a < b {
                    writeln!(
                        w,
                        "cylinder{{<{},{},{}>,<{},{},{}>,r}}",
                        verts[3 * a],
                        verts[3 * a + 1],
                        verts[3 * a + 2],
                        verts[3 * b],
                        verts[3 * b + 1],
                        verts[3 * b + 2]
                    )?;
                }
            }
        }
    }
    Ok(())
}

fn join_f64(v: &[f64]) -> String {
    v.iter()
        .map(|x| x.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn join_usize(v: &[usize]) -> String {
    v.iter()
        .map(|x| x.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn join_i32(v: &[i32]) -> String {
    v.iter()
        .map(|x| x.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn join_triples(v: &[f64]) -> String {
    v.chunks(3)
        .map(|t| format!("({},{},{})", t[0], t[1], t[2]))
        .collect::<Vec<_>>()
        .join(" ")
}

fn face_freq_table(orders: &[usize]) -> Vec<usize> {
    let max = orders.iter().copied().max().unwrap_or(0);
    let mut freq = vec![0usize; max + 1];
    for &o in orders {
        freq[o] += 1;
    }
    freq
}

fn write_custom_line<W: Write>(
    cell: &VoronoiCell,
    p: &Particle,
    format: &str,
    w: &mut W,
) -> io::Result<()> {
    let mut chars = format.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            write!(w, "{}", c)?;
            continue;
        }
        match chars.next() {
            None => write!(w, "%")?,
            Some(d) => match d {
                // particle-related
                'i' => write!(w, "{}", p.id)?,
                'x' => write!(w, "{}", p.position[0])?,
                'y' => write!(w, "{}", p.position[1])?,
                'z' => write!(w, "{}", p.position[2])?,
                'q' => write!(
                    w,
                    "{} {} {}",
                    p.position[0], p.position[1], p.position[2]
                )?,
                'r' => write!(w, "{}", p.radius)?,
                // vertex-related
                'w' => write!(w, "{}", cell.number_of_vertices())?,
                'p' => write!(w, "{}", join_triples(&cell.vertices()))?,
                'P' => write!(
                    w,
                    "{}",
                    join_triples(&cell.vertices_at(p.position[0], p.position[1], p.position[2]))
                )?,
                'o' => write!(w, "{}", join_usize(&cell.vertex_orders()))?,
                'm' => write!(w, "{}", cell.max_radius_squared())?,
                // edge-related
                'g' => write!(w, "{}", cell.number_of_edges())?,
                'E' => write!(w, "{}", cell.total_edge_distance())?,
                'e' => write!(w, "{}", join_f64(&cell.face_perimeters()))?,
                // face-related
                's' => write!(w, "{}", cell.number_of_faces())?,
                'F' => write!(w, "{}", cell.surface_area())?,
                'A' => write!(w, "{}", join_usize(&face_freq_table(&cell.face_orders())))?,
                'a' => write!(w, "{}", join_usize(&cell.face_orders()))?,
                'f' => write!(w, "{}", join_f64(&cell.face_areas()))?,
                't' => {
                    let faces = cell.faces();
                    let parts: Vec<String> = faces
                        .iter()
                        .map(|f| {
                            let idx: Vec<String> = f.iter().map(|v| v.to_string()).collect();
                            format!("({})", idx.join(","))
                        })
                        .collect();
                    write!(w, "{}", parts.join(" "))?
                }
                'l' => {
                    let normals = cell.face_normals();
                    let parts: Vec<String> = normals
                        .iter()
                        .map(|n| format!("({},{},{})", n[0], n[1], n[2]))
                        .collect();
                    write!(w, "{}", parts.join(" "))?
                }
                'n' => write!(w, "{}", join_i32(&cell.neighbors()))?,
                // volume-related
                'v' => write!(w, "{}", cell.volume())?,
                'c' => {
                    let c = cell.centroid();
                    write!(w, "{} {} {}", c[0], c[1], c[2])?
                }
                'C' => {
                    let c = cell.centroid();
                    write!(
                        w,
                        "{} {} {}",
                        c[0] + p.position[0],
                        c[1] + p.position[1],
                        c[2] + p.position[2]
                    )?
                }
                '%' => write!(w, "%")?,
                // an unrecognized directive is echoed verbatim
                other => write!(w, "%{}", other)?,
            },
        }
    }
    writeln!(w)
}

fn write_custom<W: Write>(
    parts: impl Iterator<Item = Particle>,
    mut compute: impl FnMut(&mut VoronoiCell, usize, usize) -> bool,
    format: &str,
    w: &mut W,
) -> io::Result<()> {
    let mut cell = VoronoiCell::new_tracking();
    for p in parts {
        if !compute(&mut cell, p.block, p.slot) {
            continue;
        }
        write_custom_line(&cell, &p, format, w)?;
    }
    Ok(())
}

impl Container {
    /// Writes `id x y z` per particle.
    pub fn draw_particles<W: Write>(&self, w: &mut W) -> io::Result<()> {
        for p in self.particles() {
            writeln!(
                w,
                "{} {} {} {}",
                p.id, p.position[0], p.position[1], p.position[2]
            )?;
        }
        Ok(())
    }

    /// Writes a POV-Ray sphere fragment per particle, radius variable `s`.
    pub fn draw_particles_pov<W: Write>(&self, w: &mut W) -> io::Result<()> {
        for p in self.particles() {
            writeln!(w, "// id {}", p.id)?;
            writeln!(
                w,
                "sphere{{<{},{},{}>,s}}",
                p.position[0], p.position[1], p.position[2]
            )?;
        }
        Ok(())
    }

    /// Writes each cell face as a gnuplot line loop: the face's vertices
    /// closed back to the first, one per line, blank line between faces.
    pub fn draw_cells_gnuplot<W: Write>(&self, w: &mut W) -> io::Result<()> {
        write_gnuplot_cells(self.particles(), |c, b, s| self.compute_cell(c, b, s), w)
    }

    /// Writes each cell as POV-Ray edge cylinders and vertex spheres,
    /// radius variable `r`.
    pub fn draw_cells_pov<W: Write>(&self, w: &mut W) -> io::Result<()> {
        write_pov_cells(self.particles(), |c, b, s| self.compute_cell(c, b, s), w)
    }

    /// Writes one line per live cell, substituting the `%`-directives of
    /// `format` with cell attributes. See the crate docs for the directive
    /// set.
    pub fn print_custom<W: Write>(&self, format: &str, w: &mut W) -> io::Result<()> {
        write_custom(
            self.particles(),
            |c, b, s| self.compute_cell(c, b, s),
            format,
            w,
        )
    }
}

impl ContainerPoly {
    /// Writes `id x y z r` per particle.
    pub fn draw_particles<W: Write>(&self, w: &mut W) -> io::Result<()> {
        for p in self.particles() {
            writeln!(
                w,
                "{} {} {} {} {}",
                p.id, p.position[0], p.position[1], p.position[2], p.radius
            )?;
        }
        Ok(())
    }

    /// Writes a POV-Ray sphere fragment per particle using its radius.
    pub fn draw_particles_pov<W: Write>(&self, w: &mut W) -> io::Result<()> {
        for p in self.particles() {
            writeln!(w, "// id {}", p.id)?;
            writeln!(
                w,
                "sphere{{<{},{},{}>,{}}}",
                p.position[0], p.position[1], p.position[2], p.radius
            )?;
        }
        Ok(())
    }

    /// Writes each cell face as a gnuplot line loop.
    pub fn draw_cells_gnuplot<W: Write>(&self, w: &mut W) -> io::Result<()> {
        write_gnuplot_cells(self.particles(), |c, b, s| self.compute_cell(c, b, s), w)
    }

    /// Writes each cell as POV-Ray edge cylinders and vertex spheres.
    pub fn draw_cells_pov<W: Write>(&self, w: &mut W) -> io::Result<()> {
        write_pov_cells(self.particles(), |c, b, s| self.compute_cell(c, b, s), w)
    }

    /// Writes one line per live cell, substituting the `%`-directives of
    /// `format` with cell attributes.
    pub fn print_custom<W: Write>(&self, format: &str, w: &mut W) -> io::Result<()> {
        write_custom(
            self.particles(),
            |c, b, s| self.compute_cell(c, b, s),
            format,
            w,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::BoundingBox;

    fn one_particle_container() -> Container {
        let mut con = Container::new(
            BoundingBox::new([0.0; 3], [1.0; 3]),
            [3, 3, 3],
            [false; 3],
        );
        con.put(0, 0.5, 0.5, 0.5).expect("put");
        con
    }

    #[test]
    fn gnuplot_emits_closed_face_loops() {
        let con = one_particle_container();
        let mut out = Vec::new();
        con.draw_cells_gnuplot(&mut out).expect("draw");
        let text = String::from_utf8(out).expect("utf8");
        // six quad faces, each 5 lines (closed loop) plus a separator
        let blocks: Vec<&str> = text.trim_end().split("\n\n").collect();
        assert_eq!(blocks.len(), 6);
        for b in blocks {
            let lines: Vec<&str> = b.lines().collect();
            assert_eq!(lines.len(), 5);
            assert_eq!(lines[0], lines[4]);
        }
    }

    #[test]
    fn custom_format_substitutes_directives() {
        let con = one_particle_container();
        let mut out = Vec::new();
        con.print_custom("%i %w %s %g %v", &mut out).expect("print");
        let text = String::from_utf8(out).expect("utf8");
        assert_eq!(text, "0 8 6 12 1\n");
    }

    #[test]
    fn custom_format_passes_unknown_directives() {
        let con = one_particle_container();
        let mut out = Vec::new();
        con.print_custom("%i%%%k", &mut out).expect("print");
        let text = String::from_utf8(out).expect("utf8");
        assert_eq!(text, "0%%k\n");
    }

    #[test]
    fn neighbor_directive_lists_box_walls() {
        let con = one_particle_container();
        let mut out = Vec::new();
        con.print_custom("%n", &mut out).expect("print");
        let text = String::from_utf8(out).expect("utf8");
        let mut ids: Vec<i32> = text
            .trim()
            .split(' ')
            .map(|t| t.parse().expect("id"))
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![-6, -5, -4, -3, -2, -1]);
    }
}
