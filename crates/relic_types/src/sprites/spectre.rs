//! Spectre `shap` 3-D shape resources.
//!
//! A `shap` holds a vertex list, colored planar faces (one-based vertex
//! indices), and a separate top-view wireframe. Coordinates are 16.16
//! fixed point. The decoded mesh can be emitted as STL (triangulated via
//! ear clipping, since faces may be concave) or OBJ (which keeps the
//! original polygons but needs per-vertex normals), and the top view as
//! an SVG line drawing.

use crate::error::DecodeError;
use crate::io::ByteReader;
use crate::quickdraw::Fixed;

/// A 3-D point.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec3 {
	/// X coordinate
	pub x: f64,
	/// Y coordinate
	pub y: f64,
	/// Z coordinate
	pub z: f64,
}

impl Vec3 {
	fn sub(self, other: Vec3) -> Vec3 {
		Vec3 { x: self.x - other.x, y: self.y - other.y, z: self.z - other.z }
	}

	fn cross(self, other: Vec3) -> Vec3 {
		Vec3 {
			x: self.y * other.z - self.z * other.y,
			y: self.z * other.x - self.x * other.z,
			z: self.x * other.y - self.y * other.x,
		}
	}

	fn dot(self, other: Vec3) -> f64 {
		self.x * other.x + self.y * other.y + self.z * other.z
	}

	fn norm(self) -> f64 {
		self.dot(self).sqrt()
	}

	fn scaled(self, factor: f64) -> Vec3 {
		Vec3 { x: self.x * factor, y: self.y * factor, z: self.z * factor }
	}
}

/// One face: a vertex loop and a color index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plane {
	/// Indices into the vertex list (zero-based after parsing)
	pub vertex_nums: Vec<usize>,
	/// Color index into the game's palette
	pub color_index: u16,
}

/// One top-view wireframe segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopViewLine {
	/// Start vertex index
	pub start: usize,
	/// End vertex index
	pub end: usize,
}

/// A decoded 3-D shape.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedShap3d {
	/// Model vertices
	pub vertices: Vec<Vec3>,
	/// Faces
	pub planes: Vec<Plane>,
	/// Top-view vertices (y unused)
	pub top_view_vertices: Vec<Vec3>,
	/// Top-view segments
	pub top_view_lines: Vec<TopViewLine>,
}

fn parse_vec3(r: &mut ByteReader<'_>) -> Result<Vec3, DecodeError> {
	Ok(Vec3 {
		x: Fixed::parse(r)?.as_f64(),
		y: Fixed::parse(r)?.as_f64(),
		z: Fixed::parse(r)?.as_f64(),
	})
}

/// Parses a `shap` resource. All counts on disk are stored minus one,
/// and vertex references are one-based.
pub fn decode_shap_3d(data: &[u8]) -> Result<DecodedShap3d, DecodeError> {
	let mut r = ByteReader::new(data);

	let num_vertices = r.get_u16_be()? as usize + 1;
	let mut vertices = Vec::with_capacity(num_vertices);
	for _ in 0..num_vertices {
		vertices.push(parse_vec3(&mut r)?);
	}

	let num_planes = r.get_u16_be()? as usize + 1;
	let mut planes = Vec::with_capacity(num_planes);
	for _ in 0..num_planes {
		let num_plane_vertices = r.get_u16_be()? as usize + 1;
		let mut vertex_nums = Vec::with_capacity(num_plane_vertices);
		for _ in 0..num_plane_vertices {
			let index = r.get_u16_be()? as usize;
			if index == 0 || index > vertices.len() {
				return Err(DecodeError::out_of_bounds(format!(
					"face references vertex {index} of {}",
					vertices.len()
				)));
			}
			vertex_nums.push(index - 1);
		}
		let color_index = r.get_u16_be()?;
		planes.push(Plane { vertex_nums, color_index });
	}

	let num_top_vertices = r.get_u16_be()? as usize + 1;
	let mut top_view_vertices = Vec::with_capacity(num_top_vertices);
	for _ in 0..num_top_vertices {
		top_view_vertices.push(parse_vec3(&mut r)?);
	}

	let num_lines = r.get_u16_be()? as usize + 1;
	let mut top_view_lines = Vec::with_capacity(num_lines);
	for _ in 0..num_lines {
		let start = r.get_u16_be()? as usize;
		let end = r.get_u16_be()? as usize;
		if start == 0 || end == 0 || start > num_top_vertices || end > num_top_vertices {
			return Err(DecodeError::out_of_bounds(format!(
				"top view line references vertex {start}/{end}"
			)));
		}
		top_view_lines.push(TopViewLine { start: start - 1, end: end - 1 });
	}

	Ok(DecodedShap3d { vertices, planes, top_view_vertices, top_view_lines })
}

fn face_normal(points: &[Vec3]) -> Option<Vec3> {
	if points.len() < 3 {
		return None;
	}
	let n = points[1].sub(points[0]).cross(points[points.len() - 1].sub(points[0]));
	let norm = n.norm();
	(norm != 0.0).then(|| n.scaled(1.0 / norm))
}

fn project_to_plane(normal: Vec3, points: &[Vec3]) -> Vec<(f64, f64)> {
	// Any affine basis preserves the loop's orientation
	let mut b1 = points[1].sub(points[0]);
	b1 = b1.scaled(1.0 / b1.norm().max(f64::MIN_POSITIVE));
	let mut b2 = points[2].sub(points[0]);
	b2 = b2.scaled(1.0 / b2.norm().max(f64::MIN_POSITIVE));
	points
		.iter()
		.map(|&pt| {
			let v = pt.sub(points[0]);
			let projected = pt.sub(normal.scaled(v.dot(normal)));
			(b1.dot(projected), b2.dot(projected))
		})
		.collect()
}

fn ccw(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> bool {
	(c.1 - a.1) * (b.0 - a.0) <= (b.1 - a.1) * (c.0 - a.0)
}

/// Splits a planar polygon into triangles by ear clipping; concave
/// loops are handled by only clipping ears of the dominant orientation.
/// Falls back to a fan when clipping stalls.
fn triangulate(points: &[(f64, f64)]) -> Vec<[usize; 3]> {
	if points.len() < 3 {
		return Vec::new();
	}
	for initial_ccw in [false, true] {
		let mut remaining: Vec<usize> = (0..points.len()).collect();
		let mut triangles = Vec::new();
		let mut cursor = 0usize;
		let mut skips = 0usize;
		while remaining.len() > 2 {
			let i1 = remaining[cursor % remaining.len()];
			let i2 = remaining[(cursor + 1) % remaining.len()];
			let i3 = remaining[(cursor + 2) % remaining.len()];
			if ccw(points[i1], points[i2], points[i3]) == initial_ccw {
				triangles.push([i1, i2, i3]);
				remaining.remove((cursor + 1) % remaining.len());
				skips = 0;
			} else {
				cursor += 1;
				skips += 1;
				if skips > remaining.len() {
					break;
				}
			}
		}
		if remaining.len() == 2 {
			return triangles;
		}
	}
	// Degenerate loop; fan it
	(1..points.len() - 1).map(|i| [0, i, i + 1]).collect()
}

impl DecodedShap3d {
	fn plane_points(&self, plane: &Plane) -> Vec<Vec3> {
		plane.vertex_nums.iter().map(|&i| self.vertices[i]).collect()
	}

	/// Emits the mesh as ASCII STL.
	#[must_use]
	pub fn to_stl(&self) -> String {
		let mut lines = vec!["solid shap".to_string()];
		for plane in &self.planes {
			let points = self.plane_points(plane);
			let Some(normal) = face_normal(&points) else {
				continue;
			};
			let projected = project_to_plane(normal, &points);
			for tri in triangulate(&projected) {
				lines.push(format!("facet normal {} {} {}", normal.x, normal.y, normal.z));
				lines.push("  outer loop".to_string());
				for &index in &tri {
					let p = points[index];
					lines.push(format!("    vertex {} {} {}", p.x, p.y, p.z));
				}
				lines.push("  endloop".to_string());
				lines.push("endfacet".to_string());
			}
		}
		lines.push("endsolid shap".to_string());
		lines.join("\n")
	}

	/// Emits the mesh as Wavefront OBJ, keeping polygonal faces.
	#[must_use]
	pub fn to_obj(&self) -> String {
		let mut lines = Vec::new();
		for v in &self.vertices {
			lines.push(format!("v {} {} {}", v.x, v.y, v.z));
		}
		let mut face_lines = Vec::new();
		let mut normal_count = 0usize;
		for plane in &self.planes {
			let points = self.plane_points(plane);
			let Some(normal) = face_normal(&points) else {
				continue;
			};
			lines.push(format!("vn {} {} {}", normal.x, normal.y, normal.z));
			normal_count += 1;
			let mut face = String::from("f");
			for &index in &plane.vertex_nums {
				face.push_str(&format!(" {}//{}", index + 1, normal_count));
			}
			face_lines.push(face);
		}
		lines.extend(face_lines);
		lines.join("\n")
	}

	/// Emits the top view as an SVG line drawing (x/z plane; the y
	/// coordinates of top-view vertices are unused).
	#[must_use]
	pub fn top_view_svg(&self) -> String {
		let mut xmin = 0.0f64;
		let mut xmax = 0.0f64;
		let mut zmin = 0.0f64;
		let mut zmax = 0.0f64;
		let mut first = true;
		for line in &self.top_view_lines {
			for pt in [self.top_view_vertices[line.start], self.top_view_vertices[line.end]] {
				if first {
					xmin = pt.x;
					xmax = pt.x;
					zmin = pt.z;
					zmax = pt.z;
					first = false;
				} else {
					xmin = xmin.min(pt.x);
					xmax = xmax.max(pt.x);
					zmin = zmin.min(pt.z);
					zmax = zmax.max(pt.z);
				}
			}
		}

		let mut lines = vec![
			"<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\"?>".to_string(),
			format!(
				"<svg width=\"{}\" height=\"{}\" viewBox=\"{} {} {} {}\" xmlns=\"http://www.w3.org/2000/svg\">",
				(xmax - xmin) as i64,
				(zmax - zmin) as i64,
				xmin,
				zmin,
				xmax - xmin,
				zmax - zmin
			),
		];
		for line in &self.top_view_lines {
			let start = self.top_view_vertices[line.start];
			let end = self.top_view_vertices[line.end];
			lines.push(format!(
				"<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"black\" stroke-width=\"1\" />",
				start.x, start.z, end.x, end.z
			));
		}
		lines.push("</svg>".to_string());
		lines.join("\n")
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn fixed(v: f64) -> [u8; 4] {
		((v * 65536.0) as i32).to_be_bytes()
	}

	fn unit_square_shap() -> Vec<u8> {
		let mut d = Vec::new();
		// 4 vertices (count - 1 = 3)
		d.extend_from_slice(&3u16.to_be_bytes());
		for (x, y, z) in [(0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (1.0, 1.0, 0.0), (0.0, 1.0, 0.0)] {
			d.extend_from_slice(&fixed(x));
			d.extend_from_slice(&fixed(y));
			d.extend_from_slice(&fixed(z));
		}
		// 1 plane with 4 one-based vertices, color 7
		d.extend_from_slice(&0u16.to_be_bytes());
		d.extend_from_slice(&3u16.to_be_bytes());
		for index in [1u16, 2, 3, 4] {
			d.extend_from_slice(&index.to_be_bytes());
		}
		d.extend_from_slice(&7u16.to_be_bytes());
		// 2 top view vertices, 1 line
		d.extend_from_slice(&1u16.to_be_bytes());
		for (x, y, z) in [(0.0, 0.0, 0.0), (2.0, 0.0, 2.0)] {
			d.extend_from_slice(&fixed(x));
			d.extend_from_slice(&fixed(y));
			d.extend_from_slice(&fixed(z));
		}
		d.extend_from_slice(&0u16.to_be_bytes());
		d.extend_from_slice(&1u16.to_be_bytes());
		d.extend_from_slice(&2u16.to_be_bytes());
		d
	}

	#[test]
	fn test_parse_square() {
		let shap = decode_shap_3d(&unit_square_shap()).unwrap();
		assert_eq!(shap.vertices.len(), 4);
		assert_eq!(shap.planes.len(), 1);
		assert_eq!(shap.planes[0].vertex_nums, vec![0, 1, 2, 3]);
		assert_eq!(shap.planes[0].color_index, 7);
		assert_eq!(shap.top_view_lines, vec![TopViewLine { start: 0, end: 1 }]);
	}

	#[test]
	fn test_bad_vertex_reference() {
		let mut data = unit_square_shap();
		// Vertex index 9 in the face (offset: 2 + 4*12 + 2 + 2)
		data[54] = 0;
		data[55] = 9;
		assert!(matches!(decode_shap_3d(&data), Err(DecodeError::OutOfBounds(_))));
	}

	#[test]
	fn test_stl_triangulates_square() {
		let shap = decode_shap_3d(&unit_square_shap()).unwrap();
		let stl = shap.to_stl();
		assert_eq!(stl.matches("facet normal").count(), 2);
		assert!(stl.starts_with("solid shap"));
		assert!(stl.ends_with("endsolid shap"));
	}

	#[test]
	fn test_obj_keeps_quad() {
		let shap = decode_shap_3d(&unit_square_shap()).unwrap();
		let obj = shap.to_obj();
		assert_eq!(obj.matches("\nf ").count() + usize::from(obj.starts_with("f ")), 1);
		assert!(obj.contains("v 0 0 0") || obj.contains("v 0.0 0.0 0.0") || obj.contains("v 0 0 0"));
	}

	#[test]
	fn test_svg_bounds() {
		let shap = decode_shap_3d(&unit_square_shap()).unwrap();
		let svg = shap.top_view_svg();
		assert!(svg.contains("<svg width=\"2\" height=\"2\""));
		assert!(svg.contains("<line"));
	}
}
