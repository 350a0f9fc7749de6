use dissolve_common::{DISSOLVE_PARAM, ObjectId};
use dissolve_scene::Scene;
use glam::Vec3;

/// Which part of the scene to draw.
#[derive(Debug, Clone, Copy)]
pub struct RenderView {
    /// Tiles are the direct children of this object.
    pub root: ObjectId,
}

impl RenderView {
    pub fn new(root: ObjectId) -> Self {
        Self { root }
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads scene state and a view, then produces output. It never
/// mutates the scene.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the given scene and view.
    fn render(&self, scene: &Scene, view: &RenderView) -> Self::Output;
}

/// Glyphs from fully visible to fully dissolved.
const RAMP: [char; 8] = ['#', '%', '*', '+', '=', '-', ':', '.'];

/// Glyph for a dissolve value; values outside `[0, 1]` are clamped.
pub fn glyph_for(dissolve: f32) -> char {
    let t = dissolve.clamp(0.0, 1.0);
    let index = (t * (RAMP.len() - 1) as f32).round() as usize;
    RAMP[index]
}

/// Debug text renderer: one glyph per tile, one line per grid row.
///
/// Tiles are placed by their x/z offset from the root. Tiles without a
/// dissolve material draw as `?`; empty cells draw as a space.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &Scene, view: &RenderView) -> String {
        let Some(root) = scene.get(view.root) else {
            return "=== Grid (root missing) ===\n".to_string();
        };
        let origin = root.transform.position;

        let cells: Vec<(usize, usize, char)> = scene
            .children(view.root)
            .into_iter()
            .filter_map(|id| {
                let obj = scene.get(id)?;
                let (col, row) = cell_of(obj.transform.position, origin)?;
                let glyph = scene
                    .primary_material(id)
                    .and_then(|m| scene.get_float(m, DISSOLVE_PARAM))
                    .map(glyph_for)
                    .unwrap_or('?');
                Some((col, row, glyph))
            })
            .collect();

        let width = cells.iter().map(|c| c.0 + 1).max().unwrap_or(0);
        let height = cells.iter().map(|c| c.1 + 1).max().unwrap_or(0);
        let mut rows = vec![vec![' '; width]; height];
        for (col, row, glyph) in &cells {
            rows[*row][*col] = *glyph;
        }

        let mut out = format!(
            "=== Grid {}x{} (tiles={}, objects={}, materials={}) ===\n",
            width,
            height,
            cells.len(),
            scene.object_count(),
            scene.material_count()
        );
        for row in rows {
            out.extend(row);
            out.push('\n');
        }
        tracing::trace!(tiles = cells.len(), "rendered grid text");
        out
    }
}

/// Grid cell of a tile; `None` for tiles left of or behind the origin.
fn cell_of(position: Vec3, origin: Vec3) -> Option<(usize, usize)> {
    let col = (position.x - origin.x).round();
    let row = (position.z - origin.z).round();
    if col < 0.0 || row < 0.0 {
        return None;
    }
    Some((col as usize, row as usize))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dissolve_common::Transform;
    use dissolve_scene::Prefab;

    fn grid_scene(values: &[(u32, u32, f32)]) -> (Scene, ObjectId) {
        let mut scene = Scene::new();
        let root = scene.spawn("root", Transform::from_position(Vec3::new(2.0, 0.0, 3.0)), None);
        for (x, y, v) in values {
            let id = scene.instantiate(
                &Prefab::default(),
                format!("Tile ({x}, {y})"),
                Vec3::new(2.0 + *x as f32, *v, 3.0 + *y as f32),
                Some(root),
            );
            let m = scene.primary_material(id).unwrap();
            scene.set_float(m, DISSOLVE_PARAM, *v);
        }
        (scene, root)
    }

    #[test]
    fn ramp_endpoints() {
        assert_eq!(glyph_for(0.0), '#');
        assert_eq!(glyph_for(1.0), '.');
        assert_eq!(glyph_for(-4.0), '#');
        assert_eq!(glyph_for(9.0), '.');
    }

    #[test]
    fn renders_rows_by_z_offset() {
        let (scene, root) = grid_scene(&[(0, 0, 0.0), (1, 0, 1.0), (0, 1, 1.0), (1, 1, 0.0)]);
        let output = DebugTextRenderer::new().render(&scene, &RenderView::new(root));
        let lines: Vec<&str> = output.lines().collect();
        assert!(lines[0].contains("2x2"));
        assert!(lines[0].contains("tiles=4"));
        assert_eq!(lines[1], "#.");
        assert_eq!(lines[2], ".#");
    }

    #[test]
    fn tiles_without_renderer_draw_as_question_mark() {
        let mut scene = Scene::new();
        let root = scene.spawn("root", Transform::default(), None);
        scene.instantiate(&Prefab::without_renderer("bare"), "t", Vec3::ZERO, Some(root));
        let output = DebugTextRenderer::new().render(&scene, &RenderView::new(root));
        assert_eq!(output.lines().nth(1), Some("?"));
    }

    #[test]
    fn empty_root_renders_header_only() {
        let (scene, root) = grid_scene(&[]);
        let output = DebugTextRenderer::new().render(&scene, &RenderView::new(root));
        assert_eq!(output.lines().count(), 1);
        assert!(output.contains("tiles=0"));
    }

    #[test]
    fn missing_root_is_reported() {
        let scene = Scene::new();
        let output = DebugTextRenderer::new().render(&scene, &RenderView::new(ObjectId::new()));
        assert!(output.contains("root missing"));
    }
}
