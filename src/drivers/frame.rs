use crate::drivers::grid::GridLine;

/// Ordered (x, y) pixel coordinates, one vertex per display column.
pub type VertexSequence = Vec<[f32; 2]>;

/// Everything the presentation layer needs for one full clear-and-redraw.
///
/// Built entirely from one acquisition block and dropped after the redraw;
/// nothing is retained across cycles.
#[derive(Clone, Debug)]
pub struct RenderFrame {
    pub vertices: VertexSequence,
    pub grid: Vec<GridLine>,
}
