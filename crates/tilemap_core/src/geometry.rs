//! 几何工具：矩形比较、格子命中测试、二维 ↔ 扁平数组。

/// 屏幕（或区域局部）坐标点，原点左上、y 向下。
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// 轴对齐矩形。全零矩形（[`CellRect::EMPTY`]）表示“没有”。
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CellRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CellRect {
    pub const EMPTY: CellRect = CellRect {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        rects_equal(self, &Self::EMPTY)
    }

    /// 包含判定（四条边都算在内）。
    pub fn contains(&self, point: Point) -> bool {
        if self.width <= 0.0 || self.height <= 0.0 {
            return false;
        }
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }
}

#[inline]
fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// 按两位小数比较两个矩形。
///
/// 指针坐标乘缩放后会有浮点噪声，精确比较会导致 hover 每帧都被判定为“变化”。
pub fn rects_equal(a: &CellRect, b: &CellRect) -> bool {
    round2(a.x) == round2(b.x)
        && round2(a.y) == round2(b.y)
        && round2(a.width) == round2(b.width)
        && round2(a.height) == round2(b.height)
}

/// 返回包含 `point` 的格子下标 `(row, col)`。
///
/// 扫描整个网格并保留最后一个命中：落在相邻格子公共边上的点归属于下标更大的格子。
pub fn locate_cell_index(point: Point, grid: &[Vec<CellRect>]) -> Option<(usize, usize)> {
    let mut hit = None;
    for (row, cells) in grid.iter().enumerate() {
        for (col, rect) in cells.iter().enumerate() {
            if rect.contains(point) {
                hit = Some((row, col));
            }
        }
    }
    hit
}

/// 返回包含 `point` 的格子矩形；未命中时返回 [`CellRect::EMPTY`]。
pub fn locate_cell(point: Point, grid: &[Vec<CellRect>]) -> CellRect {
    locate_cell_index(point, grid)
        .map(|(row, col)| grid[row][col])
        .unwrap_or(CellRect::EMPTY)
}

/// 行优先展开。
pub fn flatten<T: Clone>(grid: &[Vec<T>]) -> Vec<T> {
    grid.iter().flat_map(|row| row.iter().cloned()).collect()
}

/// [`flatten`] 的逆操作。`columns == 0` 或输入为空时返回空网格。
///
/// 末尾不足一行的元素仍保留为一行（长度较短）。
pub fn unflatten<T: Clone>(flat: &[T], columns: usize) -> Vec<Vec<T>> {
    if columns == 0 || flat.is_empty() {
        return Vec::new();
    }
    flat.chunks(columns).map(|row| row.to_vec()).collect()
}
