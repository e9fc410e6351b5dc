use std::fmt;

/// 3次元セル座標を表す構造体
///
/// ワールドの占有グリッドはセル単位の整数座標で管理されます。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point3 {
    pub x: i32,
    pub y: i32,
    pub z: i32, // 高度方向
}

impl Point3 {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// 変位量を加えた座標を返す
    pub fn offset(&self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// XY平面での2次元距離を計算
    pub fn distance_xy(&self, other: &Point3) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        (dx.powi(2) + dy.powi(2)).sqrt()
    }

    /// 3次元距離を計算
    pub fn distance_3d(&self, other: &Point3) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        let dz = (self.z - other.z) as f64;
        (dx.powi(2) + dy.powi(2) + dz.powi(2)).sqrt()
    }
}

impl fmt::Display for Point3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// 軸並行境界ボックス（AABB）
///
/// 2つの対角コーナーから構築され、各軸について min <= max が常に成立するよう
/// 構築時に正規化されます。正規化されていない状態で保持されることはありません。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aabb {
    pub min: Point3,
    pub max: Point3,
}

impl Aabb {
    /// 2つの対角コーナーからAABBを作成
    ///
    /// 軸ごとにmin/maxを解決するため、コーナーの指定順序は問いません。
    pub fn new(a: Point3, b: Point3) -> Self {
        Self {
            min: Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// 座標がAABB内（両コーナーを含む）にあるかを判定
    pub fn contains(&self, p: &Point3) -> bool {
        p.x >= self.min.x && p.x <= self.max.x
            && p.y >= self.min.y && p.y <= self.max.y
            && p.z >= self.min.z && p.z <= self.max.z
    }

    /// AABB内で指定座標に最も近い点を返す
    ///
    /// 各軸について座標を [min, max] にクランプします。障害物表面までの
    /// 近接距離を求める際に使用します。
    pub fn closest_point(&self, p: &Point3) -> Point3 {
        Point3::new(
            p.x.clamp(self.min.x, self.max.x),
            p.y.clamp(self.min.y, self.max.y),
            p.z.clamp(self.min.z, self.max.z),
        )
    }

    /// AABBに含まれるセル数
    pub fn cell_count(&self) -> u64 {
        let dx = (self.max.x - self.min.x + 1) as u64;
        let dy = (self.max.y - self.min.y + 1) as u64;
        let dz = (self.max.z - self.min.z + 1) as u64;
        dx * dy * dz
    }

    /// AABBに含まれる全セル座標を列挙
    pub fn cells(&self) -> Vec<Point3> {
        let mut cells = Vec::with_capacity(self.cell_count() as usize);
        for z in self.min.z..=self.max.z {
            for y in self.min.y..=self.max.y {
                for x in self.min.x..=self.max.x {
                    cells.push(Point3::new(x, y, z));
                }
            }
        }
        cells
    }
}

impl fmt::Display for Aabb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.min, self.max)
    }
}

/// グリッドセルの占有種別を表す列挙型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Empty,    // 空きセル
    Robot,    // ロボット
    Obstacle, // 障害物
    Unknown,  // 不明
}

impl EntityKind {
    /// 描画時のフォールバック記号
    pub fn symbol(&self) -> char {
        match self {
            EntityKind::Empty => '.',
            EntityKind::Robot => 'R',
            EntityKind::Obstacle => '#',
            EntityKind::Unknown => '?',
        }
    }
}

/// ロボットの動作状態を表す列挙型
///
/// 状態遷移はロボットの所有者（ミッション側）のみが行い、
/// ワールドはOffかどうかの判定にのみ使用します。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RobotState {
    Off,           // 電源OFF
    On,            // 電源ON
    Moving,        // 移動中
    ExecutingTask, // タスク実行中
    Idle,          // 待機中
}

/// ロボットの向きを表す列挙型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// 向きの表示名
    pub fn label(&self) -> &'static str {
        match self {
            Direction::North => "北",
            Direction::South => "南",
            Direction::East => "東",
            Direction::West => "西",
        }
    }
}
