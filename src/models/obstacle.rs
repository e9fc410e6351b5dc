use std::str::FromStr;

use crate::models::common::{Aabb, EntityKind, Point3};
use crate::models::traits::IOccupant;

/// 障害物の種別
///
/// 種別ごとに、高さ未指定時のデフォルト高さと通行妨害の有無が決まります。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleType {
    /// 壁
    Wall,
    /// 樹木
    Tree,
    /// 建物
    Building,
    /// 岩
    Rock,
    /// 穴（通行を妨害しない）
    Hole,
}

impl ObstacleType {
    /// 高さ指定がない場合に使用するデフォルト高さ（セル数）
    pub fn default_height(&self) -> i32 {
        match self {
            ObstacleType::Wall => 3,
            ObstacleType::Tree => 5,
            ObstacleType::Building => 10,
            ObstacleType::Rock => 2,
            ObstacleType::Hole => 0,
        }
    }

    /// 通行を妨害するかどうか
    pub fn blocks_passage(&self) -> bool {
        !matches!(self, ObstacleType::Hole)
    }

    /// 表示記号
    pub fn symbol(&self) -> char {
        match self {
            ObstacleType::Wall => '#',
            ObstacleType::Tree => 'T',
            ObstacleType::Building => 'B',
            ObstacleType::Rock => 'O',
            ObstacleType::Hole => 'H',
        }
    }

    /// 種別の表示名
    pub fn label(&self) -> &'static str {
        match self {
            ObstacleType::Wall => "壁",
            ObstacleType::Tree => "樹木",
            ObstacleType::Building => "建物",
            ObstacleType::Rock => "岩",
            ObstacleType::Hole => "穴",
        }
    }
}

impl FromStr for ObstacleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "wall" => Ok(ObstacleType::Wall),
            "tree" => Ok(ObstacleType::Tree),
            "building" => Ok(ObstacleType::Building),
            "rock" => Ok(ObstacleType::Rock),
            "hole" => Ok(ObstacleType::Hole),
            _ => Err(format!(
                "無効な障害物種別: {}. 利用可能: wall, tree, building, rock, hole",
                s
            )),
        }
    }
}

/// 障害物エンティティ（ボリュームエンティティ）
///
/// 固定のAABB領域を占有する静的エンティティです。配置後に移動・リサイズする
/// APIは存在せず、変更するには削除して再配置します。
#[derive(Debug, Clone)]
pub struct Obstacle {
    /// 障害物の一意識別子
    pub id: String,
    /// 種別
    pub obstacle_type: ObstacleType,
    /// 占有領域
    pub bounds: Aabb,
    /// 説明文
    pub description: String,
}

impl Obstacle {
    /// 2つの対角コーナーから障害物を作成
    pub fn from_corners(id: String, obstacle_type: ObstacleType, a: Point3, b: Point3) -> Self {
        let bounds = Aabb::new(a, b);
        let description = format!("{}（{}）", obstacle_type.label(), bounds);
        Self {
            id,
            obstacle_type,
            bounds,
            description,
        }
    }

    /// 底面矩形と基準高度・高さから障害物を作成
    ///
    /// z1 = base_z、z2 = base_z + max(0, 高さ - 1) となります。高さ未指定の
    /// 場合は種別のデフォルト高さを使用し、負の高さは0に丸めます。
    pub fn from_base(
        id: String,
        obstacle_type: ObstacleType,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        base_z: i32,
        height: Option<i32>,
    ) -> Self {
        let h = height.unwrap_or_else(|| obstacle_type.default_height()).max(0);
        let z2 = base_z + (h - 1).max(0);
        Self::from_corners(
            id,
            obstacle_type,
            Point3::new(x1, y1, base_z),
            Point3::new(x2, y2, z2),
        )
    }

    /// 通行を妨害するかどうか
    pub fn blocks_passage(&self) -> bool {
        self.obstacle_type.blocks_passage()
    }

    /// 指定座標までの最短距離
    ///
    /// 障害物表面（AABBの最近接点）から計測します。
    pub fn distance_to(&self, p: &Point3) -> f64 {
        self.bounds.closest_point(p).distance_3d(p)
    }
}

impl IOccupant for Obstacle {
    fn entity_id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Obstacle
    }

    fn symbol(&self) -> char {
        self.obstacle_type.symbol()
    }

    fn claimed_cells(&self) -> Vec<Point3> {
        if self.blocks_passage() {
            self.bounds.cells()
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_height_table() {
        assert_eq!(ObstacleType::Wall.default_height(), 3);
        assert_eq!(ObstacleType::Building.default_height(), 10);
        assert_eq!(ObstacleType::Hole.default_height(), 0);
    }

    #[test]
    fn test_blocks_passage_flag() {
        assert!(ObstacleType::Wall.blocks_passage());
        assert!(!ObstacleType::Hole.blocks_passage());
    }

    #[test]
    fn test_from_str() {
        assert_eq!("wall".parse::<ObstacleType>(), Ok(ObstacleType::Wall));
        assert_eq!("Building".parse::<ObstacleType>(), Ok(ObstacleType::Building));
        assert!("lava".parse::<ObstacleType>().is_err());
    }

    #[test]
    fn test_from_corners_normalizes() {
        let obstacle = Obstacle::from_corners(
            "OBS1".to_string(),
            ObstacleType::Building,
            Point3::new(6, 6, 2),
            Point3::new(5, 5, 0),
        );
        assert_eq!(obstacle.bounds.min, Point3::new(5, 5, 0));
        assert_eq!(obstacle.bounds.max, Point3::new(6, 6, 2));
    }

    #[test]
    fn test_from_base_with_explicit_height() {
        let obstacle = Obstacle::from_base(
            "OBS1".to_string(),
            ObstacleType::Wall,
            0,
            3,
            4,
            3,
            0,
            Some(2),
        );
        assert_eq!(obstacle.bounds.min, Point3::new(0, 3, 0));
        assert_eq!(obstacle.bounds.max, Point3::new(4, 3, 1));
    }

    #[test]
    fn test_from_base_uses_type_default() {
        // 壁のデフォルト高さは3 → z2 = 1 + (3 - 1) = 3
        let obstacle = Obstacle::from_base(
            "OBS1".to_string(),
            ObstacleType::Wall,
            0,
            0,
            2,
            0,
            1,
            None,
        );
        assert_eq!(obstacle.bounds.max.z, 3);
    }

    #[test]
    fn test_from_base_clamps_negative_height() {
        let obstacle = Obstacle::from_base(
            "OBS1".to_string(),
            ObstacleType::Rock,
            2,
            2,
            2,
            2,
            4,
            Some(-5),
        );
        // 負の高さは0に丸められ、1層のみ占有する
        assert_eq!(obstacle.bounds.min.z, 4);
        assert_eq!(obstacle.bounds.max.z, 4);
    }

    #[test]
    fn test_hole_claims_no_cells() {
        let hole = Obstacle::from_base(
            "HOLE1".to_string(),
            ObstacleType::Hole,
            0,
            0,
            1,
            1,
            0,
            None,
        );
        assert!(hole.claimed_cells().is_empty());

        let wall = Obstacle::from_base(
            "WALL1".to_string(),
            ObstacleType::Wall,
            0,
            0,
            1,
            1,
            0,
            Some(1),
        );
        assert_eq!(wall.claimed_cells().len(), 4);
    }

    #[test]
    fn test_distance_to_surface() {
        let obstacle = Obstacle::from_corners(
            "OBS1".to_string(),
            ObstacleType::Building,
            Point3::new(5, 5, 0),
            Point3::new(6, 6, 2),
        );
        // 表面に接する点からの距離は1
        assert!((obstacle.distance_to(&Point3::new(4, 5, 0)) - 1.0).abs() < 1e-9);
        // 内部の点は距離0
        assert!(obstacle.distance_to(&Point3::new(5, 6, 1)).abs() < 1e-9);
    }
}
