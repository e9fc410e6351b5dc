use crate::models::common::{EntityKind, Point3};
use crate::models::obstacle::Obstacle;
use crate::models::robot::Robot;
use crate::models::traits::IOccupant;

/// ワールドに登録されるエンティティ（タグ付きバリアント）
///
/// ポイントエンティティ（ロボット）とボリュームエンティティ（障害物）を
/// 1つの列挙型で扱い、ワールドは実行時型検査なしにmatchで分岐します。
#[derive(Debug, Clone)]
pub enum Entity {
    Robot(Robot),
    Obstacle(Obstacle),
}

impl Entity {
    /// エンティティの一意識別子
    pub fn id(&self) -> &str {
        match self {
            Entity::Robot(robot) => robot.entity_id(),
            Entity::Obstacle(obstacle) => obstacle.entity_id(),
        }
    }

    /// 占有種別タグ
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Robot(robot) => robot.kind(),
            Entity::Obstacle(obstacle) => obstacle.kind(),
        }
    }

    /// 表示記号
    pub fn symbol(&self) -> char {
        match self {
            Entity::Robot(robot) => robot.symbol(),
            Entity::Obstacle(obstacle) => obstacle.symbol(),
        }
    }

    /// 説明文
    pub fn description(&self) -> &str {
        match self {
            Entity::Robot(robot) => &robot.description,
            Entity::Obstacle(obstacle) => &obstacle.description,
        }
    }

    /// 占有を主張するセル座標の一覧
    pub fn claimed_cells(&self) -> Vec<Point3> {
        match self {
            Entity::Robot(robot) => robot.claimed_cells(),
            Entity::Obstacle(obstacle) => obstacle.claimed_cells(),
        }
    }

    /// ロボットとして参照
    pub fn as_robot(&self) -> Option<&Robot> {
        match self {
            Entity::Robot(robot) => Some(robot),
            Entity::Obstacle(_) => None,
        }
    }

    /// ロボットとして可変参照
    pub fn as_robot_mut(&mut self) -> Option<&mut Robot> {
        match self {
            Entity::Robot(robot) => Some(robot),
            Entity::Obstacle(_) => None,
        }
    }

    /// 障害物として参照
    pub fn as_obstacle(&self) -> Option<&Obstacle> {
        match self {
            Entity::Robot(_) => None,
            Entity::Obstacle(obstacle) => Some(obstacle),
        }
    }
}
