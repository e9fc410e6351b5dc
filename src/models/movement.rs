use crate::models::common::RobotState;
use crate::models::traits::IMovement;
use crate::world::{World, WorldError};

/// 地上ロボット用の移動検証器
///
/// 地上ロボットは現在のZ平面に拘束され、1ステップの平面移動距離が
/// 最大速度を超える要求は拒否されます。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundMovement {
    /// 1ステップで移動できる最大平面距離（セル）
    pub max_speed_cells: f64,
}

impl GroundMovement {
    pub fn new(max_speed_cells: f64) -> Self {
        Self {
            max_speed_cells: max_speed_cells.max(0.0),
        }
    }
}

impl IMovement for GroundMovement {
    fn validate(
        &self,
        world: &mut World,
        robot_id: &str,
        dx: i32,
        dy: i32,
        dz: i32,
    ) -> Result<(), WorldError> {
        let (state, position) = {
            let robot = world.robot(robot_id)?;
            (robot.state, robot.position)
        };

        if state == RobotState::Off {
            return Err(WorldError::EntityInactive(robot_id.to_string()));
        }
        if dz != 0 {
            return Err(WorldError::ActionNotAllowed(format!(
                "地上ロボット {} は垂直移動できません (dz={})",
                robot_id, dz
            )));
        }

        let target = position.offset(dx, dy, 0);
        let planar_distance = position.distance_xy(&target);
        if planar_distance > self.max_speed_cells {
            return Err(WorldError::ActionNotAllowed(format!(
                "移動距離 {:.2} が最大速度 {:.2} を超えています",
                planar_distance, self.max_speed_cells
            )));
        }

        world.move_entity(robot_id, target.x, target.y, target.z)
    }
}

/// 飛行ロボット用の移動検証器
///
/// 移動後の高度が [min_altitude, max_altitude] に収まらない要求は
/// クランプせずにそのまま拒否します。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AerialMovement {
    /// 最低飛行高度（セル、地表面の0未満には設定できない）
    pub min_altitude: i32,
    /// 最高飛行高度（セル）
    pub max_altitude: i32,
}

impl AerialMovement {
    pub fn new(min_altitude: i32, max_altitude: i32) -> Self {
        let min_altitude = min_altitude.max(0);
        Self {
            min_altitude,
            max_altitude: max_altitude.max(min_altitude),
        }
    }
}

impl IMovement for AerialMovement {
    fn validate(
        &self,
        world: &mut World,
        robot_id: &str,
        dx: i32,
        dy: i32,
        dz: i32,
    ) -> Result<(), WorldError> {
        let (state, position) = {
            let robot = world.robot(robot_id)?;
            (robot.state, robot.position)
        };

        if state == RobotState::Off {
            return Err(WorldError::EntityInactive(robot_id.to_string()));
        }

        let future_z = position.z + dz;
        if future_z > self.max_altitude {
            return Err(WorldError::ActionNotAllowed(format!(
                "移動後の高度 {} が上限 {} を超えています",
                future_z, self.max_altitude
            )));
        }
        if future_z < self.min_altitude {
            return Err(WorldError::ActionNotAllowed(format!(
                "移動後の高度 {} が下限 {} を下回っています",
                future_z, self.min_altitude
            )));
        }

        world.move_entity(robot_id, position.x + dx, position.y + dy, future_z)
    }
}

/// ロボットが保持する移動検証器（種別タグ付きバリアント）
///
/// ロボットの構築時に種別へ対応するバリアントが選択され、以降の移動要求は
/// すべてこの検証器を経由してワールドへ届きます。
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Movement {
    Ground(GroundMovement),
    Aerial(AerialMovement),
}

impl IMovement for Movement {
    fn validate(
        &self,
        world: &mut World,
        robot_id: &str,
        dx: i32,
        dy: i32,
        dz: i32,
    ) -> Result<(), WorldError> {
        match self {
            Movement::Ground(movement) => movement.validate(world, robot_id, dx, dy, dz),
            Movement::Aerial(movement) => movement.validate(world, robot_id, dx, dy, dz),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::common::Point3;
    use crate::models::entity::Entity;
    use crate::models::robot::Robot;

    fn world_with_ground_robot(max_speed_cells: f64) -> World {
        let mut world = World::new(10, 10, 10).unwrap();
        let mut robot = Robot::ground(
            "R001".to_string(),
            'R',
            "地上ロボット".to_string(),
            Point3::new(0, 0, 0),
            max_speed_cells,
        );
        robot.power_on();
        world.add_entity(Entity::Robot(robot)).unwrap();
        world
    }

    fn world_with_aerial_robot(z: i32, max_altitude: i32) -> World {
        let mut world = World::new(10, 10, 60).unwrap();
        let mut robot = Robot::aerial(
            "A001".to_string(),
            'A',
            "飛行ロボット".to_string(),
            Point3::new(5, 5, z),
            0,
            max_altitude,
        );
        robot.power_on();
        world.add_entity(Entity::Robot(robot)).unwrap();
        world
    }

    #[test]
    fn test_ground_move_within_speed_limit() {
        // 速度上限3に対して移動距離sqrt(8)≈2.83なので許可される
        let mut world = world_with_ground_robot(3.0);
        let movement = GroundMovement::new(3.0);

        movement.validate(&mut world, "R001", 2, 2, 0).unwrap();
        assert_eq!(world.robot("R001").unwrap().position, Point3::new(2, 2, 0));
    }

    #[test]
    fn test_ground_move_exceeding_speed_limit() {
        // 移動距離sqrt(18)≈4.24 > 3 なので拒否され、位置は変化しない
        let mut world = world_with_ground_robot(3.0);
        let movement = GroundMovement::new(3.0);

        movement.validate(&mut world, "R001", 2, 2, 0).unwrap();
        let result = movement.validate(&mut world, "R001", 3, 3, 0);
        assert!(matches!(result, Err(WorldError::ActionNotAllowed(_))));
        assert_eq!(world.robot("R001").unwrap().position, Point3::new(2, 2, 0));
    }

    #[test]
    fn test_ground_vertical_move_rejected() {
        let mut world = world_with_ground_robot(3.0);
        let movement = GroundMovement::new(3.0);

        let result = movement.validate(&mut world, "R001", 0, 0, 1);
        assert!(matches!(result, Err(WorldError::ActionNotAllowed(_))));
        assert_eq!(world.robot("R001").unwrap().position, Point3::new(0, 0, 0));
    }

    #[test]
    fn test_ground_move_rejected_while_off() {
        let mut world = world_with_ground_robot(3.0);
        world.robot_mut("R001").unwrap().power_off();
        let movement = GroundMovement::new(3.0);

        let result = movement.validate(&mut world, "R001", 1, 0, 0);
        assert!(matches!(result, Err(WorldError::EntityInactive(_))));
        assert_eq!(world.robot("R001").unwrap().position, Point3::new(0, 0, 0));
    }

    #[test]
    fn test_aerial_ceiling_rejected_not_clamped() {
        // 高度48から+5は上限50を超えるため拒否。+2はちょうど50で許可
        let mut world = world_with_aerial_robot(48, 50);
        let movement = AerialMovement::new(0, 50);

        let result = movement.validate(&mut world, "A001", 0, 0, 5);
        assert!(matches!(result, Err(WorldError::ActionNotAllowed(_))));
        assert_eq!(world.robot("A001").unwrap().position.z, 48);

        movement.validate(&mut world, "A001", 0, 0, 2).unwrap();
        assert_eq!(world.robot("A001").unwrap().position.z, 50);
    }

    #[test]
    fn test_aerial_floor_rejected() {
        let mut world = world_with_aerial_robot(2, 50);
        let movement = AerialMovement::new(0, 50);

        let result = movement.validate(&mut world, "A001", 0, 0, -3);
        assert!(matches!(result, Err(WorldError::ActionNotAllowed(_))));
        assert_eq!(world.robot("A001").unwrap().position.z, 2);
    }

    #[test]
    fn test_aerial_delegates_collision_to_world() {
        let mut world = world_with_aerial_robot(5, 50);
        let mut other = Robot::aerial(
            "A002".to_string(),
            'a',
            "飛行ロボット2".to_string(),
            Point3::new(5, 6, 5),
            0,
            50,
        );
        other.power_on();
        world.add_entity(Entity::Robot(other)).unwrap();

        // 高度規則は満たすが移動先セルが占有されているためワールドが拒否する
        let movement = AerialMovement::new(0, 50);
        let result = movement.validate(&mut world, "A001", 0, 1, 0);
        assert!(matches!(result, Err(WorldError::Collision { .. })));
        assert_eq!(world.robot("A001").unwrap().position, Point3::new(5, 5, 5));
    }

    #[test]
    fn test_movement_variant_dispatch() {
        let mut world = world_with_ground_robot(3.0);
        let movement = world.robot("R001").unwrap().movement;

        movement.validate(&mut world, "R001", 1, 1, 0).unwrap();
        assert_eq!(world.robot("R001").unwrap().position, Point3::new(1, 1, 0));
    }

    #[test]
    fn test_aerial_limits_normalized() {
        let movement = AerialMovement::new(-3, -1);
        assert_eq!(movement.min_altitude, 0);
        assert_eq!(movement.max_altitude, 0);
    }
}
