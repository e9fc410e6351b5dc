//! # Simulation モジュール
//!
//! シナリオ設定からワールドを組み立て、移動コマンドを逐次実行する
//! シミュレーションエンジンを提供します。
//!
//! エンジンは単一スレッドで動作し、ワールドへの書き込み（配置・削除・移動）を
//! 必ず1件ずつ直列に適用します。各コマンドの結果（成功または具体的な失敗）を
//! 観測してから次のコマンドへ進むため、占有グリッドの排他占有の不変条件が
//! 駆動側から崩れることはありません。
//!
//! ## 処理順序
//!
//! 1. **障害物配置**: シナリオの障害物を種別テーブルに従って構築し、登録
//! 2. **ロボット配置**: 地上・飛行ロボットを構築して電源を入れ、登録
//! 3. **コマンド実行**: 移動コマンドを記載順に1件ずつ、各ロボットが保持する
//!    移動検証器を経由して実行
//!
//! 移動の失敗（境界外・衝突・種別規則違反など）は回復可能な結果として
//! 記録・ログ出力され、シミュレーション全体は停止しません。

use std::str::FromStr;

use tracing::{debug, info, warn};

use crate::models::{
    Entity, IMovement, Obstacle, ObstacleType, Point3, Robot, RobotState,
};
use crate::scenario::{MoveCommand, ScenarioConfig};
use crate::world::{World, WorldError};

/// シミュレーション実行統計
#[derive(Debug, Clone, Copy, Default)]
pub struct RunStats {
    /// 実行したコマンド数
    pub executed: u64,
    /// 成功したコマンド数
    pub succeeded: u64,
    /// 失敗したコマンド数
    pub failed: u64,
}

pub struct SimulationEngine {
    pub world: World,
    pub scenario: ScenarioConfig,
    pub verbose_level: u8,
    pub stats: RunStats,
}

impl SimulationEngine {
    /// シナリオからエンジンを作成
    ///
    /// ワールドは空の状態で構築されます。エンティティの配置はinitializeで
    /// 行います。
    pub fn new(scenario: ScenarioConfig, verbose_level: u8) -> Result<Self, WorldError> {
        let world = World::new(
            scenario.world.width,
            scenario.world.depth,
            scenario.world.height,
        )?;
        Ok(Self {
            world,
            scenario,
            verbose_level,
            stats: RunStats::default(),
        })
    }

    /// ワールドへ障害物とロボットを配置
    pub fn initialize(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if self.verbose_level > 0 {
            info!("シミュレーションエンジンを初期化中...");
        }

        self.place_obstacles()?;
        self.place_robots()?;

        if self.verbose_level > 0 {
            info!("初期化完了:");
            info!("  地上ロボット: {}台", self.scenario.robots.ground.len());
            info!("  飛行ロボット: {}台", self.scenario.robots.aerial.len());
            info!("  障害物: {}個", self.scenario.obstacles.len());
        }

        Ok(())
    }

    fn place_obstacles(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        for config in &self.scenario.obstacles {
            let obstacle_type = ObstacleType::from_str(&config.r#type)?;

            let obstacle = match (&config.corners, &config.base) {
                (Some([a, b]), _) => Obstacle::from_corners(
                    config.id.clone(),
                    obstacle_type,
                    Point3::new(a.x, a.y, a.z),
                    Point3::new(b.x, b.y, b.z),
                ),
                (None, Some(base)) => Obstacle::from_base(
                    config.id.clone(),
                    obstacle_type,
                    base.x1,
                    base.y1,
                    base.x2,
                    base.y2,
                    base.base_z,
                    base.height,
                ),
                (None, None) => {
                    return Err(format!("障害物 {} の形状が未指定です", config.id).into());
                }
            };

            let bounds = obstacle.bounds;
            self.world.add_entity(Entity::Obstacle(obstacle))?;

            if self.verbose_level > 1 {
                debug!(
                    "障害物配置: {} ({} / 領域: {})",
                    config.id,
                    obstacle_type.label(),
                    bounds
                );
            }
        }

        Ok(())
    }

    fn place_robots(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        for config in &self.scenario.robots.ground {
            let mut robot = Robot::ground(
                config.id.clone(),
                config.symbol.unwrap_or('R'),
                config
                    .description
                    .clone()
                    .unwrap_or_else(|| format!("地上ロボット {}", config.id)),
                Point3::new(config.pos.x, config.pos.y, config.pos.z),
                config.max_speed_cells,
            );
            robot.power_on();
            self.world.add_entity(Entity::Robot(robot))?;

            if self.verbose_level > 1 {
                debug!(
                    "地上ロボット配置: {} (最大速度: {:.1}セル)",
                    config.id, config.max_speed_cells
                );
            }
        }

        for config in &self.scenario.robots.aerial {
            let mut robot = Robot::aerial(
                config.id.clone(),
                config.symbol.unwrap_or('A'),
                config
                    .description
                    .clone()
                    .unwrap_or_else(|| format!("飛行ロボット {}", config.id)),
                Point3::new(config.pos.x, config.pos.y, config.pos.z),
                config.min_altitude.unwrap_or(0),
                config.max_altitude,
            );
            robot.power_on();
            self.world.add_entity(Entity::Robot(robot))?;

            if self.verbose_level > 1 {
                debug!(
                    "飛行ロボット配置: {} (高度上限: {}セル)",
                    config.id, config.max_altitude
                );
            }
        }

        Ok(())
    }

    /// 移動コマンドを記載順に1件ずつ実行
    pub fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        info!("=== シミュレーション実行開始 ===");

        for index in 0..self.scenario.moves.len() {
            let command = self.scenario.moves[index].clone();
            self.execute_move(&command);
        }

        info!("=== シミュレーション完了 ===");
        info!("実行コマンド数: {}", self.stats.executed);
        info!(
            "成功: {} / 失敗: {}",
            self.stats.succeeded, self.stats.failed
        );

        Ok(())
    }

    /// 移動コマンド1件の実行
    ///
    /// ロボットが保持する検証器を経由し、結果を統計へ反映します。
    fn execute_move(&mut self, command: &MoveCommand) {
        self.stats.executed += 1;

        let movement = match self.world.robot(&command.robot) {
            Ok(robot) => robot.movement,
            Err(e) => {
                warn!("移動コマンド拒否: {}", e);
                self.stats.failed += 1;
                return;
            }
        };

        if let Ok(robot) = self.world.robot_mut(&command.robot) {
            robot.set_state(RobotState::Moving);
        }

        match movement.validate(
            &mut self.world,
            &command.robot,
            command.dx,
            command.dy,
            command.dz,
        ) {
            Ok(()) => {
                self.stats.succeeded += 1;
                if let Ok(robot) = self.world.robot(&command.robot) {
                    info!("移動成功: {} -> {}", command.robot, robot.position);
                }
            }
            Err(e) => {
                self.stats.failed += 1;
                warn!("移動失敗: {} ({})", command.robot, e);
            }
        }

        if let Ok(robot) = self.world.robot_mut(&command.robot) {
            robot.set_state(RobotState::Idle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_scenario() -> ScenarioConfig {
        let yaml = r#"
meta:
  version: "1.0"
  name: "エンジンテスト"
  description: "エンジン単体テスト用"
world:
  width: 10
  depth: 10
  height: 10
robots:
  ground:
    - id: R001
      pos: { x: 0, y: 0, z: 0 }
      max_speed_cells: 3.0
obstacles:
  - id: OBS1
    type: building
    corners:
      - { x: 5, y: 5, z: 0 }
      - { x: 6, y: 6, z: 2 }
moves:
  - { robot: R001, dx: 2, dy: 2, dz: 0 }
  - { robot: R001, dx: 3, dy: 3, dz: 0 }
  - { robot: R001, dx: 0, dy: 0, dz: 1 }
"#;
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_initialize_places_entities() {
        let mut engine = SimulationEngine::new(test_scenario(), 0).unwrap();
        engine.initialize().unwrap();

        assert_eq!(engine.world.entities().len(), 2);
        assert_eq!(engine.world.is_occupied(5, 5, 0), Ok(true));
        assert_eq!(engine.world.is_occupied(0, 0, 0), Ok(true));
        assert!(!engine.world.robot("R001").unwrap().is_off());
    }

    #[test]
    fn test_run_applies_commands_in_order() {
        let mut engine = SimulationEngine::new(test_scenario(), 0).unwrap();
        engine.initialize().unwrap();
        engine.run().unwrap();

        // 1件目のみ成功（2件目は速度超過、3件目は垂直移動で拒否）
        assert_eq!(engine.stats.executed, 3);
        assert_eq!(engine.stats.succeeded, 1);
        assert_eq!(engine.stats.failed, 2);
        assert_eq!(
            engine.world.robot("R001").unwrap().position,
            Point3::new(2, 2, 0)
        );
        assert_eq!(
            engine.world.robot("R001").unwrap().state,
            RobotState::Idle
        );
    }

    #[test]
    fn test_new_rejects_invalid_world() {
        let mut scenario = test_scenario();
        scenario.world.height = 0;
        assert!(matches!(
            SimulationEngine::new(scenario, 0),
            Err(WorldError::InvalidDimensions { .. })
        ));
    }
}
