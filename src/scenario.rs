use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::models::ObstacleType;

/// シナリオメタデータ
#[derive(Debug, Deserialize, Serialize)]
pub struct ScenarioMeta {
    pub version: String,
    pub name: String,
    pub description: String,
}

/// ワールド設定
#[derive(Debug, Deserialize, Serialize)]
pub struct WorldConfig {
    pub width: i32,
    pub depth: i32,
    pub height: i32,
}

/// セル座標
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct CellPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// 地上ロボット設定
#[derive(Debug, Deserialize, Serialize)]
pub struct GroundRobotConfig {
    pub id: String,
    pub symbol: Option<char>,
    pub description: Option<String>,
    pub pos: CellPos,
    pub max_speed_cells: f64,
}

/// 飛行ロボット設定
#[derive(Debug, Deserialize, Serialize)]
pub struct AerialRobotConfig {
    pub id: String,
    pub symbol: Option<char>,
    pub description: Option<String>,
    pub pos: CellPos,
    pub min_altitude: Option<i32>,
    pub max_altitude: i32,
}

/// ロボット配備設定
#[derive(Debug, Deserialize, Serialize)]
pub struct RobotForcesConfig {
    #[serde(default)]
    pub ground: Vec<GroundRobotConfig>,
    #[serde(default)]
    pub aerial: Vec<AerialRobotConfig>,
}

/// 障害物の底面矩形指定
#[derive(Debug, Deserialize, Serialize)]
pub struct BaseRect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
    pub base_z: i32,
    pub height: Option<i32>,
}

/// 障害物設定
///
/// cornersまたはbaseのどちらか一方を指定します。
#[derive(Debug, Deserialize, Serialize)]
pub struct ObstacleConfig {
    pub id: String,
    pub r#type: String, // "type"はRustのキーワードなのでr#でエスケープ
    pub corners: Option<[CellPos; 2]>,
    pub base: Option<BaseRect>,
}

/// 移動コマンド
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MoveCommand {
    pub robot: String,
    pub dx: i32,
    pub dy: i32,
    pub dz: i32,
}

/// 完全なシナリオ設定
#[derive(Debug, Deserialize, Serialize)]
pub struct ScenarioConfig {
    pub meta: ScenarioMeta,
    pub world: WorldConfig,
    pub robots: RobotForcesConfig,
    #[serde(default)]
    pub obstacles: Vec<ObstacleConfig>,
    #[serde(default)]
    pub moves: Vec<MoveCommand>,
}

impl ScenarioConfig {
    /// YAMLファイルからシナリオ設定を読み込み
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();

        // ファイル存在チェック
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.to_path_buf()));
        }

        // ファイル読み込み
        let contents = fs::read_to_string(path)
            .map_err(|e| ScenarioError::IoError(path.to_path_buf(), e))?;

        // YAML解析
        let config: ScenarioConfig = serde_yaml::from_str(&contents)
            .map_err(|e| ScenarioError::ParseError(path.to_path_buf(), e))?;

        // 基本的な検証
        config.validate()?;

        Ok(config)
    }

    /// 設定の基本的な検証
    pub fn validate(&self) -> Result<(), ScenarioError> {
        // ワールド寸法の検証
        if self.world.width <= 0 || self.world.depth <= 0 || self.world.height <= 0 {
            return Err(ScenarioError::ValidationError(
                "World dimensions must be positive".to_string(),
            ));
        }

        // ID重複の検証
        let mut ids: Vec<&str> = Vec::new();
        for id in self
            .robots
            .ground
            .iter()
            .map(|r| r.id.as_str())
            .chain(self.robots.aerial.iter().map(|r| r.id.as_str()))
            .chain(self.obstacles.iter().map(|o| o.id.as_str()))
        {
            if ids.contains(&id) {
                return Err(ScenarioError::ValidationError(format!(
                    "Duplicate entity id: {}",
                    id
                )));
            }
            ids.push(id);
        }

        // 地上ロボットの検証
        for robot in &self.robots.ground {
            if !self.is_cell_in_bounds(&robot.pos) {
                return Err(ScenarioError::ValidationError(format!(
                    "Robot {} initial position outside world bounds",
                    robot.id
                )));
            }
            if robot.max_speed_cells < 0.0 {
                return Err(ScenarioError::ValidationError(format!(
                    "Robot {} max_speed_cells must be non-negative",
                    robot.id
                )));
            }
        }

        // 飛行ロボットの検証
        for robot in &self.robots.aerial {
            if !self.is_cell_in_bounds(&robot.pos) {
                return Err(ScenarioError::ValidationError(format!(
                    "Robot {} initial position outside world bounds",
                    robot.id
                )));
            }
            if robot.max_altitude < 0 {
                return Err(ScenarioError::ValidationError(format!(
                    "Robot {} max_altitude must be non-negative",
                    robot.id
                )));
            }
            if let Some(min) = robot.min_altitude {
                if min > robot.max_altitude {
                    return Err(ScenarioError::ValidationError(format!(
                        "Robot {} min_altitude exceeds max_altitude",
                        robot.id
                    )));
                }
            }
        }

        // 障害物の検証
        for obstacle in &self.obstacles {
            ObstacleType::from_str(&obstacle.r#type)
                .map_err(ScenarioError::ValidationError)?;
            match (&obstacle.corners, &obstacle.base) {
                (Some(_), None) | (None, Some(_)) => {}
                _ => {
                    return Err(ScenarioError::ValidationError(format!(
                        "Obstacle {} must specify exactly one of corners/base",
                        obstacle.id
                    )));
                }
            }
        }

        // 移動コマンドの対象存在チェック
        for command in &self.moves {
            let known = self.robots.ground.iter().any(|r| r.id == command.robot)
                || self.robots.aerial.iter().any(|r| r.id == command.robot);
            if !known {
                return Err(ScenarioError::ValidationError(format!(
                    "Move command references unknown robot: {}",
                    command.robot
                )));
            }
        }

        Ok(())
    }

    /// セル座標がワールド寸法内かどうかをチェック
    fn is_cell_in_bounds(&self, pos: &CellPos) -> bool {
        pos.x >= 0 && pos.x < self.world.width
            && pos.y >= 0 && pos.y < self.world.depth
            && pos.z >= 0 && pos.z < self.world.height
    }

    /// シナリオの概要を表示
    pub fn print_summary(&self) {
        println!("=== シナリオ情報 ===");
        println!("名前: {}", self.meta.name);
        println!("説明: {}", self.meta.description);
        println!("バージョン: {}", self.meta.version);
        println!();

        println!("=== ワールド設定 ===");
        println!(
            "寸法: {} x {} x {} セル",
            self.world.width, self.world.depth, self.world.height
        );
        println!();

        println!("=== 配備 ===");
        println!("地上ロボット: {}台", self.robots.ground.len());
        println!("飛行ロボット: {}台", self.robots.aerial.len());
        println!("障害物: {}個", self.obstacles.len());
        println!();

        println!("=== ミッション ===");
        println!("移動コマンド: {}件", self.moves.len());
        for robot in &self.robots.ground {
            println!(
                "  {}: 地上 (初期位置: {}, {}, {} / 最大速度: {:.1}セル)",
                robot.id, robot.pos.x, robot.pos.y, robot.pos.z, robot.max_speed_cells
            );
        }
        for robot in &self.robots.aerial {
            println!(
                "  {}: 飛行 (初期位置: {}, {}, {} / 高度上限: {}セル)",
                robot.id, robot.pos.x, robot.pos.y, robot.pos.z, robot.max_altitude
            );
        }
    }
}

/// シナリオ読み込みエラー
#[derive(Debug)]
pub enum ScenarioError {
    FileNotFound(std::path::PathBuf),
    IoError(std::path::PathBuf, std::io::Error),
    ParseError(std::path::PathBuf, serde_yaml::Error),
    ValidationError(String),
}

impl std::fmt::Display for ScenarioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScenarioError::FileNotFound(path) => {
                write!(f, "シナリオファイルが見つかりません: {}", path.display())
            }
            ScenarioError::IoError(path, err) => {
                write!(f, "ファイル読み込みエラー {}: {}", path.display(), err)
            }
            ScenarioError::ParseError(path, err) => {
                write!(f, "YAML解析エラー {}: {}", path.display(), err)
            }
            ScenarioError::ValidationError(msg) => {
                write!(f, "設定検証エラー: {}", msg)
            }
        }
    }
}

impl std::error::Error for ScenarioError {}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_YAML: &str = r#"
meta:
  version: "1.0"
  name: "テストシナリオ"
  description: "検証用"
world:
  width: 10
  depth: 10
  height: 10
robots:
  ground:
    - id: R001
      symbol: R
      pos: { x: 0, y: 0, z: 0 }
      max_speed_cells: 3.0
  aerial:
    - id: A001
      pos: { x: 9, y: 9, z: 5 }
      max_altitude: 8
obstacles:
  - id: OBS1
    type: building
    corners:
      - { x: 5, y: 5, z: 0 }
      - { x: 6, y: 6, z: 2 }
  - id: WALL1
    type: wall
    base: { x1: 0, y1: 3, x2: 4, y2: 3, base_z: 0, height: 2 }
moves:
  - robot: R001
    dx: 2
    dy: 2
    dz: 0
"#;

    #[test]
    fn test_parse_and_validate() {
        let config: ScenarioConfig = serde_yaml::from_str(VALID_YAML).unwrap();
        config.validate().unwrap();
        assert_eq!(config.robots.ground.len(), 1);
        assert_eq!(config.robots.aerial.len(), 1);
        assert_eq!(config.obstacles.len(), 2);
        assert_eq!(config.moves.len(), 1);
        assert_eq!(config.robots.ground[0].symbol, Some('R'));
    }

    #[test]
    fn test_validate_rejects_bad_dimensions() {
        let mut config: ScenarioConfig = serde_yaml::from_str(VALID_YAML).unwrap();
        config.world.width = 0;
        assert!(matches!(
            config.validate(),
            Err(ScenarioError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validate_rejects_duplicate_ids() {
        let mut config: ScenarioConfig = serde_yaml::from_str(VALID_YAML).unwrap();
        config.obstacles[0].id = "R001".to_string();
        assert!(matches!(
            config.validate(),
            Err(ScenarioError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validate_rejects_out_of_bounds_robot() {
        let mut config: ScenarioConfig = serde_yaml::from_str(VALID_YAML).unwrap();
        config.robots.ground[0].pos.x = 10;
        assert!(matches!(
            config.validate(),
            Err(ScenarioError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validate_rejects_unknown_obstacle_type() {
        let mut config: ScenarioConfig = serde_yaml::from_str(VALID_YAML).unwrap();
        config.obstacles[0].r#type = "lava".to_string();
        assert!(matches!(
            config.validate(),
            Err(ScenarioError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validate_rejects_ambiguous_obstacle_shape() {
        let mut config: ScenarioConfig = serde_yaml::from_str(VALID_YAML).unwrap();
        config.obstacles[0].base = Some(BaseRect {
            x1: 0,
            y1: 0,
            x2: 1,
            y2: 1,
            base_z: 0,
            height: None,
        });
        assert!(matches!(
            config.validate(),
            Err(ScenarioError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validate_rejects_unknown_move_target() {
        let mut config: ScenarioConfig = serde_yaml::from_str(VALID_YAML).unwrap();
        config.moves[0].robot = "R999".to_string();
        assert!(matches!(
            config.validate(),
            Err(ScenarioError::ValidationError(_))
        ));
    }

    #[test]
    fn test_from_file_missing_path() {
        let result = ScenarioConfig::from_file("scenarios/does_not_exist.yaml");
        assert!(matches!(result, Err(ScenarioError::FileNotFound(_))));
    }
}
